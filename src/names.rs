//! XML lexical classes for text values
//!
//! Predicates for Name, NCName, NMTOKEN, language tags and collapsed
//! tokens, plus the e-mail shape check used by email fields.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z:_][\w:\-\.]*$").unwrap());

static NCNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z_][\w\-\.]*$").unwrap());

static NMTOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w:\-\.]+$").unwrap());

static LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").unwrap());

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .unwrap()
});

/// Check if a string is a valid XML Name (at most one colon)
pub fn is_valid_name(name: &str) -> bool {
    NAME.is_match(name) && name.matches(':').count() <= 1
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Check if a string is a valid NMTOKEN
pub fn is_valid_nmtoken(token: &str) -> bool {
    NMTOKEN.is_match(token)
}

/// Check if a string is a language tag: parts of one to eight characters
/// separated by dashes, the first part letters only
pub fn is_valid_language(tag: &str) -> bool {
    LANGUAGE.is_match(tag)
}

/// Check that whitespace is collapsed: no leading, trailing or repeated
/// whitespace and no tabs or newlines
pub fn is_collapsed(value: &str) -> bool {
    value.split_whitespace().collect::<Vec<_>>().join(" ") == value
}

/// Check the shape of an e-mail address
pub fn is_valid_email(address: &str) -> bool {
    EMAIL.is_match(address)
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}
