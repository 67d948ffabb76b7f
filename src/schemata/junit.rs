//! JUnit XML report schema
//!
//! The report layout written by most test runners:
//!
//! ```text
//! testsuites
//! └── testsuite*          @name @timestamp @hostname @id @package
//!     │                   @tests @errors @failures @time
//!     ├── properties?
//!     │   └── property*   @name @value
//!     ├── testcase*       @name @classname @time
//!     │   └── (error | failure)?   @message @type #text
//!     ├── system-out?
//!     └── system-err?
//! ```

use crate::error::Result;
use crate::fields::Field;
use crate::models::Model;
use crate::validators::{Choice, Occurs, Sequence, SequenceElement};
use std::sync::Arc;

/// Output pattern of the `timestamp` attribute
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The models of a JUnit report, from `property` up to `testsuites`
#[derive(Debug, Clone)]
pub struct JUnitSchema {
    /// `<property name="" value=""/>`
    pub property: Arc<Model>,
    /// `<properties>` wrapping the properties of a suite
    pub properties: Arc<Model>,
    /// `<error>` / `<failure>` of a test case
    pub failure_status: Arc<Model>,
    /// `<testcase>`
    pub test_case: Arc<Model>,
    /// `<testsuite>`
    pub test_suite: Arc<Model>,
    /// `<testsuites>`, the document root
    pub test_suites: Arc<Model>,
}

impl JUnitSchema {
    /// Build every model of the schema
    pub fn new() -> Result<Self> {
        let property = Model::builder("Property")
            .root("property")
            .attribute("name", Field::token().min_length(1).required())
            .attribute("value", Field::text().no_strip().required())
            .build()?;

        let properties = Model::builder("Properties")
            .root("properties")
            .field("property", Field::models(&property))
            .sequence(Sequence::new().element("property", Occurs::zero_or_more()))
            .build()?;

        let failure_status = Model::builder("FailureStatus")
            .attribute("message", Field::text())
            .attribute("type", Field::text().required())
            .text("details", Field::text().no_strip())
            .build()?;

        let test_case = Model::builder("TestCase")
            .root("testcase")
            .field("error", Field::model(&failure_status))
            .field("failure", Field::model(&failure_status))
            .attribute("name", Field::token().required())
            .attribute("classname", Field::token().required())
            .attribute("time", Field::non_negative_float().required())
            .sequence(
                Sequence::new().choice(
                    Choice::new()
                        .element(SequenceElement::required("error"))
                        .element(SequenceElement::required("failure"))
                        .optional(),
                ),
            )
            .build()?;

        let test_suite = Model::builder("TestSuite")
            .root("testsuite")
            .field("properties", Field::model(&properties))
            .field("testcase", Field::models(&test_case))
            .field("system_out", Field::text().no_strip().source("system-out"))
            .field("system_err", Field::text().no_strip().source("system-err"))
            .attribute("name", Field::token().required())
            .attribute(
                "timestamp",
                Field::datetime().canonical_format(TIMESTAMP_FORMAT).required(),
            )
            .attribute("hostname", Field::token().required())
            .attribute("id", Field::non_negative_integer())
            .attribute("package", Field::token())
            .attribute("tests", Field::non_negative_integer().required())
            .attribute("errors", Field::non_negative_integer().required())
            .attribute("failures", Field::non_negative_integer().required())
            .attribute("time", Field::non_negative_float().required())
            .sequence(
                Sequence::new()
                    .element("properties", Occurs::optional())
                    .element("testcase", Occurs::zero_or_more())
                    .element("system_out", Occurs::optional())
                    .element("system_err", Occurs::optional()),
            )
            .build()?;

        let test_suites = Model::builder("TestSuites")
            .root("testsuites")
            .field("testsuite", Field::models(&test_suite))
            .sequence(Sequence::new().element("testsuite", Occurs::zero_or_more()))
            .build()?;

        Ok(Self {
            property,
            properties,
            failure_status,
            test_case,
            test_suite,
            test_suites,
        })
    }
}
