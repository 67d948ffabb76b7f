//! Validators
//!
//! Building blocks the fields and models are assembled from: facets,
//! lexical conversions, temporal formats, identity constraints and the
//! sequence/choice content models.

pub mod base;
pub mod facets;
pub mod groups;
pub mod helpers;
pub mod identities;
pub mod particles;
pub mod temporal;

pub use base::{Facet, ValidityStatus};
pub use facets::{
    BoundFacet, BoundKind, EnumerationFacet, Lexical, LexicalFacet, MaxLengthFacet,
    MinLengthFacet, NumericBound, PatternFacet,
};
pub use groups::{Choice, ChoiceOption, Sequence, SequenceElement, SequenceMatch, SequenceParticle};
pub use identities::{ConstraintKind, IdentityStore, KeyConstraint};
pub use particles::Occurs;
pub use temporal::{TemporalFormats, TemporalKind};
