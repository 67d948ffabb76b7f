//! Bundled schemas expressed with the model builder

pub mod junit;

pub use junit::JUnitSchema;
