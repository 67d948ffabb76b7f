//! Models
//!
//! A [`Model`] is declared once with [`Model::builder`] and shared behind
//! an `Arc`; every converted record is an [`Instance`] of it.

mod instance;
mod schema;

pub use instance::Instance;
pub use schema::{Model, ModelBuilder, ModelOptions, UnknownKeys};
