//! Infrastructure layer - concrete implementations of domain ports

pub mod openapi;
pub mod synthesis;

pub use openapi::{CompositeSpecLoader, FileSpecLoader, HttpSpecLoader};
pub use synthesis::InferenceSynthesizer;
