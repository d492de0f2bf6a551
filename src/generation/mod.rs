//! Generation domain module - turns endpoint descriptions into hook fragments
//!
//! This module implements the core code generation logic: it parses example
//! and schema inputs, splits request variables, classifies the response
//! envelope, asks a [`TypeSynthesizer`] for type declarations and emits the
//! model, api, queryKey and hook fragments of a feature.

pub mod batch;
pub mod classifier;
pub mod emitter;
pub mod errors;
pub mod input;
pub mod orchestrator;
pub mod sanitizers;
pub mod synthesis;
pub mod traits;
pub mod types;
pub mod utils;
pub mod variables;

pub use batch::{BatchModels, ModelTypeNames};
pub use classifier::{ConventionalPagination, PaginationPolicy, ResponseShapeClassification};
pub use errors::*;
pub use orchestrator::*;
pub use traits::*;
pub use types::*;
