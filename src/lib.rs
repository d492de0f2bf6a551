//! hookgen turns example payloads, JSON Schemas and OpenAPI documents into
//! typed React Query models, api functions, query keys and hooks.
#![deny(unsafe_code)]

pub mod config;
pub mod generation;
pub mod infrastructure;

pub use config::CodegenConfig;
pub use generation::{GenerateFileResponse, GenerateRequest, GenerationError, HookGenerator};
pub use infrastructure::InferenceSynthesizer;
