//! Error types for the generation domain

use thiserror::Error;

/// Errors that can occur while generating fragments
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Missing required input: {0}")]
    MissingInput(&'static str),

    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Failed to generate types for '{feature}': {message}")]
    SchemaGeneration { feature: String, message: String },

    #[error("Invalid OpenAPI spec: {0}")]
    InvalidSpec(String),

    #[error("OpenAPI loading error: {0}")]
    LoadError(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl GenerationError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by a type synthesizer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("unresolved reference '{0}'")]
    UnresolvedReference(String),

    #[error("{0}")]
    Other(String),
}
