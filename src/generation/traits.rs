//! Port interfaces for the generation domain

use async_trait::async_trait;
use serde_json::Value;

use crate::generation::{GenerationError, SynthesisError};

/// What a type declaration is synthesized from
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisSource {
    /// An example value
    Example(Value),
    /// JSON Schema text
    Schema(String),
}

/// A named schema for batch synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSchema {
    pub name: String,
    pub schema: String,
}

/// Turns examples and schemas into TypeScript type declarations
#[async_trait]
pub trait TypeSynthesizer: Send + Sync {
    /// Declare `name` (and any nested types it needs) from one source.
    async fn synthesize(
        &self,
        name: &str,
        source: &SynthesisSource,
    ) -> Result<String, SynthesisError>;

    /// Declare every schema in one pass so shared shapes are declared once.
    async fn synthesize_batch(&self, sources: &[NamedSchema]) -> Result<String, SynthesisError>;
}

/// Loads API specification documents
#[async_trait]
pub trait SpecLoader: Send + Sync {
    /// Load a spec document from a source
    async fn load(&self, source: &str) -> Result<Value, GenerationError>;
}
