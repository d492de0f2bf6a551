//! File-based spec loader
//!
//! This loader handles only file I/O. Parsing is shared with the other loaders.

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{DocumentFormat, parse_document};
use crate::generation::{GenerationError, SpecLoader};

/// Loads API specifications from local files
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSpecLoader;

impl FileSpecLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpecLoader for FileSpecLoader {
    async fn load(&self, source: &str) -> Result<serde_json::Value, GenerationError> {
        debug!(path = %source, "Reading spec file");
        let content = fs::read_to_string(source).await?;

        let format = if source.ends_with(".json") {
            DocumentFormat::Json
        } else if source.ends_with(".yaml") || source.ends_with(".yml") {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Unknown
        };
        parse_document(&content, format)
    }
}
