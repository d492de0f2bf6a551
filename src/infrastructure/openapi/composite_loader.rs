//! Composite spec loader that picks a strategy from the source

use async_trait::async_trait;
use tracing::debug;

use super::http_loader::is_http_url;
use super::{DocumentFormat, FileSpecLoader, HttpSpecLoader, parse_document};
use crate::generation::{GenerationError, SpecLoader};

/// Loads inline documents, URLs and files
pub struct CompositeSpecLoader {
    http: Box<dyn SpecLoader>,
    file: Box<dyn SpecLoader>,
}

impl CompositeSpecLoader {
    pub fn new() -> Result<Self, GenerationError> {
        Ok(Self::with_loaders(
            Box::new(HttpSpecLoader::new()?),
            Box::new(FileSpecLoader::new()),
        ))
    }

    pub fn with_loaders(http: Box<dyn SpecLoader>, file: Box<dyn SpecLoader>) -> Self {
        Self { http, file }
    }
}

#[async_trait]
impl SpecLoader for CompositeSpecLoader {
    async fn load(&self, source: &str) -> Result<serde_json::Value, GenerationError> {
        let trimmed = source.trim();

        if trimmed.starts_with('{') {
            debug!("CompositeSpecLoader: Parsing inline document");
            parse_document(trimmed, DocumentFormat::Json)
        } else if is_http_url(trimmed) {
            debug!(url = %trimmed, "CompositeSpecLoader: Using HTTP loader");
            self.http.load(trimmed).await
        } else {
            debug!(path = %trimmed, "CompositeSpecLoader: Using file loader");
            self.file.load(trimmed).await
        }
    }
}
