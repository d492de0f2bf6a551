//! OpenAPI import: loading, dereferencing and endpoint extraction

pub mod composite_loader;
pub mod dereference;
pub mod endpoints;
pub mod file_loader;
pub mod http_loader;

pub use composite_loader::CompositeSpecLoader;
pub use dereference::{ApiSpecification, dereference};
pub use endpoints::extract_endpoints;
pub use file_loader::FileSpecLoader;
pub use http_loader::HttpSpecLoader;

use serde_json::Value;

use crate::generation::GenerationError;

/// Serialization format of a spec document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    /// Try JSON first, then YAML
    Unknown,
}

/// Parses spec content as JSON or YAML.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Value, GenerationError> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(content)?),
        DocumentFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| GenerationError::LoadError(format!("Failed to parse YAML: {e}"))),
        DocumentFormat::Unknown => serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| GenerationError::LoadError(format!("Failed to parse spec: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_formats() {
        let json = parse_document(r#"{"paths": {}}"#, DocumentFormat::Json).unwrap();
        assert!(json["paths"].is_object());

        let yaml = parse_document("paths:\n  /a: {}\n", DocumentFormat::Unknown).unwrap();
        assert!(yaml["paths"]["/a"].is_object());

        assert!(matches!(
            parse_document("paths: [", DocumentFormat::Yaml),
            Err(GenerationError::LoadError(_))
        ));
        assert!(matches!(
            parse_document("{", DocumentFormat::Json),
            Err(GenerationError::SerializationError(_))
        ));
    }
}
