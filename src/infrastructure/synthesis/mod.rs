//! In-process type synthesizer
//!
//! [`InferenceSynthesizer`] infers TypeScript declarations from example
//! values and converts JSON Schema documents. A batch shares one registry so
//! nested shapes common to several endpoints are declared once.

mod example;
mod registry;
mod schema;

use async_trait::async_trait;
use tracing::debug;

use crate::generation::{NamedSchema, SynthesisError, SynthesisSource, TypeSynthesizer};
use example::declare_example;
use registry::TypeRegistry;
use schema::{declare_schema, parse_schema};

/// Default [`TypeSynthesizer`] that needs no external tooling
#[derive(Debug, Clone, Copy, Default)]
pub struct InferenceSynthesizer;

impl InferenceSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TypeSynthesizer for InferenceSynthesizer {
    async fn synthesize(
        &self,
        name: &str,
        source: &SynthesisSource,
    ) -> Result<String, SynthesisError> {
        let mut registry = TypeRegistry::new();
        match source {
            SynthesisSource::Example(value) => declare_example(&mut registry, name, value),
            SynthesisSource::Schema(text) => {
                let document = parse_schema(text)?;
                declare_schema(&mut registry, name, &document)?;
            }
        }
        Ok(registry.render())
    }

    async fn synthesize_batch(&self, sources: &[NamedSchema]) -> Result<String, SynthesisError> {
        let documents = sources
            .iter()
            .map(|source| parse_schema(&source.schema))
            .collect::<Result<Vec<_>, _>>()?;

        let mut registry = TypeRegistry::new();
        for source in sources {
            registry.claim(&source.name);
        }
        for (source, document) in sources.iter().zip(&documents) {
            declare_schema(&mut registry, &source.name, document)?;
        }

        debug!(sources = sources.len(), "Synthesized batch declarations");
        Ok(registry.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_example_source() {
        let out = InferenceSynthesizer::new()
            .synthesize("GetUserResponse", &SynthesisSource::Example(json!({ "id": 1 })))
            .await
            .unwrap();
        assert_eq!(out, "export interface GetUserResponse {\n  id: number;\n}");
    }

    #[tokio::test]
    async fn test_invalid_schema_text() {
        let err = InferenceSynthesizer::new()
            .synthesize("X", &SynthesisSource::Schema("{ not json".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidSchema(_)));
    }

    #[tokio::test]
    async fn test_batch_shares_nested_shapes() {
        let address = json!({
            "type": "object",
            "properties": { "city": { "type": "string" } }
        });
        let user = json!({ "type": "object", "properties": { "address": address } });
        let shop = json!({ "type": "object", "properties": { "location": address, "open": { "type": "boolean" } } });
        let sources = vec![
            NamedSchema { name: "GetUserResponse".into(), schema: user.to_string() },
            NamedSchema { name: "GetShopResponse".into(), schema: shop.to_string() },
            NamedSchema { name: "GetUserAgainResponse".into(), schema: user.to_string() },
        ];

        let out = InferenceSynthesizer::new()
            .synthesize_batch(&sources)
            .await
            .unwrap();

        assert!(out.contains("address?: GetUserResponseAddress;"));
        assert!(out.contains("location?: GetUserResponseAddress;"));
        assert!(!out.contains("interface GetShopResponseLocation"));
        assert!(out.contains("export type GetUserAgainResponse = GetUserResponse;"));
        assert!(out.find("interface GetUserResponse {") < out.find("interface GetShopResponse {"));
    }

    #[tokio::test]
    async fn test_batch_fails_on_any_invalid_schema() {
        let sources = vec![
            NamedSchema { name: "A".into(), schema: "{}".into() },
            NamedSchema { name: "B".into(), schema: "nope".into() },
        ];
        assert!(InferenceSynthesizer::new().synthesize_batch(&sources).await.is_err());
    }
}
