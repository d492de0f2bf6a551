//! Boundary to the type synthesizer
//!
//! Every call goes through [`SynthesisBridge`], which tags failures with the
//! feature being generated. Failures are never retried.

use std::sync::Arc;

use tracing::debug;

use crate::generation::{GenerationError, NamedSchema, SynthesisSource, TypeSynthesizer};

#[derive(Clone)]
pub struct SynthesisBridge {
    synthesizer: Arc<dyn TypeSynthesizer>,
}

impl SynthesisBridge {
    pub fn new(synthesizer: Arc<dyn TypeSynthesizer>) -> Self {
        Self { synthesizer }
    }

    /// Synthesizes `type_name` for `feature`.
    pub async fn synthesize(
        &self,
        feature: &str,
        type_name: &str,
        source: &SynthesisSource,
    ) -> Result<String, GenerationError> {
        debug!(feature, type_name, "Synthesizing type");
        let declaration = self
            .synthesizer
            .synthesize(type_name, source)
            .await
            .map_err(|e| GenerationError::SchemaGeneration {
                feature: feature.to_string(),
                message: format!("{type_name}: {e}"),
            })?;
        Ok(declaration.trim_end().to_string())
    }

    /// Synthesizes all `sources` in one call; `label` names the batch in errors.
    pub async fn synthesize_batch(
        &self,
        label: &str,
        sources: &[NamedSchema],
    ) -> Result<String, GenerationError> {
        debug!(count = sources.len(), "Synthesizing batch types");
        let declarations = self
            .synthesizer
            .synthesize_batch(sources)
            .await
            .map_err(|e| GenerationError::SchemaGeneration {
                feature: label.to_string(),
                message: e.to_string(),
            })?;
        Ok(declarations.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::SynthesisError;
    use async_trait::async_trait;

    struct FailingSynthesizer;

    #[async_trait]
    impl TypeSynthesizer for FailingSynthesizer {
        async fn synthesize(
            &self,
            _name: &str,
            _source: &SynthesisSource,
        ) -> Result<String, SynthesisError> {
            Err(SynthesisError::Other("boom".into()))
        }

        async fn synthesize_batch(
            &self,
            _sources: &[NamedSchema],
        ) -> Result<String, SynthesisError> {
            Err(SynthesisError::InvalidSchema("bad".into()))
        }
    }

    #[tokio::test]
    async fn test_failures_name_the_feature() {
        let bridge = SynthesisBridge::new(Arc::new(FailingSynthesizer));
        let err = bridge
            .synthesize("getUser", "GetUserResponse", &SynthesisSource::Schema("{}".into()))
            .await
            .unwrap_err();
        match err {
            GenerationError::SchemaGeneration { feature, message } => {
                assert_eq!(feature, "getUser");
                assert_eq!(message, "GetUserResponse: boom");
            }
            other => panic!("Expected SchemaGeneration, got {other:?}"),
        }

        let err = bridge.synthesize_batch("batch", &[]).await.unwrap_err();
        assert!(err.to_string().contains("invalid schema: bad"));
    }
}
