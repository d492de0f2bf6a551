//! Batch model aggregation
//!
//! Collects the response and variables schemas of many endpoints and
//! synthesizes them in a single call, so shapes shared between endpoints are
//! declared once.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::generation::synthesis::SynthesisBridge;
use crate::generation::utils::FeatureNames;
use crate::generation::{BatchModelSpec, GenerationError, NamedSchema};

/// Type names derived for one endpoint of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTypeNames {
    pub feature_name: String,
    pub response: String,
    pub variables: String,
    /// Whether a response schema was declared under `response`
    pub has_response: bool,
    /// Whether a params schema was declared under `variables`
    pub has_variables: bool,
}

/// Result of batch aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchModels {
    /// One entry per spec, in input order
    pub names: Vec<ModelTypeNames>,
    /// The combined declarations, absent when no spec had a schema
    pub model: Option<String>,
}

/// Derives type names for every spec and synthesizes all schemas at once.
pub async fn aggregate(
    bridge: &SynthesisBridge,
    specs: &[BatchModelSpec],
) -> Result<BatchModels, GenerationError> {
    let mut names = Vec::with_capacity(specs.len());
    let mut sources = Vec::new();

    for spec in specs {
        let feature = FeatureNames::new(&spec.feature_name);
        let response_schema = non_blank(&spec.response_schema);
        let params_schema = non_blank(&spec.params_schema);

        if let Some(schema) = response_schema {
            sources.push(NamedSchema {
                name: feature.response_type(),
                schema: schema.to_string(),
            });
        }
        if let Some(schema) = params_schema {
            sources.push(NamedSchema {
                name: feature.variables_type(),
                schema: schema.to_string(),
            });
        }

        names.push(ModelTypeNames {
            feature_name: spec.feature_name.clone(),
            response: feature.response_type(),
            variables: feature.variables_type(),
            has_response: response_schema.is_some(),
            has_variables: params_schema.is_some(),
        });
    }

    if sources.is_empty() {
        debug!(endpoints = specs.len(), "No schemas to synthesize in batch");
        return Ok(BatchModels { names, model: None });
    }

    info!(
        endpoints = specs.len(),
        schemas = sources.len(),
        "Synthesizing batch models"
    );
    let label = format!("batch of {} endpoints", specs.len());
    let model = bridge.synthesize_batch(&label, &sources).await?;

    Ok(BatchModels {
        names,
        model: Some(model).filter(|m| !m.trim().is_empty()),
    })
}

/// Makes feature names unique in order, suffixing repeats with `_2`, `_3`, ...
///
/// Names are compared by the camel and Pascal forms every fragment derives
/// from them, so `getUser` and `GetUser` collide. The result holds the camel
/// form of each name.
pub fn unique_feature_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut camels: HashSet<String> = HashSet::with_capacity(names.len());
    let mut pascals: HashSet<String> = HashSet::with_capacity(names.len());
    let mut unique = Vec::with_capacity(names.len());

    for name in names {
        let base = FeatureNames::new(name.as_ref()).camel().to_string();
        let mut candidate = FeatureNames::new(&base);
        let mut counter = 2;
        while camels.contains(candidate.camel()) || pascals.contains(candidate.pascal()) {
            candidate = FeatureNames::new(&format!("{base}_{counter}"));
            counter += 1;
        }
        camels.insert(candidate.camel().to_string());
        pascals.insert(candidate.pascal().to_string());
        unique.push(candidate.camel().to_string());
    }

    unique
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{SynthesisError, SynthesisSource, TypeSynthesizer};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingSynthesizer {
        batches: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl TypeSynthesizer for RecordingSynthesizer {
        async fn synthesize(
            &self,
            name: &str,
            _source: &SynthesisSource,
        ) -> Result<String, SynthesisError> {
            Ok(format!("export type {name} = any;"))
        }

        async fn synthesize_batch(
            &self,
            sources: &[NamedSchema],
        ) -> Result<String, SynthesisError> {
            let names: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();
            self.batches.lock().unwrap().push(names.clone());
            Ok(names
                .iter()
                .map(|n| format!("export type {n} = any;"))
                .collect::<Vec<_>>()
                .join("\n\n"))
        }
    }

    fn spec(name: &str, response: Option<&str>, params: Option<&str>) -> BatchModelSpec {
        BatchModelSpec {
            feature_name: name.into(),
            response_schema: response.map(String::from),
            params_schema: params.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_one_batch_call_for_all_schemas() {
        let synthesizer = Arc::new(RecordingSynthesizer::default());
        let bridge = SynthesisBridge::new(synthesizer.clone());
        let specs = vec![
            spec("getUser", Some("{}"), Some("{}")),
            spec("listUsers", Some("{}"), None),
            spec("ping", None, None),
        ];

        let models = aggregate(&bridge, &specs).await.unwrap();

        assert_eq!(models.names.len(), 3);
        assert_eq!(models.names[2].response, "PingResponse");
        assert!(!models.names[2].has_response);
        let batches = synthesizer.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(
            batches[0],
            vec!["GetUserResponse", "GetUserVariables", "ListUsersResponse"]
        );
        let model = models.model.unwrap();
        assert!(model.contains("GetUserVariables"));
        assert!(!model.contains("PingResponse"));
    }

    #[tokio::test]
    async fn test_no_schemas_skips_synthesis() {
        let synthesizer = Arc::new(RecordingSynthesizer::default());
        let bridge = SynthesisBridge::new(synthesizer.clone());

        let models = aggregate(&bridge, &[spec("ping", Some("  "), None)])
            .await
            .unwrap();

        assert!(models.model.is_none());
        assert!(synthesizer.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unique_feature_names() {
        let names = unique_feature_names(&["getUser", "getUser", "list-users"]);
        assert_eq!(names, vec!["getUser", "getUser_2", "listUsers"]);
    }

    #[test]
    fn test_unique_feature_names_ignore_leading_case() {
        let names = unique_feature_names(&["getUser", "GetUser", "get-user", "getUser_2"]);
        assert_eq!(names, vec!["getUser", "getUser_2", "getUser_3", "getUser_2_2"]);
    }
}
