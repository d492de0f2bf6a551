//! Generation orchestration - coordinates the generation workflow
//!
//! [`HookGenerator`] runs one request through parsing, variable extraction,
//! classification, type synthesis and emission. Generation is all-or-nothing:
//! any failure aborts the request before fragments are assembled.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::CodegenConfig;
use crate::generation::batch::{self, BatchModels, unique_feature_names};
use crate::generation::classifier::{
    ConventionalPagination, PaginationPolicy, ResponseShapeClassification, classify,
};
use crate::generation::emitter::{
    ApiFragment, Emit, FragmentContext, HookFragment, QueryKeyFragment, TsType, VariablesType,
    reserved_identifiers,
};
use crate::generation::input::parse_tolerant;
use crate::generation::synthesis::SynthesisBridge;
use crate::generation::utils::FeatureNames;
use crate::generation::variables::{
    ExtractedVariables, ParamSource, extract_variables, params_object, schema_property_names,
    url_variables_schema,
};
use crate::generation::{
    ArtifactKind, BatchModelSpec, EndpointDescriptor, GenerateFileResponse, GenerateRequest,
    GenerationError, SynthesisSource, TypeSynthesizer,
};

/// Key the records of a paginated envelope live under by default
const DEFAULT_RECORDS_KEY: &str = "data";

/// Response type and model decided for one request
struct ResponseModel {
    return_type: TsType,
    model: Option<String>,
    records_key: String,
}

/// Orchestrates the code generation workflow
pub struct HookGenerator {
    synthesis: SynthesisBridge,
    pagination: Arc<dyn PaginationPolicy>,
    config: CodegenConfig,
}

impl HookGenerator {
    /// Create a new generator with the conventional pagination policy
    pub fn new(synthesizer: Arc<dyn TypeSynthesizer>, config: CodegenConfig) -> Self {
        Self {
            synthesis: SynthesisBridge::new(synthesizer),
            pagination: Arc::new(ConventionalPagination::new(&config)),
            config,
        }
    }

    /// Replace the pagination policy
    pub fn with_pagination_policy(mut self, policy: Arc<dyn PaginationPolicy>) -> Self {
        self.pagination = policy;
        self
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Generate the model, api, queryKey and hook fragments for one request
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateFileResponse, GenerationError> {
        // 1. Validate request
        let core = request.validate()?;
        let names = FeatureNames::new(core.feature_name);
        let skip_models = request.skip_model_generation;
        debug!(
            feature = names.camel(),
            method = %core.method,
            hook = ?core.hook_type,
            skip_models,
            "Generating hook"
        );

        // 2. Parse inputs once
        let response_schema = GenerateRequest::text(&request.response_schema);
        let params_schema_text = GenerateRequest::text(&request.params_schema);
        let params_source = match params_schema_text {
            Some(text) => {
                let schema: Value = serde_json::from_str(text).map_err(|e| {
                    GenerationError::invalid_input("params schema", e.to_string())
                })?;
                ParamSource::Schema(schema_property_names(&schema))
            }
            None => match GenerateRequest::text(&request.params) {
                Some(text) => ParamSource::Example(params_object(parse_tolerant(text, "params")?)?),
                None => ParamSource::None,
            },
        };
        let example = match (response_schema, GenerateRequest::text(&request.example_response)) {
            (None, Some(text)) => Some(parse_tolerant(text, "example response")?),
            _ => None,
        };

        // 3. Split variables
        let placeholder = Value::from(self.config.placeholder_value);
        let reserved = reserved_identifiers(&names, &self.config);
        let variables = extract_variables(core.api_url, params_source, &placeholder, &reserved)?;

        // 4. Synthesize the response model, then the variables model
        let response = self
            .response_model(&names, response_schema, example.as_ref(), skip_models)
            .await?;
        let (variables_type, variables_model) = self
            .variables_model(&names, params_schema_text, &variables, skip_models)
            .await?;

        // 5. Emit fragments
        let ctx = FragmentContext {
            names: &names,
            method: core.method,
            hook_type: core.hook_type,
            variables: &variables,
            variables_type,
            return_type: response.return_type,
            envelope: GenerateRequest::text(&request.wrapper_args),
            records_key: &response.records_key,
            page_field: self.pagination.page_field(&variables.body_params),
            count_fields: self.pagination.count_fields(),
            config: &self.config,
        };

        let mut output = GenerateFileResponse::default();
        let models: Vec<String> = [variables_model, response.model]
            .into_iter()
            .flatten()
            .collect();
        output.set(ArtifactKind::Model, models.join("\n\n"));
        output.set(ArtifactKind::Api, ApiFragment::build(&ctx).emit());
        if let Some(query_key) = QueryKeyFragment::build(&ctx) {
            output.set(ArtifactKind::QueryKey, query_key.emit());
        }
        output.set(ArtifactKind::Hook, HookFragment::build(&ctx).emit());

        info!(feature = names.camel(), "Generated hook fragments");
        Ok(output)
    }

    /// Synthesize one combined model block for many endpoints
    pub async fn generate_models(
        &self,
        specs: &[BatchModelSpec],
    ) -> Result<BatchModels, GenerationError> {
        batch::aggregate(&self.synthesis, specs).await
    }

    /// Generate every endpoint against one shared model block.
    ///
    /// Endpoints run sequentially in input order; repeated feature names get
    /// `_2`, `_3`, ... suffixes before any names are derived. An endpoint with
    /// URL variables but no params schema gets one declaring those variables,
    /// so its `Variables` type is part of the shared block.
    pub async fn generate_batch(
        &self,
        endpoints: &[EndpointDescriptor],
    ) -> Result<GenerateFileResponse, GenerationError> {
        let feature_names: Vec<&str> = endpoints.iter().map(|e| e.feature_name.as_str()).collect();
        let mut renamed = Vec::with_capacity(endpoints.len());
        for (endpoint, feature_name) in endpoints.iter().zip(unique_feature_names(&feature_names)) {
            let params_schema = match GenerateRequest::text(&endpoint.params_schema) {
                Some(schema) => Some(schema.to_string()),
                None => url_variables_schema(&endpoint.url)?,
            };
            renamed.push(EndpointDescriptor {
                feature_name,
                params_schema,
                ..endpoint.clone()
            });
        }
        let endpoints = renamed;

        let specs: Vec<BatchModelSpec> = endpoints.iter().map(EndpointDescriptor::model_spec).collect();
        let models = self.generate_models(&specs).await?;

        let mut responses = Vec::with_capacity(endpoints.len());
        for endpoint in &endpoints {
            responses.push(self.generate(&endpoint.to_request()).await?);
        }

        let mut combined = GenerateFileResponse::concat(&responses);
        combined.set(ArtifactKind::Model, models.model.unwrap_or_default());
        info!(endpoints = endpoints.len(), "Generated batch");
        Ok(combined)
    }

    async fn response_model(
        &self,
        names: &FeatureNames,
        response_schema: Option<&str>,
        example: Option<&Value>,
        skip_models: bool,
    ) -> Result<ResponseModel, GenerationError> {
        let records_key = DEFAULT_RECORDS_KEY.to_string();

        if let Some(schema) = response_schema {
            let type_name = names.response_type();
            let model = if skip_models {
                None
            } else {
                let source = SynthesisSource::Schema(schema.to_string());
                Some(self.synthesis.synthesize(names.camel(), &type_name, &source).await?)
            };
            return Ok(ResponseModel {
                return_type: TsType::named(type_name),
                model,
                records_key,
            });
        }

        let Some(example) = example else {
            if skip_models {
                return Ok(ResponseModel {
                    return_type: TsType::any(),
                    model: None,
                    records_key,
                });
            }
            let type_name = names.response_type();
            return Ok(ResponseModel {
                model: Some(format!("export type {type_name} = any;")),
                return_type: TsType::named(type_name),
                records_key,
            });
        };

        let shape = classify(example, self.pagination.as_ref());
        debug!(feature = names.camel(), shape = shape_label(&shape), "Classified response");

        let (type_name, payload, return_type, records_key) = match shape {
            ResponseShapeClassification::PlainValue(payload) => {
                let type_name = names.response_type();
                let return_type = TsType::named(type_name.as_str());
                (type_name, payload, return_type, records_key)
            }
            ResponseShapeClassification::WrappedValue {
                payload,
                empty_page,
            } => {
                let (type_name, records_key) = if empty_page {
                    let key = payload
                        .as_object()
                        .and_then(|block| self.pagination.array_key(block))
                        .map_or(records_key, str::to_string);
                    (names.data_type(), key)
                } else {
                    (names.response_type(), records_key)
                };
                let return_type = TsType::generic(
                    self.config.value_wrapper.as_str(),
                    vec![TsType::named(type_name.as_str())],
                );
                (type_name, payload, return_type, records_key)
            }
            ResponseShapeClassification::PaginatedArray { array_key, item } => {
                let type_name = names.item_type();
                let item_type = TsType::named(type_name.as_str());
                let return_type = if array_key == DEFAULT_RECORDS_KEY {
                    TsType::generic(
                        self.config.list_wrapper.as_str(),
                        vec![TsType::Array(Box::new(item_type))],
                    )
                } else {
                    TsType::generic(
                        self.config.named_list_wrapper.as_str(),
                        vec![TsType::string_literal(array_key.as_str()), item_type],
                    )
                };
                (type_name, item, return_type, array_key)
            }
        };

        // Declarations live elsewhere, the classified shape still applies
        if skip_models {
            return Ok(ResponseModel {
                return_type,
                model: None,
                records_key,
            });
        }

        let model = self
            .synthesis
            .synthesize(names.camel(), &type_name, &SynthesisSource::Example(payload))
            .await?;
        Ok(ResponseModel {
            return_type,
            model: Some(model),
            records_key,
        })
    }

    async fn variables_model(
        &self,
        names: &FeatureNames,
        params_schema: Option<&str>,
        variables: &ExtractedVariables,
        skip_models: bool,
    ) -> Result<(VariablesType, Option<String>), GenerationError> {
        let type_name = names.variables_type();

        if let Some(schema) = params_schema {
            let model = if skip_models {
                None
            } else {
                let source = SynthesisSource::Schema(schema.to_string());
                Some(self.synthesis.synthesize(names.camel(), &type_name, &source).await?)
            };
            return Ok((VariablesType::Named(type_name), model));
        }

        match &variables.example {
            Some(example) if !example.is_empty() && skip_models => {
                Ok((VariablesType::Named(type_name), None))
            }
            Some(example) if !example.is_empty() => {
                let source = SynthesisSource::Example(Value::Object(example.clone()));
                let model = self
                    .synthesis
                    .synthesize(names.camel(), &type_name, &source)
                    .await?;
                Ok((VariablesType::Named(type_name), Some(model)))
            }
            _ => Ok((VariablesType::None, None)),
        }
    }
}

fn shape_label(shape: &ResponseShapeClassification) -> &'static str {
    match shape {
        ResponseShapeClassification::PlainValue(_) => "plain",
        ResponseShapeClassification::WrappedValue { .. } => "wrapped",
        ResponseShapeClassification::PaginatedArray { .. } => "paginated",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{HookType, HttpMethod};
    use crate::infrastructure::InferenceSynthesizer;
    use tracing_test::traced_test;

    fn generator() -> HookGenerator {
        HookGenerator::new(Arc::new(InferenceSynthesizer::new()), CodegenConfig::default())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_generate_logs_classification() {
        let request = GenerateRequest::new("getUser", HttpMethod::Get, "/users", HookType::Query)
            .with_example_response(r#"{"success": true, "data": {"id": 1}}"#);

        generator().generate(&request).await.unwrap();

        assert!(logs_contain("Classified response"));
        assert!(logs_contain("wrapped"));
        assert!(logs_contain("Generated hook fragments"));
    }

    #[tokio::test]
    async fn test_empty_page_uses_data_type() {
        let request = GenerateRequest::new("listUsers", HttpMethod::Get, "/users", HookType::Query)
            .with_example_response(
                r#"{"success": true, "data": {"totalRecords": 0, "filteredRecords": 0, "rows": []}}"#,
            );

        let output = generator().generate(&request).await.unwrap();

        let model = output.model.unwrap();
        assert!(model.starts_with("export interface ListUsersData {"));
        assert!(model.contains("rows: any[];"));
        assert!(output.api.unwrap().contains("Promise<WithResponse<ListUsersData>>"));
    }

    #[tokio::test]
    async fn test_params_schema_must_be_json() {
        let request = GenerateRequest::new("getUser", HttpMethod::Get, "/users", HookType::Query)
            .with_params_schema("{ type: 'object' }");

        let err = generator().generate(&request).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput { field, .. } if field == "params schema"));
    }

    #[tokio::test]
    async fn test_no_inputs_fall_back_to_any() {
        let request = GenerateRequest::new("ping", HttpMethod::Post, "/ping", HookType::Mutation);

        let output = generator().generate(&request).await.unwrap();

        assert_eq!(output.model.as_deref(), Some("export type PingResponse = any;"));
        assert!(output.api.unwrap().contains("export const ping = async (): Promise<PingResponse>"));
    }
}
