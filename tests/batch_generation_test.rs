//! Batch generation against one shared model block

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hookgen::config::CodegenConfig;
use hookgen::generation::{
    BatchModelSpec, EndpointDescriptor, HookGenerator, HookType, HttpMethod, NamedSchema,
    SynthesisError, SynthesisSource, TypeSynthesizer,
};
use hookgen::infrastructure::InferenceSynthesizer;
use serde_json::json;

fn endpoint(
    feature_name: &str,
    method: HttpMethod,
    url: &str,
    response_schema: Option<serde_json::Value>,
    params_schema: Option<serde_json::Value>,
) -> EndpointDescriptor {
    EndpointDescriptor {
        feature_name: feature_name.to_string(),
        method,
        url: url.to_string(),
        hook_type: HookType::for_method(method),
        response_schema: response_schema.map(|s| s.to_string()),
        params_schema: params_schema.map(|s| s.to_string()),
    }
}

fn user_list() -> serde_json::Value {
    json!({
        "type": "array",
        "items": { "type": "object", "properties": { "id": { "type": "integer" } } }
    })
}

#[tokio::test]
async fn test_batch_shares_models_across_endpoints() {
    let generator = HookGenerator::new(Arc::new(InferenceSynthesizer::new()), CodegenConfig::default());
    let endpoints = vec![
        endpoint("getUsers", HttpMethod::Get, "/users", Some(user_list()), None),
        endpoint(
            "createUser",
            HttpMethod::Post,
            "/users",
            Some(json!({ "type": "object", "properties": { "id": { "type": "integer" } } })),
            Some(json!({
                "type": "object",
                "required": ["name"],
                "properties": { "name": { "type": "string" } }
            })),
        ),
    ];

    let output = generator.generate_batch(&endpoints).await.unwrap();

    let model = output.model.unwrap();
    assert!(model.starts_with("export type GetUsersResponse = GetUsersResponseItem[];"));
    assert!(model.contains("export interface GetUsersResponseItem {\n  id?: number;\n}"));
    assert!(model.contains("export type CreateUserResponse = GetUsersResponseItem;"));
    assert!(model.contains("export interface CreateUserVariables {\n  name: string;\n}"));

    let api = output.api.unwrap();
    assert!(api.contains("export const getUsers = async ("));
    assert!(api.contains("export const createUser = async ({ name }: CreateUserVariables): Promise<CreateUserResponse>"));
    assert!(api.find("export const getUsers").unwrap() < api.find("export const createUser").unwrap());

    // Only the query has a cache key
    assert_eq!(output.query_key.unwrap().matches("Key = {").count(), 1);
    assert_eq!(output.hook.unwrap().matches("export const use").count(), 2);
}

#[tokio::test]
async fn test_batch_suffixes_repeated_feature_names() {
    let generator = HookGenerator::new(Arc::new(InferenceSynthesizer::new()), CodegenConfig::default());
    let endpoints = vec![
        endpoint("getUsers", HttpMethod::Get, "/v1/users", Some(user_list()), None),
        endpoint("getUsers", HttpMethod::Get, "/v2/users", Some(user_list()), None),
    ];

    let output = generator.generate_batch(&endpoints).await.unwrap();

    let model = output.model.unwrap();
    assert!(model.contains("export type GetUsers_2Response = GetUsersResponseItem[];"));
    assert!(!model.contains("GetUsers_2ResponseItem"));
    let api = output.api.unwrap();
    assert!(api.contains("export const getUsers = async ("));
    assert!(api.contains("export const getUsers_2 = async ("));
    assert!(output.hook.unwrap().contains("export const useGetUsers_2 = "));
}

#[tokio::test]
async fn test_batch_without_schemas_has_no_model() {
    let generator = HookGenerator::new(Arc::new(InferenceSynthesizer::new()), CodegenConfig::default());
    let endpoints = vec![endpoint("ping", HttpMethod::Get, "/ping", None, None)];

    let output = generator.generate_batch(&endpoints).await.unwrap();

    assert!(output.model.is_none());
    assert!(output.api.unwrap().contains("Promise<any>"));
}

/// Records every call so tests can count synthesizer round trips
#[derive(Default)]
struct CountingSynthesizer {
    single: Mutex<usize>,
    batches: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl TypeSynthesizer for CountingSynthesizer {
    async fn synthesize(&self, _name: &str, _source: &SynthesisSource) -> Result<String, SynthesisError> {
        *self.single.lock().unwrap() += 1;
        Ok(String::new())
    }

    async fn synthesize_batch(&self, sources: &[NamedSchema]) -> Result<String, SynthesisError> {
        let names = sources.iter().map(|s| s.name.clone()).collect();
        self.batches.lock().unwrap().push(names);
        Ok("// models".to_string())
    }
}

#[tokio::test]
async fn test_batch_makes_exactly_one_synthesis_call() {
    let synthesizer = Arc::new(CountingSynthesizer::default());
    let generator = HookGenerator::new(synthesizer.clone(), CodegenConfig::default());
    let endpoints = vec![
        endpoint("getUsers", HttpMethod::Get, "/users", Some(user_list()), Some(json!({ "type": "object" }))),
        endpoint("deleteUser", HttpMethod::Delete, "/users/{id}", None, None),
        endpoint("getShops", HttpMethod::Get, "/shops", Some(user_list()), None),
    ];

    let output = generator.generate_batch(&endpoints).await.unwrap();

    assert_eq!(output.model.as_deref(), Some("// models"));
    assert_eq!(*synthesizer.single.lock().unwrap(), 0);
    let batches = synthesizer.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0],
        vec![
            "GetUsersResponse",
            "GetUsersVariables",
            "DeleteUserVariables",
            "GetShopsResponse"
        ]
    );
}

#[tokio::test]
async fn test_generate_models_reports_names() {
    let generator = HookGenerator::new(Arc::new(InferenceSynthesizer::new()), CodegenConfig::default());
    let specs = vec![
        BatchModelSpec {
            feature_name: "get-user".into(),
            response_schema: Some(json!({ "type": "string" }).to_string()),
            params_schema: None,
        },
        BatchModelSpec {
            feature_name: "ping".into(),
            response_schema: None,
            params_schema: Some("  ".into()),
        },
    ];

    let models = generator.generate_models(&specs).await.unwrap();

    assert_eq!(models.names[0].response, "GetUserResponse");
    assert!(models.names[0].has_response);
    assert!(!models.names[1].has_variables);
    assert_eq!(models.model.as_deref(), Some("export type GetUserResponse = string;"));
}

#[tokio::test]
async fn test_batch_names_differing_only_in_case_are_suffixed() {
    let generator = HookGenerator::new(Arc::new(InferenceSynthesizer::new()), CodegenConfig::default());
    let endpoints = vec![
        endpoint("getUser", HttpMethod::Get, "/users/{id}", Some(json!({ "type": "string" })), None),
        endpoint("GetUser", HttpMethod::Get, "/v2/users/{id}", Some(json!({ "type": "number" })), None),
    ];

    let output = generator.generate_batch(&endpoints).await.unwrap();

    let api = output.api.unwrap();
    assert_eq!(api.matches("export const getUser = ").count(), 1);
    assert_eq!(api.matches("export const getUser_2 = ").count(), 1);
    let model = output.model.unwrap();
    assert_eq!(model.matches("export type GetUserResponse = ").count(), 1);
    assert!(model.contains("export type GetUser_2Response = number;"));
    let hook = output.hook.unwrap();
    assert_eq!(hook.matches("export const useGetUser = ").count(), 1);
    assert!(hook.contains("export const useGetUser_2 = "));
}

#[tokio::test]
async fn test_batch_is_deterministic() {
    let generator = HookGenerator::new(Arc::new(InferenceSynthesizer::new()), CodegenConfig::default());
    let endpoints = vec![
        endpoint("getUsers", HttpMethod::Get, "/users/{org-id}", Some(user_list()), None),
        endpoint(
            "createUser",
            HttpMethod::Post,
            "/users",
            Some(json!({ "type": "object", "properties": { "profile": { "type": "object", "properties": { "tags": { "type": "array", "items": { "type": "string" } } } } } })),
            Some(json!({ "type": "object", "properties": { "first name": { "type": "string" } } })),
        ),
        endpoint("getUsers", HttpMethod::Get, "/v2/users", Some(user_list()), None),
    ];

    let first = generator.generate_batch(&endpoints).await.unwrap();
    let second = generator.generate_batch(&endpoints).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_batch_declares_url_variables_without_params_schema() {
    let generator = HookGenerator::new(Arc::new(InferenceSynthesizer::new()), CodegenConfig::default());
    let endpoints = vec![endpoint("deleteUser", HttpMethod::Delete, "/users/{id}", None, None)];

    let output = generator.generate_batch(&endpoints).await.unwrap();

    assert_eq!(
        output.model.as_deref(),
        Some("export interface DeleteUserVariables {\n  id: any;\n}")
    );
    assert!(output.api.unwrap().contains(
        "export const deleteUser = async ({ id }: DeleteUserVariables): Promise<any>"
    ));
}
