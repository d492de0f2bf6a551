//! Endpoint extraction from a dereferenced specification

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::ApiSpecification;
use crate::config::CodegenConfig;
use crate::generation::batch::unique_feature_names;
use crate::generation::utils::upper_first;
use crate::generation::{EndpointDescriptor, HookType, HttpMethod};

const JSON_MEDIA_TYPE: &str = "application/json";
const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Lists every supported operation in document order.
///
/// Feature names come from `operationId` or, without one, from the method
/// and the last literal path segment. Repeated names are suffixed.
pub fn extract_endpoints(spec: &ApiSpecification, config: &CodegenConfig) -> Vec<EndpointDescriptor> {
    let mut endpoints = Vec::new();

    for (path, item) in &spec.paths {
        let Some(item) = item.as_object() else {
            warn!(path = %path, "Skipping path item that is not an object");
            continue;
        };
        let shared_params = parameters(item);

        for (key, operation) in item {
            let Ok(method) = key.parse::<HttpMethod>() else {
                continue;
            };
            let Some(operation) = operation.as_object() else {
                continue;
            };

            endpoints.push(EndpointDescriptor {
                feature_name: feature_name(operation, method, path),
                method,
                url: strip_prefix(path, &config.strip_path_prefix),
                hook_type: HookType::for_method(method),
                response_schema: response_schema(operation),
                params_schema: params_schema(&shared_params, operation),
            });
        }
    }

    let names: Vec<&str> = endpoints.iter().map(|e| e.feature_name.as_str()).collect();
    let unique = unique_feature_names(&names);
    for (endpoint, name) in endpoints.iter_mut().zip(unique) {
        endpoint.feature_name = name;
    }

    debug!(count = endpoints.len(), "Extracted endpoints");
    endpoints
}

fn feature_name(operation: &Map<String, Value>, method: HttpMethod, path: &str) -> String {
    if let Some(id) = operation
        .get("operationId")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
    {
        return id.to_string();
    }

    let last = path
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .next_back()
        .unwrap_or("feature");
    format!("{}{}", method.as_lowercase(), upper_first(last))
}

/// Removes `prefix` when it is a whole leading segment run of `path`.
fn strip_prefix(path: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    match path.strip_prefix(prefix) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => path.to_string(),
    }
}

fn json_schema(container: Option<&Value>) -> Option<&Value> {
    container?.get("content")?.get(JSON_MEDIA_TYPE)?.get("schema")
}

/// Schema of the first 2xx JSON response.
fn response_schema(operation: &Map<String, Value>) -> Option<String> {
    let responses = operation.get("responses")?.as_object()?;
    responses
        .iter()
        .find(|(code, _)| code.starts_with('2'))
        .and_then(|(_, response)| json_schema(Some(response)))
        .map(Value::to_string)
}

/// Parameters are identified by name and location.
fn same_parameter(a: &Value, b: &Value) -> bool {
    a.get("name") == b.get("name") && a.get("in") == b.get("in")
}

fn parameters(container: &Map<String, Value>) -> Vec<&Value> {
    container
        .get("parameters")
        .and_then(Value::as_array)
        .map(|params| params.iter().collect())
        .unwrap_or_default()
}

/// Object schema over path/query parameters and request body properties.
fn params_schema(shared: &[&Value], operation: &Map<String, Value>) -> Option<String> {
    let own = parameters(operation);
    let mut merged: Vec<&Value> = shared
        .iter()
        .copied()
        .filter(|param| !own.iter().any(|o| same_parameter(o, param)))
        .collect();
    merged.extend(own);

    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::new();

    for param in merged {
        let location = param.get("in").and_then(Value::as_str);
        if !matches!(location, Some("query" | "path")) {
            continue;
        }
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            continue;
        };
        properties.insert(
            name.to_string(),
            param.get("schema").cloned().unwrap_or_else(|| json!({})),
        );
        if param.get("required").and_then(Value::as_bool) == Some(true) {
            required.push(Value::from(name));
        }
    }

    if let Some(body) = json_schema(operation.get("requestBody")) {
        let body_properties = body.get("properties").and_then(Value::as_object);
        match body_properties {
            Some(props) if body.get("type").and_then(Value::as_str) == Some("object") => {
                for (key, schema) in props {
                    properties.insert(key.clone(), schema.clone());
                }
                if let Some(names) = body.get("required").and_then(Value::as_array) {
                    required.extend(names.iter().cloned());
                }
            }
            _ => {
                properties.insert("body".to_string(), body.clone());
                required.push(Value::from("body"));
            }
        }
    }

    if properties.is_empty() {
        return None;
    }
    Some(
        json!({
            "$schema": DRAFT_07,
            "type": "object",
            "properties": properties,
            "required": required,
        })
        .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::openapi::dereference;

    fn spec(document: Value) -> ApiSpecification {
        dereference(document).unwrap()
    }

    #[test]
    fn test_feature_name_fallback() {
        let spec = spec(json!({ "paths": {
            "/api/users/{id}": { "get": {}, "delete": { "operationId": "removeUser" } },
            "/": { "post": {} }
        } }));
        let endpoints = extract_endpoints(&spec, &CodegenConfig::default());

        let names: Vec<&str> = endpoints.iter().map(|e| e.feature_name.as_str()).collect();
        assert_eq!(names, vec!["getUsers", "removeUser", "postFeature"]);
        assert_eq!(endpoints[0].url, "/users/{id}");
        assert_eq!(endpoints[0].hook_type, HookType::Query);
        assert_eq!(endpoints[1].hook_type, HookType::Mutation);
        assert_eq!(endpoints[2].url, "/");
    }

    #[test]
    fn test_duplicate_names_are_suffixed() {
        let spec = spec(json!({ "paths": {
            "/v1/users": { "get": {} },
            "/v2/users": { "get": {} }
        } }));
        let endpoints = extract_endpoints(&spec, &CodegenConfig::default());
        assert_eq!(endpoints[0].feature_name, "getUsers");
        assert_eq!(endpoints[1].feature_name, "getUsers_2");
    }

    #[test]
    fn test_prefix_only_strips_whole_segments() {
        assert_eq!(strip_prefix("/api/users", "/api"), "/users");
        assert_eq!(strip_prefix("/apis/users", "/api"), "/apis/users");
        assert_eq!(strip_prefix("/users", ""), "/users");
    }

    #[test]
    fn test_response_schema_uses_first_success() {
        let spec = spec(json!({ "paths": { "/users": { "get": { "responses": {
            "400": { "content": { "application/json": { "schema": { "type": "string" } } } },
            "201": { "content": { "application/json": { "schema": { "type": "object" } } } },
            "200": { "content": { "application/json": { "schema": { "type": "array" } } } }
        } } } } }));
        let endpoints = extract_endpoints(&spec, &CodegenConfig::default());
        assert_eq!(endpoints[0].response_schema.as_deref(), Some(r#"{"type":"object"}"#));
    }

    #[test]
    fn test_params_schema_merges_parameters_and_body() {
        let spec = spec(json!({ "paths": { "/users/{id}": {
            "parameters": [
                { "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } },
                { "name": "trace", "in": "header", "schema": { "type": "string" } }
            ],
            "put": {
                "parameters": [{ "name": "dryRun", "in": "query", "schema": { "type": "boolean" } }],
                "requestBody": { "content": { "application/json": { "schema": {
                    "type": "object",
                    "required": ["name"],
                    "properties": { "name": { "type": "string" } }
                } } } }
            },
            "post": {
                "requestBody": { "content": { "application/json": { "schema": {
                    "type": "array", "items": { "type": "string" }
                } } } }
            }
        } } }));
        let endpoints = extract_endpoints(&spec, &CodegenConfig::default());

        let put: Value = serde_json::from_str(endpoints[0].params_schema.as_deref().unwrap()).unwrap();
        assert_eq!(put["$schema"], DRAFT_07);
        let keys: Vec<&String> = put["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["id", "dryRun", "name"]);
        assert_eq!(put["required"], json!(["id", "name"]));

        let post: Value = serde_json::from_str(endpoints[1].params_schema.as_deref().unwrap()).unwrap();
        assert_eq!(post["properties"]["body"]["type"], "array");
        assert_eq!(post["required"], json!(["id", "body"]));
    }

    #[test]
    fn test_no_params_means_no_schema() {
        let spec = spec(json!({ "paths": { "/ping": { "get": {} } } }));
        let endpoints = extract_endpoints(&spec, &CodegenConfig::default());
        assert!(endpoints[0].params_schema.is_none());
    }
}
