//! Local `$ref` resolution for spec documents

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::generation::GenerationError;

/// A spec document whose `paths` have every local reference inlined
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSpecification {
    pub title: Option<String>,
    pub version: Option<String>,
    /// Path template to path item, in document order
    pub paths: Map<String, Value>,
}

/// Inlines every local `$ref` reachable from `paths`.
///
/// A reference back into a schema that is still being resolved is replaced
/// by an empty schema. Fails with [`GenerationError::InvalidSpec`] when the
/// document has no `paths` object or a reference can't be resolved.
pub fn dereference(document: Value) -> Result<ApiSpecification, GenerationError> {
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return Err(GenerationError::InvalidSpec(
            "no paths found".to_string(),
        ));
    };

    let mut resolver = Resolver {
        document: &document,
        stack: Vec::new(),
    };
    let mut resolved = Map::with_capacity(paths.len());
    for (path, item) in paths {
        resolved.insert(path.clone(), resolver.resolve(item)?);
    }
    debug!(paths = resolved.len(), "Dereferenced spec");

    let info = document.get("info");
    let text = |key: &str| {
        info.and_then(|i| i.get(key))
            .and_then(Value::as_str)
            .map(String::from)
    };
    Ok(ApiSpecification {
        title: text("title"),
        version: text("version"),
        paths: resolved,
    })
}

struct Resolver<'d> {
    document: &'d Value,
    /// References currently being inlined
    stack: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, value: &Value) -> Result<Value, GenerationError> {
        match value {
            Value::Object(object) => {
                if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
                    return self.inline(reference);
                }
                let mut resolved = Map::with_capacity(object.len());
                for (key, child) in object {
                    resolved.insert(key.clone(), self.resolve(child)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn inline(&mut self, reference: &str) -> Result<Value, GenerationError> {
        let Some(pointer) = reference.strip_prefix('#') else {
            return Err(GenerationError::InvalidSpec(format!(
                "External reference {reference} is not supported"
            )));
        };

        if self.stack.iter().any(|r| r == reference) {
            warn!(reference, "Cyclic reference replaced by an empty schema");
            return Ok(Value::Object(Map::new()));
        }

        let target = self.document.pointer(pointer).ok_or_else(|| {
            GenerationError::InvalidSpec(format!("Unresolved reference {reference}"))
        })?;

        self.stack.push(reference.to_string());
        let resolved = self.resolve(target);
        self.stack.pop();
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_paths_is_invalid() {
        let err = dereference(json!({ "openapi": "3.0.0" })).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidSpec(_)));
    }

    #[test]
    fn test_refs_are_inlined() {
        let spec = dereference(json!({
            "info": { "title": "Pets", "version": "1.2.0" },
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {
                            "200": { "$ref": "#/components/responses/PetList" }
                        }
                    }
                }
            },
            "components": {
                "responses": {
                    "PetList": {
                        "content": { "application/json": { "schema": {
                            "type": "array", "items": { "$ref": "#/components/schemas/Pet" }
                        } } }
                    }
                },
                "schemas": { "Pet": { "type": "object", "properties": { "name": { "type": "string" } } } }
            }
        }))
        .unwrap();

        assert_eq!(spec.title.as_deref(), Some("Pets"));
        assert_eq!(spec.version.as_deref(), Some("1.2.0"));
        let schema = &spec.paths["/pets"]["get"]["responses"]["200"]["content"]["application/json"]["schema"];
        assert_eq!(schema["items"]["properties"]["name"]["type"], "string");
    }

    #[test]
    fn test_cycles_become_empty_schemas() {
        let spec = dereference(json!({
            "paths": { "/nodes": { "get": { "responses": { "200": {
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Node" } } }
            } } } } },
            "components": { "schemas": { "Node": {
                "type": "object",
                "properties": { "next": { "$ref": "#/components/schemas/Node" } }
            } } }
        }))
        .unwrap();

        let schema = &spec.paths["/nodes"]["get"]["responses"]["200"]["content"]["application/json"]["schema"];
        assert_eq!(schema["properties"]["next"], json!({}));
    }

    #[test]
    fn test_unresolved_reference_is_invalid() {
        let err = dereference(json!({
            "paths": { "/a": { "get": { "responses": { "200": { "$ref": "#/nope" } } } } }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("#/nope"));
    }
}
