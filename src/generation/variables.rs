//! URL template variables and parameter splitting

use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::generation::GenerationError;
use crate::generation::sanitizers::{VariableMapping, resolve_all_excluding};
use crate::generation::utils::cached_regex;

static PLACEHOLDER: OnceCell<Regex> = OnceCell::new();

/// Matches `{name}` and `${name}`; names can't contain braces, slashes or whitespace.
const PLACEHOLDER_PATTERN: &str = r"(\$?)\{([^{}/\s]+)\}";

/// A piece of a URL template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSegment {
    Literal(String),
    /// A placeholder, holding the original variable name
    Variable(String),
}

/// A URL template split into literal text and variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    segments: Vec<UrlSegment>,
}

impl UrlTemplate {
    /// Splits `url` on its placeholders.
    pub fn parse(url: &str) -> Result<Self, GenerationError> {
        let placeholder = cached_regex(&PLACEHOLDER, PLACEHOLDER_PATTERN)?;
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in placeholder.captures_iter(url) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(UrlSegment::Literal(url[last..whole.start()].to_string()));
            }
            segments.push(UrlSegment::Variable(name.as_str().to_string()));
            last = whole.end();
        }
        if last < url.len() {
            segments.push(UrlSegment::Literal(url[last..].to_string()));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[UrlSegment] {
        &self.segments
    }

    /// Variable names in first-occurrence order, without duplicates.
    pub fn variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for segment in &self.segments {
            if let UrlSegment::Variable(name) = segment {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }
}

/// Where the variable names of a request come from
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSource {
    /// No parameters were supplied
    None,
    /// An example object; URL variables missing from it are filled in
    Example(Map<String, Value>),
    /// Property names declared by a parameter schema
    Schema(Vec<String>),
}

/// Variables of one request, split into URL and body/query parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedVariables {
    pub template: UrlTemplate,
    pub url_vars: Vec<String>,
    /// Every variable: URL variables first, then the remaining parameter keys
    pub all_vars: Vec<String>,
    /// Parameter keys that aren't URL variables, in parameter order
    pub body_params: Vec<String>,
    /// The example object used for type inference, with URL placeholders filled
    pub example: Option<Map<String, Value>>,
    pub mapping: VariableMapping,
}

impl ExtractedVariables {
    pub fn has_variables(&self) -> bool {
        !self.all_vars.is_empty()
    }
}

/// Splits the variables of `api_url` and `params`.
///
/// URL variables absent from an example object are added with
/// `placeholder` as their value so that type inference sees them.
/// Identifiers in `reserved` are never bound to a variable.
pub fn extract_variables(
    api_url: &str,
    params: ParamSource,
    placeholder: &Value,
    reserved: &[String],
) -> Result<ExtractedVariables, GenerationError> {
    let template = UrlTemplate::parse(api_url)?;
    let url_vars = template.variables();

    let (param_keys, example) = match params {
        ParamSource::None if url_vars.is_empty() => (Vec::new(), None),
        ParamSource::None => {
            let example = fill_placeholders(Map::new(), &url_vars, placeholder);
            (example.keys().cloned().collect(), Some(example))
        }
        ParamSource::Example(map) => {
            let example = fill_placeholders(map, &url_vars, placeholder);
            (example.keys().cloned().collect(), Some(example))
        }
        ParamSource::Schema(keys) => (keys, None),
    };

    let body_params: Vec<String> = param_keys
        .iter()
        .filter(|key| !url_vars.contains(key))
        .cloned()
        .collect();

    let mut all_vars = url_vars.clone();
    for key in &param_keys {
        if !all_vars.contains(key) {
            all_vars.push(key.clone());
        }
    }

    let mapping = resolve_all_excluding(&all_vars, reserved);
    debug!(
        url_vars = url_vars.len(),
        body_params = body_params.len(),
        "Extracted request variables"
    );

    Ok(ExtractedVariables {
        template,
        url_vars,
        all_vars,
        body_params,
        example,
        mapping,
    })
}

fn fill_placeholders(
    mut example: Map<String, Value>,
    url_vars: &[String],
    placeholder: &Value,
) -> Map<String, Value> {
    for var in url_vars {
        if !example.contains_key(var) {
            example.insert(var.clone(), placeholder.clone());
        }
    }
    example
}

/// Normalizes a parsed params example into an object.
///
/// Arrays contribute their first element; `null` and empty arrays mean no
/// parameters.
pub fn params_object(value: Value) -> Result<Map<String, Value>, GenerationError> {
    let value = match value {
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(GenerationError::invalid_input(
            "params",
            format!("expected an object, got {other}"),
        )),
    }
}

/// An object schema requiring every variable of `api_url`, or `None` when the
/// URL has no placeholders.
pub fn url_variables_schema(api_url: &str) -> Result<Option<String>, GenerationError> {
    let vars = UrlTemplate::parse(api_url)?.variables();
    if vars.is_empty() {
        return Ok(None);
    }
    let properties: Map<String, Value> = vars
        .iter()
        .map(|var| (var.clone(), Value::Object(Map::new())))
        .collect();
    let schema = serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": vars,
    });
    Ok(Some(schema.to_string()))
}

/// Property names declared by a parameter schema, in declaration order.
pub fn schema_property_names(schema: &Value) -> Vec<String> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn placeholder() -> Value {
        json!(123)
    }

    #[test]
    fn test_url_variables_are_auto_filled() {
        let vars =
            extract_variables("/users/{id}/posts/{post-id}", ParamSource::None, &placeholder(), &[])
                .unwrap();
        assert_eq!(vars.url_vars, vec!["id", "post-id"]);
        let identifiers: Vec<&str> = vars.mapping.iter().map(|b| b.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["id", "postId"]);
        assert_eq!(
            vars.example,
            Some(json!({ "id": 123, "post-id": 123 }).as_object().unwrap().clone())
        );
        assert!(vars.body_params.is_empty());
    }

    #[test]
    fn test_dollar_placeholders_and_duplicates() {
        let template = UrlTemplate::parse("/a/${x}/b/{x}/{y}").unwrap();
        assert_eq!(template.variables(), vec!["x", "y"]);
        assert_eq!(
            template.segments(),
            &[
                UrlSegment::Literal("/a/".into()),
                UrlSegment::Variable("x".into()),
                UrlSegment::Literal("/b/".into()),
                UrlSegment::Variable("x".into()),
                UrlSegment::Literal("/".into()),
                UrlSegment::Variable("y".into()),
            ]
        );
    }

    #[test]
    fn test_example_keys_split_into_body_params() {
        let example = json!({ "status": "active", "id": 5, "page-size": 10 });
        let vars = extract_variables(
            "/users/{id}",
            ParamSource::Example(example.as_object().unwrap().clone()),
            &placeholder(),
            &[],
        )
        .unwrap();
        assert_eq!(vars.all_vars, vec!["id", "status", "page-size"]);
        assert_eq!(vars.body_params, vec!["status", "page-size"]);
        assert_eq!(vars.example.as_ref().unwrap()["id"], json!(5));
        assert_eq!(vars.mapping.identifier_for("page-size"), Some("pageSize"));
    }

    #[test]
    fn test_schema_properties_split_into_body_params() {
        let schema = json!({
            "type": "object",
            "properties": { "orgId": {}, "name": {}, "tags": {} }
        });
        let vars = extract_variables(
            "/orgs/{orgId}/teams",
            ParamSource::Schema(schema_property_names(&schema)),
            &placeholder(),
            &[],
        )
        .unwrap();
        assert_eq!(vars.all_vars, vec!["orgId", "name", "tags"]);
        assert_eq!(vars.body_params, vec!["name", "tags"]);
        assert!(vars.example.is_none());
    }

    #[test]
    fn test_reserved_identifiers_are_not_bound() {
        let example = json!({ "source": 1, "q": "" });
        let reserved = vec!["source".to_string(), "id".to_string()];
        let vars = extract_variables(
            "/items/{id}",
            ParamSource::Example(example.as_object().unwrap().clone()),
            &placeholder(),
            &reserved,
        )
        .unwrap();
        assert_eq!(vars.all_vars, vec!["id", "source", "q"]);
        let identifiers: Vec<&str> = vars.mapping.iter().map(|b| b.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["id_2", "source_2", "q"]);
    }

    #[test]
    fn test_no_variables() {
        let vars = extract_variables("/health", ParamSource::None, &placeholder(), &[]).unwrap();
        assert!(!vars.has_variables());
        assert!(vars.example.is_none());
        assert_eq!(vars.template.segments(), &[UrlSegment::Literal("/health".into())]);
    }

    #[test]
    fn test_url_variables_schema() {
        let schema = url_variables_schema("/orgs/{org-id}/users/${id}").unwrap().unwrap();
        let schema: Value = serde_json::from_str(&schema).unwrap();
        assert_eq!(schema_property_names(&schema), vec!["org-id", "id"]);
        assert_eq!(schema["required"], json!(["org-id", "id"]));
        assert!(url_variables_schema("/health").unwrap().is_none());
    }

    #[test]
    fn test_params_object_normalization() {
        assert_eq!(
            params_object(json!([{ "a": 1 }, { "b": 2 }])).unwrap(),
            json!({ "a": 1 }).as_object().unwrap().clone()
        );
        assert!(params_object(json!([])).unwrap().is_empty());
        assert!(params_object(json!(5)).is_err());
    }
}
