//! Domain types for the generation pipeline

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::generation::GenerationError;

/// HTTP methods an endpoint can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "delete")]
    Delete,
    #[serde(alias = "patch")]
    Patch,
}

impl HttpMethod {
    /// Lower-case name as used for the transport method call
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }

    /// GET and DELETE carry variables as query parameters instead of a body.
    pub fn sends_query_params(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_lowercase().to_uppercase())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            "patch" => Ok(HttpMethod::Patch),
            _ => Err(format!("unsupported HTTP method '{s}'")),
        }
    }
}

/// Access pattern of the generated hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookType {
    #[serde(alias = "useQuery")]
    Query,
    #[serde(alias = "useMutation")]
    Mutation,
    #[serde(alias = "useInfiniteQuery", alias = "infinite-query")]
    InfiniteQuery,
}

impl HookType {
    /// Query and infinite query hooks read through the cache.
    pub fn is_cached(&self) -> bool {
        !matches!(self, HookType::Mutation)
    }

    /// Name of the React Query hook the generated hook wraps
    pub fn react_query_hook(&self) -> &'static str {
        match self {
            HookType::Query => "useQuery",
            HookType::Mutation => "useMutation",
            HookType::InfiniteQuery => "useInfiniteQuery",
        }
    }

    /// GET endpoints are read as queries, everything else as mutations.
    pub fn for_method(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => HookType::Query,
            _ => HookType::Mutation,
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.react_query_hook())
    }
}

impl FromStr for HookType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" | "useQuery" => Ok(HookType::Query),
            "mutation" | "useMutation" => Ok(HookType::Mutation),
            "infiniteQuery" | "infinite-query" | "useInfiniteQuery" => Ok(HookType::InfiniteQuery),
            _ => Err(format!(
                "unsupported hook type '{s}', expected query, mutation or infinite-query"
            )),
        }
    }
}

/// A single generation request
///
/// The four identifying fields are optional so that a partially filled
/// request can be described and rejected with [`GenerationError::MissingInput`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    pub feature_name: Option<String>,
    pub method_type: Option<HttpMethod>,
    pub api_url: Option<String>,
    pub example_response: Option<String>,
    pub params: Option<String>,
    pub hook_type: Option<HookType>,
    pub response_schema: Option<String>,
    pub params_schema: Option<String>,
    pub skip_model_generation: bool,
    pub wrapper_args: Option<String>,
}

/// The mandatory part of a request, borrowed after validation
#[derive(Debug, Clone, Copy)]
pub struct RequestCore<'a> {
    pub feature_name: &'a str,
    pub method: HttpMethod,
    pub api_url: &'a str,
    pub hook_type: HookType,
}

impl GenerateRequest {
    pub fn new(
        feature_name: impl Into<String>,
        method: HttpMethod,
        api_url: impl Into<String>,
        hook_type: HookType,
    ) -> Self {
        Self {
            feature_name: Some(feature_name.into()),
            method_type: Some(method),
            api_url: Some(api_url.into()),
            hook_type: Some(hook_type),
            ..Default::default()
        }
    }

    pub fn with_example_response(mut self, text: impl Into<String>) -> Self {
        self.example_response = Some(text.into());
        self
    }

    pub fn with_params(mut self, text: impl Into<String>) -> Self {
        self.params = Some(text.into());
        self
    }

    pub fn with_response_schema(mut self, schema: impl Into<String>) -> Self {
        self.response_schema = Some(schema.into());
        self
    }

    pub fn with_params_schema(mut self, schema: impl Into<String>) -> Self {
        self.params_schema = Some(schema.into());
        self
    }

    pub fn with_wrapper(mut self, wrapper: impl Into<String>) -> Self {
        self.wrapper_args = Some(wrapper.into());
        self
    }

    pub fn skip_model_generation(mut self, skip: bool) -> Self {
        self.skip_model_generation = skip;
        self
    }

    /// Checks that the four mandatory fields are present and non-blank.
    pub fn validate(&self) -> Result<RequestCore<'_>, GenerationError> {
        let feature_name = non_blank(self.feature_name.as_deref())
            .ok_or(GenerationError::MissingInput("featureName"))?;
        let method = self
            .method_type
            .ok_or(GenerationError::MissingInput("methodType"))?;
        let api_url =
            non_blank(self.api_url.as_deref()).ok_or(GenerationError::MissingInput("apiUrl"))?;
        let hook_type = self
            .hook_type
            .ok_or(GenerationError::MissingInput("hookType"))?;

        Ok(RequestCore {
            feature_name,
            method,
            api_url,
            hook_type,
        })
    }

    /// Optional text fields count as absent when blank.
    pub(crate) fn text(value: &Option<String>) -> Option<&str> {
        non_blank(value.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The kinds of fragment a generation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    Api,
    QueryKey,
    Hook,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Model,
        ArtifactKind::Api,
        ArtifactKind::QueryKey,
        ArtifactKind::Hook,
    ];
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Api => "api",
            ArtifactKind::QueryKey => "queryKey",
            ArtifactKind::Hook => "hook",
        };
        f.write_str(name)
    }
}

/// The four generated fragments; an empty fragment is `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
}

impl GenerateFileResponse {
    pub fn fragment(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::Model => self.model.as_deref(),
            ArtifactKind::Api => self.api.as_deref(),
            ArtifactKind::QueryKey => self.query_key.as_deref(),
            ArtifactKind::Hook => self.hook.as_deref(),
        }
    }

    fn fragment_mut(&mut self, kind: ArtifactKind) -> &mut Option<String> {
        match kind {
            ArtifactKind::Model => &mut self.model,
            ArtifactKind::Api => &mut self.api,
            ArtifactKind::QueryKey => &mut self.query_key,
            ArtifactKind::Hook => &mut self.hook,
        }
    }

    /// Non-empty fragments in model, api, queryKey, hook order.
    pub fn fragments(&self) -> impl Iterator<Item = (ArtifactKind, &str)> {
        ArtifactKind::ALL
            .into_iter()
            .filter_map(|kind| self.fragment(kind).map(|text| (kind, text)))
    }

    /// Sets a fragment, storing blank text as `None`.
    pub fn set(&mut self, kind: ArtifactKind, text: impl Into<String>) {
        let text = text.into();
        *self.fragment_mut(kind) = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
    }

    /// Joins fragments of the same kind with a blank line, skipping empty ones.
    pub fn concat<'a>(responses: impl IntoIterator<Item = &'a GenerateFileResponse>) -> Self {
        let mut parts: [Vec<&str>; 4] = Default::default();
        for response in responses {
            for (index, kind) in ArtifactKind::ALL.into_iter().enumerate() {
                if let Some(text) = response.fragment(kind) {
                    parts[index].push(text);
                }
            }
        }

        let mut joined = Self::default();
        for (index, kind) in ArtifactKind::ALL.into_iter().enumerate() {
            joined.set(kind, parts[index].join("\n\n"));
        }
        joined
    }
}

/// Input to batch model synthesis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchModelSpec {
    pub feature_name: String,
    pub response_schema: Option<String>,
    pub params_schema: Option<String>,
}

/// One endpoint of a batch, typically extracted from an OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    pub feature_name: String,
    pub method: HttpMethod,
    pub url: String,
    pub hook_type: HookType,
    pub response_schema: Option<String>,
    pub params_schema: Option<String>,
}

impl EndpointDescriptor {
    pub fn model_spec(&self) -> BatchModelSpec {
        BatchModelSpec {
            feature_name: self.feature_name.clone(),
            response_schema: self.response_schema.clone(),
            params_schema: self.params_schema.clone(),
        }
    }

    /// The per-endpoint request used after batch models were generated.
    pub fn to_request(&self) -> GenerateRequest {
        GenerateRequest {
            response_schema: self.response_schema.clone(),
            params_schema: self.params_schema.clone(),
            skip_model_generation: true,
            ..GenerateRequest::new(&self.feature_name, self.method, &self.url, self.hook_type)
        }
    }
}
