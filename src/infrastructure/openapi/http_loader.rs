//! HTTP-based spec loader

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{DocumentFormat, parse_document};
use crate::generation::{GenerationError, SpecLoader};

/// Whether `source` is an `http(s)` URL.
pub fn is_http_url(source: &str) -> bool {
    Url::parse(source).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Loads API specifications from HTTP/HTTPS URLs
#[derive(Debug, Clone)]
pub struct HttpSpecLoader {
    client: Client,
}

impl HttpSpecLoader {
    pub fn new() -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| GenerationError::LoadError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SpecLoader for HttpSpecLoader {
    async fn load(&self, source: &str) -> Result<serde_json::Value, GenerationError> {
        if !is_http_url(source) {
            return Err(GenerationError::LoadError(format!(
                "HttpSpecLoader only handles HTTP(S) URLs, got: {source}"
            )));
        }

        debug!(url = %source, "Fetching spec");
        let response = self.client.get(source).send().await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to fetch spec from {source}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::LoadError(format!(
                "HTTP {status} when fetching {source}"
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let content = response.text().await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to read response body: {e}"))
        })?;

        let format = if content_type.contains("json") || source.ends_with(".json") {
            DocumentFormat::Json
        } else if content_type.contains("yaml")
            || source.ends_with(".yaml")
            || source.ends_with(".yml")
        {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Unknown
        };
        parse_document(&content, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_http_loader_yaml() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/openapi.yaml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("openapi: 3.0.0\npaths: {}\n")
                    .insert_header("content-type", "application/x-yaml"),
            )
            .mount(&mock_server)
            .await;

        let loader = HttpSpecLoader::new().unwrap();
        let url = format!("{}/openapi.yaml", mock_server.uri());
        let spec = loader.load(&url).await.unwrap();

        assert_eq!(spec["openapi"], "3.0.0");
    }

    #[tokio::test]
    async fn test_http_loader_404() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/notfound"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let loader = HttpSpecLoader::new().unwrap();
        let url = format!("{}/notfound", mock_server.uri());

        match loader.load(&url).await.unwrap_err() {
            GenerationError::LoadError(msg) => assert!(msg.contains("HTTP 404")),
            other => panic!("Expected LoadError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_loader_rejects_non_http_source() {
        let loader = HttpSpecLoader::new().unwrap();
        let err = loader.load("file:///path/to/spec.yaml").await.unwrap_err();
        assert!(err.to_string().contains("only handles HTTP"));
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://example.com/spec.json"));
        assert!(is_http_url("http://localhost:8080/openapi"));
        assert!(!is_http_url("./spec.yaml"));
        assert!(!is_http_url("C:\\specs\\api.yaml"));
    }
}
