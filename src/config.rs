//! Code generation conventions.
//!
//! The names of wrapper types, transport helpers and pagination fields that
//! generated fragments refer to. Every field has a default, so an empty YAML
//! document is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::generation::GenerationError;

/// File name looked up in the user config directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "hookgen.yaml";

/// Conventions threaded through every generated fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Function returning the configured axios instance
    pub transport_factory: String,

    /// Body/query field that receives the infinite-query page cursor
    pub page_field: String,

    pub total_count_field: String,
    pub filtered_count_field: String,

    /// Wrapper for paginated lists stored under `data`
    pub list_wrapper: String,

    /// Wrapper for paginated lists stored under any other key
    pub named_list_wrapper: String,

    /// Wrapper for a single enveloped value
    pub value_wrapper: String,

    /// Hook returning a callback that invalidates shared queries after a mutation
    pub invalidation_hook: String,

    /// Function called with the failed response in error callbacks
    pub error_notifier: String,

    /// Example value used for URL variables that have no explicit example
    pub placeholder_value: i64,

    /// Prefix removed from OpenAPI paths before they are used as URLs
    pub strip_path_prefix: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            transport_factory: String::from("getInstance"),
            page_field: String::from("pageNo"),
            total_count_field: String::from("totalRecords"),
            filtered_count_field: String::from("filteredRecords"),
            list_wrapper: String::from("WithRecordResponse"),
            named_list_wrapper: String::from("WithCustomRecordResponse"),
            value_wrapper: String::from("WithResponse"),
            invalidation_hook: String::from("useInvalidateCommonQueries"),
            error_notifier: String::from("showSnackbarOnApiError"),
            placeholder_value: 123,
            strip_path_prefix: String::from("/api"),
        }
    }
}

impl CodegenConfig {
    /// Load a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or contains invalid YAML.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, GenerationError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading codegen config");

        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Write the configuration as YAML, creating parent directories as needed.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), GenerationError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        debug!(path = %path.display(), "Saved codegen config");
        Ok(())
    }

    /// The per-user config location, e.g. `~/.config/hookgen/hookgen.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hookgen").join(CONFIG_FILE_NAME))
    }

    /// Load from `path` if given, else from the per-user location if it exists,
    /// else fall back to the defaults.
    pub async fn resolve(path: Option<&Path>) -> Result<Self, GenerationError> {
        if let Some(path) = path {
            return Self::from_file(path).await;
        }
        match Self::default_path() {
            Some(default) if fs::try_exists(&default).await.unwrap_or(false) => {
                Self::from_file(default).await
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_defaults() {
        let config = CodegenConfig::default();
        assert_eq!(config.transport_factory, "getInstance");
        assert_eq!(config.page_field, "pageNo");
        assert_eq!(config.total_count_field, "totalRecords");
        assert_eq!(config.filtered_count_field, "filteredRecords");
        assert_eq!(config.placeholder_value, 123);
        assert_eq!(config.strip_path_prefix, "/api");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "page_field: page\nvalue_wrapper: ApiResult\n";
        let config: CodegenConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.page_field, "page");
        assert_eq!(config.value_wrapper, "ApiResult");
        assert_eq!(config.list_wrapper, "WithRecordResponse");
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = CodegenConfig {
            transport_factory: String::from("http"),
            placeholder_value: 7,
            ..Default::default()
        };
        config.save(&path).await.unwrap();

        let loaded = CodegenConfig::from_file(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_resolve_explicit_missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = CodegenConfig::resolve(Some(&dir.path().join("absent.yaml"))).await;
        assert!(matches!(result, Err(GenerationError::IoError(_))));
    }
}
