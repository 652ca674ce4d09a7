//! Navigation configuration
//!
//! Defaults, then an optional TOML file, then `OC_NAV_*` environment
//! variables.
//!
//! ```toml
//! id_scheme_prefix = "gid:"
//! min_numeric_id_len = 4
//! unresolved_url = "#"
//! annotation_param = "ann"
//! graphql_endpoint = "http://localhost:8000/graphql"
//! log_filter = "info"
//! log_json = false
//! ```

use crate::error::ConfigError;
use oc_ident::{IdClassifier, ID_SCHEME_PREFIX, MIN_NUMERIC_ID_LEN};
use oc_routes::{UrlBuilder, ANNOTATION_PARAM, UNRESOLVED_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default GraphQL endpoint
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "http://localhost:8000/graphql";

/// Navigation core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Prefix marking canonical ids
    pub id_scheme_prefix: String,
    /// Minimum length for all-digit ids
    pub min_numeric_id_len: usize,
    /// URL returned when a canonical URL cannot be built
    pub unresolved_url: String,
    /// Query parameter carrying selected annotation ids
    pub annotation_param: String,
    /// GraphQL endpoint
    pub graphql_endpoint: String,
    /// Default tracing filter, used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit JSON log lines
    pub log_json: bool,
}

impl NavConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With id scheme prefix
    #[inline]
    #[must_use]
    pub fn with_id_scheme_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_scheme_prefix = prefix.into();
        self
    }

    /// With numeric id threshold
    #[inline]
    #[must_use]
    pub fn with_min_numeric_id_len(mut self, len: usize) -> Self {
        self.min_numeric_id_len = len;
        self
    }

    /// With unresolved URL placeholder
    #[inline]
    #[must_use]
    pub fn with_unresolved_url(mut self, url: impl Into<String>) -> Self {
        self.unresolved_url = url.into();
        self
    }

    /// With annotation query parameter
    #[inline]
    #[must_use]
    pub fn with_annotation_param(mut self, param: impl Into<String>) -> Self {
        self.annotation_param = param.into();
        self
    }

    /// With GraphQL endpoint
    #[inline]
    #[must_use]
    pub fn with_graphql_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.graphql_endpoint = endpoint.into();
        self
    }

    /// With default log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// With JSON logging
    #[inline]
    #[must_use]
    pub fn with_log_json(mut self, json: bool) -> Self {
        self.log_json = json;
        self
    }

    /// Identifier classifier for these settings
    #[must_use]
    pub fn classifier(&self) -> IdClassifier {
        IdClassifier::new(self.id_scheme_prefix.clone(), self.min_numeric_id_len)
    }

    /// URL builder for these settings
    #[must_use]
    pub fn url_builder(&self) -> UrlBuilder {
        UrlBuilder::new()
            .with_unresolved(self.unresolved_url.clone())
            .with_annotation_param(self.annotation_param.clone())
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed TOML, [`ConfigError::Invalid`]
    /// when a value fails validation.
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` (if given and present), then apply environment overrides
    ///
    /// # Errors
    /// Read, parse or validation failures.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                let config = Self::from_toml_str(&contents, path)?;
                tracing::debug!("Loaded config from {}", path.display());
                config
            }
            Some(path) => {
                tracing::debug!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `OC_NAV_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut text = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = text("OC_NAV_ID_PREFIX") {
            self.id_scheme_prefix = value;
        }
        if let Some(value) = text("OC_NAV_MIN_NUMERIC_ID_LEN") {
            match value.parse() {
                Ok(len) => self.min_numeric_id_len = len,
                Err(err) => tracing::warn!("invalid OC_NAV_MIN_NUMERIC_ID_LEN, ignoring: {err}"),
            }
        }
        if let Some(value) = text("OC_NAV_UNRESOLVED_URL") {
            self.unresolved_url = value;
        }
        if let Some(value) = text("OC_NAV_ANNOTATION_PARAM") {
            self.annotation_param = value;
        }
        if let Some(value) = text("OC_NAV_GRAPHQL_ENDPOINT") {
            self.graphql_endpoint = value;
        }
        if let Some(value) = text("OC_NAV_LOG") {
            self.log_filter = value;
        }
        if let Some(value) = text("OC_NAV_LOG_JSON") {
            self.log_json = matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Check settings that would break routing
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_numeric_id_len == 0 {
            return Err(ConfigError::invalid(
                "min_numeric_id_len",
                "must be at least 1",
            ));
        }
        if self.unresolved_url.is_empty() {
            return Err(ConfigError::invalid("unresolved_url", "must not be empty"));
        }
        if self.unresolved_url.starts_with('/') {
            return Err(ConfigError::invalid(
                "unresolved_url",
                "must not look like a route path",
            ));
        }
        if self.annotation_param.is_empty()
            || self
                .annotation_param
                .contains(|c: char| matches!(c, '&' | '=' | '?' | '#'))
        {
            return Err(ConfigError::invalid(
                "annotation_param",
                format!("'{}' is not a usable query parameter name", self.annotation_param),
            ));
        }
        Ok(())
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            id_scheme_prefix: ID_SCHEME_PREFIX.to_string(),
            min_numeric_id_len: MIN_NUMERIC_ID_LEN,
            unresolved_url: UNRESOLVED_URL.to_string(),
            annotation_param: ANNOTATION_PARAM.to_string(),
            graphql_endpoint: DEFAULT_GRAPHQL_ENDPOINT.to_string(),
            log_filter: "info".to_string(),
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = NavConfig::default();
        assert_eq!(config.id_scheme_prefix, "gid:");
        assert_eq!(config.min_numeric_id_len, 4);
        assert_eq!(config.unresolved_url, "#");
        assert_eq!(config.annotation_param, "ann");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config =
            NavConfig::from_toml_str("annotation_param = \"sel\"\n", Path::new("nav.toml")).unwrap();
        assert_eq!(config.annotation_param, "sel");
        assert_eq!(config.unresolved_url, "#");
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = NavConfig::from_toml_str("min_numeric_id_len = \"x\"", Path::new("nav.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("nav.toml"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = NavConfig::new().with_annotation_param("a&b").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "annotation_param", .. }));

        let err = NavConfig::new().with_unresolved_url("/nowhere").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "unresolved_url", .. }));

        let err = NavConfig::new().with_min_numeric_id_len(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "min_numeric_id_len", .. }));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OC_NAV_ANNOTATION_PARAM", " sel "),
            ("OC_NAV_MIN_NUMERIC_ID_LEN", "6"),
            ("OC_NAV_LOG_JSON", "true"),
            ("OC_NAV_GRAPHQL_ENDPOINT", ""),
        ]
        .into_iter()
        .collect();

        let mut config = NavConfig::default();
        config.apply_env_overrides_from(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.annotation_param, "sel");
        assert_eq!(config.min_numeric_id_len, 6);
        assert!(config.log_json);
        assert_eq!(config.graphql_endpoint, DEFAULT_GRAPHQL_ENDPOINT);
    }

    #[test]
    fn bad_numeric_override_is_ignored() {
        let mut config = NavConfig::default();
        config.apply_env_overrides_from(|key| {
            (key == "OC_NAV_MIN_NUMERIC_ID_LEN").then(|| "many".to_string())
        });
        assert_eq!(config.min_numeric_id_len, 4);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "unresolved_url = \"#missing\"").unwrap();

        let config = NavConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.unresolved_url, "#missing");
        assert_eq!(config.url_builder().unresolved(), "#missing");
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NavConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.unresolved_url, "#");
    }

    #[test]
    fn classifier_uses_settings() {
        let classifier = NavConfig::new()
            .with_id_scheme_prefix("urn:")
            .with_min_numeric_id_len(6)
            .classifier();
        assert!(classifier.is_valid_id("urn:corpus:1"));
        assert!(!classifier.is_valid_id("12345"));
    }
}
