//! Error types for the navigation facade

use oc_dedup::DedupError;
use oc_guard::TransportError;
use oc_ident::IdentError;
use oc_routes::RouteError;
use oc_sync::SelectionError;
use std::path::PathBuf;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::NavConfig`]
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A setting has an unusable value
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Setting name
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    /// Create an invalid-value error
    #[inline]
    #[must_use]
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the navigation facade
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Identifier error
    #[error(transparent)]
    Ident(#[from] IdentError),

    /// URL building error
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Selection state error
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Request tracking error
    #[error(transparent)]
    Dedup(#[from] DedupError),

    /// Transport error
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Logging could not be installed
    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Result type for navigation operations
pub type NavResult<T> = Result<T, NavError>;
