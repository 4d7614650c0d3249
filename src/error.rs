//! Error types for logocache
//!
//! All modules use `LogoResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for logocache operations
pub type LogoResult<T> = Result<T, LogoError>;

/// All errors that can occur in logocache
#[derive(Error, Debug)]
pub enum LogoError {
    // Load errors (absorbed by the loader, reported on the handle)
    #[error("Invalid image URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Could not decode image from {url}: {reason}")]
    DecodeFailed { url: String, reason: String },

    // Placeholder asset errors
    #[error("Failed to load placeholder asset {path}: {reason}")]
    AssetLoad { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Runtime errors
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LogoError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a fetch failed error
    pub fn fetch_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a decode failed error
    pub fn decode_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::DecodeFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is one of the failures a load absorbs into the placeholder
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl { .. } | Self::FetchFailed { .. } | Self::DecodeFailed { .. }
        )
    }

    /// Short machine-readable kind, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::AssetLoad { .. } => "asset_load",
            Self::ConfigInvalid { .. } | Self::ConfigDirCreate { .. } => "config",
            Self::NoRuntime(_) => "runtime",
            Self::Io { .. } => "io",
            Self::Json(_) | Self::TomlParse(_) | Self::TomlSerialize(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigInvalid { .. } => Some("Run: logocache config init --force"),
            Self::AssetLoad { .. } => {
                Some("Check placeholders.assets_dir; files must be PNG, JPEG or WebP")
            }
            Self::NoRuntime(_) => Some("Create the loader from inside a tokio runtime"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LogoError::invalid_url("team42", "relative URL without a base");
        assert!(err.to_string().contains("Invalid image URL 'team42'"));
    }

    #[test]
    fn error_hint() {
        let err = LogoError::ConfigInvalid {
            path: PathBuf::from("/tmp/config.toml"),
            reason: "bad".to_string(),
        };
        assert_eq!(err.hint(), Some("Run: logocache config init --force"));
        assert_eq!(LogoError::Internal("x".to_string()).hint(), None);
    }

    #[test]
    fn load_failures() {
        assert!(LogoError::fetch_failed("u", "timeout").is_load_failure());
        assert!(LogoError::decode_failed("u", "bad png").is_load_failure());
        assert!(!LogoError::Internal("nope".to_string()).is_load_failure());
        assert_eq!(LogoError::decode_failed("u", "x").kind(), "decode_failed");
    }
}
