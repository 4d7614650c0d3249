//! Configuration schema for logocache
//!
//! Configuration is stored at `~/.config/logocache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Network fetch settings
    pub fetch: FetchConfig,

    /// Decode settings
    pub decode: DecodeConfig,

    /// Placeholder assets
    pub placeholders: PlaceholderConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds, 0 leaves it to the transport
    pub timeout_secs: u64,

    /// Largest response body accepted, in bytes
    pub max_bytes: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_bytes: 10 * 1024 * 1024,
            user_agent: concat!("logocache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Image decode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Downscale images whose width or height exceeds this, 0 disables
    pub max_edge: u32,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self { max_edge: 512 }
    }
}

/// Placeholder asset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// Name of the placeholder used when a call does not name one
    pub default: String,

    /// Directory of extra placeholder images, named by file stem
    pub assets_dir: Option<PathBuf>,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            default: crate::assets::NO_LOGO.to_string(),
            assets_dir: None,
        }
    }
}
