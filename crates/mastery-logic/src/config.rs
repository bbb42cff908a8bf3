//! Builder configuration: share link shape and scroll caps.
//!
//! ```
//! use mastery_logic::config::{validate_config, BuilderConfig};
//!
//! let config = BuilderConfig::from_json_str(r#"{ "share_base_url": "https://example.test/m/" }"#).unwrap();
//! assert_eq!(config.share_param, "m");
//! assert!(validate_config(&config).is_empty());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::budget::ScrollCaps;
use crate::error::Result;

/// Host-supplied settings. Every field has a default, so a partial JSON
/// document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Page the share link points at.
    pub share_base_url: String,
    /// Query parameter carrying the share code.
    pub share_param: String,
    /// Display caps for the scroll totals.
    pub scroll_caps: ScrollCaps,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            share_base_url: "/tools/mastery-builder/".to_string(),
            share_param: "m".to_string(),
            scroll_caps: ScrollCaps::default(),
        }
    }
}

impl BuilderConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyBaseUrl,
    /// Base URL already carries a query string.
    BaseUrlHasQuery(String),
    /// Parameter name empty or not `[A-Za-z0-9_]+`.
    InvalidParam(String),
    /// A scroll cap of zero.
    ZeroCap(&'static str),
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &BuilderConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.share_base_url.trim().is_empty() {
        errors.push(ConfigError::EmptyBaseUrl);
    } else if config.share_base_url.contains('?') {
        errors.push(ConfigError::BaseUrlHasQuery(config.share_base_url.clone()));
    }

    let param_ok = !config.share_param.is_empty()
        && config
            .share_param
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !param_ok {
        errors.push(ConfigError::InvalidParam(config.share_param.clone()));
    }

    let caps = &config.scroll_caps;
    for (name, cap) in [
        ("basic", caps.basic),
        ("advanced", caps.advanced),
        ("divine", caps.divine),
    ] {
        if cap == 0 {
            errors.push(ConfigError::ZeroCap(name));
        }
    }

    errors
}
