//! Demo session configuration.
//!
//! Loaded from an optional TOML file; command-line flags override file values.
//!
//! ```toml
//! start_url = "/search?search=rust"
//! search_debounce_ms = 300
//! history = "replace"
//!
//! [defaults]
//! search = ""
//! page = "1"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use urlstate_codec::UrlState;
use urlstate_sync::HistoryMode;

/// Settings for a scripted demo session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Address the session starts at.
    pub start_url: String,
    /// Debounce applied to `type=` steps, in milliseconds.
    pub search_debounce_ms: u64,
    /// How committed states land in the history.
    pub history: HistoryMode,
    /// Default state for the demo consumer.
    pub defaults: UrlState,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            start_url: "/".to_string(),
            search_debounce_ms: 500,
            history: HistoryMode::default(),
            defaults: UrlState::new().with("search", ""),
        }
    }
}

impl DemoConfig {
    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read demo config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parse demo config {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
