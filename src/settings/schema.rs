//! Settings schema definitions for leakshare.
//!
//! All settings structs use `#[serde(default)]` to allow partial configuration files.
//! Missing fields are filled with sensible defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::reconciler::PageLoadOptions;
use crate::share::codec::DEFAULT_MAX_INFLATED_BYTES;

pub const DEFAULT_BASE_URL: &str = "https://gitleaks.io/playground";

/// Consulted when `engine.config_path` is unset.
pub const ENGINE_CONFIG_ENV: &str = "LEAKSHARE_ENGINE_CONFIG";

pub const THEMES: [&str; 2] = ["light", "dark"];

/// Root settings structure.
///
/// Loaded from `~/.leakshare/settings.toml` with environment variable interpolation support.
/// Version field enables future migrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeakshareSettings {
    /// Schema version for migrations
    pub version: u32,

    /// Share link generation and loading
    pub share: ShareSettings,

    /// Scanning engine loading
    pub engine: EngineSettings,

    /// Persisted local preferences
    pub ui: UiSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareSettings {
    /// Origin and path prefix of generated links
    pub base_url: String,

    /// Largest content accepted, both when composing and after inflation
    pub max_content_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Default configuration file; the bundled copy is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,

    /// Seconds to wait for the engine, 0 to wait forever
    pub load_timeout_secs: u64,
}

/// User interface preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Color theme: "light" | "dark"
    pub theme: String,

    /// Editor height as a CSS length
    pub editor_height: String,

    /// Overlay fade-out after a shared load
    pub overlay_fade_ms: u64,
}

impl EngineSettings {
    pub fn load_timeout(&self) -> Option<Duration> {
        (self.load_timeout_secs > 0).then(|| Duration::from_secs(self.load_timeout_secs))
    }

    /// `config_path`, or `LEAKSHARE_ENGINE_CONFIG` when that is unset or empty.
    pub fn resolved_config_path(&self) -> Option<String> {
        self.config_path_or(std::env::var(ENGINE_CONFIG_ENV).ok())
    }

    fn config_path_or(&self, fallback: Option<String>) -> Option<String> {
        self.config_path
            .clone()
            .filter(|path| !path.is_empty())
            .or(fallback)
            .filter(|path| !path.is_empty())
    }
}

impl LeakshareSettings {
    /// Reject values the share flow cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let base = url::Url::parse(&self.share.base_url)
            .map_err(|e| anyhow::anyhow!("share.base_url '{}': {}", self.share.base_url, e))?;
        anyhow::ensure!(
            matches!(base.scheme(), "http" | "https"),
            "share.base_url must be an http(s) URL, got '{}'",
            self.share.base_url
        );
        anyhow::ensure!(
            self.share.max_content_bytes > 0,
            "share.max_content_bytes must be greater than zero"
        );
        anyhow::ensure!(
            THEMES.contains(&self.ui.theme.as_str()),
            "ui.theme must be one of {:?}, got '{}'",
            THEMES,
            self.ui.theme
        );
        Ok(())
    }

    pub fn page_load_options(&self) -> PageLoadOptions {
        PageLoadOptions {
            max_content_bytes: self.share.max_content_bytes,
            overlay_fade: Duration::from_millis(self.ui.overlay_fade_ms),
            engine_timeout: self.engine.load_timeout(),
        }
    }
}

// =============================================================================
// Default implementations
// =============================================================================

impl Default for LeakshareSettings {
    fn default() -> Self {
        Self {
            version: 1,
            share: ShareSettings::default(),
            engine: EngineSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_content_bytes: DEFAULT_MAX_INFLATED_BYTES,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            config_path: None,
            load_timeout_secs: 30,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            editor_height: "500px".to_string(),
            overlay_fade_ms: 300,
        }
    }
}
