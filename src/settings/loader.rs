//! Reading and writing `~/.leakshare/settings.toml`.
//!
//! Every settings value that reaches the cache has been validated, so a bad
//! `settings set` never lands on disk and a hand-edited file with a bad value
//! fails loudly at startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::RwLock;

use super::schema::LeakshareSettings;

/// Written on first run.
const TEMPLATE: &str = include_str!("template.toml");

pub fn settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".leakshare")
        .join("settings.toml")
}

/// Cached, validated settings backed by one TOML file.
pub struct SettingsManager {
    settings: RwLock<LeakshareSettings>,
    path: PathBuf,
}

impl SettingsManager {
    pub async fn new() -> Result<Self> {
        Self::with_path(settings_path()).await
    }

    pub async fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = read_settings(&path).await?;
        Ok(Self {
            settings: RwLock::new(settings),
            path,
        })
    }

    pub async fn get(&self) -> LeakshareSettings {
        self.settings.read().await.clone()
    }

    /// Validate, persist, then cache. The cache is left alone on failure.
    pub async fn update(&self, settings: LeakshareSettings) -> Result<()> {
        settings.validate()?;
        let mut cached = self.settings.write().await;
        write_settings(&self.path, &settings).await?;
        *cached = settings;
        Ok(())
    }

    /// Value at a dotted key such as `share.base_url` or `ui`.
    pub async fn get_value(&self, key: &str) -> Result<serde_json::Value> {
        let json = serde_json::to_value(&*self.settings.read().await)?;
        json.pointer(&pointer_for(key)?)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown setting '{}'", key))
    }

    /// Replace the value at an existing dotted key. New keys are never
    /// created; the result must still deserialize and validate.
    pub async fn set_value(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let current = self.get().await;
        let mut json = serde_json::to_value(&current)?;
        let slot = json
            .pointer_mut(&pointer_for(key)?)
            .ok_or_else(|| anyhow::anyhow!("Unknown setting '{}'", key))?;
        *slot = value;

        let updated: LeakshareSettings = serde_json::from_value(json)
            .with_context(|| format!("Wrong type for '{}'", key))?;
        self.update(updated).await?;
        tracing::info!("Set {} in {:?}", key, self.path);
        Ok(())
    }

    pub async fn reset(&self) -> Result<()> {
        self.update(LeakshareSettings::default()).await
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the commented template if no settings file exists yet.
    /// Returns whether one was written.
    pub async fn ensure_settings_file(&self) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, TEMPLATE).await?;
        tracing::info!("Generated settings template at {:?}", self.path);
        Ok(true)
    }

    pub async fn reload(&self) -> Result<()> {
        let settings = read_settings(&self.path).await?;
        *self.settings.write().await = settings;
        Ok(())
    }
}

async fn read_settings(path: &Path) -> Result<LeakshareSettings> {
    if !path.exists() {
        tracing::debug!("No settings at {:?}, using defaults", path);
        return Ok(LeakshareSettings::default());
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut settings: LeakshareSettings = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    settings.share.base_url = expand_env(&settings.share.base_url);
    if let Some(config_path) = settings.engine.config_path.as_mut() {
        *config_path = expand_env(config_path);
    }
    settings
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;

    tracing::info!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// Temp file plus rename, so readers never see a half-written file.
async fn write_settings(path: &Path, settings: &LeakshareSettings) -> Result<()> {
    let text = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let temp_path = path.with_extension("toml.tmp");
    tokio::fs::write(&temp_path, text).await?;
    tokio::fs::rename(&temp_path, path).await?;
    tracing::info!("Saved settings to {:?}", path);
    Ok(())
}

/// `share.base_url` -> `/share/base_url`.
fn pointer_for(key: &str) -> Result<String> {
    if key.is_empty() || key.split('.').any(str::is_empty) {
        anyhow::bail!("Invalid setting key '{}'", key);
    }
    Ok(key.split('.').fold(String::new(), |mut pointer, part| {
        pointer.push('/');
        pointer.push_str(part);
        pointer
    }))
}

/// Substitute `$VAR` and `${VAR}` references anywhere in `value`.
///
/// References to unset variables are kept verbatim.
fn expand_env(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let (name, consumed) = match after.strip_prefix('{') {
            Some(braced) => match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            },
            None => {
                let end = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], end)
            }
        };

        let reference = &rest[start..start + 1 + consumed];
        match std::env::var(name) {
            Ok(resolved) if !name.is_empty() => out.push_str(&resolved),
            _ => {
                if !name.is_empty() {
                    tracing::warn!("Environment variable {} is not set", name);
                }
                out.push_str(if consumed == 0 { "$" } else { reference });
            }
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}
