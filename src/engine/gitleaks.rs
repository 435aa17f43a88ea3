//! Gitleaks-backed engine.
//!
//! Loading is the asynchronous "fetch + instantiate" step: the default
//! configuration is read from the bundled copy or from disk, validated, and
//! only then is the engine handed to [`super::EngineState::install`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::ScanEngine;

/// Default configuration bundled into the binary.
const EMBEDDED_CONFIG: &str = include_str!("default_config.toml");

const ENGINE_VERSION: &str = "Gitleaks v8.24.0";

/// Where the engine's default configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSource {
    Embedded,
    File(PathBuf),
}

impl EngineSource {
    /// `engine.config_path` from settings, falling back to the bundled copy.
    pub fn from_setting(path: Option<&str>) -> Self {
        match path {
            Some(p) if !p.trim().is_empty() => EngineSource::File(PathBuf::from(p)),
            _ => EngineSource::Embedded,
        }
    }
}

pub struct GitleaksEngine {
    default_config: String,
    rule_count: usize,
}

impl GitleaksEngine {
    /// Fetch and validate the default configuration.
    pub async fn load(source: &EngineSource) -> Result<Self> {
        let text = match source {
            EngineSource::Embedded => EMBEDDED_CONFIG.to_string(),
            EngineSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read engine config {}", path.display()))?,
        };
        Self::from_config(text)
    }

    /// Load into an `Arc<dyn ScanEngine>` for [`super::EngineState::load_with`].
    pub async fn load_shared(source: EngineSource) -> Result<Arc<dyn ScanEngine>> {
        let engine = Self::load(&source).await?;
        Ok(Arc::new(engine))
    }

    fn from_config(text: String) -> Result<Self> {
        let table: toml::Table =
            toml::from_str(&text).context("Engine config is not valid TOML")?;

        let rules = table
            .get("rules")
            .and_then(|rules| rules.as_array())
            .ok_or_else(|| anyhow::anyhow!("Engine config has no [[rules]]"))?;

        for (index, rule) in rules.iter().enumerate() {
            let has_id = rule.get("id").and_then(|id| id.as_str()).is_some();
            if !has_id {
                anyhow::bail!("Rule #{} in engine config has no id", index + 1);
            }
        }

        tracing::debug!("Engine config validated with {} rules", rules.len());
        Ok(Self {
            rule_count: rules.len(),
            default_config: text,
        })
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }
}

impl ScanEngine for GitleaksEngine {
    fn version(&self) -> &str {
        ENGINE_VERSION
    }

    fn default_config(&self) -> &str {
        &self.default_config
    }
}
