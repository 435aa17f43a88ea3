//! In-memory editor model used by the CLI and tests.

use std::path::Path;

use anyhow::{Context, Result};
use parking_lot::RwLock;

use super::PresentationSink;
use crate::share::{ActiveTab, LogLevel};

#[derive(Debug, Default)]
struct EditorView {
    config_text: String,
    input_text: String,
    log_level: LogLevel,
    active_tab: ActiveTab,
    /// Number of writes applied, for observing re-application
    writes: usize,
}

/// Holds the config editor, input editor, log level selector and tab bar.
#[derive(Debug, Default)]
pub struct EditorSink {
    view: RwLock<EditorView>,
}

impl EditorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total setter calls so far.
    pub fn write_count(&self) -> usize {
        self.view.read().writes
    }

    /// Write the editors out as `config.toml` and `input.txt` under `dir`.
    pub async fn export(&self, dir: &Path) -> Result<()> {
        let (config, input) = {
            let view = self.view.read();
            (view.config_text.clone(), view.input_text.clone())
        };

        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        tokio::fs::write(dir.join("config.toml"), config)
            .await
            .context("Failed to write config.toml")?;
        tokio::fs::write(dir.join("input.txt"), input)
            .await
            .context("Failed to write input.txt")?;

        tracing::info!("Exported session to {:?}", dir);
        Ok(())
    }
}

impl PresentationSink for EditorSink {
    fn set_config_text(&self, text: &str) {
        let mut view = self.view.write();
        view.config_text = text.to_string();
        view.writes += 1;
    }

    fn set_input_text(&self, text: &str) {
        let mut view = self.view.write();
        view.input_text = text.to_string();
        view.writes += 1;
    }

    fn set_log_level(&self, level: LogLevel) {
        let mut view = self.view.write();
        view.log_level = level;
        view.writes += 1;
    }

    fn set_active_tab(&self, tab: ActiveTab) {
        let mut view = self.view.write();
        view.active_tab = tab;
        view.writes += 1;
    }

    fn config_text(&self) -> String {
        self.view.read().config_text.clone()
    }

    fn input_text(&self) -> String {
        self.view.read().input_text.clone()
    }

    fn log_level(&self) -> LogLevel {
        self.view.read().log_level
    }

    fn active_tab(&self) -> ActiveTab {
        self.view.read().active_tab
    }
}
