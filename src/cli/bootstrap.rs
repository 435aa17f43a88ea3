//! CLI bootstrap - Initialize the leakshare stack for CLI usage.
//!
//! `CliContext` owns everything a page load needs: the runtime and its event
//! channel, the editor sink, the engine readiness gate and the settings.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::engine::{EngineSource, EngineState};
use crate::runtime::{CliRuntime, PageRuntime, RuntimeEvent};
use crate::settings::{LeakshareSettings, SettingsManager};
use crate::sink::EditorSink;

use super::args::Args;

/// Context for CLI execution containing all initialized services.
pub struct CliContext {
    /// Runtime abstraction for event emission
    pub runtime: Arc<dyn PageRuntime>,

    /// Event receiver for output handling, taken by the output loop
    pub event_rx: Option<mpsc::UnboundedReceiver<RuntimeEvent>>,

    /// Settings manager
    pub settings_manager: Arc<SettingsManager>,

    /// Scanning engine readiness gate
    pub engine: Arc<EngineState>,

    /// Editors receiving reconciled state
    pub sink: Arc<EditorSink>,

    /// Command-line arguments
    pub args: Args,
}

impl CliContext {
    pub async fn settings(&self) -> LeakshareSettings {
        self.settings_manager.get().await
    }

    /// Graceful shutdown - closes the event channel so the output loop drains.
    pub async fn shutdown(&self) -> Result<()> {
        if let Err(e) = self.runtime.shutdown().await {
            tracing::warn!("Runtime shutdown error: {}", e);
        }
        Ok(())
    }
}

/// `engine.config_path`, or `LEAKSHARE_ENGINE_CONFIG` when unset.
pub fn engine_source(settings: &LeakshareSettings) -> EngineSource {
    EngineSource::from_setting(settings.engine.resolved_config_path().as_deref())
}

/// Initialize the CLI context with all services.
pub async fn initialize(args: &Args) -> Result<CliContext> {
    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        // Only warn on errors other than file not found
        if !matches!(e, dotenvy::Error::Io(_)) {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }

    init_logging(args.verbose)?;

    // Load settings
    let settings_manager = Arc::new(
        SettingsManager::new()
            .await
            .context("Failed to initialize settings manager")?,
    );

    // Ensure settings file exists (creates template on first run)
    if let Err(e) = settings_manager.ensure_settings_file().await {
        tracing::warn!("Failed to create settings template: {}", e);
    }

    if args.verbose {
        let settings = settings_manager.get().await;
        eprintln!(
            "[cli] Settings loaded from {}",
            settings_manager.path().display()
        );
        eprintln!("[cli] Share base URL: {}", settings.share.base_url);
        eprintln!("[cli] Engine source: {:?}", engine_source(&settings));
    }

    // Create event channel
    let (event_tx, event_rx) = mpsc::unbounded_channel::<RuntimeEvent>();

    // Create CLI runtime
    let runtime: Arc<dyn PageRuntime> = Arc::new(CliRuntime::new(event_tx));

    Ok(CliContext {
        runtime,
        event_rx: Some(event_rx),
        settings_manager,
        engine: Arc::new(EngineState::new()),
        sink: Arc::new(EditorSink::new()),
        args: args.clone(),
    })
}

/// Logs go to stderr; stdout carries command results only.
fn init_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { "warn" };
    let directive = format!("leakshare={}", log_level)
        .parse()
        .context("Invalid log directive")?;
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .try_init();
    Ok(())
}
