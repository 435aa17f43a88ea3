//! Scanning engine collaborator and its readiness gate.
//!
//! The engine loads asynchronously and may finish before or after a share
//! link has been decoded. `EngineState` publishes its status through a watch
//! channel; the page loader treats the first non-loading status as the single
//! trigger for reconciliation.

pub mod gitleaks;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::error::{Result, ShareError};

pub use gitleaks::{EngineSource, GitleaksEngine};

/// What the core needs from a loaded engine.
pub trait ScanEngine: Send + Sync + 'static {
    /// Human readable engine version
    fn version(&self) -> &str;

    /// The engine's built-in configuration text
    fn default_config(&self) -> &str;
}

/// Load status published to readiness waiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Holds the engine once loaded and signals readiness.
pub struct EngineState {
    engine: RwLock<Option<Arc<dyn ScanEngine>>>,
    status_tx: watch::Sender<EngineStatus>,
}

impl EngineState {
    pub fn new() -> Self {
        let (status_tx, _) = watch::channel(EngineStatus::Loading);
        Self {
            engine: RwLock::new(None),
            status_tx,
        }
    }

    /// Install a loaded engine and fire the readiness signal.
    ///
    /// Calling this again replaces the engine and fires the signal again;
    /// consumers must tolerate repeated readiness.
    pub fn install(&self, engine: Arc<dyn ScanEngine>) {
        tracing::info!("Scanning engine ready: {}", engine.version());
        *self.engine.write() = Some(engine);
        self.status_tx.send_replace(EngineStatus::Ready);
    }

    /// Record that the engine could not be loaded.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!("Scanning engine failed to load: {}", reason);
        self.status_tx.send_replace(EngineStatus::Failed(reason));
    }

    pub fn status(&self) -> EngineStatus {
        self.status_tx.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.engine.read().is_some()
    }

    pub fn version(&self) -> Option<String> {
        self.engine
            .read()
            .as_ref()
            .map(|engine| engine.version().to_string())
    }

    /// The installed engine's default configuration.
    ///
    /// Fails with [`ShareError::EngineUnavailable`] before readiness.
    pub fn default_config(&self) -> Result<String> {
        self.engine
            .read()
            .as_ref()
            .map(|engine| engine.default_config().to_string())
            .ok_or(ShareError::EngineUnavailable)
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineStatus> {
        self.status_tx.subscribe()
    }

    /// Wait until the engine is ready or has failed.
    pub async fn wait_ready(&self) -> EngineStatus {
        let mut rx = self.subscribe();
        rx.wait_for(|status| *status != EngineStatus::Loading)
            .await
            .map(|status| status.clone())
            .unwrap_or_else(|_| EngineStatus::Failed("engine status channel closed".to_string()))
    }

    /// Drive an engine load to completion, installing the result or
    /// recording the failure. `timeout` of `None` waits indefinitely.
    pub async fn load_with<F>(&self, load: F, timeout: Option<Duration>)
    where
        F: Future<Output = anyhow::Result<Arc<dyn ScanEngine>>>,
    {
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, load).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "timed out after {}s",
                    limit.as_secs_f32()
                )),
            },
            None => load.await,
        };

        match result {
            Ok(engine) => self.install(engine),
            Err(e) => self.fail(format!("{:#}", e)),
        }
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEngine;

    impl ScanEngine for FixedEngine {
        fn version(&self) -> &str {
            "fixed"
        }

        fn default_config(&self) -> &str {
            "title = \"fixed\""
        }
    }

    #[test]
    fn test_default_config_unavailable_before_ready() {
        let state = EngineState::new();
        assert!(matches!(
            state.default_config(),
            Err(ShareError::EngineUnavailable)
        ));
        assert_eq!(state.status(), EngineStatus::Loading);
    }

    #[tokio::test]
    async fn test_wait_ready_resolves_after_install() {
        let state = Arc::new(EngineState::new());
        let waiter = {
            let state = state.clone();
            tokio::spawn(async move { state.wait_ready().await })
        };
        tokio::task::yield_now().await;
        state.install(Arc::new(FixedEngine));

        assert_eq!(waiter.await.unwrap(), EngineStatus::Ready);
        assert_eq!(state.default_config().unwrap(), "title = \"fixed\"");
        assert_eq!(state.version().as_deref(), Some("fixed"));
    }

    #[tokio::test]
    async fn test_wait_ready_returns_immediately_when_already_ready() {
        let state = EngineState::new();
        state.install(Arc::new(FixedEngine));
        assert_eq!(state.wait_ready().await, EngineStatus::Ready);
    }

    #[tokio::test]
    async fn test_load_with_records_failure() {
        let state = EngineState::new();
        state
            .load_with(async { Err(anyhow::anyhow!("fetch failed")) }, None)
            .await;
        assert_eq!(
            state.wait_ready().await,
            EngineStatus::Failed("fetch failed".to_string())
        );
        assert!(!state.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_with_times_out() {
        let state = EngineState::new();
        let stalled = std::future::pending::<anyhow::Result<Arc<dyn ScanEngine>>>();
        state
            .load_with(stalled, Some(Duration::from_secs(30)))
            .await;
        assert!(matches!(state.status(), EngineStatus::Failed(reason) if reason.contains("timed out")));
    }
}
