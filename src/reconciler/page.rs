//! One page load: fragment decode and engine load run concurrently, and a
//! single consumer reconciles once the engine settles.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::stage::{stage_fragments, LoadFailure};
use super::{LoadPhase, LoadReconciler, ReconcileOutcome};
use crate::engine::{EngineState, EngineStatus, ScanEngine};
use crate::runtime::PageRuntime;
use crate::share::codec::DEFAULT_MAX_INFLATED_BYTES;
use crate::share::fragment_of;
use crate::sink::PresentationSink;

#[derive(Debug, Clone)]
pub struct PageLoadOptions {
    pub max_content_bytes: usize,
    pub overlay_fade: Duration,
    /// `None` waits for the engine indefinitely
    pub engine_timeout: Option<Duration>,
}

impl Default for PageLoadOptions {
    fn default() -> Self {
        Self {
            max_content_bytes: DEFAULT_MAX_INFLATED_BYTES,
            overlay_fade: Duration::from_millis(300),
            engine_timeout: Some(Duration::from_secs(30)),
        }
    }
}

#[derive(Debug)]
pub struct PageLoadReport {
    pub outcome: ReconcileOutcome,
    pub failures: Vec<LoadFailure>,
    pub phase: LoadPhase,
    pub engine: EngineStatus,
}

pub struct PageLoader {
    runtime: Arc<dyn PageRuntime>,
    sink: Arc<dyn PresentationSink>,
    engine: Arc<EngineState>,
    options: PageLoadOptions,
}

impl PageLoader {
    pub fn new(
        runtime: Arc<dyn PageRuntime>,
        sink: Arc<dyn PresentationSink>,
        engine: Arc<EngineState>,
        options: PageLoadOptions,
    ) -> Self {
        Self {
            runtime,
            sink,
            engine,
            options,
        }
    }

    pub fn engine(&self) -> &Arc<EngineState> {
        &self.engine
    }

    /// Open `link` while `engine_load` brings the engine up.
    ///
    /// Decoding may finish before or after the engine; either way the staged
    /// state is applied exactly once, after readiness.
    pub async fn load<F>(&self, link: &str, engine_load: F) -> PageLoadReport
    where
        F: Future<Output = anyhow::Result<Arc<dyn ScanEngine>>> + Send + 'static,
    {
        let mut reconciler = LoadReconciler::new(
            self.runtime.clone(),
            self.sink.clone(),
            self.options.overlay_fade,
        );
        let fragments = reconciler.begin(&fragment_of(link));

        let decode = {
            let slot = reconciler.staging();
            let runtime = self.runtime.clone();
            let max_bytes = self.options.max_content_bytes;
            tokio::task::spawn_blocking(move || {
                stage_fragments(&fragments, &slot, runtime.as_ref(), max_bytes)
            })
        };

        let mut engine_task = {
            let engine = self.engine.clone();
            let timeout = self.options.engine_timeout;
            tokio::spawn(async move { engine.load_with(engine_load, timeout).await })
        };

        let status = tokio::select! {
            status = self.engine.wait_ready() => status,
            joined = &mut engine_task => match joined {
                Ok(()) => self.engine.wait_ready().await,
                Err(e) => {
                    let reason = format!("engine task aborted: {}", e);
                    self.engine.fail(reason.clone());
                    EngineStatus::Failed(reason)
                }
            },
        };

        // Readiness may beat decoding; staged state must be complete first.
        let failures = match decode.await {
            Ok(failures) => failures,
            Err(e) => {
                tracing::error!("Fragment decode task failed: {}", e);
                Vec::new()
            }
        };

        let outcome = match &status {
            EngineStatus::Ready => reconciler.on_engine_ready(&self.engine),
            EngineStatus::Failed(reason) => reconciler.on_engine_failed(reason),
            EngineStatus::Loading => reconciler.on_engine_failed("engine never settled"),
        };

        if !engine_task.is_finished() {
            engine_task.abort();
        }

        PageLoadReport {
            outcome,
            failures,
            phase: reconciler.phase(),
            engine: status,
        }
    }
}
