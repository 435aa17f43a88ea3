//! Load reconciliation.
//!
//! A share link is decoded as soon as the page opens, but the settings it
//! carries can only be applied once the scanning engine is ready. Decoded
//! state is parked in a [`StagingSlot`]; engine readiness is the single
//! trigger that drains it into the [`PresentationSink`].
//!
//! ```text
//! Idle --begin--> AwaitingEngine --on_engine_ready/on_engine_failed--> Reconciled
//! ```

mod page;
mod pending;
mod stage;

#[cfg(test)]
mod integration_tests;

pub use page::{PageLoadOptions, PageLoadReport, PageLoader};
pub use pending::{PendingState, Staged, StagingSlot};
pub use stage::{
    decode_content, decode_settings, stage_fragments, FragmentPart, LoadFailure,
    CONTENT_LOAD_FAILED, SETTINGS_LOAD_FAILED,
};

use std::sync::Arc;
use std::time::Duration;

use crate::engine::EngineState;
use crate::runtime::{NotificationKind, PageRuntime};
use crate::share::{decode_fragments, FragmentMap};
use crate::sink::PresentationSink;

pub const LOAD_SUCCEEDED: &str = "Shared configuration loaded successfully!";
pub const ENGINE_LOAD_FAILED: &str = "Failed to load scanning engine.";

/// Input text seeded on a cold start.
pub const EXAMPLE_INPUT: &str = "some fake secrets to mess around with\n\n\
discord_client_secret = '8dyfuiRyq=vVc3RRr_edRk-fK__JItpZ'\n\
const FastlyAPIToken = \"uhZtofOcNnzoH6F5-m0bzsLvCqIjzNFG\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    AwaitingEngine,
    Reconciled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Staged state was written to the sink
    Applied { settings: bool, input_text: bool },
    /// Nothing was staged; the default configuration was seeded
    NothingPending,
    /// This page load was already reconciled
    AlreadyReconciled,
}

/// Per-page-load reconciliation context.
pub struct LoadReconciler {
    phase: LoadPhase,
    overlay_visible: bool,
    staging: Arc<StagingSlot>,
    runtime: Arc<dyn PageRuntime>,
    sink: Arc<dyn PresentationSink>,
    overlay_fade: Duration,
}

impl LoadReconciler {
    pub fn new(
        runtime: Arc<dyn PageRuntime>,
        sink: Arc<dyn PresentationSink>,
        overlay_fade: Duration,
    ) -> Self {
        Self {
            phase: LoadPhase::Idle,
            overlay_visible: false,
            staging: Arc::new(StagingSlot::new()),
            runtime,
            sink,
            overlay_fade,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Slot the decode task writes into.
    pub fn staging(&self) -> Arc<StagingSlot> {
        self.staging.clone()
    }

    /// Page entry.
    ///
    /// Shows the overlay whenever a fragment is present and returns the
    /// parsed pairs for staging. A fragment with no usable pairs is a cold
    /// start: the overlay comes down at once and the example input is seeded.
    pub fn begin(&mut self, fragment: &str) -> FragmentMap {
        if self.phase != LoadPhase::Idle {
            tracing::warn!("Page load already started ({:?}), ignoring", self.phase);
            return FragmentMap::default();
        }
        self.phase = LoadPhase::AwaitingEngine;

        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        if !fragment.is_empty() {
            self.show_overlay();
        }

        let fragments = decode_fragments(fragment);
        if fragments.is_empty() {
            tracing::info!("No shared state in link, cold start");
            self.hide_overlay(Duration::ZERO);
            self.sink.set_input_text(EXAMPLE_INPUT);
        } else {
            tracing::debug!("Decoded {} fragment pair(s)", fragments.len());
        }
        fragments
    }

    /// Engine readiness. Safe to call any number of times; only the first
    /// call after `begin` applies anything.
    pub fn on_engine_ready(&mut self, engine: &EngineState) -> ReconcileOutcome {
        if self.phase == LoadPhase::Reconciled {
            tracing::debug!("Readiness fired again after reconciliation, ignoring");
            return ReconcileOutcome::AlreadyReconciled;
        }

        let default_config = match engine.default_config() {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Reconciling without engine default config: {}", e);
                None
            }
        };
        self.apply(default_config, true)
    }

    /// Engine load failure. Applies what does not depend on the engine,
    /// reports the failure and releases the overlay.
    pub fn on_engine_failed(&mut self, reason: &str) -> ReconcileOutcome {
        if self.phase == LoadPhase::Reconciled {
            return ReconcileOutcome::AlreadyReconciled;
        }
        tracing::error!("Scanning engine unavailable: {}", reason);
        let outcome = self.apply(None, false);
        self.runtime.notify(ENGINE_LOAD_FAILED, NotificationKind::Error);
        outcome
    }

    fn apply(&mut self, default_config: Option<String>, announce: bool) -> ReconcileOutcome {
        if self.phase == LoadPhase::Idle {
            tracing::debug!("Reconciling before page entry");
        }
        self.phase = LoadPhase::Reconciled;

        let staged = self.staging.take();
        if staged.is_empty() {
            if let Some(config) = &default_config {
                self.sink.set_config_text(config);
            }
            self.hide_overlay(Duration::ZERO);
            return ReconcileOutcome::NothingPending;
        }

        let settings_applied = staged.settings.is_some();
        match staged.settings {
            Some(PendingState::DefaultConfig {
                log_level,
                active_tab,
            }) => {
                match &default_config {
                    Some(config) => self.sink.set_config_text(config),
                    None => tracing::warn!("Default config requested but engine has none"),
                }
                self.sink.set_log_level(log_level);
                self.sink.set_active_tab(active_tab);
            }
            Some(PendingState::Shared(payload)) => {
                if let Some(config) = payload.config.or(default_config) {
                    self.sink.set_config_text(&config);
                }
                if let Some(level) = payload.log_level {
                    self.sink.set_log_level(level);
                }
                if let Some(tab) = payload.active_tab {
                    self.sink.set_active_tab(tab);
                }
            }
            None => {
                if let Some(config) = &default_config {
                    self.sink.set_config_text(config);
                }
            }
        }

        let input_applied = match staged.input_text {
            Some(text) => {
                self.sink.set_input_text(&text);
                true
            }
            None => false,
        };

        // Only a configuration that actually arrived is announced.
        if settings_applied {
            self.hide_overlay(self.overlay_fade);
            if announce {
                self.runtime.notify(LOAD_SUCCEEDED, NotificationKind::Default);
            }
        } else {
            self.hide_overlay(Duration::ZERO);
        }
        tracing::info!(
            settings = settings_applied,
            input_text = input_applied,
            "Shared state applied"
        );

        ReconcileOutcome::Applied {
            settings: settings_applied,
            input_text: input_applied,
        }
    }

    fn show_overlay(&mut self) {
        self.overlay_visible = true;
        self.runtime.show_overlay();
    }

    fn hide_overlay(&mut self, fade: Duration) {
        if !self.overlay_visible {
            return;
        }
        self.overlay_visible = false;
        self.runtime.hide_overlay(fade);
    }
}
