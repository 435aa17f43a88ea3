// Runtime abstraction for the overlay and notification surface.
//
// The core emits fire-and-forget UI events through `PageRuntime`. The CLI
// forwards them over a channel; tests record them.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Runtime-specific errors
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Event receiver closed")]
    ReceiverClosed,
}

/// Visual style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Default,
    Error,
    Processing,
}

/// Events that can be emitted to the page/CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    /// Loading overlay covering the editors
    OverlayShown { message: String },

    /// Overlay dismissed, fading out over `fade_ms`
    OverlayHidden { fade_ms: u64 },

    /// Non-blocking toast
    Notification {
        message: String,
        kind: NotificationKind,
    },

    /// A freshly composed share link
    ShareLink { url: String },
}

pub const OVERLAY_MESSAGE: &str = "Loading shared configuration...";

/// Overlay/notification surface consumed by the core.
///
/// # Object Safety
/// This trait is object-safe and intended to be used as `Arc<dyn PageRuntime>`.
#[async_trait]
pub trait PageRuntime: Send + Sync + 'static {
    /// Emit an event to the page/output
    ///
    /// # Errors
    /// Returns `RuntimeError::ReceiverClosed` if the consumer is gone.
    fn emit(&self, event: RuntimeEvent) -> Result<(), RuntimeError>;

    /// Graceful shutdown - flush events, close channels, etc.
    async fn shutdown(&self) -> Result<(), RuntimeError>;

    fn show_overlay(&self) {
        self.emit_or_log(RuntimeEvent::OverlayShown {
            message: OVERLAY_MESSAGE.to_string(),
        });
    }

    fn hide_overlay(&self, fade: Duration) {
        self.emit_or_log(RuntimeEvent::OverlayHidden {
            fade_ms: fade.as_millis() as u64,
        });
    }

    fn notify(&self, message: &str, kind: NotificationKind) {
        self.emit_or_log(RuntimeEvent::Notification {
            message: message.to_string(),
            kind,
        });
    }

    /// UI events never fail the caller.
    fn emit_or_log(&self, event: RuntimeEvent) {
        if let Err(e) = self.emit(event) {
            tracing::warn!("Dropped runtime event: {}", e);
        }
    }
}

#[cfg(feature = "cli")]
pub mod cli;
mod recording;

#[cfg(feature = "cli")]
pub use cli::CliRuntime;
pub use recording::RecordingRuntime;
