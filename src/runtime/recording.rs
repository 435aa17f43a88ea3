use super::{NotificationKind, PageRuntime, RuntimeError, RuntimeEvent};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Keeps every emitted event in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingRuntime {
    events: Mutex<Vec<RuntimeEvent>>,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RuntimeEvent> {
        self.events.lock().clone()
    }

    /// Notifications only, as `(message, kind)`.
    pub fn notifications(&self) -> Vec<(String, NotificationKind)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                RuntimeEvent::Notification { message, kind } => Some((message.clone(), *kind)),
                _ => None,
            })
            .collect()
    }

    /// Whether the last overlay event left the overlay on screen.
    pub fn overlay_visible(&self) -> bool {
        self.events
            .lock()
            .iter()
            .rev()
            .find_map(|event| match event {
                RuntimeEvent::OverlayShown { .. } => Some(true),
                RuntimeEvent::OverlayHidden { .. } => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

#[async_trait]
impl PageRuntime for RecordingRuntime {
    fn emit(&self, event: RuntimeEvent) -> Result<(), RuntimeError> {
        self.events.lock().push(event);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), RuntimeError> {
        Ok(())
    }
}
