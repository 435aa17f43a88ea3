//! State decoded from a share link but not yet applied.

use parking_lot::Mutex;

use crate::share::{ActiveTab, LogLevel, SettingsPayload};

/// Settings waiting for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingState {
    /// `default=1`: the engine supplies the configuration text
    DefaultConfig {
        log_level: LogLevel,
        active_tab: ActiveTab,
    },
    /// `conf=`: settings carried in full by the link
    Shared(SettingsPayload),
}

/// Everything staged for one page load.
///
/// Input text is kept apart from the settings: the default-config branch
/// only supplies settings, and text merges in whichever branch was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Staged {
    pub settings: Option<PendingState>,
    pub input_text: Option<String>,
}

impl Staged {
    pub fn is_empty(&self) -> bool {
        self.settings.is_none() && self.input_text.is_none()
    }
}

/// Slot written by the decode task and drained exactly once by the
/// reconciler. Draining moves the contents out, so a second drain is empty.
#[derive(Debug, Default)]
pub struct StagingSlot {
    staged: Mutex<Staged>,
}

impl StagingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_settings(&self, settings: PendingState) {
        let previous = self.staged.lock().settings.replace(settings);
        if previous.is_some() {
            tracing::debug!("Replaced previously staged settings");
        }
    }

    pub fn stage_input_text(&self, text: String) {
        self.staged.lock().input_text = Some(text);
    }

    /// Move everything out of the slot, leaving it empty.
    pub fn take(&self) -> Staged {
        std::mem::take(&mut *self.staged.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.staged.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_drains_slot() {
        let slot = StagingSlot::new();
        slot.stage_settings(PendingState::DefaultConfig {
            log_level: LogLevel::Warn,
            active_tab: ActiveTab::Scan,
        });
        slot.stage_input_text("hello".into());
        assert!(!slot.is_empty());

        let staged = slot.take();
        assert_eq!(staged.input_text.as_deref(), Some("hello"));
        assert!(matches!(
            staged.settings,
            Some(PendingState::DefaultConfig {
                log_level: LogLevel::Warn,
                ..
            })
        ));

        assert!(slot.is_empty());
        assert!(slot.take().is_empty());
    }

    #[test]
    fn test_later_settings_replace_earlier() {
        let slot = StagingSlot::new();
        slot.stage_settings(PendingState::Shared(SettingsPayload::default()));
        slot.stage_settings(PendingState::DefaultConfig {
            log_level: LogLevel::Info,
            active_tab: ActiveTab::Config,
        });
        assert!(matches!(
            slot.take().settings,
            Some(PendingState::DefaultConfig { .. })
        ));
    }
}
