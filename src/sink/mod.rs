//! Presentation sink: the editors, tab controller and form fields that
//! receive reconciled state.
//!
//! The core never touches UI state except through [`PresentationSink`].

mod editor;

pub use editor::EditorSink;

use crate::share::{ActiveTab, LogLevel, SessionState};

/// Read/write surface for live session state.
pub trait PresentationSink: Send + Sync {
    fn set_config_text(&self, text: &str);
    fn set_input_text(&self, text: &str);
    fn set_log_level(&self, level: LogLevel);
    fn set_active_tab(&self, tab: ActiveTab);

    fn config_text(&self) -> String;
    fn input_text(&self) -> String;
    fn log_level(&self) -> LogLevel;
    fn active_tab(&self) -> ActiveTab;
}

/// Read-only snapshot of the live editors.
pub fn snapshot(sink: &dyn PresentationSink) -> SessionState {
    let config = sink.config_text();
    let input = sink.input_text();
    SessionState {
        config: (!config.is_empty()).then_some(config),
        log_level: sink.log_level(),
        active_tab: sink.active_tab(),
        input_text: (!input.is_empty()).then_some(input),
    }
}
