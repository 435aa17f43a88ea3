//! CLI output handling - Event receiver loop.
//!
//! Receives runtime events over the channel and renders them based on output
//! mode (terminal, JSON, or quiet). Share links and errors are always shown;
//! overlay and progress chatter is dropped in quiet mode.

use std::io::{self, Write};

use anyhow::Result;
use tokio::sync::mpsc;

use crate::runtime::{NotificationKind, RuntimeEvent};

/// Run the event loop until the runtime shuts down and the channel drains.
pub async fn run_event_loop(
    mut event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    json_mode: bool,
    quiet_mode: bool,
) -> Result<()> {
    while let Some(event) = event_rx.recv().await {
        if json_mode {
            // JSON mode: output each event as a JSON line
            println!("{}", serde_json::to_string(&event)?);
            io::stdout().flush()?;
        } else {
            handle_event_terminal(&event, quiet_mode)?;
        }
    }

    Ok(())
}

fn handle_event_terminal(event: &RuntimeEvent, quiet_mode: bool) -> Result<()> {
    match event {
        RuntimeEvent::ShareLink { url } => {
            println!("{}", url);
            io::stdout().flush()?;
        }
        RuntimeEvent::Notification {
            kind: NotificationKind::Error,
            ..
        } => {
            if let Some(line) = format_event(event) {
                eprintln!("{}", line);
            }
        }
        _ if quiet_mode => {}
        _ => {
            if let Some(line) = format_event(event) {
                eprintln!("{}", line);
            }
        }
    }
    Ok(())
}

/// One-line terminal rendering of a UI event.
fn format_event(event: &RuntimeEvent) -> Option<String> {
    match event {
        RuntimeEvent::OverlayShown { message } => Some(format!("[overlay] {}", message)),
        RuntimeEvent::OverlayHidden { fade_ms: 0 } => Some("[overlay] hidden".to_string()),
        RuntimeEvent::OverlayHidden { fade_ms } => {
            Some(format!("[overlay] hidden ({}ms fade)", fade_ms))
        }
        RuntimeEvent::Notification { message, kind } => {
            let tag = match kind {
                NotificationKind::Default => "ok",
                NotificationKind::Error => "error",
                NotificationKind::Processing => "...",
            };
            Some(format!("[{}] {}", tag, message))
        }
        RuntimeEvent::ShareLink { .. } => None,
    }
}
