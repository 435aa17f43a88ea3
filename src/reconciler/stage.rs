//! Decoding of fragment payloads into the staging slot.
//!
//! Settings and content are decoded independently: a failure in one is
//! reported once and never prevents the other from staging.

use std::fmt;

use super::pending::{PendingState, StagingSlot};
use crate::error::{Result, ShareError};
use crate::runtime::{NotificationKind, PageRuntime};
use crate::share::codec;
use crate::share::{ContentPayload, FragmentMap, FragmentName, SettingsPayload};

pub const SETTINGS_LOAD_FAILED: &str = "Failed to load shared configuration.";
pub const CONTENT_LOAD_FAILED: &str = "Failed to load shared content.";

/// Which half of a share link a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentPart {
    Settings,
    Content,
}

impl FragmentPart {
    pub fn failure_message(&self) -> &'static str {
        match self {
            FragmentPart::Settings => SETTINGS_LOAD_FAILED,
            FragmentPart::Content => CONTENT_LOAD_FAILED,
        }
    }
}

#[derive(Debug)]
pub struct LoadFailure {
    pub part: FragmentPart,
    pub error: ShareError,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.part.failure_message(), self.error)
    }
}

/// Settings carried by the link, if any.
///
/// `default=1` wins over `conf=`. Literal `log`/`tab` values that are not
/// recognised fall back to their defaults; inside `conf` they are dropped.
/// The inflated `conf` payload may not exceed `max_bytes`.
pub fn decode_settings(
    fragments: &FragmentMap,
    max_bytes: usize,
) -> Result<Option<PendingState>> {
    if fragments.has_default_flag() {
        let log_level = literal_or_default(fragments, FragmentName::Log);
        let active_tab = literal_or_default(fragments, FragmentName::Tab);
        return Ok(Some(PendingState::DefaultConfig {
            log_level,
            active_tab,
        }));
    }

    match fragments.get(FragmentName::Conf) {
        Some(token) if !token.is_empty() => {
            let payload: SettingsPayload = codec::decompress_bounded(token, max_bytes)?;
            Ok(Some(PendingState::Shared(payload)))
        }
        _ => Ok(None),
    }
}

/// Input text carried by the link, if any and non-empty.
pub fn decode_content(fragments: &FragmentMap, max_bytes: usize) -> Result<Option<String>> {
    match fragments.get(FragmentName::Content) {
        Some(token) if !token.is_empty() => {
            let payload: ContentPayload = codec::decompress_bounded(token, max_bytes)?;
            Ok(Some(payload.input_text).filter(|text| !text.is_empty()))
        }
        _ => Ok(None),
    }
}

fn literal_or_default<T>(fragments: &FragmentMap, name: FragmentName) -> T
where
    T: std::str::FromStr<Err = ShareError> + Default,
{
    match fragments.get(name).map(str::parse::<T>) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            tracing::warn!("Ignoring '{}' fragment: {}", name, e);
            T::default()
        }
        None => T::default(),
    }
}

/// Decode both halves of the link into `slot`.
///
/// Every failure is surfaced through exactly one error notification and
/// returned to the caller; nothing here is fatal.
pub fn stage_fragments(
    fragments: &FragmentMap,
    slot: &StagingSlot,
    runtime: &dyn PageRuntime,
    max_content_bytes: usize,
) -> Vec<LoadFailure> {
    let mut failures = Vec::new();

    for name in fragments.unknown_names() {
        tracing::debug!("Ignoring unknown fragment '{}'", name);
    }

    match decode_settings(fragments, max_content_bytes) {
        Ok(Some(settings)) => {
            tracing::info!("Staged shared settings");
            slot.stage_settings(settings);
        }
        Ok(None) => {}
        Err(error) => failures.push(LoadFailure {
            part: FragmentPart::Settings,
            error,
        }),
    }

    match decode_content(fragments, max_content_bytes) {
        Ok(Some(text)) => {
            tracing::info!("Staged shared content ({} bytes)", text.len());
            slot.stage_input_text(text);
        }
        Ok(None) => {}
        Err(error) => failures.push(LoadFailure {
            part: FragmentPart::Content,
            error,
        }),
    }

    for failure in &failures {
        tracing::warn!("{}", failure);
        runtime.notify(failure.part.failure_message(), NotificationKind::Error);
    }

    failures
}
