//! Shapes of the state that can travel inside a share link.
//!
//! `SessionState` is the logical unit. On the wire it is split into a
//! settings payload (`config`, `logLevel`, `activeTab`) and a content
//! payload (`inputText`); each is compressed independently.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ShareError;

/// Scanner verbosity, as offered by the log level selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warn => "Warn",
            LogLevel::Error => "Error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ShareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ShareError::UnknownValue {
                kind: "log level",
                value: s.to_string(),
            })
    }
}

/// UI section shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTab {
    #[default]
    Scan,
    Config,
    Wizard,
    Entropy,
}

impl ActiveTab {
    pub const ALL: [ActiveTab; 4] = [
        ActiveTab::Scan,
        ActiveTab::Config,
        ActiveTab::Wizard,
        ActiveTab::Entropy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveTab::Scan => "scan",
            ActiveTab::Config => "config",
            ActiveTab::Wizard => "wizard",
            ActiveTab::Entropy => "entropy",
        }
    }
}

impl fmt::Display for ActiveTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActiveTab {
    type Err = ShareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActiveTab::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ShareError::UnknownValue {
                kind: "tab",
                value: s.to_string(),
            })
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for ActiveTab {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Reads an optional selector value, dropping values it does not recognize
/// instead of failing the whole payload.
fn lenient_selector<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = ShareError>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match raw.parse() {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!("Ignoring shared selector value: {}", e);
            Ok(None)
        }
    }
}

/// Full working state of an editing session.
///
/// Immutable once built: either snapshotted from the live editors when
/// composing a link, or assembled from decoded fragments when loading one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Configuration text. `None` means "use the default configuration".
    pub config: Option<String>,
    pub log_level: LogLevel,
    pub active_tab: ActiveTab,
    pub input_text: Option<String>,
}

impl SessionState {
    /// Whether `config` is equivalent to `default_config` after whitespace
    /// normalization. An absent config always counts as the default.
    pub fn uses_default_config(&self, default_config: &str) -> bool {
        match &self.config {
            None => true,
            Some(config) => normalize_whitespace(config) == normalize_whitespace(default_config),
        }
    }

    /// Input text, if it has any non-whitespace content.
    pub fn shareable_input(&self) -> Option<&str> {
        self.input_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compressed settings fragment body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_selector",
        skip_serializing_if = "Option::is_none"
    )]
    pub log_level: Option<LogLevel>,

    #[serde(
        default,
        deserialize_with = "lenient_selector",
        skip_serializing_if = "Option::is_none"
    )]
    pub active_tab: Option<ActiveTab>,
}

impl From<&SessionState> for SettingsPayload {
    fn from(state: &SessionState) -> Self {
        Self {
            config: state.config.clone(),
            log_level: Some(state.log_level),
            active_tab: Some(state.active_tab),
        }
    }
}

/// Compressed content fragment body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPayload {
    #[serde(default)]
    pub input_text: String,
}
