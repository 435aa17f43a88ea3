//! Builds share links from a session snapshot.

use url::Url;

use super::codec;
use super::schema::{ContentPayload, SessionState, SettingsPayload};
use super::wire::{encode_fragments, FragmentName, WireFragment, DEFAULT_FLAG};
use crate::engine::EngineState;
use crate::error::{Result, ShareError};
use crate::runtime::{NotificationKind, PageRuntime, RuntimeEvent};
use crate::sink::PresentationSink;

pub const GENERATING_LINK: &str = "Generating share link...";

/// Turns a [`SessionState`] into `origin + path + "#" + fragments`.
#[derive(Debug, Clone)]
pub struct ShareComposer {
    base: Url,
    max_content_bytes: usize,
}

impl ShareComposer {
    /// `base_url` is the page the link should open; any query or fragment
    /// on it is discarded.
    pub fn new(base_url: &str, max_content_bytes: usize) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            base,
            max_content_bytes,
        })
    }

    /// Settings fragment (or default flag) first, content fragment last.
    ///
    /// `default_config` is the engine's default text; `None` means it is not
    /// known, in which case the configuration is always sent in full.
    pub fn fragments(
        &self,
        state: &SessionState,
        default_config: Option<&str>,
    ) -> Result<Vec<WireFragment>> {
        let uses_default = match (&state.config, default_config) {
            (None, _) => true,
            (Some(_), Some(default)) => state.uses_default_config(default),
            (Some(_), None) => false,
        };

        let mut fragments = Vec::with_capacity(4);
        if uses_default {
            fragments.push(WireFragment::new(FragmentName::Default, DEFAULT_FLAG)?);
            fragments.push(WireFragment::new(
                FragmentName::Log,
                state.log_level.as_str(),
            )?);
            fragments.push(WireFragment::new(
                FragmentName::Tab,
                state.active_tab.as_str(),
            )?);
        } else {
            let token = codec::compress(&SettingsPayload::from(state))?;
            fragments.push(WireFragment::new(FragmentName::Conf, token)?);
        }

        if let Some(input) = state.shareable_input() {
            if input.len() > self.max_content_bytes {
                return Err(ShareError::ContentTooLarge {
                    size: input.len(),
                    limit: self.max_content_bytes,
                });
            }
            let content = ContentPayload {
                input_text: input.to_string(),
            };
            fragments.push(WireFragment::new(
                FragmentName::Content,
                codec::compress(&content)?,
            )?);
        }

        Ok(fragments)
    }

    /// Full shareable URL for `state`.
    pub fn compose(&self, state: &SessionState, default_config: Option<&str>) -> Result<String> {
        let fragments = self.fragments(state, default_config)?;
        let mut url = self.base.clone();
        url.set_fragment(Some(&encode_fragments(&fragments)));

        tracing::info!(
            fragments = fragments.len(),
            url_len = url.as_str().len(),
            "Composed share link"
        );
        Ok(url.into())
    }

    /// Snapshot the live editors and compose a link for them.
    ///
    /// Until the engine is ready there is no default to compare against,
    /// so the configuration is sent in full.
    pub fn compose_from_sink(
        &self,
        sink: &dyn PresentationSink,
        engine: &EngineState,
    ) -> Result<String> {
        let state = crate::sink::snapshot(sink);
        let default_config = match engine.default_config() {
            Ok(config) => Some(config),
            Err(ShareError::EngineUnavailable) => {
                tracing::warn!("Engine not ready, sharing configuration in full");
                None
            }
            Err(e) => return Err(e),
        };
        self.compose(&state, default_config.as_deref())
    }

    /// The share button: report progress, compose from the live editors and
    /// hand the link to the page.
    pub fn share(
        &self,
        sink: &dyn PresentationSink,
        engine: &EngineState,
        runtime: &dyn PageRuntime,
    ) -> Result<String> {
        runtime.notify(GENERATING_LINK, NotificationKind::Processing);
        let url = self.compose_from_sink(sink, engine)?;
        runtime.emit_or_log(RuntimeEvent::ShareLink { url: url.clone() });
        Ok(url)
    }
}
