//! Fragment wire format: `name=payload` pairs joined with `&` after the `#`.
//!
//! Payloads are either codec tokens or short literal identifiers, neither of
//! which can contain `&`. A pair is split at its first `=`, so Base64 padding
//! stays with the payload. Nothing is percent-decoded.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, ShareError};

/// Value of the `default` pair that means "use the default configuration".
pub const DEFAULT_FLAG: &str = "1";

/// Fragment names this protocol assigns meaning to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentName {
    /// `default=1`: settings are the engine's default configuration
    Default,
    /// Literal log level accompanying `default`
    Log,
    /// Literal tab id accompanying `default`
    Tab,
    /// Compressed settings payload
    Conf,
    /// Compressed content payload
    Content,
}

impl FragmentName {
    pub const ALL: [FragmentName; 5] = [
        FragmentName::Default,
        FragmentName::Log,
        FragmentName::Tab,
        FragmentName::Conf,
        FragmentName::Content,
    ];

    /// The known name spelled `name`, if any.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentName::Default => "default",
            FragmentName::Log => "log",
            FragmentName::Tab => "tab",
            FragmentName::Conf => "conf",
            FragmentName::Content => "content",
        }
    }
}

impl fmt::Display for FragmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `name=payload` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFragment {
    name: FragmentName,
    payload: String,
}

impl WireFragment {
    /// Build a fragment, rejecting payloads that would break the flat
    /// `&`-separated layout.
    pub fn new(name: FragmentName, payload: impl Into<String>) -> Result<Self> {
        let payload = payload.into();
        if payload.contains(['&', '#']) || payload.chars().any(char::is_whitespace) {
            return Err(ShareError::InvalidFragment(format!(
                "payload for '{}' contains a delimiter",
                name
            )));
        }
        Ok(Self { name, payload })
    }

    pub fn name(&self) -> FragmentName {
        self.name
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Join fragments in order as `name=payload&name=payload...`.
pub fn encode_fragments(fragments: &[WireFragment]) -> String {
    fragments
        .iter()
        .map(|fragment| format!("{}={}", fragment.name, fragment.payload))
        .collect::<Vec<_>>()
        .join("&")
}

/// Name to payload mapping decoded from a fragment string.
///
/// Unknown names are kept; interpreting them is the caller's business.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentMap {
    entries: HashMap<String, String>,
}

impl FragmentMap {
    pub fn get(&self, name: FragmentName) -> Option<&str> {
        self.get_raw(name.as_str())
    }

    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// True when the pair is the literal `default=1` command.
    pub fn has_default_flag(&self) -> bool {
        self.get(FragmentName::Default) == Some(DEFAULT_FLAG)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Names with no meaning in this protocol, sorted.
    pub fn unknown_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .keys()
            .map(String::as_str)
            .filter(|name| FragmentName::from_name(name).is_none())
            .collect();
        names.sort_unstable();
        names
    }
}

/// Best-effort parse of a fragment string (with or without the leading `#`).
///
/// Pairs without `=` or with an empty name are dropped. When a name repeats,
/// the last occurrence wins.
pub fn decode_fragments(fragment: &str) -> FragmentMap {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut entries = HashMap::new();

    for pair in fragment.split('&') {
        let Some((name, payload)) = pair.split_once('=') else {
            if !pair.is_empty() {
                tracing::debug!("Dropping fragment pair without '=': {:?}", pair);
            }
            continue;
        };
        if name.is_empty() {
            tracing::debug!("Dropping fragment pair with empty name");
            continue;
        }
        entries.insert(name.to_string(), payload.to_string());
    }

    FragmentMap { entries }
}

/// The fragment part of a share link.
///
/// Accepts a full URL, a bare `#fragment`, or the fragment text itself.
pub fn fragment_of(link: &str) -> String {
    let link = link.trim();
    match url::Url::parse(link) {
        Ok(url) => url.fragment().unwrap_or_default().to_string(),
        Err(_) => match link.split_once('#') {
            Some((_, fragment)) => fragment.to_string(),
            None => link.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::codec;
    use crate::share::schema::{ActiveTab, ContentPayload, LogLevel, SettingsPayload};
    use proptest::prelude::*;

    #[test]
    fn test_encode_joins_in_order() {
        let fragments = vec![
            WireFragment::new(FragmentName::Default, "1").unwrap(),
            WireFragment::new(FragmentName::Log, "Info").unwrap(),
            WireFragment::new(FragmentName::Tab, "scan").unwrap(),
        ];
        assert_eq!(encode_fragments(&fragments), "default=1&log=Info&tab=scan");
    }

    #[test]
    fn test_payload_with_delimiter_is_rejected() {
        assert!(WireFragment::new(FragmentName::Conf, "ab&cd").is_err());
        assert!(WireFragment::new(FragmentName::Conf, "ab#cd").is_err());
        assert!(WireFragment::new(FragmentName::Conf, "abc==").is_ok());
    }

    #[test]
    fn test_decode_keeps_padding_in_payload() {
        let map = decode_fragments("conf=QUJD==&content=eA=");
        assert_eq!(map.get(FragmentName::Conf), Some("QUJD=="));
        assert_eq!(map.get(FragmentName::Content), Some("eA="));
    }

    #[test]
    fn test_decode_drops_malformed_pairs() {
        let map = decode_fragments("#=orphan&stray&&default=1&log=Warn&");
        assert_eq!(map.len(), 2);
        assert!(map.has_default_flag());
        assert_eq!(map.get(FragmentName::Log), Some("Warn"));
        assert_eq!(map.get_raw(""), None);
    }

    #[test]
    fn test_decode_preserves_unknown_keys() {
        let map = decode_fragments("theme=dark&conf=abc");
        assert_eq!(map.get_raw("theme"), Some("dark"));
        assert_eq!(map.get(FragmentName::Conf), Some("abc"));
        assert_eq!(map.unknown_names(), vec!["theme"]);
        assert_eq!(FragmentName::from_name("conf"), Some(FragmentName::Conf));
    }

    #[test]
    fn test_default_flag_requires_literal_one() {
        assert!(!decode_fragments("default=true").has_default_flag());
        assert!(!decode_fragments("default=").has_default_flag());
    }

    #[test]
    fn test_last_duplicate_wins() {
        let map = decode_fragments("log=Debug&log=Error");
        assert_eq!(map.get(FragmentName::Log), Some("Error"));
    }

    #[test]
    fn test_empty_fragment_decodes_to_empty_map() {
        assert!(decode_fragments("").is_empty());
        assert!(decode_fragments("#").is_empty());
        assert!(decode_fragments("justtext").is_empty());
    }

    #[test]
    fn test_fragment_of_full_url() {
        let link = "https://example.com/playground/?q=1#default=1&log=Info&tab=scan";
        assert_eq!(fragment_of(link), "default=1&log=Info&tab=scan");
    }

    #[test]
    fn test_fragment_of_bare_forms() {
        assert_eq!(fragment_of("#conf=abc"), "conf=abc");
        assert_eq!(fragment_of("conf=abc"), "conf=abc");
        assert_eq!(fragment_of("https://example.com/"), "");
    }

    #[test]
    fn test_codec_tokens_survive_the_wire() {
        let settings = SettingsPayload {
            config: Some("[[rules]]\nid = \"x&y=z\"".into()),
            log_level: Some(LogLevel::Trace),
            active_tab: Some(ActiveTab::Wizard),
        };
        let content = ContentPayload {
            input_text: "token=abc&secret=def#frag".into(),
        };
        let wire = encode_fragments(&[
            WireFragment::new(FragmentName::Conf, codec::compress(&settings).unwrap()).unwrap(),
            WireFragment::new(FragmentName::Content, codec::compress(&content).unwrap()).unwrap(),
        ]);

        let map = decode_fragments(&wire);
        let back_settings: SettingsPayload =
            codec::decompress(map.get(FragmentName::Conf).unwrap()).unwrap();
        let back_content: ContentPayload =
            codec::decompress(map.get(FragmentName::Content).unwrap()).unwrap();
        assert_eq!(back_settings, settings);
        assert_eq!(back_content, content);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        /// Property: arbitrary settings and content survive encode -> wire -> decode
        #[test]
        fn prop_wire_roundtrip(config in any::<String>(), input in any::<String>()) {
            let settings = SettingsPayload {
                config: Some(config),
                log_level: Some(LogLevel::Info),
                active_tab: Some(ActiveTab::Scan),
            };
            let content = ContentPayload { input_text: input };
            let wire = encode_fragments(&[
                WireFragment::new(FragmentName::Conf, codec::compress(&settings).unwrap()).unwrap(),
                WireFragment::new(FragmentName::Content, codec::compress(&content).unwrap()).unwrap(),
            ]);
            let map = decode_fragments(&format!("#{wire}"));
            let back_settings: SettingsPayload =
                codec::decompress(map.get(FragmentName::Conf).unwrap()).unwrap();
            let back_content: ContentPayload =
                codec::decompress(map.get(FragmentName::Content).unwrap()).unwrap();
            prop_assert_eq!(back_settings, settings);
            prop_assert_eq!(back_content, content);
        }
    }
}
