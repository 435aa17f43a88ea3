//! Share-link protocol: state schema, payload codec, fragment wire format
//! and the composer that ties them together.
//!
//! ```text
//! SessionState -> ShareComposer -> codec -> wire -> URL fragment
//! ```

pub mod codec;
pub mod composer;
pub mod schema;
pub mod wire;

pub use composer::ShareComposer;
pub use schema::{ActiveTab, ContentPayload, LogLevel, SessionState, SettingsPayload};
pub use wire::{decode_fragments, encode_fragments, fragment_of, FragmentMap, FragmentName, WireFragment};
