//! Share-link state transfer for the gitleaks playground.
//!
//! A session (configuration, log level, active tab, input text) is packed
//! into a URL fragment by [`share::ShareComposer`] and restored by
//! [`reconciler::PageLoader`] once the scanning engine is ready.

pub mod engine;
pub mod error;
pub mod reconciler;
pub mod runtime;
pub mod settings;
pub mod share;
pub mod sink;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{DecodeError, Result, ShareError};
pub use reconciler::{LoadReconciler, PageLoadOptions, PageLoader};
pub use share::{SessionState, ShareComposer};
