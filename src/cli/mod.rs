//! CLI module for headless share-link work.
//!
//! # Architecture
//!
//! The CLI uses the `PageRuntime` abstraction shared with the library
//! core. Overlay and notification events are sent through a channel that
//! is consumed by the output handler.
//!
//! ```text
//! +-----------------+     +-------------+     +---------------+
//! | PageLoader      | --> | CliRuntime  | --> | output.rs     |
//! | ShareComposer   |     | (emit())    |     | (print/JSON)  |
//! +-----------------+     +-------------+     +---------------+
//! ```

mod args;
mod bootstrap;
mod output;
mod runner;

pub use args::{Args, Command, SettingsAction};
pub use bootstrap::{engine_source, initialize, CliContext};
pub use output::run_event_loop;
pub use runner::{execute, CommandOutput};
