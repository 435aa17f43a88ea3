//! TOML-based settings and persisted local preferences.
//!
//! Settings live in `~/.leakshare/settings.toml`. String values may reference
//! environment variables, and the engine configuration path can also come from
//! `LEAKSHARE_ENGINE_CONFIG`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use leakshare_lib::settings::SettingsManager;
//!
//! let manager = SettingsManager::new().await?;
//! manager.set_value("ui.theme", serde_json::json!("dark")).await?;
//! let config_path = manager.get().await.engine.resolved_config_path();
//! ```

pub mod loader;
pub mod schema;

pub use loader::{settings_path, SettingsManager};
pub use schema::LeakshareSettings;
