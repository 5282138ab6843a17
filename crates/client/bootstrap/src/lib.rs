//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading, persisted preferences, and runtime setup
//! that can be reused by the CLI or any other front-end crate.
pub mod builder;
pub mod config;
pub mod preferences;

pub use builder::{RuntimeBuilder, RuntimeSetup};
pub use config::RuntimeConfig;
pub use preferences::{DisplayMode, Preferences, PreferencesStore};
