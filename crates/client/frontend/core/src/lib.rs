//! Cross-frontend primitives for presenting battles.
//!
//! Houses message logging, event handling, formatting, and view-model types
//! that the CLI and future graphical clients can reuse.
pub mod achievements;
pub mod config;
pub mod event;
pub mod format;
pub mod frontend;
pub mod hooks;
pub mod message;
pub mod services;
pub mod view_model;

pub use achievements::{Achievement, AchievementSet};
pub use config::{FrontendConfig, MessageConfig};
pub use event::{EventConsumer, EventImpact};
pub use frontend::Frontend;
pub use hooks::{NoopHooks, SessionHooks};
pub use services::{UpdateScope, ViewModelUpdater};
