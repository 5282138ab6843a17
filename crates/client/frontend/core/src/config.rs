//! Frontend configuration structures and loaders.
//!
//! This module contains UI-specific configuration that is shared across
//! different frontend implementations (CLI, GUI, etc.).

use std::env;
use std::time::Duration;

/// Frontend-specific configuration.
#[derive(Clone, Debug, Default)]
pub struct FrontendConfig {
    pub messages: MessageConfig,
    pub timing: TimingConfig,
}

impl FrontendConfig {
    pub const fn new(messages: MessageConfig, timing: TimingConfig) -> Self {
        Self { messages, timing }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `CLI_MESSAGE_CAPACITY` - Message log capacity (default: 64)
    /// - `FLOATING_TEXT_MS` - Lifetime of floating damage/heal numbers (default: 1000)
    /// - `NOTICE_MS` - Lifetime of a notice banner (default: 3000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("CLI_MESSAGE_CAPACITY") {
            config.messages.capacity = capacity.max(1);
        }

        if let Some(ms) = read_env::<u64>("FLOATING_TEXT_MS") {
            config.timing.floating_text = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("NOTICE_MS") {
            config.timing.notice = Duration::from_millis(ms);
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub capacity: usize,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// How long transient view-model elements stay visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub floating_text: Duration,
    pub notice: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            floating_text: Duration::from_millis(1000),
            notice: Duration::from_millis(3000),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
