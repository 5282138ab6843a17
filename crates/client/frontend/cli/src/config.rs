//! Terminal layout settings for the battle screen.
use std::env;

/// Smallest battle log that still shows one line between its borders.
const MIN_BATTLE_LOG_HEIGHT: u16 = 3;

/// Settings that only the terminal frontend reads.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub ui: UiConfig,
}

impl CliConfig {
    /// Reads `CLI_MESSAGE_PANEL_HEIGHT`, the battle log height in lines
    /// including borders (default: 8, minimum: 3).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(height) = read_env::<u16>("CLI_MESSAGE_PANEL_HEIGHT") {
            config.ui = config.ui.with_message_panel_height(height);
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct UiConfig {
    /// Height of the battle log under the arena in detailed display mode.
    /// Compact mode hides the log regardless.
    pub message_panel_height: u16,
}

impl UiConfig {
    pub fn with_message_panel_height(mut self, height: u16) -> Self {
        self.message_panel_height = height.max(MIN_BATTLE_LOG_HEIGHT);
        self
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            message_panel_height: 8,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battle_log_keeps_room_for_one_line() {
        let ui = UiConfig::default().with_message_panel_height(1);
        assert_eq!(ui.message_panel_height, 3);

        let ui = UiConfig::default().with_message_panel_height(12);
        assert_eq!(ui.message_panel_height, 12);
    }
}
