//! Client runtime configuration structures and loaders.
use std::env;
use std::time::Duration;

use runtime::RuntimeConfig as CoreRuntimeConfig;

/// Configuration required to reach the backend and bootstrap the runtime.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Base URL of the HTTP API.
    pub server_url: String,
    /// URL of the push (WebSocket) endpoint.
    pub push_url: String,
    pub request_timeout: Duration,
    /// Settings forwarded to [`runtime::RuntimeBuilder`].
    pub core: CoreRuntimeConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            push_url: "ws://127.0.0.1:5000/ws".to_string(),
            request_timeout: Duration::from_millis(5000),
            core: CoreRuntimeConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_SERVER_URL` - HTTP API base URL (default: http://127.0.0.1:5000)
    /// - `BATTLE_PUSH_URL` - Push channel URL (default: ws://127.0.0.1:5000/ws)
    /// - `BATTLE_REQUEST_TIMEOUT_MS` - Per-request timeout (default: 5000)
    /// - `PUSH_MAX_RECONNECT_ATTEMPTS` - Failures before polling (default: 5)
    /// - `PUSH_RECONNECT_DELAY_MS` - First reconnect delay (default: 1000)
    /// - `PUSH_RECONNECT_DELAY_MAX_MS` - Reconnect delay ceiling (default: 5000)
    /// - `POLLING_INTERVAL_MS` - Stats polling period (default: 10000)
    /// - `EVENT_BUFFER` - Event bus capacity per topic (default: 256)
    /// - `COMMAND_BUFFER` - Command queue size (default: 32)
    /// - `MANUAL_ACTOR_REVEAL_MS`, `MANUAL_INTER_EVENT_MS` - Manual pacing
    /// - `AUTO_ACTOR_REVEAL_MS`, `AUTO_INTER_EVENT_MS`, `AUTO_CONTINUE_MS` - Auto pacing
    /// - `CRITICAL_DELAY_MS`, `TEARDOWN_DELAY_MS` - Shared by both profiles
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("BATTLE_SERVER_URL") {
            config.server_url = url;
        }
        if let Ok(url) = env::var("BATTLE_PUSH_URL") {
            config.push_url = url;
        }
        if let Some(timeout) = read_millis("BATTLE_REQUEST_TIMEOUT_MS") {
            config.request_timeout = timeout;
        }

        let core = &mut config.core;

        if let Some(attempts) = read_env::<u32>("PUSH_MAX_RECONNECT_ATTEMPTS") {
            core.push.max_reconnect_attempts = attempts.max(1);
        }
        if let Some(delay) = read_millis("PUSH_RECONNECT_DELAY_MS") {
            core.push.reconnect_delay = delay;
        }
        if let Some(delay) = read_millis("PUSH_RECONNECT_DELAY_MAX_MS") {
            core.push.reconnect_delay_max = delay;
        }
        if let Some(interval) = read_millis("POLLING_INTERVAL_MS") {
            core.polling_interval = interval.max(Duration::from_millis(100));
        }

        if let Some(capacity) = read_env::<usize>("EVENT_BUFFER") {
            core.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("COMMAND_BUFFER") {
            core.command_buffer_size = capacity.max(1);
        }

        let pacing = &mut core.pacing;
        if let Some(delay) = read_millis("MANUAL_ACTOR_REVEAL_MS") {
            pacing.manual.actor_reveal = delay;
        }
        if let Some(delay) = read_millis("MANUAL_INTER_EVENT_MS") {
            pacing.manual.inter_event = delay;
        }
        if let Some(delay) = read_millis("AUTO_ACTOR_REVEAL_MS") {
            pacing.auto.actor_reveal = delay;
        }
        if let Some(delay) = read_millis("AUTO_INTER_EVENT_MS") {
            pacing.auto.inter_event = delay;
        }
        if let Some(delay) = read_millis("AUTO_CONTINUE_MS") {
            pacing.auto.auto_continue = delay;
            pacing.manual.auto_continue = delay;
        }
        if let Some(delay) = read_millis("CRITICAL_DELAY_MS") {
            pacing.manual.critical_delay = delay;
            pacing.auto.critical_delay = delay;
        }
        if let Some(delay) = read_millis("TEARDOWN_DELAY_MS") {
            pacing.manual.teardown_delay = delay;
            pacing.auto.teardown_delay = delay;
        }

        // Backoff must never start above its ceiling.
        if core.push.reconnect_delay > core.push.reconnect_delay_max {
            core.push.reconnect_delay_max = core.push.reconnect_delay;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_millis(key: &str) -> Option<Duration> {
    read_env::<u64>(key).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = RuntimeConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
        assert_eq!(config.push_url, "ws://127.0.0.1:5000/ws");
        assert_eq!(config.core.push.max_reconnect_attempts, 5);
        assert_eq!(config.core.polling_interval, Duration::from_secs(10));
        assert_eq!(
            config.core.pacing.manual.actor_reveal,
            Duration::from_millis(400)
        );
    }
}
