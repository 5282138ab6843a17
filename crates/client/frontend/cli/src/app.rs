//! Glue code tying the runtime handle and terminal UI together.
use anyhow::Result;
use async_trait::async_trait;

use runtime::RuntimeHandle;

use crate::config::CliConfig;
use crate::event::{CliEventConsumer, EventLoop};
use crate::hooks;
use crate::presentation::terminal;
use client_bootstrap::{Preferences, PreferencesStore};
use client_frontend_core::{
    FrontendConfig, ViewModelUpdater, frontend::Frontend, message::MessageLog,
};

/// Terminal frontend.
///
/// Does not own the runtime; it is driven entirely through the
/// [`RuntimeHandle`] passed to [`Frontend::run`].
pub struct CliFrontend {
    frontend_config: FrontendConfig,
    cli_config: CliConfig,
    preferences_store: Option<PreferencesStore>,
}

impl CliFrontend {
    /// `preferences_store` of `None` runs with defaults and never writes to disk.
    pub fn new(
        frontend_config: FrontendConfig,
        cli_config: CliConfig,
        preferences_store: Option<PreferencesStore>,
    ) -> Self {
        Self {
            frontend_config,
            cli_config,
            preferences_store,
        }
    }
}

#[async_trait]
impl Frontend for CliFrontend {
    async fn run(&mut self, handle: RuntimeHandle) -> Result<()> {
        tracing::info!("CLI frontend starting...");

        let preferences = self
            .preferences_store
            .as_ref()
            .map(PreferencesStore::load)
            .unwrap_or_else(Preferences::default);

        let mut messages = MessageLog::new(self.frontend_config.messages.capacity);
        messages.push_text("Welcome, challenger. The Dragon King awaits.");

        let consumer =
            CliEventConsumer::new(messages, hooks::for_sound(preferences.sound_enabled));

        // Subscribes before the first command so no event is missed.
        let event_loop = EventLoop::new(
            handle,
            consumer,
            ViewModelUpdater::new(self.frontend_config.timing),
            self.cli_config.clone(),
            preferences,
            self.preferences_store.clone(),
        );

        let mut terminal = terminal::init()?;
        let _guard = terminal::TerminalGuard;

        let _consumer = event_loop.run(&mut terminal).await?;

        tracing::info!("CLI frontend exiting");
        Ok(())
    }
}
