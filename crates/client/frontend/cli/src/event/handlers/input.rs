//! Input handling: start form, battle controls and navigation.

use anyhow::Result;
use battle_protocol::SkillId;
use client_frontend_core::{EventConsumer, message::MessageLevel};
use crossterm::event::{self as term_event, Event as TermEvent, KeyEvent, KeyEventKind};
use runtime::GateDecision;
use tokio::time::Duration;

use super::super::EventLoop;
use crate::{
    hooks,
    input::KeyAction,
    presentation::terminal::Tui,
    state::{AppMode, Tab},
};

impl<C> EventLoop<C>
where
    C: EventConsumer,
{
    /// Poll for keyboard input and handle UI interactions.
    pub(in crate::event) async fn handle_input_tick(&mut self, terminal: &mut Tui) -> Result<bool> {
        if !term_event::poll(Duration::from_millis(0))? {
            return Ok(false);
        }

        match term_event::read()? {
            TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key_press(key, terminal).await
            }
            TermEvent::Resize(_, _) => {
                self.render(terminal)?;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    /// Handle key press and dispatch to appropriate handler.
    pub(in crate::event) async fn handle_key_press(
        &mut self,
        key: KeyEvent,
        terminal: &mut Tui,
    ) -> Result<bool> {
        let action =
            self.input
                .handle_key(key, &self.app_state.mode, self.app_state.show_help);

        match action {
            KeyAction::Quit => return Ok(true),
            KeyAction::None => return Ok(false),

            KeyAction::TypeChar(_)
            | KeyAction::DeleteChar
            | KeyAction::FocusNext
            | KeyAction::FocusPrev
            | KeyAction::CycleOption => self.edit_start_form(action),
            KeyAction::Confirm => self.start_battle(),

            KeyAction::Skill(skill) => self.submit_skill(skill).await,
            KeyAction::ToggleAuto => self.toggle_auto().await,
            KeyAction::CloseBattle => self.close_battle().await,
            KeyAction::NewBattle => self.app_state.enter_start_screen(&self.preferences),

            KeyAction::NextTab => self.switch_tab(self.app_state.tab.next()),
            KeyAction::PrevTab => self.switch_tab(self.app_state.tab.prev()),
            KeyAction::SelectNext if self.app_state.tab == Tab::History => {
                self.view_model.history.select_next()
            }
            KeyAction::SelectPrev if self.app_state.tab == Tab::History => {
                self.view_model.history.select_prev()
            }
            KeyAction::SelectNext | KeyAction::SelectPrev => {}
            KeyAction::OpenReplay => {
                if self.app_state.tab == Tab::History
                    && let Some(game) = self.view_model.history.selected_game()
                {
                    self.load_replay(game.clone());
                }
            }
            KeyAction::Refresh => {
                if let Err(err) = self.handle.refresh_stats().await {
                    tracing::warn!("Stats refresh failed: {}", err);
                }
                self.load_leaderboards();
            }

            KeyAction::ToggleHelp => self.toggle_help(),
            KeyAction::ToggleDisplayMode => {
                self.app_state.display_mode = self.app_state.display_mode.toggle();
                self.preferences.display_mode = self.app_state.display_mode;
                self.save_preferences();
            }
            KeyAction::ToggleSound => {
                self.app_state.sound_enabled = !self.app_state.sound_enabled;
                self.preferences.sound_enabled = self.app_state.sound_enabled;
                self.consumer
                    .set_hooks(hooks::for_sound(self.app_state.sound_enabled));
                self.save_preferences();
            }
        }

        self.render(terminal)?;
        Ok(false)
    }

    fn edit_start_form(&mut self, action: KeyAction) {
        let AppMode::StartScreen(form) = &mut self.app_state.mode else {
            return;
        };
        match action {
            KeyAction::TypeChar(ch) => form.push_char(ch),
            KeyAction::DeleteChar => form.pop_char(),
            KeyAction::FocusNext => form.focus_next(),
            KeyAction::FocusPrev => form.focus_prev(),
            KeyAction::CycleOption => form.cycle_option(),
            _ => {}
        }
    }

    /// Leave the start form and ask the runtime for a new battle.
    ///
    /// The request runs off the loop; its outcome arrives as session events.
    fn start_battle(&mut self) {
        let AppMode::StartScreen(form) = &self.app_state.mode else {
            return;
        };
        let difficulty = form.difficulty;
        let auto_mode = form.auto_mode;

        self.preferences.player_name = form.name.trim().to_string();
        self.preferences.difficulty = difficulty;
        self.save_preferences();

        let player_name = self.preferences.effective_player_name();
        self.app_state.enter_battle();
        if !self.preferences.has_seen_help {
            self.app_state.show_help = true;
        }

        let handle = self.handle.clone();
        tokio::spawn(async move {
            match handle.start_battle(player_name, difficulty, auto_mode).await {
                Ok(game_id) => tracing::info!("Battle {} started", game_id),
                Err(err) => tracing::warn!("Battle start failed: {}", err),
            }
        });
    }

    async fn submit_skill(&mut self, skill: SkillId) {
        match self.handle.submit(skill).await {
            Ok(GateDecision::Accepted) => tracing::debug!("Skill {} sent", skill),
            Ok(GateDecision::Ignored) => {
                if !self.view_model.has_battle() {
                    self.consumer
                        .message_log_mut()
                        .push_level("No battle in progress (press n)", MessageLevel::Warning);
                }
            }
            // The runtime publishes the rejection reason as a session event.
            Ok(GateDecision::Rejected(reason)) => tracing::debug!("Skill {} refused: {}", skill, reason),
            Err(err) => self.report_error("submit skill", &err),
        }
    }

    async fn toggle_auto(&mut self) {
        if !self.view_model.has_battle() || self.view_model.battle_ended() {
            return;
        }
        let enabled = !self.view_model.controls.auto_mode;
        if let Err(err) = self.handle.set_auto_mode(enabled).await {
            self.report_error("toggle auto mode", &err);
        }
    }

    async fn close_battle(&mut self) {
        match self.handle.close_battle().await {
            Ok(true) => {}
            Ok(false) => self
                .consumer
                .message_log_mut()
                .push_level("No battle to close", MessageLevel::Info),
            Err(err) => self.report_error("close battle", &err),
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.app_state.tab = tab;
        if tab == Tab::Leaderboard && !self.view_model.leaderboards.loaded {
            self.load_leaderboards();
        }
    }

    fn toggle_help(&mut self) {
        let closing = self.app_state.show_help;
        self.app_state.show_help = !closing;
        if closing && !self.preferences.has_seen_help {
            self.preferences.has_seen_help = true;
            self.save_preferences();
        }
    }

    fn report_error(&mut self, what: &str, err: &runtime::RuntimeError) {
        tracing::error!("Failed to {}: {}", what, err);
        self.consumer
            .message_log_mut()
            .push_level(format!("Failed to {what}: {err}"), MessageLevel::Error);
    }
}
