//! Input processing for the CLI client.
//!
//! This module owns the keyboard-to-command mapping so the rest of the
//! application can remain agnostic about concrete key bindings or the
//! specifics of `crossterm` events.

use battle_protocol::SkillId;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::state::AppMode;

/// High-level outcome of processing a keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Exit the application.
    Quit,

    // Start screen
    TypeChar(char),
    DeleteChar,
    FocusNext,
    FocusPrev,
    CycleOption,
    Confirm,

    // Main view
    /// Submit a hero skill through the input gate.
    Skill(SkillId),
    ToggleAuto,
    CloseBattle,
    NewBattle,
    NextTab,
    PrevTab,
    Refresh,
    ToggleHelp,
    ToggleDisplayMode,
    ToggleSound,
    SelectNext,
    SelectPrev,
    /// Load the replay of the highlighted battle.
    OpenReplay,

    /// No meaningful command was produced.
    None,
}

/// Translates `KeyEvent`s into commands for the current mode.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Converts a raw key event into a higher-level command.
    pub fn handle_key(&self, key: KeyEvent, mode: &AppMode, show_help: bool) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match mode {
            AppMode::StartScreen(_) => self.start_screen(key),
            AppMode::Main if show_help => match key.code {
                KeyCode::Char('q') => KeyAction::Quit,
                // Any other key dismisses the overlay.
                _ => KeyAction::ToggleHelp,
            },
            AppMode::Main => self.main_view(key),
        }
    }

    fn start_screen(&self, key: KeyEvent) -> KeyAction {
        match key.code {
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::Enter => KeyAction::Confirm,
            KeyCode::Tab | KeyCode::Down => KeyAction::FocusNext,
            KeyCode::BackTab | KeyCode::Up => KeyAction::FocusPrev,
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => KeyAction::CycleOption,
            KeyCode::Backspace => KeyAction::DeleteChar,
            KeyCode::Char(ch) => KeyAction::TypeChar(ch),
            _ => KeyAction::None,
        }
    }

    fn main_view(&self, key: KeyEvent) -> KeyAction {
        match key.code {
            KeyCode::Char(ch) => self.handle_char(ch),
            KeyCode::Tab => KeyAction::NextTab,
            KeyCode::BackTab => KeyAction::PrevTab,
            KeyCode::Down => KeyAction::SelectNext,
            KeyCode::Up => KeyAction::SelectPrev,
            KeyCode::Enter => KeyAction::OpenReplay,
            _ => KeyAction::None,
        }
    }

    fn handle_char(&self, raw: char) -> KeyAction {
        let ch = raw.to_ascii_lowercase();
        match ch {
            '1' => KeyAction::Skill(SkillId::ATTACK),
            '2' => KeyAction::Skill(SkillId::HEAL),
            '3' => KeyAction::Skill(SkillId::ULTIMATE),
            't' => KeyAction::ToggleAuto,
            'c' => KeyAction::CloseBattle,
            'n' => KeyAction::NewBattle,
            'r' => KeyAction::Refresh,
            '?' => KeyAction::ToggleHelp,
            'd' => KeyAction::ToggleDisplayMode,
            's' => KeyAction::ToggleSound,
            'j' => KeyAction::SelectNext,
            'k' => KeyAction::SelectPrev,
            'q' => KeyAction::Quit,
            _ => KeyAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StartScreenState;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn maps_skill_keys() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('1')), &AppMode::Main, false),
            KeyAction::Skill(SkillId::ATTACK)
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('3')), &AppMode::Main, false),
            KeyAction::Skill(SkillId::ULTIMATE)
        );
    }

    #[test]
    fn maps_battle_controls() {
        let handler = InputHandler::new();
        let main = AppMode::Main;
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('T')), &main, false),
            KeyAction::ToggleAuto
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('c')), &main, false),
            KeyAction::CloseBattle
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Tab), &main, false),
            KeyAction::NextTab
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('q')), &main, false),
            KeyAction::Quit
        );
    }

    #[test]
    fn help_overlay_swallows_keys() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('1')), &AppMode::Main, true),
            KeyAction::ToggleHelp
        );
    }

    #[test]
    fn start_screen_types_instead_of_triggering_skills() {
        let handler = InputHandler::new();
        let start = AppMode::StartScreen(StartScreenState::default());
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('1')), &start, false),
            KeyAction::TypeChar('1')
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('q')), &start, false),
            KeyAction::TypeChar('q')
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Esc), &start, false),
            KeyAction::Quit
        );
    }

    #[test]
    fn ctrl_c_always_quits() {
        let handler = InputHandler::new();
        let mut ctrl_c = key(KeyCode::Char('c'));
        ctrl_c.modifiers = KeyModifiers::CONTROL;
        assert_eq!(
            handler.handle_key(ctrl_c, &AppMode::Main, false),
            KeyAction::Quit
        );
    }
}
