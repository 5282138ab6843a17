//! Application state for mode management and UI context.

use battle_protocol::Difficulty;
use client_bootstrap::{DisplayMode, Preferences};

/// Top-level application mode determining input handling and UI layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppMode {
    /// Battle setup form (full-screen).
    StartScreen(StartScreenState),
    /// Tabbed main view: battle, stats, history, leaderboards.
    Main,
}

/// Panels of the main view, in `Tab` order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Battle,
    Stats,
    History,
    Leaderboard,
}

impl Tab {
    pub const ALL: [Self; 4] = [Self::Battle, Self::Stats, Self::History, Self::Leaderboard];

    pub const fn title(self) -> &'static str {
        match self {
            Tab::Battle => "Battle",
            Tab::Stats => "Stats",
            Tab::History => "History",
            Tab::Leaderboard => "Leaderboard",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Field focused on the start screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartField {
    #[default]
    Name,
    Difficulty,
    Mode,
    Start,
}

impl StartField {
    const ORDER: [Self; 4] = [Self::Name, Self::Difficulty, Self::Mode, Self::Start];

    fn step(self, delta: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(index + delta).rem_euclid(len) as usize]
    }
}

const NAME_LIMIT: usize = 20;

/// Battle setup form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StartScreenState {
    pub name: String,
    pub difficulty: Difficulty,
    pub auto_mode: bool,
    pub focus: StartField,
}

impl StartScreenState {
    pub fn from_preferences(preferences: &Preferences) -> Self {
        Self {
            name: preferences.player_name.clone(),
            difficulty: preferences.difficulty,
            auto_mode: false,
            focus: if preferences.player_name.is_empty() {
                StartField::Name
            } else {
                StartField::Start
            },
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.step(1);
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.step(-1);
    }

    /// Types into the name field; ignored elsewhere.
    pub fn push_char(&mut self, ch: char) {
        if self.focus == StartField::Name && !ch.is_control() && self.name.chars().count() < NAME_LIMIT
        {
            self.name.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if self.focus == StartField::Name {
            self.name.pop();
        }
    }

    /// Left/right on an option field.
    pub fn cycle_option(&mut self) {
        match self.focus {
            StartField::Difficulty => self.difficulty = self.difficulty.next(),
            StartField::Mode => self.auto_mode = !self.auto_mode,
            StartField::Name | StartField::Start => {}
        }
    }
}

/// Mutable application state tracking current mode and panels.
#[derive(Clone, Debug)]
pub struct AppState {
    pub mode: AppMode,
    pub tab: Tab,
    /// Help overlay drawn on top of the main view.
    pub show_help: bool,
    pub display_mode: DisplayMode,
    pub sound_enabled: bool,
}

impl AppState {
    pub fn new(preferences: &Preferences) -> Self {
        Self {
            mode: AppMode::StartScreen(StartScreenState::from_preferences(preferences)),
            tab: Tab::Battle,
            show_help: false,
            display_mode: preferences.display_mode,
            sound_enabled: preferences.sound_enabled,
        }
    }

    pub fn is_start_screen(&self) -> bool {
        matches!(self.mode, AppMode::StartScreen(_))
    }

    /// Opens the setup form, prefilled from `preferences`.
    pub fn enter_start_screen(&mut self, preferences: &Preferences) {
        self.mode = AppMode::StartScreen(StartScreenState::from_preferences(preferences));
        self.show_help = false;
    }

    /// Leaves the setup form for the battle tab.
    pub fn enter_battle(&mut self) {
        self.mode = AppMode::Main;
        self.tab = Tab::Battle;
    }
}
