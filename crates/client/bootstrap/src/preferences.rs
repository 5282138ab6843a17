//! Client-local preferences persisted between runs.
//!
//! Stored as JSON in the platform config directory. A missing or unreadable
//! file is never fatal: the client falls back to defaults and logs why.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use battle_protocol::Difficulty;

const FILE_NAME: &str = "preferences.json";
const MAX_NAME_LEN: usize = 20;

/// How much of the battle screen the terminal UI draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Fighters, skills bar and message log.
    #[default]
    Detailed,
    /// Fighters and skills bar only.
    Compact,
}

impl DisplayMode {
    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::Detailed => DisplayMode::Compact,
            DisplayMode::Compact => DisplayMode::Detailed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub player_name: String,
    pub remember_player_name: bool,
    pub display_mode: DisplayMode,
    pub sound_enabled: bool,
    pub difficulty: Difficulty,
    pub has_seen_help: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            remember_player_name: true,
            display_mode: DisplayMode::default(),
            sound_enabled: true,
            difficulty: Difficulty::Normal,
            has_seen_help: false,
        }
    }
}

impl Preferences {
    /// Name sent to the backend: trimmed, capped, `Anonymous` when empty.
    pub fn effective_player_name(&self) -> String {
        let trimmed: String = self.player_name.trim().chars().take(MAX_NAME_LEN).collect();
        if trimmed.is_empty() {
            "Anonymous".to_string()
        } else {
            trimmed
        }
    }

    /// Copy suitable for writing to disk.
    fn persisted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.remember_player_name {
            copy.player_name.clear();
        }
        copy
    }
}

/// File-backed preference storage.
#[derive(Clone, Debug)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform config directory, if one can be determined.
    pub fn default_location() -> Option<Self> {
        ProjectDirs::from("", "", "dragon-duel")
            .map(|dirs| Self::at(dirs.config_dir().join(FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences, falling back to defaults when absent or corrupt.
    pub fn load(&self) -> Preferences {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no saved preferences");
                return Preferences::default();
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "failed to read preferences: {err}");
                return Preferences::default();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(preferences) => preferences,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "ignoring corrupt preferences: {err}");
                Preferences::default()
            }
        }
    }

    pub fn save(&self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_vec_pretty(&preferences.persisted())
            .context("failed to encode preferences")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> PreferencesStore {
        PreferencesStore::at(dir.path().join("nested").join(FILE_NAME))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load(), Preferences::default());
    }

    #[test]
    fn saved_preferences_load_back() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let preferences = Preferences {
            player_name: "Ari".to_string(),
            difficulty: Difficulty::Hard,
            sound_enabled: false,
            display_mode: DisplayMode::Compact,
            has_seen_help: true,
            ..Preferences::default()
        };

        store.save(&preferences).unwrap();
        assert_eq!(store.load(), preferences);
    }

    #[test]
    fn forgotten_name_is_not_written() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let preferences = Preferences {
            player_name: "Ari".to_string(),
            remember_player_name: false,
            ..Preferences::default()
        };

        store.save(&preferences).unwrap();
        assert_eq!(store.load().player_name, "");
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::at(dir.path().join(FILE_NAME));
        fs::write(store.path(), b"{not json").unwrap();
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn unknown_and_missing_fields_are_tolerated() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::at(dir.path().join(FILE_NAME));
        fs::write(store.path(), br#"{"difficulty": "easy", "theme": "dark"}"#).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.difficulty, Difficulty::Easy);
        assert!(loaded.sound_enabled);
    }

    #[test]
    fn effective_name_is_trimmed_and_capped() {
        let mut preferences = Preferences::default();
        assert_eq!(preferences.effective_player_name(), "Anonymous");

        preferences.player_name = "  a-very-long-player-name-indeed  ".to_string();
        assert_eq!(preferences.effective_player_name().chars().count(), MAX_NAME_LEN);
    }
}
