//! Ratatui widgets composing the terminal UI.
pub mod arena;
pub mod footer;
pub mod header;
pub mod help;
pub mod history;
pub mod leaderboard;
pub mod messages;
pub mod notice;
pub mod skills;
pub mod start_screen;
pub mod stats;
