//! Terminal UI frontend for Dragon Duel.
//!
//! This crate provides a terminal-based user interface for the battle client.
//! It implements the `client_frontend_core::Frontend` trait for pure UI rendering.
//!
//! # Architecture
//!
//! CliFrontend is a pure UI layer that:
//! - Receives a RuntimeHandle for communication
//! - Does NOT own the Runtime
//! - Subscribes to events and submits skills via the handle

mod app;
mod config;
mod event;
mod hooks;
mod input;
pub mod logging;
pub mod presentation;
mod state;

pub use app::CliFrontend;
pub use config::CliConfig;
pub use hooks::BellHooks;

// Re-export for convenience (used in main.rs)
pub use client_frontend_core::FrontendConfig;
