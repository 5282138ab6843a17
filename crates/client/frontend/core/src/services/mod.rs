//! Service layer for ViewModel updates.

pub mod updater;

pub use updater::{UpdateScope, ViewModelUpdater};
