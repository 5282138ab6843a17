//! Topic-based event bus for runtime events.
//!
//! The session worker publishes everything a frontend needs to render the
//! battle: playback steps, session lifecycle and control changes, push
//! connection health, and refreshed statistics. Consumers subscribe only to
//! the topics they care about.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{ConnectionEvent, Notice, NoticeLevel, PlaybackEvent, SessionEvent, StatsEvent};
