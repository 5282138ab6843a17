//! Client runtime for turn-based battles against a remote backend.
//!
//! The backend resolves every round; this crate keeps the client honest about
//! it. It admits at most one round request at a time, replays each round's
//! sub-events as paced steps before snapping to the authoritative snapshot,
//! and drives auto mode without ever racing ahead of playback. Consumers embed
//! [`Runtime`] and interact with it through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`transport`] talks to the backend over HTTP and the push channel
//! - [`session`], [`playback`], [`auto`] and [`scheduler`] hold the battle
//!   state machine driven by the internal session worker
pub mod api;
pub mod auto;
pub mod events;
pub mod playback;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod transport;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{
    ConnectionEvent, Event, EventBus, Notice, NoticeLevel, PlaybackEvent, SessionEvent,
    StatsEvent, Topic,
};
pub use playback::{DisplayState, PacingConfig, PacingProfile, PlaybackPhase, Synchronizer};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use session::{
    ControlState, GateDecision, GateRejection, InputGate, SessionSnapshot, SessionState,
    SessionToken,
};
pub use transport::push::PushInbound;
pub use transport::{
    BattleApi, HttpBattleApi, PushConfig, PushConnection, PushConnector, TransportError,
    WsConnector,
};
