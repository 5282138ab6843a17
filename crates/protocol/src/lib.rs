//! Wire and data model for the dragon-vs-hero battle backend.
//!
//! `battle-protocol` owns every type that crosses the network boundary: the
//! per-round [`RoundResult`] snapshot and its ordered [`TurnEvent`]s, the HTTP
//! request/response bodies, the push-channel envelopes, and the read-only
//! statistics payloads. The runtime and all frontends depend on the types
//! re-exported here; none of them parse JSON by hand.
pub mod api;
pub mod ids;
pub mod push;
pub mod round;
pub mod stats;

mod de;

pub use api::{
    ActionRequest, AutoRoundRequest, RoundPayload, RoundRejection, StartBattleRequest,
    StartBattleResponse, StartedBattle,
};
pub use ids::{Difficulty, GameId, Side, SkillId, Winner};
pub use push::{ClientPush, ConnectionAck, ServerPush};
pub use round::{Cooldowns, EffectKind, RoundResult, SnapshotError, TurnEvent};
pub use stats::{
    CharacterStats, DamageEntry, FighterRecord, GameRecord, OverallStats, PlayerStanding,
    ReplayEvent, RoundsEntry, SideStats,
};
