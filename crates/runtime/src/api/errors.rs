//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and the transport layer so
//! clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

pub use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("no battle is active")]
    NoActiveSession,

    #[error("a battle start is already in progress")]
    StartInProgress,

    #[error("runtime requires a battle API to be configured before building")]
    MissingApi,
}
