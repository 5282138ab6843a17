//! Worker tasks that back the runtime orchestration.
//!
//! The session worker is the single logical thread of control: it owns the
//! session state, input gate, playback synchronizer, auto driver and the
//! timeline they schedule on.

mod session;

pub(crate) use session::{Command, SessionWorker, WorkerConfig};
