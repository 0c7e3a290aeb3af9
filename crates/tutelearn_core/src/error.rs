//! crates/tutelearn_core/src/error.rs
//!
//! Defines the error type shared by every engine operation.

use uuid::Uuid;

use crate::domain::Phase;

/// Errors produced by the learning engine.
///
/// Every error is local to a single operation call: operations validate
/// before mutating, so a returned error means the session state is exactly
/// what it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The topic payload from the content repository is malformed. Fatal:
    /// no session is constructed.
    #[error("Invalid topic data: {0}")]
    InvalidTopicData(String),

    /// The completion gate refused to mark the item complete. Recoverable;
    /// the caller should surface the reason (e.g. "watch more of the
    /// video") and let the learner retry.
    #[error("Completion gate not satisfied for item {item_id}: {reason}")]
    GateNotSatisfied { item_id: Uuid, reason: String },

    /// A navigation or answer index outside the bounds of the current
    /// phase. A programming error on the caller's side.
    #[error("Index {index} out of range (length {len})")]
    OutOfRange { index: usize, len: usize },

    /// An operation invoked in a phase that does not support it, e.g.
    /// recording an answer while still learning.
    #[error("Operation '{operation}' is not valid in phase '{phase}'")]
    InvalidPhaseOperation {
        operation: &'static str,
        phase: Phase,
    },

    /// An item id that names no content item in this session.
    #[error("Unknown content item {0}")]
    UnknownItem(Uuid),

    /// A video operation aimed at a non-video content item.
    #[error("Content item {0} is not a video")]
    NotVideo(Uuid),
}

/// A convenience type alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;
