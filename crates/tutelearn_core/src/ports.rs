//! crates/tutelearn_core/src/ports.rs
//!
//! Defines the service contracts (traits) at the engine's boundary.
//! These traits form the edge of the hexagonal architecture, keeping the
//! engine independent of the content repository and the rewards ledger
//! that a deployment wires in.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CompletionRecord, TopicData};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations, abstracting away the
/// specific errors of external services (database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Supplies topic definitions by identifier.
///
/// The returned [`TopicData`] is deliberately raw; validating it belongs
/// to the engine (`Topic::from_data`), not to the adapter.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    async fn fetch_topic(&self, topic_id: Uuid) -> PortResult<TopicData>;
}

/// Permanently credits TUTE points against a learner's account once a
/// session completes. Persistence itself lives behind this boundary.
#[async_trait]
pub trait RewardsLedger: Send + Sync {
    async fn credit_completion(
        &self,
        learner_id: Uuid,
        topic_id: Uuid,
        session_id: Uuid,
        record: &CompletionRecord,
    ) -> PortResult<()>;
}
