//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the in-memory session
//! registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::Config;
use tutelearn_core::facade::SessionFacade;
use tutelearn_core::gate::CompletionGate;
use tutelearn_core::ports::{RewardsLedger, TopicRepository};

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all
/// handlers.
pub struct AppState {
    pub topics: Arc<dyn TopicRepository>,
    pub ledger: Arc<dyn RewardsLedger>,
    pub config: Arc<Config>,
    pub gate: CompletionGate,
    pub sessions: SessionRegistry,
}

//=========================================================================================
// SessionRegistry (In-Memory, Process-Local)
//=========================================================================================

/// Holds every live learning session.
///
/// Sessions are deliberately in-memory only: intermediate progress does
/// not survive a restart, and only the completion record reaches the
/// rewards ledger. The registry lock also serializes duplicate clicks
/// from the rendering layer, so the engine itself never sees concurrent
/// mutation.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    sessions: HashMap<Uuid, SessionFacade>,
    /// `(learner_id, topic_id)` → live session id. At most one session per
    /// learner attempt at a topic.
    by_attempt: HashMap<(Uuid, Uuid), Uuid>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly created session, replacing (and discarding) any
    /// live session for the same learner/topic pair.
    pub async fn insert(&self, facade: SessionFacade) -> Uuid {
        let mut inner = self.inner.lock().await;
        let session_id = facade.session_id();
        let key = (facade.learner_id(), facade.topic_id());
        if let Some(previous) = inner.by_attempt.insert(key, session_id) {
            inner.sessions.remove(&previous);
        }
        inner.sessions.insert(session_id, facade);
        session_id
    }

    /// Runs `f` against the session with the given id, holding the
    /// registry lock for the duration. Returns `None` when no such session
    /// is live.
    pub async fn with_session<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut SessionFacade) -> T,
    ) -> Option<T> {
        let mut inner = self.inner.lock().await;
        inner.sessions.get_mut(&session_id).map(f)
    }

    /// Drops a session from the registry (learner exit).
    pub async fn remove(&self, session_id: Uuid) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.sessions.remove(&session_id) {
            Some(facade) => {
                inner
                    .by_attempt
                    .remove(&(facade.learner_id(), facade.topic_id()));
                true
            }
            None => false,
        }
    }
}
