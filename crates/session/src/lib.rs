//! Conversation history per session id.
//!
//! A [`SessionLease`] is an exclusive guard over one session's history. The
//! fulfillment runtime holds it for a whole turn (read history, call the
//! model, append user and assistant turns) so concurrent deliveries for the
//! same session id are applied one after the other. Different session ids
//! never contend.

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use dialogbridge_core::{SessionId, Turn};
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;

pub use memory::InMemorySessionStore;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// History so far; empty for an unseen id. Does not create the session.
    async fn get(&self, id: &SessionId) -> Vec<Turn>;

    async fn append(&self, id: &SessionId, turn: Turn);

    /// Waits for exclusive access to the session, creating it if unseen.
    async fn lease(&self, id: &SessionId) -> SessionLease;

    /// Drops sessions idle for longer than `ttl` that nobody is using.
    /// Returns how many were removed.
    async fn evict_idle(&self, ttl: Duration) -> usize;

    async fn len(&self) -> usize;
}

#[derive(Debug)]
pub struct SessionRecord {
    turns: Vec<Turn>,
    last_active: Instant,
}

impl SessionRecord {
    fn new() -> Self {
        Self { turns: Vec::new(), last_active: Instant::now() }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }
}

pub struct SessionLease {
    id: SessionId,
    record: OwnedMutexGuard<SessionRecord>,
}

impl SessionLease {
    fn new(id: SessionId, mut record: OwnedMutexGuard<SessionRecord>) -> Self {
        record.touch();
        Self { id, record }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.id
    }

    pub fn history(&self) -> &[Turn] {
        &self.record.turns
    }

    pub fn append(&mut self, turn: Turn) {
        self.record.turns.push(turn);
        self.record.touch();
    }
}
