use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dialogbridge_core::{SessionId, Turn};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::{SessionLease, SessionRecord, SessionStore};

type SharedRecord = Arc<Mutex<SessionRecord>>;

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SharedRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn existing(&self, id: &SessionId) -> Option<SharedRecord> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn existing_or_create(&self, id: &SessionId) -> SharedRecord {
        if let Some(record) = self.existing(id).await {
            return record;
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.clone())
            .or_insert_with(|| {
                debug!(event_name = "session.created", session_id = %id, "session created");
                Arc::new(Mutex::new(SessionRecord::new()))
            })
            .clone()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Vec<Turn> {
        match self.existing(id).await {
            Some(record) => record.lock().await.turns.clone(),
            None => Vec::new(),
        }
    }

    async fn append(&self, id: &SessionId, turn: Turn) {
        self.lease(id).await.append(turn);
    }

    async fn lease(&self, id: &SessionId) -> SessionLease {
        let record = self.existing_or_create(id).await;
        SessionLease::new(id.clone(), record.lock_owned().await)
    }

    async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        // A strong count above one means a caller has cloned the record and
        // is about to lock it (or holds the lease); such sessions stay.
        sessions.retain(|_, record| {
            if Arc::strong_count(record) > 1 {
                return true;
            }
            match record.try_lock() {
                Ok(guard) => guard.idle_for() <= ttl,
                Err(_) => true,
            }
        });

        before - sessions.len()
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
