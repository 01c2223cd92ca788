use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use dialogbridge_core::IntentRegistry;
use dialogbridge_session::SessionStore;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    pub sessions: Arc<dyn SessionStore>,
    pub registry: Arc<IntentRegistry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub intents: Vec<String>,
    pub active_sessions: usize,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let ready = !state.registry.is_empty();

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: if ready { "ready" } else { "degraded" },
            detail: format!("{} intents registered", state.registry.len()),
        },
        intents: state.registry.ids().map(|id| id.to_string()).collect(),
        active_sessions: state.sessions.len().await,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use dialogbridge_core::{IntentRegistry, SessionId, Turn};
    use dialogbridge_session::{InMemorySessionStore, SessionStore};

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_reports_intents_and_session_count() {
        let sessions = Arc::new(InMemorySessionStore::new());
        sessions.append(&SessionId::new("s-1"), Turn::user("hi")).await;
        let registry = Arc::new(IntentRegistry::builtin().expect("builtin registry"));

        let (status, Json(payload)) = health(State(HealthState { sessions, registry })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.active_sessions, 1);
        assert_eq!(payload.intents, vec!["balance_enquiry", "loan_balance", "loan_status"]);
    }

    #[tokio::test]
    async fn health_is_degraded_without_intents() {
        let state = HealthState {
            sessions: Arc::new(InMemorySessionStore::new()),
            registry: Arc::new(IntentRegistry::default()),
        };

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert!(payload.intents.is_empty());
    }
}
