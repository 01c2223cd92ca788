use std::sync::Arc;

use axum::Router;
use dialogbridge_agent::{
    ChatCompletionsClient, FulfillmentRuntime, HttpDownstreamClient, RuntimeOptions,
};
use dialogbridge_core::config::{AppConfig, ConfigError};
use dialogbridge_core::{DownstreamError, GenerationError, IntentRegistry, RegistryError, TagRouter};
use dialogbridge_session::InMemorySessionStore;
use thiserror::Error;
use tracing::info;

use crate::health::{self, HealthState};
use crate::webhook::{self, EnvelopeOptions, WebhookState};

pub struct Application {
    pub config: AppConfig,
    pub registry: Arc<IntentRegistry>,
    pub sessions: Arc<InMemorySessionStore>,
    pub runtime: Arc<FulfillmentRuntime>,
    pub tag_router: Arc<TagRouter>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("intent registry is invalid: {0}")]
    Registry(#[from] RegistryError),
    #[error("generation client could not be built: {0}")]
    Generation(#[source] GenerationError),
    #[error("downstream client could not be built: {0}")]
    Downstream(#[source] DownstreamError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let registry = Arc::new(IntentRegistry::with_overrides(&config.intents)?);
    let tag_router = Arc::new(TagRouter::new(&config.webhook.tag_aliases, &registry));
    info!(
        event_name = "system.bootstrap.registry_loaded",
        intents = registry.len(),
        aliases = config.webhook.tag_aliases.len(),
        "intent registry loaded"
    );

    let llm = ChatCompletionsClient::from_config(&config.llm).map_err(BootstrapError::Generation)?;
    info!(
        event_name = "system.bootstrap.llm_configured",
        provider = config.llm.provider.as_str(),
        model = %config.llm.model,
        endpoint = llm.endpoint(),
        "generation client configured"
    );

    let downstream = HttpDownstreamClient::new(config.downstream.timeout_secs)
        .map_err(BootstrapError::Downstream)?;
    let sessions = Arc::new(InMemorySessionStore::new());

    let runtime = Arc::new(FulfillmentRuntime::new(
        registry.clone(),
        Arc::new(llm),
        Arc::new(downstream),
        sessions.clone(),
        RuntimeOptions::from(&config),
    ));

    Ok(Application { config, registry, sessions, runtime, tag_router })
}

impl Application {
    /// Webhook routes plus `/health`.
    pub fn router(&self) -> Router {
        let webhook_state = WebhookState {
            runtime: self.runtime.clone(),
            router: self.tag_router.clone(),
            envelope: EnvelopeOptions { include_ssml: self.config.webhook.include_ssml },
        };
        let health_state = HealthState { sessions: self.sessions.clone(), registry: self.registry.clone() };

        webhook::router(webhook_state).merge(health::router(health_state))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use dialogbridge_core::config::{
        AppConfig, ConfigOverrides, IntentOverride, LlmProvider, LoadOptions,
    };
    use tower::ServiceExt;

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        bootstrap_with_config(AppConfig::load(options)?)
    }

    fn ollama_overrides() -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                llm_provider: Some(LlmProvider::Ollama),
                llm_base_url: Some("http://127.0.0.1:11434/v1".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[test]
    fn bootstrap_rejects_invalid_llm_base_url() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                llm_provider: Some(LlmProvider::Ollama),
                llm_base_url: Some("ftp://models.internal".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("error").to_string();
        assert!(message.contains("llm.base_url"), "unexpected error: {message}");
    }

    #[test]
    fn bootstrap_rejects_new_intent_without_template() {
        let mut config = AppConfig::default();
        config.intents = BTreeMap::from([(
            "card_limit".to_string(),
            IntentOverride {
                downstream_endpoint: Some("http://bank.test/limit".to_string()),
                ..IntentOverride::default()
            },
        )]);

        let result = bootstrap_with_config(config);
        assert!(matches!(result, Err(BootstrapError::Registry(_))));
    }

    #[tokio::test]
    async fn bootstrapped_router_serves_health_and_unsupported_webhook() {
        let app = bootstrap(ollama_overrides()).expect("bootstrap should succeed");
        assert_eq!(app.registry.len(), 3);

        let health = app
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(health.status(), StatusCode::OK);

        let webhook = app
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook/cx")
                    .body(Body::from(r#"{"fulfillmentInfo":{"tag":"nope"},"text":"joke"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(webhook.status(), StatusCode::OK);
    }
}
