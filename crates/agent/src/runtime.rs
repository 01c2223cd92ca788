use std::sync::Arc;

use dialogbridge_core::config::{AppConfig, DEFAULT_APOLOGY_MESSAGE, DEFAULT_UNSUPPORTED_MESSAGE};
use dialogbridge_core::{
    ApiData, DownstreamError, GenerationError, IntentId, IntentRegistry, IntentSpec,
    NormalizedRequest, SlotResolution, SlotResolver, Turn,
};
use dialogbridge_session::SessionStore;
use tracing::{info, warn};

use crate::downstream::{DownstreamClient, DownstreamPayload};
use crate::llm::LlmClient;
use crate::synthesizer::{Framing, PromptContext, ResponseSynthesizer, Synthesis};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub unsupported_message: String,
    pub apology_message: String,
    pub default_sentiment: String,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            unsupported_message: DEFAULT_UNSUPPORTED_MESSAGE.to_string(),
            apology_message: DEFAULT_APOLOGY_MESSAGE.to_string(),
            default_sentiment: "neutral".to_string(),
        }
    }
}

impl From<&AppConfig> for RuntimeOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            unsupported_message: config.webhook.unsupported_message.clone(),
            apology_message: config.webhook.apology_message.clone(),
            default_sentiment: config.downstream.default_sentiment.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyOutcome {
    Unsupported { intent_id: IntentId },
    NeedsInput { missing: Vec<String> },
    Fulfilled { api_data: ApiData },
    GenerationFailed { error: GenerationError },
}

impl ReplyOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unsupported { .. } => "unsupported",
            Self::NeedsInput { .. } => "needs_input",
            Self::Fulfilled { .. } => "fulfilled",
            Self::GenerationFailed { .. } => "generation_failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FulfillmentReply {
    pub text: String,
    pub outcome: ReplyOutcome,
}

/// The per-turn negotiation loop: route, check slots, fetch data, phrase the
/// answer, record the exchange.
pub struct FulfillmentRuntime {
    registry: Arc<IntentRegistry>,
    resolver: SlotResolver,
    synthesizer: ResponseSynthesizer,
    downstream: Arc<dyn DownstreamClient>,
    sessions: Arc<dyn SessionStore>,
    options: RuntimeOptions,
}

impl FulfillmentRuntime {
    pub fn new(
        registry: Arc<IntentRegistry>,
        llm: Arc<dyn LlmClient>,
        downstream: Arc<dyn DownstreamClient>,
        sessions: Arc<dyn SessionStore>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            registry,
            resolver: SlotResolver::new(),
            synthesizer: ResponseSynthesizer::new(llm, options.apology_message.clone()),
            downstream,
            sessions,
            options,
        }
    }

    pub fn registry(&self) -> &IntentRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Never fails: every error kind is folded into the reply text.
    pub async fn handle(&self, request: &NormalizedRequest) -> FulfillmentReply {
        let mut lease = self.sessions.lease(&request.session_id).await;

        let reply = match self.registry.lookup(&request.intent_id) {
            Ok(spec) => self.fulfill(spec, request, lease.history()).await,
            Err(error) => {
                warn!(
                    event_name = "fulfillment.intent.unsupported",
                    session_id = %request.session_id,
                    intent_tag = %request.intent_tag,
                    error = %error,
                    "no intent for request, replying unsupported"
                );
                FulfillmentReply {
                    text: self.options.unsupported_message.clone(),
                    outcome: ReplyOutcome::Unsupported { intent_id: request.intent_id.clone() },
                }
            }
        };

        lease.append(Turn::user(request.user_text.clone()));
        lease.append(Turn::assistant(reply.text.clone()));

        info!(
            event_name = "fulfillment.turn.completed",
            session_id = %request.session_id,
            intent_id = %request.intent_id,
            outcome = reply.outcome.label(),
            history_len = lease.history().len(),
            "fulfillment turn completed"
        );

        reply
    }

    async fn fulfill(
        &self,
        spec: &IntentSpec,
        request: &NormalizedRequest,
        history: &[Turn],
    ) -> FulfillmentReply {
        let context = match self.resolver.resolve(spec, &request.parameters) {
            SlotResolution::NeedsInput(missing) => {
                info!(
                    event_name = "fulfillment.slots.missing",
                    session_id = %request.session_id,
                    intent_id = %spec.id,
                    missing = ?missing,
                    "required parameters missing, asking caller"
                );
                PromptContext::clarification(spec, &request.user_text, missing)
            }
            SlotResolution::Ready(_) => {
                let api_data = self.fetch_api_data(spec, request).await;
                PromptContext::fulfillment(spec, &request.user_text, api_data)
            }
        };

        match self.synthesizer.reply(&context, history).await {
            Synthesis::Generated(text) => {
                let outcome = match context.framing {
                    Framing::Clarification { missing } => ReplyOutcome::NeedsInput { missing },
                    Framing::Fulfillment { api_data } => ReplyOutcome::Fulfilled { api_data },
                };
                FulfillmentReply { text, outcome }
            }
            Synthesis::Apology { text, error } => {
                FulfillmentReply { text, outcome: ReplyOutcome::GenerationFailed { error } }
            }
        }
    }

    async fn fetch_api_data(&self, spec: &IntentSpec, request: &NormalizedRequest) -> ApiData {
        let Some(endpoint) = spec.downstream_endpoint.as_deref() else {
            return ApiData::NoData;
        };

        let payload = DownstreamPayload {
            user_text: request.user_text.clone(),
            parameters: request.parameters.to_json(),
            sentiment: request
                .sentiment
                .clone()
                .filter(|sentiment| !sentiment.trim().is_empty())
                .unwrap_or_else(|| self.options.default_sentiment.clone()),
        };

        match self.downstream.call(endpoint, &payload).await {
            Ok(answer) if answer.response.trim().is_empty() => ApiData::NoData,
            Ok(answer) => ApiData::Answer(answer.response.trim().to_string()),
            Err(DownstreamError::NotConfigured) => ApiData::NoData,
            Err(error) => {
                warn!(
                    event_name = "fulfillment.downstream.failed",
                    session_id = %request.session_id,
                    intent_id = %spec.id,
                    endpoint,
                    error = %error,
                    "downstream data call failed, continuing with degraded context"
                );
                ApiData::Failed(error.to_string())
            }
        }
    }
}
