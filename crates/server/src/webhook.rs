//! Webhook endpoints for the dialogue platform.
//!
//! Each platform shape has a [`PlatformAdapter`] that extracts a
//! [`NormalizedRequest`] and wraps the reply text in the envelope that shape
//! expects. Everything between those two steps is platform-neutral.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use dialogbridge_agent::{FulfillmentReply, FulfillmentRuntime};
use dialogbridge_core::{IntentId, NormalizedRequest, SessionId, SlotSet, TagRouter};
use serde_json::{json, Map, Value};
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvelopeOptions {
    pub include_ssml: bool,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self { include_ssml: true }
    }
}

pub trait PlatformAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Extracts session id, user text, intent label, parameters. The returned
    /// request is not routed yet; `intent_id` is left unrouted.
    fn parse(&self, body: &Value) -> NormalizedRequest;

    fn envelope(&self, reply: &FulfillmentReply, options: &EnvelopeOptions) -> Value;
}

/// `sessionInfo` / `fulfillmentInfo.tag` deliveries.
#[derive(Clone, Copy, Debug, Default)]
pub struct CxAdapter;

impl PlatformAdapter for CxAdapter {
    fn name(&self) -> &'static str {
        "cx"
    }

    fn parse(&self, body: &Value) -> NormalizedRequest {
        let user_text = text_at(body, "/text").or_else(|| text_at(body, "/transcript"));

        NormalizedRequest {
            session_id: session_id(text_at(body, "/sessionInfo/session")),
            user_text: user_text.unwrap_or_default().to_string(),
            intent_tag: text_at(body, "/fulfillmentInfo/tag").unwrap_or_default().trim().to_string(),
            intent_id: IntentId::unrouted(),
            parameters: SlotSet::from_json(
                body.pointer("/sessionInfo/parameters").unwrap_or(&Value::Null),
            ),
            sentiment: None,
        }
    }

    fn envelope(&self, reply: &FulfillmentReply, options: &EnvelopeOptions) -> Value {
        let mut messages = vec![json!({ "text": { "text": [reply.text] } })];
        if options.include_ssml {
            messages.push(json!({ "outputAudioText": { "ssml": ssml(&reply.text) } }));
        }
        json!({ "fulfillment_response": { "messages": messages } })
    }
}

/// `queryResult` deliveries, plus the flat
/// `{intent, user_text, parameters, sentiment}` shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct LegacyAdapter;

impl LegacyAdapter {
    fn parse_query_result(body: &Value) -> NormalizedRequest {
        NormalizedRequest {
            session_id: session_id(text_at(body, "/session")),
            user_text: text_at(body, "/queryResult/queryText").unwrap_or_default().to_string(),
            intent_tag: text_at(body, "/queryResult/intent/displayName")
                .unwrap_or_default()
                .trim()
                .to_string(),
            intent_id: IntentId::unrouted(),
            parameters: SlotSet::from_json(
                body.pointer("/queryResult/parameters").unwrap_or(&Value::Null),
            ),
            sentiment: sentiment(text_at(body, "/originalDetectIntentRequest/payload/sentiment")),
        }
    }

    fn parse_flat(body: &Value) -> NormalizedRequest {
        NormalizedRequest {
            session_id: session_id(text_at(body, "/session")),
            user_text: text_at(body, "/user_text").unwrap_or_default().to_string(),
            intent_tag: text_at(body, "/intent").unwrap_or_default().trim().to_string(),
            intent_id: IntentId::unrouted(),
            parameters: SlotSet::from_json(body.pointer("/parameters").unwrap_or(&Value::Null)),
            sentiment: sentiment(text_at(body, "/sentiment")),
        }
    }
}

impl PlatformAdapter for LegacyAdapter {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn parse(&self, body: &Value) -> NormalizedRequest {
        if body.get("queryResult").is_some() {
            Self::parse_query_result(body)
        } else {
            Self::parse_flat(body)
        }
    }

    fn envelope(&self, reply: &FulfillmentReply, options: &EnvelopeOptions) -> Value {
        let mut envelope = json!({
            "fulfillmentText": reply.text,
            "fulfillmentMessages": [ { "text": { "text": [reply.text] } } ],
        });
        if options.include_ssml {
            envelope["payload"] = json!({ "ssml": ssml(&reply.text) });
        }
        envelope
    }
}

#[derive(Clone)]
pub struct WebhookState {
    pub runtime: Arc<FulfillmentRuntime>,
    pub router: Arc<TagRouter>,
    pub envelope: EnvelopeOptions,
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook/cx", post(cx_webhook))
        .route("/dialogflow-hook", post(cx_webhook))
        .route("/webhook/legacy", post(legacy_webhook))
        .route("/dialogflow-hookold", post(legacy_webhook))
        .with_state(state)
}

async fn cx_webhook(State(state): State<WebhookState>, body: Bytes) -> Json<Value> {
    Json(fulfill(&state, &CxAdapter, &body).await)
}

async fn legacy_webhook(State(state): State<WebhookState>, body: Bytes) -> Json<Value> {
    Json(fulfill(&state, &LegacyAdapter, &body).await)
}

/// Always produces an envelope; every failure has already been folded into
/// the reply text by the runtime.
pub async fn fulfill(state: &WebhookState, adapter: &dyn PlatformAdapter, body: &[u8]) -> Value {
    let correlation_id = Uuid::new_v4().to_string();
    let span = info_span!("webhook", correlation_id = %correlation_id, platform = adapter.name());

    async move {
        let payload = decode_body(body);
        debug!(event_name = "webhook.request.received", body = %payload, "webhook request received");

        let mut request = adapter.parse(&payload);
        request.intent_id = state.router.route(&request.intent_tag);

        let reply = state.runtime.handle(&request).await;
        adapter.envelope(&reply, &state.envelope)
    }
    .instrument(span)
    .await
}

fn decode_body(body: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            warn!(
                event_name = "webhook.request.malformed",
                kind = json_kind(&other),
                "webhook body is not a JSON object, treating as empty"
            );
            Value::Object(Map::new())
        }
        Err(error) => {
            warn!(
                event_name = "webhook.request.malformed",
                error = %error,
                bytes = body.len(),
                "webhook body is not valid JSON, treating as empty"
            );
            Value::Object(Map::new())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text_at<'a>(body: &'a Value, pointer: &str) -> Option<&'a str> {
    body.pointer(pointer).and_then(Value::as_str)
}

fn session_id(raw: Option<&str>) -> SessionId {
    raw.map(str::trim).filter(|id| !id.is_empty()).map(SessionId::new).unwrap_or_default()
}

fn sentiment(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

pub fn ssml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    format!("<speak>{escaped}</speak>")
}
