use std::collections::BTreeMap;
use std::env;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use dialogbridge_agent::{
    DownstreamAnswer, DownstreamClient, DownstreamPayload, FulfillmentRuntime, GenerationRequest,
    LlmClient, RuntimeOptions,
};
use dialogbridge_cli::commands::{config, doctor, smoke};
use dialogbridge_core::{DownstreamError, GenerationError, IntentRegistry, TagRouter};
use dialogbridge_session::InMemorySessionStore;
use serde_json::Value;

struct CannedLlm;

#[async_trait]
impl LlmClient for CannedLlm {
    async fn complete(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        Ok("Happy to help.".to_string())
    }
}

struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Status { status: 429, body: "quota exceeded".to_string() })
    }
}

struct NoDownstream;

#[async_trait]
impl DownstreamClient for NoDownstream {
    async fn call(
        &self,
        _endpoint: &str,
        _payload: &DownstreamPayload,
    ) -> Result<DownstreamAnswer, DownstreamError> {
        Err(DownstreamError::NotConfigured)
    }
}

fn scripted_runtime(llm: Arc<dyn LlmClient>) -> (FulfillmentRuntime, TagRouter) {
    let registry = Arc::new(IntentRegistry::builtin().expect("builtin registry"));
    let router = TagRouter::new(&BTreeMap::new(), &registry);
    let runtime = FulfillmentRuntime::new(
        registry,
        llm,
        Arc::new(NoDownstream),
        Arc::new(InMemorySessionStore::new()),
        RuntimeOptions::default(),
    );
    (runtime, router)
}

#[tokio::test]
async fn scripted_smoke_cases_pass_with_working_generation() {
    let (runtime, router) = scripted_runtime(Arc::new(CannedLlm));

    let result = smoke::run_scripted(&runtime, &router).await;
    assert_eq!(result.exit_code, 0, "expected all scripted cases to pass: {}", result.output);

    let payload = parse_payload(last_line(&result.output));
    assert_eq!(payload["status"], "pass");
    let names = payload["checks"]
        .as_array()
        .expect("checks array")
        .iter()
        .map(|check| check["name"].as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["loan_balance", "balance_enquiry", "loan_status", "unsupported_intent"]);
}

#[tokio::test]
async fn scripted_smoke_fails_when_generation_fails() {
    let (runtime, router) = scripted_runtime(Arc::new(FailingLlm));

    let result = smoke::run_scripted(&runtime, &router).await;
    assert_eq!(result.exit_code, 6);

    let payload = parse_payload(last_line(&result.output));
    assert_eq!(payload["status"], "fail");
    // The unsupported reply never calls the model, so that case still passes.
    assert_eq!(payload["checks"][3]["status"], "pass");
    assert_eq!(payload["checks"][0]["status"], "fail");
}

#[test]
fn smoke_returns_failure_when_config_invalid() {
    with_env(&[], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 6, "expected smoke failure code");

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "smoke");
        assert_eq!(payload["status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][1]["status"], "skipped");
    });
}

#[test]
fn doctor_passes_for_ollama_without_probe() {
    with_env(&[("DIALOGBRIDGE_LLM_PROVIDER", "ollama")], || {
        let result = doctor::run(true, false);
        assert_eq!(result.exit_code, 0, "unexpected doctor output: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        let probe = payload["checks"]
            .as_array()
            .expect("checks array")
            .iter()
            .find(|check| check["name"] == "llm_probe")
            .expect("probe check present");
        assert_eq!(probe["status"], "skipped");
    });
}

#[test]
fn doctor_reports_missing_openai_key() {
    with_env(&[], || {
        let result = doctor::run(true, false);
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert!(payload["checks"][0]["details"]
            .as_str()
            .unwrap_or_default()
            .contains("llm.api_key"));
    });
}

#[test]
fn config_redacts_api_key_and_attributes_fallback_env() {
    with_env(&[("OPENAI_API_KEY", "sk-live-secretvalue")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        let output = result.output;
        assert!(output.contains("- llm.api_key = sk-*** (source: env (OPENAI_API_KEY))"), "{output}");
        assert!(!output.contains("secretvalue"));
        assert!(output.contains("- llm.model = gpt-3.5-turbo (source: default)"), "{output}");
        assert!(output.contains("WaveAPITag->balance_enquiry"));
    });
}

#[test]
fn config_reports_validation_failure() {
    with_env(&[("DIALOGBRIDGE_LLM_PROVIDER", "ollama"), ("DIALOGBRIDGE_LLM_TIMEOUT_SECS", "0")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2);
        assert!(result.output.starts_with("config validation failed"), "{}", result.output);
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "OPENAI_API_KEY",
        "DIALOGBRIDGE_LLM_PROVIDER",
        "DIALOGBRIDGE_LLM_API_KEY",
        "DIALOGBRIDGE_LLM_BASE_URL",
        "DIALOGBRIDGE_LLM_MODEL",
        "DIALOGBRIDGE_LLM_TEMPERATURE",
        "DIALOGBRIDGE_LLM_MAX_TOKENS",
        "DIALOGBRIDGE_LLM_TIMEOUT_SECS",
        "DIALOGBRIDGE_LLM_MAX_RETRIES",
        "DIALOGBRIDGE_LLM_RETRY_BACKOFF_MS",
        "DIALOGBRIDGE_DOWNSTREAM_TIMEOUT_SECS",
        "DIALOGBRIDGE_DOWNSTREAM_DEFAULT_SENTIMENT",
        "DIALOGBRIDGE_SERVER_BIND_ADDRESS",
        "DIALOGBRIDGE_SERVER_PORT",
        "DIALOGBRIDGE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "DIALOGBRIDGE_SESSION_TTL_SECS",
        "DIALOGBRIDGE_SESSION_SWEEP_INTERVAL_SECS",
        "DIALOGBRIDGE_WEBHOOK_INCLUDE_SSML",
        "DIALOGBRIDGE_LOGGING_LEVEL",
        "DIALOGBRIDGE_LOGGING_FORMAT",
        "DIALOGBRIDGE_LOG_LEVEL",
        "DIALOGBRIDGE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
