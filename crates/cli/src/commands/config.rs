use std::env;
use std::fs;
use std::path::Path;

use dialogbridge_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use super::CommandResult;

struct FileDoc<'a> {
    path: Option<&'a Path>,
    doc: Option<Value>,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult { exit_code: 2, output: format!("config validation failed: {error}") }
        }
    };

    let config_file_path = resolve_config_path(None);
    let file = FileDoc {
        path: config_file_path.as_deref(),
        doc: load_config_file_doc(config_file_path.as_deref()),
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    let mut push = |key: &str, value: &str, env_keys: &[&str]| {
        lines.push(render_line(key, value, field_source(key, env_keys, &file)));
    };

    let llm = &config.llm;
    push("llm.provider", llm.provider.as_str(), &["DIALOGBRIDGE_LLM_PROVIDER"]);
    push("llm.model", &llm.model, &["DIALOGBRIDGE_LLM_MODEL"]);
    push("llm.base_url", &llm.effective_base_url(), &["DIALOGBRIDGE_LLM_BASE_URL"]);
    let api_key = llm
        .api_key
        .as_ref()
        .map(|key| redact_token(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    push("llm.api_key", &api_key, &["DIALOGBRIDGE_LLM_API_KEY", "OPENAI_API_KEY"]);
    push("llm.temperature", &llm.temperature.to_string(), &["DIALOGBRIDGE_LLM_TEMPERATURE"]);
    let max_tokens = llm.max_tokens.map(|tokens| tokens.to_string());
    push(
        "llm.max_tokens",
        max_tokens.as_deref().unwrap_or("<unset>"),
        &["DIALOGBRIDGE_LLM_MAX_TOKENS"],
    );
    push("llm.timeout_secs", &llm.timeout_secs.to_string(), &["DIALOGBRIDGE_LLM_TIMEOUT_SECS"]);
    push("llm.max_retries", &llm.max_retries.to_string(), &["DIALOGBRIDGE_LLM_MAX_RETRIES"]);
    push(
        "llm.retry_backoff_ms",
        &llm.retry_backoff_ms.to_string(),
        &["DIALOGBRIDGE_LLM_RETRY_BACKOFF_MS"],
    );

    push(
        "downstream.timeout_secs",
        &config.downstream.timeout_secs.to_string(),
        &["DIALOGBRIDGE_DOWNSTREAM_TIMEOUT_SECS"],
    );
    push(
        "downstream.default_sentiment",
        &config.downstream.default_sentiment,
        &["DIALOGBRIDGE_DOWNSTREAM_DEFAULT_SENTIMENT"],
    );

    push("server.bind_address", &config.server.bind_address, &["DIALOGBRIDGE_SERVER_BIND_ADDRESS"]);
    push("server.port", &config.server.port.to_string(), &["DIALOGBRIDGE_SERVER_PORT"]);
    push(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        &["DIALOGBRIDGE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
    );

    push("session.ttl_secs", &config.session.ttl_secs.to_string(), &["DIALOGBRIDGE_SESSION_TTL_SECS"]);
    push(
        "session.sweep_interval_secs",
        &config.session.sweep_interval_secs.to_string(),
        &["DIALOGBRIDGE_SESSION_SWEEP_INTERVAL_SECS"],
    );

    push(
        "webhook.include_ssml",
        &config.webhook.include_ssml.to_string(),
        &["DIALOGBRIDGE_WEBHOOK_INCLUDE_SSML"],
    );
    let aliases = config
        .webhook
        .tag_aliases
        .iter()
        .map(|(tag, intent)| format!("{tag}->{intent}"))
        .collect::<Vec<_>>()
        .join(", ");
    push("webhook.tag_aliases", &aliases, &[]);

    let intents = config.intents.keys().cloned().collect::<Vec<_>>().join(", ");
    push("intents", if intents.is_empty() { "<builtin only>" } else { &intents }, &[]);

    push(
        "logging.level",
        &config.logging.level,
        &["DIALOGBRIDGE_LOGGING_LEVEL", "DIALOGBRIDGE_LOG_LEVEL"],
    );
    push(
        "logging.format",
        &format!("{:?}", config.logging.format).to_lowercase(),
        &["DIALOGBRIDGE_LOGGING_FORMAT", "DIALOGBRIDGE_LOG_FORMAT"],
    );

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(key_path: &str, env_keys: &[&str], file: &FileDoc<'_>) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = &file.doc {
        if contains_path(doc, key_path) {
            let file_path = file
                .path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
