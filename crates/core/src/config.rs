use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routing::normalize_label;

pub const DEFAULT_CONFIG_FILE: &str = "dialogbridge.toml";
pub const NESTED_CONFIG_FILE: &str = "config/dialogbridge.toml";

pub const DEFAULT_UNSUPPORTED_MESSAGE: &str =
    "Sorry, I couldn't route your request to a suitable agent. I can help with balance \
     enquiries, loan balances and loan status.";
pub const DEFAULT_APOLOGY_MESSAGE: &str =
    "Sorry, I'm having trouble answering right now. Please try again in a moment.";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub downstream: DownstreamConfig,
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub webhook: WebhookConfig,
    pub intents: BTreeMap<String, IntentOverride>,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Clone, Debug)]
pub struct DownstreamConfig {
    pub timeout_secs: u64,
    pub default_sentiment: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub include_ssml: bool,
    pub tag_aliases: BTreeMap<String, String>,
    pub unsupported_message: String,
    pub apology_message: String,
}

/// Per-intent settings from `[intents.<id>]`. Unset fields keep the built-in
/// value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct IntentOverride {
    pub downstream_endpoint: Option<String>,
    pub prompt_template: Option<String>,
    pub system_prompt: Option<String>,
    pub required_params: Option<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

impl LlmProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub server_port: Option<u16>,
    pub session_ttl_secs: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut tag_aliases = BTreeMap::new();
        tag_aliases.insert("WaveAPITag".to_string(), "balance_enquiry".to_string());

        Self {
            llm: LlmConfig {
                provider: LlmProvider::OpenAi,
                api_key: None,
                base_url: None,
                model: "gpt-3.5-turbo".to_string(),
                temperature: 0.5,
                max_tokens: None,
                timeout_secs: 30,
                max_retries: 1,
                retry_backoff_ms: 250,
            },
            downstream: DownstreamConfig {
                timeout_secs: 10,
                default_sentiment: "neutral".to_string(),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            session: SessionConfig { ttl_secs: 3600, sweep_interval_secs: 60 },
            webhook: WebhookConfig {
                include_ssml: true,
                tag_aliases,
                unsupported_message: DEFAULT_UNSUPPORTED_MESSAGE.to_string(),
                apology_message: DEFAULT_APOLOGY_MESSAGE.to_string(),
            },
            intents: BTreeMap::new(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LlmConfig {
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
            if let Some(max_tokens) = llm.max_tokens {
                self.llm.max_tokens = Some(max_tokens);
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(max_retries) = llm.max_retries {
                self.llm.max_retries = max_retries;
            }
            if let Some(retry_backoff_ms) = llm.retry_backoff_ms {
                self.llm.retry_backoff_ms = retry_backoff_ms;
            }
        }

        if let Some(downstream) = patch.downstream {
            if let Some(timeout_secs) = downstream.timeout_secs {
                self.downstream.timeout_secs = timeout_secs;
            }
            if let Some(default_sentiment) = downstream.default_sentiment {
                self.downstream.default_sentiment = default_sentiment;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(session) = patch.session {
            if let Some(ttl_secs) = session.ttl_secs {
                self.session.ttl_secs = ttl_secs;
            }
            if let Some(sweep_interval_secs) = session.sweep_interval_secs {
                self.session.sweep_interval_secs = sweep_interval_secs;
            }
        }

        if let Some(webhook) = patch.webhook {
            if let Some(include_ssml) = webhook.include_ssml {
                self.webhook.include_ssml = include_ssml;
            }
            if let Some(tag_aliases) = webhook.tag_aliases {
                // A file alias replaces any existing alias that routes the same label.
                let incoming = tag_aliases.keys().map(|tag| normalize_label(tag)).collect::<Vec<_>>();
                self.webhook.tag_aliases.retain(|tag, _| !incoming.contains(&normalize_label(tag)));
                self.webhook.tag_aliases.extend(tag_aliases);
            }
            if let Some(unsupported_message) = webhook.unsupported_message {
                self.webhook.unsupported_message = unsupported_message;
            }
            if let Some(apology_message) = webhook.apology_message {
                self.webhook.apology_message = apology_message;
            }
        }

        if let Some(intents) = patch.intents {
            self.intents.extend(intents);
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("DIALOGBRIDGE_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        let api_key = read_env("DIALOGBRIDGE_LLM_API_KEY").or_else(|| read_env("OPENAI_API_KEY"));
        if let Some(value) = api_key {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("DIALOGBRIDGE_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("DIALOGBRIDGE_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("DIALOGBRIDGE_LLM_TEMPERATURE") {
            self.llm.temperature = parse_f32("DIALOGBRIDGE_LLM_TEMPERATURE", &value)?;
        }
        if let Some(value) = read_env("DIALOGBRIDGE_LLM_MAX_TOKENS") {
            self.llm.max_tokens = Some(parse_u32("DIALOGBRIDGE_LLM_MAX_TOKENS", &value)?);
        }
        if let Some(value) = read_env("DIALOGBRIDGE_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("DIALOGBRIDGE_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("DIALOGBRIDGE_LLM_MAX_RETRIES") {
            self.llm.max_retries = parse_u32("DIALOGBRIDGE_LLM_MAX_RETRIES", &value)?;
        }
        if let Some(value) = read_env("DIALOGBRIDGE_LLM_RETRY_BACKOFF_MS") {
            self.llm.retry_backoff_ms = parse_u64("DIALOGBRIDGE_LLM_RETRY_BACKOFF_MS", &value)?;
        }

        if let Some(value) = read_env("DIALOGBRIDGE_DOWNSTREAM_TIMEOUT_SECS") {
            self.downstream.timeout_secs =
                parse_u64("DIALOGBRIDGE_DOWNSTREAM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("DIALOGBRIDGE_DOWNSTREAM_DEFAULT_SENTIMENT") {
            self.downstream.default_sentiment = value;
        }

        if let Some(value) = read_env("DIALOGBRIDGE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("DIALOGBRIDGE_SERVER_PORT") {
            self.server.port = parse_u16("DIALOGBRIDGE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("DIALOGBRIDGE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("DIALOGBRIDGE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("DIALOGBRIDGE_SESSION_TTL_SECS") {
            self.session.ttl_secs = parse_u64("DIALOGBRIDGE_SESSION_TTL_SECS", &value)?;
        }
        if let Some(value) = read_env("DIALOGBRIDGE_SESSION_SWEEP_INTERVAL_SECS") {
            self.session.sweep_interval_secs =
                parse_u64("DIALOGBRIDGE_SESSION_SWEEP_INTERVAL_SECS", &value)?;
        }

        if let Some(value) = read_env("DIALOGBRIDGE_WEBHOOK_INCLUDE_SSML") {
            self.webhook.include_ssml = parse_bool("DIALOGBRIDGE_WEBHOOK_INCLUDE_SSML", &value)?;
        }

        let log_level =
            read_env("DIALOGBRIDGE_LOGGING_LEVEL").or_else(|| read_env("DIALOGBRIDGE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("DIALOGBRIDGE_LOGGING_FORMAT").or_else(|| read_env("DIALOGBRIDGE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = Some(llm_base_url);
        }
        if let Some(server_port) = overrides.server_port {
            self.server.port = server_port;
        }
        if let Some(session_ttl_secs) = overrides.session_ttl_secs {
            self.session.ttl_secs = session_ttl_secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_llm(&self.llm)?;
        validate_downstream(&self.downstream)?;
        validate_server(&self.server)?;
        validate_session(&self.session)?;
        validate_webhook(&self.webhook)?;
        validate_intents(&self.intents)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.max_retries > 5 {
        return Err(ConfigError::Validation("llm.max_retries must be at most 5".to_string()));
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation(
            "llm.temperature must be in range 0.0..=2.0".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    if let Some(base_url) = &llm.base_url {
        validate_http_url("llm.base_url", base_url)?;
    }

    if llm.provider == LlmProvider::OpenAi {
        let missing = llm
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing {
            return Err(ConfigError::Validation(
                "llm.api_key is required for openai provider (set DIALOGBRIDGE_LLM_API_KEY or OPENAI_API_KEY)"
                    .to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_downstream(downstream: &DownstreamConfig) -> Result<(), ConfigError> {
    if downstream.timeout_secs == 0 || downstream.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "downstream.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "session.ttl_secs must be greater than zero".to_string(),
        ));
    }

    if session.sweep_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "session.sweep_interval_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_webhook(webhook: &WebhookConfig) -> Result<(), ConfigError> {
    if webhook.unsupported_message.trim().is_empty() {
        return Err(ConfigError::Validation(
            "webhook.unsupported_message must not be empty".to_string(),
        ));
    }

    if webhook.apology_message.trim().is_empty() {
        return Err(ConfigError::Validation(
            "webhook.apology_message must not be empty".to_string(),
        ));
    }

    if let Some((tag, _)) = webhook.tag_aliases.iter().find(|(_, intent)| intent.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "webhook.tag_aliases.{tag} must name an intent id"
        )));
    }

    let mut seen = BTreeMap::new();
    for tag in webhook.tag_aliases.keys() {
        if let Some(previous) = seen.insert(normalize_label(tag), tag) {
            return Err(ConfigError::Validation(format!(
                "webhook.tag_aliases.{previous} and webhook.tag_aliases.{tag} match the same label"
            )));
        }
    }

    Ok(())
}

fn validate_intents(intents: &BTreeMap<String, IntentOverride>) -> Result<(), ConfigError> {
    for (id, intent) in intents {
        if let Some(endpoint) = intent.downstream_endpoint.as_deref().map(str::trim) {
            if !endpoint.is_empty() {
                validate_http_url(&format!("intents.{id}.downstream_endpoint"), endpoint)?;
            }
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{key} must start with http:// or https://")))
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.parse::<f32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    downstream: Option<DownstreamPatch>,
    server: Option<ServerPatch>,
    session: Option<SessionPatch>,
    webhook: Option<WebhookPatch>,
    intents: Option<BTreeMap<String, IntentOverride>>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_backoff_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DownstreamPatch {
    timeout_secs: Option<u64>,
    default_sentiment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    ttl_secs: Option<u64>,
    sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookPatch {
    include_ssml: Option<bool>,
    tag_aliases: Option<BTreeMap<String, String>>,
    unsupported_message: Option<String>,
    apology_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
