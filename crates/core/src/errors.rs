use thiserror::Error;

use crate::domain::intent::IntentId;

/// Raised while parsing a prompt template at registry build time.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder `{{{name}}}` (expected user_text or api_data)")]
    UnknownPlaceholder { name: String },
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated { offset: usize },
    #[error("unmatched `}}` at byte {offset} (use `}}}}` for a literal brace)")]
    UnmatchedClose { offset: usize },
}

/// Intent lookup failure. Reported to the caller as an unsupported request,
/// never propagated past the webhook boundary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("no intent registered for `{intent_id}`")]
    Unknown { intent_id: IntentId },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("intent `{intent_id}` has an invalid prompt template: {source}")]
    Template { intent_id: IntentId, source: TemplateError },
    #[error("intent `{0}` is new and needs a prompt_template")]
    MissingTemplate(IntentId),
    #[error("intent id `{0}` is reserved")]
    ReservedId(IntentId),
}

/// Failure of the downstream data call. Degrades the prompt context; the end
/// user only sees it through the synthesized reply.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DownstreamError {
    #[error("no downstream endpoint configured")]
    NotConfigured,
    #[error("downstream call timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("downstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("downstream transport failure: {0}")]
    Transport(String),
    #[error("downstream response could not be decoded: {0}")]
    Decode(String),
}

/// Failure of the generation capability. Turned into the apology reply.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("generation provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation transport failure: {0}")]
    Transport(String),
    #[error("generation response could not be decoded: {0}")]
    Decode(String),
    #[error("generation provider returned an empty completion")]
    EmptyCompletion,
}

impl GenerationError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::EmptyCompletion => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::intent::IntentId;
    use crate::errors::{GenerationError, IntentError, TemplateError};

    #[test]
    fn rate_limits_and_server_errors_are_transient() {
        assert!(GenerationError::Status { status: 429, body: String::new() }.is_transient());
        assert!(GenerationError::Status { status: 503, body: String::new() }.is_transient());
        assert!(GenerationError::Timeout { timeout_secs: 30 }.is_transient());
        assert!(GenerationError::Transport("connection reset".to_owned()).is_transient());
    }

    #[test]
    fn auth_and_decode_failures_are_not_transient() {
        assert!(!GenerationError::Status { status: 401, body: String::new() }.is_transient());
        assert!(!GenerationError::Status { status: 400, body: String::new() }.is_transient());
        assert!(!GenerationError::Decode("missing choices".to_owned()).is_transient());
        assert!(!GenerationError::EmptyCompletion.is_transient());
    }

    #[test]
    fn unknown_intent_message_names_the_id() {
        let error = IntentError::Unknown { intent_id: IntentId::new("XYZ") };
        assert_eq!(error.to_string(), "no intent registered for `XYZ`");
    }

    #[test]
    fn template_error_messages_show_braces() {
        let error = TemplateError::UnknownPlaceholder { name: "name".to_owned() };
        assert_eq!(
            error.to_string(),
            "unknown placeholder `{name}` (expected user_text or api_data)"
        );
    }
}
