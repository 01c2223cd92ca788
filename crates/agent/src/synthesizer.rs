use std::sync::Arc;

use dialogbridge_core::prompt::{clarification_prompt, render_transcript};
use dialogbridge_core::{ApiData, GenerationError, IntentSpec, PromptVars, Turn};
use tracing::warn;

use crate::llm::{GenerationRequest, LlmClient};

/// Used when an intent carries no persona of its own.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful bank assistant. Respond naturally \
    and briefly as if you are speaking to the customer.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Framing {
    /// Ask the caller for the listed parameters.
    Clarification { missing: Vec<String> },
    /// Answer using the intent template and the data step's result.
    Fulfillment { api_data: ApiData },
}

/// The new context for one generation call, before history is prepended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptContext {
    pub framing: Framing,
    pub system_prompt: Option<String>,
    pub body: String,
}

impl PromptContext {
    pub fn clarification(spec: &IntentSpec, user_text: &str, missing: Vec<String>) -> Self {
        Self {
            body: clarification_prompt(user_text, &missing),
            system_prompt: spec.system_prompt.clone(),
            framing: Framing::Clarification { missing },
        }
    }

    pub fn fulfillment(spec: &IntentSpec, user_text: &str, api_data: ApiData) -> Self {
        let api_text = api_data.prompt_text();
        Self {
            body: spec
                .prompt_template
                .render(PromptVars { user_text: user_text.trim(), api_data: &api_text }),
            system_prompt: spec.system_prompt.clone(),
            framing: Framing::Fulfillment { api_data },
        }
    }

    pub fn is_clarification(&self) -> bool {
        matches!(self.framing, Framing::Clarification { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Synthesis {
    Generated(String),
    Apology { text: String, error: GenerationError },
}

impl Synthesis {
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) | Self::Apology { text, .. } => text,
        }
    }
}

pub struct ResponseSynthesizer {
    llm: Arc<dyn LlmClient>,
    apology_message: String,
}

impl ResponseSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, apology_message: impl Into<String>) -> Self {
        Self { llm, apology_message: apology_message.into() }
    }

    pub fn build_request(context: &PromptContext, history: &[Turn]) -> GenerationRequest {
        GenerationRequest {
            system_prompt: Some(
                context.system_prompt.clone().unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            ),
            prompt: render_transcript(history, &context.body),
            max_tokens: None,
        }
    }

    pub async fn synthesize(
        &self,
        context: &PromptContext,
        history: &[Turn],
    ) -> Result<String, GenerationError> {
        self.llm.complete(&Self::build_request(context, history)).await
    }

    /// Like [`Self::synthesize`] but never fails: a generation error becomes
    /// the configured apology.
    pub async fn reply(&self, context: &PromptContext, history: &[Turn]) -> Synthesis {
        match self.synthesize(context, history).await {
            Ok(text) => Synthesis::Generated(text),
            Err(error) => {
                warn!(
                    event_name = "fulfillment.generation.failed",
                    clarification = context.is_clarification(),
                    error = %error,
                    "generation failed, replying with apology"
                );
                Synthesis::Apology { text: self.apology_message.clone(), error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use dialogbridge_core::{ApiData, IntentId, IntentSpec, PromptTemplate, Turn};

    use super::{Framing, PromptContext, ResponseSynthesizer, DEFAULT_SYSTEM_PROMPT};

    fn spec() -> IntentSpec {
        IntentSpec {
            id: IntentId::new("balance_enquiry"),
            downstream_endpoint: None,
            prompt_template: PromptTemplate::parse("Q: {user_text}\nDATA: {api_data}")
                .expect("parses"),
            system_prompt: Some("You are a balance bot.".to_string()),
            required_params: BTreeSet::from(["account_number".to_string()]),
        }
    }

    #[test]
    fn fulfillment_context_renders_template() {
        let context = PromptContext::fulfillment(
            &spec(),
            " what's my balance? ",
            ApiData::Answer("$2,543.78 checking".to_string()),
        );

        assert_eq!(context.body, "Q: what's my balance?\nDATA: $2,543.78 checking");
        assert!(!context.is_clarification());
        assert_eq!(
            context.framing,
            Framing::Fulfillment { api_data: ApiData::Answer("$2,543.78 checking".to_string()) }
        );
    }

    #[test]
    fn clarification_context_names_missing_params() {
        let context = PromptContext::clarification(
            &spec(),
            "how much do I owe",
            vec!["account_number".to_string()],
        );

        assert!(context.is_clarification());
        assert!(context.body.contains("account number"));
        assert!(context.body.contains("how much do I owe"));
    }

    #[test]
    fn request_carries_persona_and_transcript() {
        let context = PromptContext::fulfillment(&spec(), "hi", ApiData::NoData);
        let history = vec![Turn::user("earlier"), Turn::assistant("reply")];

        let request = ResponseSynthesizer::build_request(&context, &history);

        assert_eq!(request.system_prompt.as_deref(), Some("You are a balance bot."));
        assert!(request.prompt.starts_with("User: earlier\nAssistant: reply\n\n"));
        assert!(request.prompt.ends_with("DATA: no data found"));
    }

    #[test]
    fn missing_persona_falls_back_to_default() {
        let spec = IntentSpec { system_prompt: None, ..spec() };
        let context = PromptContext::fulfillment(&spec, "hi", ApiData::NoData);

        let request = ResponseSynthesizer::build_request(&context, &[]);
        assert_eq!(request.system_prompt.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
    }
}
