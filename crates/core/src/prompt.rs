//! Prompt templates and the fixed framings built around them.
//!
//! Intent templates are parsed once, when the registry is built, so a typo in
//! a placeholder fails startup instead of producing a half-rendered prompt at
//! request time. Only `{user_text}` and `{api_data}` are recognised; `{{` and
//! `}}` produce literal braces.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::session::Turn;
use crate::errors::TemplateError;

/// Substituted for `{api_data}` when the intent has no data endpoint or the
/// endpoint answered with nothing.
pub const NO_DATA_SENTINEL: &str = "no data found";

/// Prefix substituted for `{api_data}` when the data endpoint failed.
pub const DATA_FAILURE_SENTINEL: &str = "data service unavailable";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placeholder {
    UserText,
    ApiData,
}

impl Placeholder {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "user_text" => Some(Self::UserText),
            "api_data" => Some(Self::ApiData),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

/// Values substituted into a [`PromptTemplate`].
#[derive(Clone, Copy, Debug)]
pub struct PromptVars<'a> {
    pub user_text: &'a str,
    pub api_data: &'a str,
}

impl PromptTemplate {
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, ch)) = chars.next() {
            match ch {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, next)) => name.push(next),
                            None => return Err(TemplateError::Unterminated { offset }),
                        }
                    }
                    let placeholder = Placeholder::parse(name.trim())
                        .ok_or(TemplateError::UnknownPlaceholder { name })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(placeholder));
                }
                '}' => return Err(TemplateError::UnmatchedClose { offset }),
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.segments.iter().any(|segment| *segment == Segment::Slot(placeholder))
    }

    pub fn render(&self, vars: PromptVars<'_>) -> String {
        let mut output = String::with_capacity(self.source.len() + vars.api_data.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Slot(Placeholder::UserText) => output.push_str(vars.user_text),
                Segment::Slot(Placeholder::ApiData) => output.push_str(vars.api_data),
            }
        }
        output
    }
}

/// What the data step produced for one turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ApiData {
    Answer(String),
    NoData,
    Failed(String),
}

impl ApiData {
    pub fn prompt_text(&self) -> String {
        match self {
            Self::Answer(answer) => answer.clone(),
            Self::NoData => NO_DATA_SENTINEL.to_string(),
            Self::Failed(reason) => format!("{DATA_FAILURE_SENTINEL}: {reason}"),
        }
    }
}

impl fmt::Display for ApiData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prompt_text())
    }
}

/// Prompt asking the model to request the missing parameters from the caller.
pub fn clarification_prompt(user_text: &str, missing: &[String]) -> String {
    let wanted = join_names(&missing.iter().map(|name| humanize(name)).collect::<Vec<_>>());
    format!(
        "The customer said: \"{}\". Before this request can be answered, politely ask the \
         customer to provide their {wanted}. Do not answer the request itself yet.",
        user_text.trim()
    )
}

/// Prior turns as `Role: content` lines, a blank line, then the new context.
pub fn render_transcript(history: &[Turn], context: &str) -> String {
    if history.is_empty() {
        return context.to_string();
    }

    let mut lines = history.iter().map(Turn::transcript_line).collect::<Vec<_>>();
    lines.push(String::new());
    lines.push(context.to_string());
    lines.join("\n")
}

pub fn humanize(param: &str) -> String {
    param.trim().replace(['_', '-'], " ")
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        clarification_prompt, render_transcript, ApiData, Placeholder, PromptTemplate,
        PromptVars, NO_DATA_SENTINEL,
    };
    use crate::domain::session::Turn;
    use crate::errors::TemplateError;

    #[test]
    fn render_substitutes_both_placeholders() {
        let template =
            PromptTemplate::parse("Customer asked: {user_text}. Records say: {api_data}.")
                .expect("template parses");

        let rendered = template.render(PromptVars {
            user_text: "what is my balance",
            api_data: "$2,543.78 checking",
        });

        assert_eq!(rendered, "Customer asked: what is my balance. Records say: $2,543.78 checking.");
        assert!(template.uses(Placeholder::UserText));
        assert!(template.uses(Placeholder::ApiData));
    }

    #[test]
    fn doubled_braces_render_literally() {
        let template = PromptTemplate::parse("{{json}} {user_text}").expect("template parses");
        let rendered = template.render(PromptVars { user_text: "hi", api_data: "" });
        assert_eq!(rendered, "{json} hi");
        assert!(!template.uses(Placeholder::ApiData));
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let error = PromptTemplate::parse("Hello {customer_name}").expect_err("should fail");
        assert_eq!(error, TemplateError::UnknownPlaceholder { name: "customer_name".to_string() });
    }

    #[test]
    fn unterminated_placeholder_is_rejected() {
        let error = PromptTemplate::parse("Hello {user_text").expect_err("should fail");
        assert_eq!(error, TemplateError::Unterminated { offset: 6 });
    }

    #[test]
    fn stray_closing_brace_is_rejected() {
        let error = PromptTemplate::parse("oops } here").expect_err("should fail");
        assert_eq!(error, TemplateError::UnmatchedClose { offset: 5 });
    }

    #[test]
    fn api_data_sentinels_are_distinct() {
        let no_data = ApiData::NoData.prompt_text();
        let failed = ApiData::Failed("timed out after 10s".to_string()).prompt_text();

        assert_eq!(no_data, NO_DATA_SENTINEL);
        assert_ne!(no_data, failed);
        assert!(failed.starts_with("data service unavailable"));
        assert!(failed.contains("timed out after 10s"));
    }

    #[test]
    fn clarification_prompt_lists_humanized_names() {
        let prompt = clarification_prompt(
            "what do I owe?",
            &["account_number".to_string(), "date_of_birth".to_string(), "pin".to_string()],
        );

        assert!(prompt.contains("what do I owe?"));
        assert!(prompt.contains("account number, date of birth and pin"));
    }

    #[test]
    fn transcript_lists_history_before_context() {
        let history = vec![Turn::user("hi"), Turn::assistant("hello, how can I help?")];
        let transcript = render_transcript(&history, "NEW CONTEXT");

        assert_eq!(transcript, "User: hi\nAssistant: hello, how can I help?\n\nNEW CONTEXT");
        assert_eq!(render_transcript(&[], "ONLY"), "ONLY");
    }
}
