use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::prompt::PromptTemplate;

/// Reserved id for platform labels that map to no registered intent.
pub const UNROUTED_INTENT_ID: &str = "unrouted";

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntentId(pub String);

impl IntentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn unrouted() -> Self {
        Self(UNROUTED_INTENT_ID.to_string())
    }

    pub fn is_unrouted(&self) -> bool {
        self.0 == UNROUTED_INTENT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IntentId {
    fn default() -> Self {
        Self::unrouted()
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static description of how one intent is fulfilled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntentSpec {
    pub id: IntentId,
    pub downstream_endpoint: Option<String>,
    pub prompt_template: PromptTemplate,
    pub system_prompt: Option<String>,
    pub required_params: BTreeSet<String>,
}

impl IntentSpec {
    pub fn requires_input(&self) -> bool {
        !self.required_params.is_empty()
    }
}
