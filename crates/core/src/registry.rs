//! Static table of supported intents.
//!
//! The registry is assembled once at startup from the built-in banking intents
//! plus any `[intents.<id>]` overrides in the config file, and is read-only
//! afterwards.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::IntentOverride;
use crate::domain::intent::{IntentId, IntentSpec};
use crate::errors::{IntentError, RegistryError};
use crate::prompt::PromptTemplate;

struct BuiltinIntent {
    id: &'static str,
    system_prompt: &'static str,
    prompt_template: &'static str,
    required_params: &'static [&'static str],
}

const BUILTIN_INTENTS: &[BuiltinIntent] = &[
    BuiltinIntent {
        id: "loan_status",
        system_prompt: "You are a virtual loan officer. You check loan status and provide \
            information about loan approvals. For the demo, the user has a pending home loan \
            application submitted 3 days ago which is still under review. Respond naturally as \
            if you are speaking to the customer.",
        prompt_template: "The customer asked: {user_text}\n\
            Loan application records: {api_data}\n\
            Answer the customer's question about the status of their loan application.",
        required_params: &[],
    },
    BuiltinIntent {
        id: "balance_enquiry",
        system_prompt: "You are a helpful bank assistant for balance inquiries. For this demo, \
            the user has a checking account with $2,543.78 and a savings account with \
            $15,689.22. Respond naturally as if you are speaking to the customer.",
        prompt_template: "The customer asked: {user_text}\n\
            Account balance data: {api_data}\n\
            Tell the customer their balance in one or two friendly sentences.",
        required_params: &["account_number"],
    },
    BuiltinIntent {
        id: "loan_balance",
        system_prompt: "You help customers check their loan balances. For this demo, the user \
            has a car loan with a remaining balance of $12,450.67 with 36 payments left. Respond \
            naturally as if you are speaking to the customer.",
        prompt_template: "The customer asked: {user_text}\n\
            Loan balance data: {api_data}\n\
            Tell the customer what they still owe and how many payments remain.",
        required_params: &["account_number"],
    },
];

#[derive(Clone, Debug, Default)]
pub struct IntentRegistry {
    intents: BTreeMap<IntentId, IntentSpec>,
}

impl IntentRegistry {
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::with_overrides(&BTreeMap::new())
    }

    /// Built-in intents with config overrides merged field by field. An
    /// override for an unknown id registers a new intent.
    pub fn with_overrides(
        overrides: &BTreeMap<String, IntentOverride>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();

        for builtin in BUILTIN_INTENTS {
            let id = IntentId::new(builtin.id);
            let prompt_template = parse_template(&id, builtin.prompt_template)?;
            registry.register(IntentSpec {
                id,
                downstream_endpoint: None,
                prompt_template,
                system_prompt: Some(builtin.system_prompt.to_string()),
                required_params: builtin.required_params.iter().map(|p| p.to_string()).collect(),
            })?;
        }

        for (raw_id, patch) in overrides {
            let id = IntentId::new(raw_id.trim());
            let spec = match registry.intents.remove(&id) {
                Some(existing) => apply_override(existing, patch)?,
                None => {
                    let template = patch
                        .prompt_template
                        .as_deref()
                        .ok_or_else(|| RegistryError::MissingTemplate(id.clone()))?;
                    let base = IntentSpec {
                        id: id.clone(),
                        downstream_endpoint: None,
                        prompt_template: parse_template(&id, template)?,
                        system_prompt: None,
                        required_params: BTreeSet::new(),
                    };
                    apply_override(base, patch)?
                }
            };
            registry.register(spec)?;
        }

        Ok(registry)
    }

    fn register(&mut self, spec: IntentSpec) -> Result<(), RegistryError> {
        if spec.id.is_unrouted() {
            return Err(RegistryError::ReservedId(spec.id));
        }
        self.intents.insert(spec.id.clone(), spec);
        Ok(())
    }

    pub fn lookup(&self, intent_id: &IntentId) -> Result<&IntentSpec, IntentError> {
        self.intents
            .get(intent_id)
            .ok_or_else(|| IntentError::Unknown { intent_id: intent_id.clone() })
    }

    pub fn contains(&self, intent_id: &str) -> bool {
        self.intents.keys().any(|id| id.as_str() == intent_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &IntentId> {
        self.intents.keys()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

fn apply_override(
    mut spec: IntentSpec,
    patch: &IntentOverride,
) -> Result<IntentSpec, RegistryError> {
    if let Some(endpoint) = &patch.downstream_endpoint {
        let endpoint = endpoint.trim();
        spec.downstream_endpoint = (!endpoint.is_empty()).then(|| endpoint.to_string());
    }
    if let Some(template) = &patch.prompt_template {
        spec.prompt_template = parse_template(&spec.id, template)?;
    }
    if let Some(system_prompt) = &patch.system_prompt {
        spec.system_prompt = Some(system_prompt.clone());
    }
    if let Some(required) = &patch.required_params {
        spec.required_params = required
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
    }
    Ok(spec)
}

fn parse_template(id: &IntentId, source: &str) -> Result<PromptTemplate, RegistryError> {
    PromptTemplate::parse(source)
        .map_err(|source| RegistryError::Template { intent_id: id.clone(), source })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::config::IntentOverride;
    use crate::domain::intent::IntentId;
    use crate::errors::{IntentError, RegistryError};
    use crate::prompt::Placeholder;

    use super::IntentRegistry;

    #[test]
    fn builtin_registry_has_banking_intents() {
        let registry = IntentRegistry::builtin().expect("builtin templates parse");

        let ids = registry.ids().map(IntentId::as_str).collect::<Vec<_>>();
        assert_eq!(ids, vec!["balance_enquiry", "loan_balance", "loan_status"]);

        let balance = registry.lookup(&IntentId::new("balance_enquiry")).expect("registered");
        assert!(balance.required_params.contains("account_number"));
        assert!(balance.prompt_template.uses(Placeholder::UserText));
        assert!(balance.prompt_template.uses(Placeholder::ApiData));
        assert!(balance.downstream_endpoint.is_none());

        let status = registry.lookup(&IntentId::new("loan_status")).expect("registered");
        assert!(!status.requires_input());
    }

    #[test]
    fn unknown_lookup_is_repeatable_and_side_effect_free() {
        let registry = IntentRegistry::builtin().expect("builtin templates parse");
        let before = registry.len();

        let first = registry.lookup(&IntentId::new("XYZ")).expect_err("unknown");
        let second = registry.lookup(&IntentId::new("XYZ")).expect_err("unknown");

        assert_eq!(first, second);
        assert_eq!(first, IntentError::Unknown { intent_id: IntentId::new("XYZ") });
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn unrouted_id_is_never_registered() {
        let registry = IntentRegistry::builtin().expect("builtin templates parse");
        assert!(registry.lookup(&IntentId::unrouted()).is_err());

        let mut overrides = BTreeMap::new();
        overrides.insert(
            "unrouted".to_string(),
            IntentOverride {
                prompt_template: Some("{user_text}".to_string()),
                ..IntentOverride::default()
            },
        );
        let error = IntentRegistry::with_overrides(&overrides).expect_err("reserved id");
        assert_eq!(error, RegistryError::ReservedId(IntentId::unrouted()));
    }

    #[test]
    fn overrides_merge_into_builtins() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "balance_enquiry".to_string(),
            IntentOverride {
                downstream_endpoint: Some("http://bank.internal/balance".to_string()),
                required_params: Some(vec!["account_number".to_string(), "pin".to_string()]),
                ..IntentOverride::default()
            },
        );

        let registry = IntentRegistry::with_overrides(&overrides).expect("overrides apply");
        let spec = registry.lookup(&IntentId::new("balance_enquiry")).expect("registered");

        assert_eq!(spec.downstream_endpoint.as_deref(), Some("http://bank.internal/balance"));
        assert_eq!(spec.required_params.len(), 2);
        assert!(spec.system_prompt.as_deref().unwrap_or("").contains("balance inquiries"));
    }

    #[test]
    fn new_intent_requires_template() {
        let mut overrides = BTreeMap::new();
        overrides.insert("card_block".to_string(), IntentOverride::default());

        let error = IntentRegistry::with_overrides(&overrides).expect_err("missing template");
        assert_eq!(error, RegistryError::MissingTemplate(IntentId::new("card_block")));
    }

    #[test]
    fn bad_override_template_names_the_intent() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "loan_status".to_string(),
            IntentOverride {
                prompt_template: Some("Status for {account}".to_string()),
                ..IntentOverride::default()
            },
        );

        let error = IntentRegistry::with_overrides(&overrides).expect_err("bad template");
        assert!(matches!(
            error,
            RegistryError::Template { ref intent_id, .. } if intent_id.as_str() == "loan_status"
        ));
    }
}
