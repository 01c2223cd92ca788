use crate::domain::intent::IntentSpec;
use crate::domain::slots::SlotSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotResolution {
    /// Every required parameter has a non-empty value.
    Ready(SlotSet),
    /// Names of the missing parameters, sorted.
    NeedsInput(Vec<String>),
}

impl SlotResolution {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

#[derive(Clone, Debug, Default)]
pub struct SlotResolver;

impl SlotResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, spec: &IntentSpec, supplied: &SlotSet) -> SlotResolution {
        // required_params is a BTreeSet, so the result is sorted regardless of
        // declaration order.
        let missing = spec
            .required_params
            .iter()
            .filter(|name| !supplied.is_present(name))
            .cloned()
            .collect::<Vec<_>>();

        if missing.is_empty() {
            SlotResolution::Ready(supplied.clone())
        } else {
            SlotResolution::NeedsInput(missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::domain::intent::{IntentId, IntentSpec};
    use crate::domain::slots::SlotSet;
    use crate::prompt::PromptTemplate;

    use super::{SlotResolution, SlotResolver};

    fn spec(required: &[&str]) -> IntentSpec {
        IntentSpec {
            id: IntentId::new("loan_balance"),
            downstream_endpoint: None,
            prompt_template: PromptTemplate::parse("{user_text} {api_data}").expect("parses"),
            system_prompt: None,
            required_params: required.iter().map(|name| name.to_string()).collect(),
        }
    }

    #[test]
    fn empty_slots_need_every_required_param() {
        let resolution = SlotResolver::new().resolve(&spec(&["account_number"]), &SlotSet::new());
        assert_eq!(resolution, SlotResolution::NeedsInput(vec!["account_number".to_string()]));
    }

    #[test]
    fn missing_names_do_not_depend_on_declaration_order() {
        let supplied = SlotSet::new().with("branch", "north");
        let forward = SlotResolver::new().resolve(&spec(&["pin", "account_number", "branch"]), &supplied);
        let reverse = SlotResolver::new().resolve(&spec(&["branch", "account_number", "pin"]), &supplied);

        assert_eq!(forward, reverse);
        assert_eq!(
            forward,
            SlotResolution::NeedsInput(vec!["account_number".to_string(), "pin".to_string()])
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut supplied = SlotSet::new().with("account_number", "   ");
        supplied.insert("pin", None);

        let resolution = SlotResolver::new().resolve(&spec(&["account_number", "pin"]), &supplied);
        assert_eq!(
            resolution,
            SlotResolution::NeedsInput(vec!["account_number".to_string(), "pin".to_string()])
        );
    }

    #[test]
    fn satisfied_params_are_ready_with_all_supplied_values() {
        let supplied = SlotSet::new().with("account_number", "123456").with("extra", "kept");
        let resolution = SlotResolver::new().resolve(&spec(&["account_number"]), &supplied);

        assert!(resolution.is_ready());
        assert_eq!(resolution, SlotResolution::Ready(supplied));
    }

    #[test]
    fn resolve_is_idempotent() {
        let resolver = SlotResolver::new();
        let spec = spec(&["account_number"]);
        let supplied = SlotSet::new();

        assert_eq!(resolver.resolve(&spec, &supplied), resolver.resolve(&spec, &supplied));
    }

    #[test]
    fn intents_without_requirements_are_always_ready() {
        let empty = IntentSpec { required_params: BTreeSet::new(), ..spec(&[]) };
        assert!(SlotResolver::new().resolve(&empty, &SlotSet::new()).is_ready());
    }
}
