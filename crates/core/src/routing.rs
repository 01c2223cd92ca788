use std::collections::BTreeMap;

use crate::domain::intent::IntentId;
use crate::registry::IntentRegistry;

/// Maps platform labels (fulfillment tags, intent display names) onto
/// registered intent ids. Every webhook shape routes through here.
///
/// Labels and alias keys are compared in [`normalize_label`] form. Resolution
/// order: configured alias, then a registered id equal to the normalized
/// label, then [`IntentId::unrouted`].
#[derive(Clone, Debug, Default)]
pub struct TagRouter {
    aliases: BTreeMap<String, IntentId>,
    known_ids: Vec<IntentId>,
}

impl TagRouter {
    pub fn new(aliases: &BTreeMap<String, String>, registry: &IntentRegistry) -> Self {
        let aliases = aliases
            .iter()
            .map(|(tag, intent)| (normalize_label(tag), IntentId::new(intent.trim())))
            .collect();
        Self { aliases, known_ids: registry.ids().cloned().collect() }
    }

    pub fn route(&self, label: &str) -> IntentId {
        let normalized = normalize_label(label);
        if normalized.is_empty() {
            return IntentId::unrouted();
        }

        if let Some(intent) = self.aliases.get(&normalized) {
            return intent.clone();
        }

        self.known_ids
            .iter()
            .find(|id| id.as_str() == normalized)
            .cloned()
            .unwrap_or_else(IntentId::unrouted)
    }
}

/// `Banking.Balance Enquiry` -> `balance_enquiry`.
pub fn normalize_label(label: &str) -> String {
    let last_segment = label.trim().rsplit('.').next().unwrap_or_default();
    last_segment
        .trim()
        .chars()
        .map(|ch| if ch == ' ' || ch == '-' { '_' } else { ch.to_ascii_lowercase() })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::domain::intent::IntentId;
    use crate::registry::IntentRegistry;

    use super::{normalize_label, TagRouter};

    fn router() -> TagRouter {
        let registry = IntentRegistry::builtin().expect("builtin templates parse");
        let mut aliases = BTreeMap::new();
        aliases.insert("WaveAPITag".to_string(), "balance_enquiry".to_string());
        TagRouter::new(&aliases, &registry)
    }

    #[test]
    fn alias_match_is_case_insensitive() {
        let router = router();
        assert_eq!(router.route("WaveAPITag"), IntentId::new("balance_enquiry"));
        assert_eq!(router.route("  waveapitag "), IntentId::new("balance_enquiry"));
    }

    #[test]
    fn aliases_match_dotted_and_dashed_labels() {
        let registry = IntentRegistry::builtin().expect("builtin templates parse");
        let mut aliases = BTreeMap::new();
        aliases.insert("WaveAPITag".to_string(), "balance_enquiry".to_string());
        aliases.insert("check balance".to_string(), "balance_enquiry".to_string());
        let router = TagRouter::new(&aliases, &registry);

        assert_eq!(router.route("Banking.WaveAPITag"), IntentId::new("balance_enquiry"));
        assert_eq!(router.route("Check-Balance"), IntentId::new("balance_enquiry"));
        assert_eq!(router.route("check_balance"), IntentId::new("balance_enquiry"));
        assert!(router.route("Banking.").is_unrouted());
    }

    #[test]
    fn registered_ids_route_directly() {
        let router = router();
        assert_eq!(router.route("loan_balance"), IntentId::new("loan_balance"));
        assert_eq!(router.route("Loan Status"), IntentId::new("loan_status"));
        assert_eq!(router.route("banking.loan-balance"), IntentId::new("loan_balance"));
    }

    #[test]
    fn unknown_and_empty_labels_are_unrouted() {
        let router = router();
        assert!(router.route("XYZ").is_unrouted());
        assert!(router.route("").is_unrouted());
        assert!(router.route("unsupported_intent").is_unrouted());
    }

    #[test]
    fn normalize_label_uses_last_path_segment() {
        assert_eq!(normalize_label("Banking.Balance Enquiry"), "balance_enquiry");
        assert_eq!(normalize_label("loan-status"), "loan_status");
    }
}
