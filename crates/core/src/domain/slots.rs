use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller-supplied parameters for one request. A slot whose value is `None`
/// or blank is treated as not supplied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSet(BTreeMap<String, Option<String>>);

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a slot set from a platform parameter object. Non-object input
    /// yields an empty set.
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        Self(object.iter().map(|(name, raw)| (name.clone(), normalize_value(raw))).collect())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.0.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, Some(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|value| value.as_deref()).filter(|value| !value.trim().is_empty())
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Present slots only, as a JSON object for downstream payloads.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in self.iter() {
            if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
                object.insert(name.to_string(), Value::String(value.to_string()));
            }
        }
        Value::Object(object)
    }
}

fn normalize_value(raw: &Value) -> Option<String> {
    match raw {
        Value::Null => None,
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::SlotSet;

    #[test]
    fn from_json_normalizes_scalar_values() {
        let slots = SlotSet::from_json(&json!({
            "account_number": " 123456 ",
            "amount": 250.5,
            "confirmed": true,
            "nickname": null,
            "memo": "   ",
            "tags": [],
        }));

        assert_eq!(slots.get("account_number"), Some("123456"));
        assert_eq!(slots.get("amount"), Some("250.5"));
        assert_eq!(slots.get("confirmed"), Some("true"));
        assert!(!slots.is_present("nickname"));
        assert!(!slots.is_present("memo"));
        assert!(!slots.is_present("tags"));
        assert_eq!(slots.len(), 6);
    }

    #[test]
    fn from_json_ignores_non_object_input() {
        assert!(SlotSet::from_json(&json!("account_number")).is_empty());
        assert!(SlotSet::from_json(&json!(null)).is_empty());
    }

    #[test]
    fn to_json_drops_absent_slots() {
        let mut slots = SlotSet::new().with("account_number", "42");
        slots.insert("branch", None);

        assert_eq!(slots.to_json(), json!({ "account_number": "42" }));
    }
}
