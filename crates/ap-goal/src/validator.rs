// validator.rs — Category-supplied payload validation.
//
// The lifecycle does not know what a Business or Quality goal contains. Each
// category hands it a `PayloadValidator`; the lifecycle only asks which
// required fields are empty. Validation is synchronous and does no I/O, so
// it always runs before anything touches the gateway.

use std::collections::HashMap;

use ap_store::{Category, Payload};
use serde_json::Value;

/// Required-field check supplied by a category.
pub trait PayloadValidator: Send + Sync {
    /// Names of required fields that are absent or empty, in a stable order.
    /// An empty result means the payload is acceptable.
    fn missing_fields(&self, payload: &Payload) -> Vec<String>;
}

/// The common validator: a fixed list of fields that must be non-empty.
///
/// "Empty" means absent, `null`, a blank string, or an empty array/object.
/// Numbers and booleans always count as filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredFields {
    fields: Vec<String>,
}

impl RequiredFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl PayloadValidator for RequiredFields {
    fn missing_fields(&self, payload: &Payload) -> Vec<String> {
        self.fields
            .iter()
            .filter(|name| payload.get(name.as_str()).map_or(true, is_empty))
            .cloned()
            .collect()
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Which validator applies to each category. Categories without one accept
/// any payload.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: HashMap<Category, Box<dyn PayloadValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry of [`RequiredFields`] validators from config.
    pub fn from_required_fields(required: HashMap<Category, Vec<String>>) -> Self {
        let mut registry = Self::new();
        for (category, fields) in required {
            registry.register(category, Box::new(RequiredFields::new(fields)));
        }
        registry
    }

    /// Install (or replace) the validator for a category.
    pub fn register(&mut self, category: Category, validator: Box<dyn PayloadValidator>) {
        self.validators.insert(category, validator);
    }

    /// Missing required fields for `payload` under `category`'s rules.
    pub fn missing_fields(&self, category: Category, payload: &Payload) -> Vec<String> {
        self.validators
            .get(&category)
            .map(|v| v.missing_fields(payload))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let v = RequiredFields::new(["a", "b", "c", "d", "e"]);
        let p = payload(json!({
            "a": "  ",
            "b": null,
            "c": [],
            "d": {},
        }));
        assert_eq!(v.missing_fields(&p), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn filled_values_pass() {
        let v = RequiredFields::new(["objective", "hours", "billable"]);
        let p = payload(json!({
            "objective": "Grow the EMEA pipeline",
            "hours": 0,
            "billable": false,
        }));
        assert!(v.missing_fields(&p).is_empty());
    }

    #[test]
    fn unregistered_category_accepts_anything() {
        let mut registry = ValidatorRegistry::new();
        registry.register(Category::Business, Box::new(RequiredFields::new(["revenue"])));

        assert!(registry
            .missing_fields(Category::Industry, &Payload::new())
            .is_empty());
        assert_eq!(
            registry.missing_fields(Category::Business, &Payload::new()),
            vec!["revenue"]
        );
    }

    #[test]
    fn registry_from_config_map() {
        let mut required = HashMap::new();
        required.insert(Category::People, vec!["coaching_hours".to_string()]);
        let registry = ValidatorRegistry::from_required_fields(required);

        let p = payload(json!({ "coaching_hours": 12 }));
        assert!(registry.missing_fields(Category::People, &p).is_empty());
    }
}
