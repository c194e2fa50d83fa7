//! Validator registry and rule evaluation.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crudkit_model::{FieldConfig, Record, ValidationRule};
use serde_json::Value;

use crate::builtins;
use crate::translate::Translator;

/// A named validator: `(value, params, translate) -> error message`.
pub type ValidatorFn =
    Arc<dyn Fn(&Value, Option<&Value>, Option<&dyn Translator>) -> Option<String> + Send + Sync>;

/// Error messages keyed by field name.
///
/// Fields without errors are absent, never present with an empty list.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Registry of validators indexed by rule name.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, ValidatorFn>,
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorRegistry").field("validators", &names).finish()
    }
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in validators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::install(&mut registry);
        registry
    }

    /// Insert (or replace) a validator.
    pub fn register<F>(&mut self, name: impl Into<String>, validator: F)
    where
        F: Fn(&Value, Option<&Value>, Option<&dyn Translator>) -> Option<String>
            + Send
            + Sync
            + 'static,
    {
        self.validators.insert(name.into(), Arc::new(validator));
    }

    /// Get validator by rule name.
    pub fn get(&self, name: &str) -> Option<&ValidatorFn> {
        self.validators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Number of validators in the registry.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Evaluate `rules` in order against `value`.
    ///
    /// Unknown rule names are skipped. A rule's own `message` replaces the
    /// validator's text.
    pub fn validate_field(
        &self,
        value: &Value,
        rules: &[ValidationRule],
        translate: Option<&dyn Translator>,
    ) -> Vec<String> {
        let mut errors = Vec::new();
        for rule in rules {
            let Some(validator) = self.validators.get(&rule.rule) else {
                tracing::trace!(rule = %rule.rule, "skipping unknown validator");
                continue;
            };
            if let Some(error) = validator(value, rule.params.as_ref(), translate) {
                errors.push(rule.message.clone().unwrap_or(error));
            }
        }
        errors
    }

    /// Validate every field's current value in `state`.
    ///
    /// Only fields with at least one error appear in the result.
    pub fn validate_all_fields<'a>(
        &self,
        state: &Record,
        fields: impl IntoIterator<Item = &'a FieldConfig>,
        translate: Option<&dyn Translator>,
    ) -> FieldErrors {
        let mut result = FieldErrors::new();
        for field in fields {
            let value = state.get(&field.name).unwrap_or(&Value::Null);
            let errors = self.validate_field(value, &field.validations, translate);
            if !errors.is_empty() {
                result.insert(field.name.clone(), errors);
            }
        }
        result
    }
}

static GLOBAL: LazyLock<RwLock<ValidatorRegistry>> =
    LazyLock::new(|| RwLock::new(ValidatorRegistry::with_builtins()));

/// Snapshot of the process-wide registry.
///
/// Validators run against the snapshot, so a validator may itself call
/// [`register_validator`] without deadlocking.
fn global_snapshot() -> ValidatorRegistry {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Register a validator in the process-wide registry.
///
/// Intended for startup; names are shared across the whole process.
pub fn register_validator<F>(name: impl Into<String>, validator: F)
where
    F: Fn(&Value, Option<&Value>, Option<&dyn Translator>) -> Option<String>
        + Send
        + Sync
        + 'static,
{
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, validator);
}

/// Evaluate `rules` against `value` using the process-wide registry.
pub fn validate_field(
    value: &Value,
    rules: &[ValidationRule],
    translate: Option<&dyn Translator>,
) -> Vec<String> {
    global_snapshot().validate_field(value, rules, translate)
}

/// Validate every field using the process-wide registry.
pub fn validate_all_fields<'a>(
    state: &Record,
    fields: impl IntoIterator<Item = &'a FieldConfig>,
    translate: Option<&dyn Translator>,
) -> FieldErrors {
    global_snapshot().validate_all_fields(state, fields, translate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtins_are_installed() {
        let registry = ValidatorRegistry::with_builtins();
        for name in [
            "required",
            "minLength",
            "maxLength",
            "min",
            "max",
            "minDate",
            "maxDate",
            "pattern",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert!(ValidatorRegistry::new().is_empty());
    }

    #[test]
    fn unknown_rules_are_skipped() {
        let registry = ValidatorRegistry::with_builtins();
        let rules = [ValidationRule::new("doesNotExist"), ValidationRule::new("required")];
        assert_eq!(registry.validate_field(&Value::Null, &rules, None).len(), 1);
    }

    #[test]
    fn all_failing_rules_are_reported_in_order() {
        let registry = ValidatorRegistry::with_builtins();
        let rules = [
            ValidationRule::new("minLength").with_params(5),
            ValidationRule::new("pattern")
                .with_params(json!({ "pattern": "^[0-9]+$", "message": "Digits only" })),
        ];
        let errors = registry.validate_field(&json!("ab"), &rules, None);
        assert_eq!(errors, vec!["Must be at least 5 characters", "Digits only"]);
    }

    #[test]
    fn rule_message_wins() {
        let registry = ValidatorRegistry::with_builtins();
        let rules = [ValidationRule::new("required").with_message("Name please")];
        let translate = |_: &str| Some("translated".to_string());
        let errors = registry.validate_field(&json!(""), &rules, Some(&translate));
        assert_eq!(errors, vec!["Name please"]);
    }

    #[test]
    fn scoped_registry_is_isolated() {
        let mut scoped = ValidatorRegistry::with_builtins();
        scoped.register("even", |value, _, _| {
            value
                .as_i64()
                .filter(|n| n % 2 != 0)
                .map(|_| "Must be even".to_string())
        });
        let rules = [ValidationRule::new("even")];
        assert_eq!(scoped.validate_field(&json!(3), &rules, None), vec!["Must be even"]);
        assert!(validate_field(&json!(3), &rules, None).is_empty());
    }

    #[test]
    fn validate_all_omits_passing_fields() {
        let registry = ValidatorRegistry::with_builtins();
        let fields = [
            FieldConfig::text("name").with_validation(ValidationRule::new("required")),
            FieldConfig::text("email").with_validation(ValidationRule::new("required")),
            FieldConfig::text("notes"),
        ];
        let mut state = Record::new();
        state.insert("name".into(), json!("Alice"));
        let errors = registry.validate_all_fields(&state, &fields, None);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("email"));
        assert!(!errors.contains_key("name"));
        assert!(!errors.contains_key("notes"));
    }
}
