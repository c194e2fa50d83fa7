//! Field validation for crudkit schemas.
//!
//! Validators are pure functions looked up by name in a [`ValidatorRegistry`].
//! A field's [`ValidationRule`](crudkit_model::ValidationRule) list is
//! evaluated in order and every failing rule contributes one message; there
//! is no first-error short-circuit. Unknown rule names are skipped so that
//! schemas can reference validators a given build does not register.
//!
//! # Registries
//!
//! The free functions ([`validate_field`], [`validate_all_fields`],
//! [`register_validator`]) use a process-wide registry seeded with the
//! built-ins. Register custom validators once at startup; names are a shared
//! namespace. Isolated contexts construct their own registry with
//! [`ValidatorRegistry::with_builtins`].
//!
//! # Example
//!
//! ```
//! use crudkit_model::ValidationRule;
//! use crudkit_validate::validate_field;
//! use serde_json::json;
//!
//! let rules = [ValidationRule::new("required")];
//! assert_eq!(validate_field(&json!(""), &rules, None).len(), 1);
//! assert!(validate_field(&json!(0), &rules, None).is_empty());
//! ```

mod builtins;
mod registry;
mod translate;

pub use builtins::param;
pub use registry::{
    FieldErrors, ValidatorFn, ValidatorRegistry, register_validator, validate_all_fields,
    validate_field,
};
pub use translate::{Translator, message};
