//! Record type and value display helpers.

use serde_json::{Map, Value};

/// A record: field name to value.
///
/// Absent values and explicit nulls are both `Value::Null` once a record has
/// been initialised by an engine.
pub type Record = Map<String, Value>;

/// Converts a value to its display string.
///
/// Returns an empty string for `Null` (never the literal `"null"`), strings
/// without quotes, and JSON text for arrays and objects.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use crudkit_model::display_string;
///
/// assert_eq!(display_string(&json!(null)), "");
/// assert_eq!(display_string(&json!("acme")), "acme");
/// assert_eq!(display_string(&json!(42)), "42");
/// assert_eq!(display_string(&json!(true)), "true");
/// ```
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// True for `Null` and the empty string.
///
/// `0` and `false` are not blank.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_values() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(!is_blank(&json!(" ")));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!(false)));
    }

    #[test]
    fn display_nested_values_as_json() {
        assert_eq!(display_string(&json!([1, 2])), "[1,2]");
        assert_eq!(display_string(&json!(1.5)), "1.5");
    }
}
