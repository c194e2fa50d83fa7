//! Built-in validators.
//!
//! Every built-in is a no-op on values of the wrong type; `required` is the
//! only one that looks at emptiness.

use crudkit_model::{display_string, is_blank};
use regex::Regex;
use serde_json::Value;

use crate::registry::ValidatorRegistry;
use crate::translate::{Translator, message};

pub(crate) fn install(registry: &mut ValidatorRegistry) {
    registry.register("required", required);
    registry.register("minLength", min_length);
    registry.register("maxLength", max_length);
    registry.register("min", min);
    registry.register("max", max);
    registry.register("minDate", min_date);
    registry.register("maxDate", max_date);
    registry.register("pattern", pattern);
}

/// Read a rule parameter.
///
/// Bare scalars are returned as-is; objects are searched for `key`, then
/// for `value`.
///
/// ```
/// use crudkit_validate::param;
/// use serde_json::json;
///
/// assert_eq!(param(Some(&json!(3)), "min"), Some(&json!(3)));
/// assert_eq!(param(Some(&json!({ "value": 3 })), "min"), Some(&json!(3)));
/// assert_eq!(param(Some(&json!({ "min": 4 })), "min"), Some(&json!(4)));
/// assert_eq!(param(None, "min"), None);
/// ```
pub fn param<'a>(params: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    match params? {
        Value::Object(map) => map.get(key).or_else(|| map.get("value")),
        Value::Null => None,
        other => Some(other),
    }
}

fn required(
    value: &Value,
    _: Option<&Value>,
    translate: Option<&dyn Translator>,
) -> Option<String> {
    is_blank(value)
        .then(|| message(translate, "validation.required", "This field is required", &[]))
}

fn min_length(
    value: &Value,
    params: Option<&Value>,
    translate: Option<&dyn Translator>,
) -> Option<String> {
    let text = value.as_str()?;
    let bound = param(params, "min")?.as_u64()?;
    (text.chars().count() < bound as usize).then(|| {
        message(
            translate,
            "validation.minLength",
            "Must be at least {min} characters",
            &[("min", bound.to_string())],
        )
    })
}

fn max_length(
    value: &Value,
    params: Option<&Value>,
    translate: Option<&dyn Translator>,
) -> Option<String> {
    let text = value.as_str()?;
    let bound = param(params, "max")?.as_u64()?;
    (text.chars().count() > bound as usize).then(|| {
        message(
            translate,
            "validation.maxLength",
            "Must be at most {max} characters",
            &[("max", bound.to_string())],
        )
    })
}

fn min(
    value: &Value,
    params: Option<&Value>,
    translate: Option<&dyn Translator>,
) -> Option<String> {
    let number = value.as_f64()?;
    let bound = param(params, "min")?;
    (number < bound.as_f64()?).then(|| {
        message(
            translate,
            "validation.min",
            "Must be at least {min}",
            &[("min", display_string(bound))],
        )
    })
}

fn max(
    value: &Value,
    params: Option<&Value>,
    translate: Option<&dyn Translator>,
) -> Option<String> {
    let number = value.as_f64()?;
    let bound = param(params, "max")?;
    (number > bound.as_f64()?).then(|| {
        message(
            translate,
            "validation.max",
            "Must be at most {max}",
            &[("max", display_string(bound))],
        )
    })
}

// Dates compare as plain strings; only zero-padded ISO-8601 orders correctly.
fn min_date(
    value: &Value,
    params: Option<&Value>,
    translate: Option<&dyn Translator>,
) -> Option<String> {
    let date = value.as_str().filter(|s| !s.is_empty())?;
    let bound = param(params, "min")?.as_str()?;
    (date < bound).then(|| {
        message(
            translate,
            "validation.minDate",
            "Must be on or after {min}",
            &[("min", bound.to_string())],
        )
    })
}

fn max_date(
    value: &Value,
    params: Option<&Value>,
    translate: Option<&dyn Translator>,
) -> Option<String> {
    let date = value.as_str().filter(|s| !s.is_empty())?;
    let bound = param(params, "max")?.as_str()?;
    (date > bound).then(|| {
        message(
            translate,
            "validation.maxDate",
            "Must be on or before {max}",
            &[("max", bound.to_string())],
        )
    })
}

fn pattern(
    value: &Value,
    params: Option<&Value>,
    translate: Option<&dyn Translator>,
) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let source = param(params, "pattern")?.as_str()?;
    let regex = match Regex::new(source) {
        Ok(regex) => regex,
        Err(error) => {
            tracing::warn!(pattern = source, %error, "ignoring invalid pattern rule");
            return None;
        }
    };
    if regex.is_match(&text) {
        return None;
    }
    let custom = params
        .and_then(|p| p.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(custom.unwrap_or_else(|| message(translate, "validation.pattern", "Invalid format", &[])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_only_fails_on_null_and_empty_string() {
        assert!(required(&Value::Null, None, None).is_some());
        assert!(required(&json!(""), None, None).is_some());
        assert!(required(&json!(0), None, None).is_none());
        assert!(required(&json!(false), None, None).is_none());
        assert!(required(&json!([]), None, None).is_none());
    }

    #[test]
    fn length_counts_characters() {
        let params = json!(3);
        assert!(min_length(&json!("äöü"), Some(&params), None).is_none());
        assert!(min_length(&json!("ab"), Some(&params), None).is_some());
        assert!(max_length(&json!("abcd"), Some(&params), None).is_some());
        assert!(max_length(&json!(12345), Some(&params), None).is_none());
    }

    #[test]
    fn numeric_bounds_ignore_non_numbers() {
        let params = json!({ "value": 10 });
        assert!(min(&json!(9.5), Some(&params), None).is_some());
        assert!(min(&json!(10), Some(&params), None).is_none());
        assert!(min(&json!("5"), Some(&params), None).is_none());
        assert_eq!(
            max(&json!(11), Some(&params), None).as_deref(),
            Some("Must be at most 10")
        );
    }

    #[test]
    fn dates_compare_lexicographically() {
        let params = json!("2024-01-15");
        assert!(min_date(&json!("2024-01-14"), Some(&params), None).is_some());
        assert!(min_date(&json!("2024-01-15"), Some(&params), None).is_none());
        assert!(max_date(&json!("2024-02-01"), Some(&params), None).is_some());
        // Not zero-padded: "2024-1-5" sorts after "2024-01-15" as text.
        assert!(max_date(&json!("2024-1-5"), Some(&params), None).is_some());
        assert!(min_date(&json!("2024-1-5"), Some(&params), None).is_none());
        assert!(min_date(&json!(""), Some(&params), None).is_none());
    }

    #[test]
    fn pattern_message_precedence() {
        let plain = json!("^a+$");
        assert_eq!(pattern(&json!("b"), Some(&plain), None).as_deref(), Some("Invalid format"));

        let translate = |key: &str| (key == "validation.pattern").then(|| "Ungültig".to_string());
        assert_eq!(
            pattern(&json!("b"), Some(&plain), Some(&translate)).as_deref(),
            Some("Ungültig")
        );

        let custom = json!({ "pattern": "^a+$", "message": "Only a" });
        assert_eq!(
            pattern(&json!("b"), Some(&custom), Some(&translate)).as_deref(),
            Some("Only a")
        );
        assert!(pattern(&json!("aaa"), Some(&custom), None).is_none());
    }

    #[test]
    fn invalid_pattern_never_fails_the_field() {
        let params = json!("(unclosed");
        assert!(pattern(&json!("x"), Some(&params), None).is_none());
    }

    #[test]
    fn pattern_tests_numbers_as_text() {
        let params = json!("^[0-9]{3}$");
        assert!(pattern(&json!(123), Some(&params), None).is_none());
        assert!(pattern(&json!(12), Some(&params), None).is_some());
        assert!(pattern(&Value::Null, Some(&params), None).is_none());
    }
}
