//! Seam to the external translation lookup.

use std::collections::HashMap;

/// Looks up a message template by key.
///
/// Returning `None` lets the caller fall back to its built-in text.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> Option<String>;
}

impl<F> Translator for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn translate(&self, key: &str) -> Option<String> {
        self(key)
    }
}

impl Translator for HashMap<String, String> {
    fn translate(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Resolve `key` through `translate` (or `fallback`) and substitute
/// `{name}` placeholders.
pub fn message(
    translate: Option<&dyn Translator>,
    key: &str,
    fallback: &str,
    args: &[(&str, String)],
) -> String {
    let mut text = translate
        .and_then(|t| t.translate(key))
        .unwrap_or_else(|| fallback.to_string());
    for (name, value) in args {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_without_translator() {
        let args = [("min", "3".to_string())];
        let text = message(None, "validation.min", "Must be at least {min}", &args);
        assert_eq!(text, "Must be at least 3");
    }

    #[test]
    fn map_translator_wins_over_fallback() {
        let mut catalog = HashMap::new();
        catalog.insert("validation.min".to_string(), "Mindestens {min}".to_string());
        let text = message(Some(&catalog), "validation.min", "Must be at least {min}", &[(
            "min",
            "3".into(),
        )]);
        assert_eq!(text, "Mindestens 3");
    }

    #[test]
    fn closure_translator_may_miss() {
        let translate =
            |key: &str| (key == "validation.required").then(|| "Pflichtfeld".to_string());
        assert_eq!(message(Some(&translate), "validation.required", "x", &[]), "Pflichtfeld");
        assert_eq!(message(Some(&translate), "validation.other", "x", &[]), "x");
    }
}
