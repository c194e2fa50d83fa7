//! Mutation-tracking drafts handed to event handlers and bootstrap hooks.
//!
//! Handlers mutate through the drafts; the engine afterwards reads back only
//! what was written and merges it into its own state.

use std::collections::BTreeMap;

use crudkit_model::{FieldConfig, FieldOverride, FieldProxy, FormLayout, Overrides, Record};
use serde_json::Value;

/// Copy of form values recording every key written.
#[derive(Debug, Clone, Default)]
pub struct StateDraft {
    values: Record,
    changes: Record,
}

impl StateDraft {
    pub fn new(values: &Record) -> Self {
        Self {
            values: values.clone(),
            changes: Record::new(),
        }
    }

    /// Current value of `key`; missing keys read as `Null`.
    pub fn get(&self, key: &str) -> &Value {
        self.values.get(key).unwrap_or(&Value::Null)
    }

    /// Write `key`. Writing an unchanged value still records it.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        self.values.insert(key.clone(), value.clone());
        self.changes.insert(key, value);
    }

    /// Every key written so far, with its last value.
    pub fn changes(&self) -> &Record {
        &self.changes
    }

    pub fn into_changes(self) -> Record {
        self.changes
    }
}

struct DraftField {
    layout: FormLayout,
    committed: FieldOverride,
    overrides: FieldOverride,
}

/// Per-field proxy view recording property writes as overrides.
///
/// Fields are materialized from the declared fields at construction;
/// unknown names are absent.
pub struct SchemaDraft {
    fields: BTreeMap<String, DraftField>,
}

impl SchemaDraft {
    /// Build a draft over `fields`, starting from previously committed
    /// `overrides` for reads. Only writes made through this draft are
    /// reported by [`SchemaDraft::overrides`].
    pub fn new(fields: &[FieldConfig], overrides: &Overrides) -> Self {
        let fields = fields
            .iter()
            .map(|field| {
                (
                    field.name.clone(),
                    DraftField {
                        layout: field.form.clone(),
                        committed: overrides.get(&field.name).cloned().unwrap_or_default(),
                        overrides: FieldOverride::default(),
                    },
                )
            })
            .collect();
        Self { fields }
    }

    /// Current proxy of `name` including writes made through this draft.
    pub fn field(&self, name: &str) -> Option<FieldProxy> {
        let field = self.fields.get(name)?;
        let mut current = field.committed.clone();
        current.merge(&field.overrides);
        Some(FieldProxy::resolve(&field.layout, Some(&current)))
    }

    pub fn field_mut(&mut self, name: &str) -> Option<FieldProxyMut<'_>> {
        self.fields.get_mut(name).map(|field| FieldProxyMut {
            overrides: &mut field.overrides,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Writes made through this draft; untouched fields are omitted.
    pub fn overrides(&self) -> Overrides {
        self.fields
            .iter()
            .filter(|(_, field)| !field.overrides.is_empty())
            .map(|(name, field)| (name.clone(), field.overrides.clone()))
            .collect()
    }
}

/// Mutable handle to one field of a [`SchemaDraft`].
pub struct FieldProxyMut<'a> {
    overrides: &'a mut FieldOverride,
}

impl FieldProxyMut<'_> {
    pub fn set_width(&mut self, width: u32) -> &mut Self {
        self.overrides.width = Some(width);
        self
    }

    pub fn set_height(&mut self, height: u32) -> &mut Self {
        self.overrides.height = Some(height);
        self
    }

    pub fn set_hidden(&mut self, hidden: bool) -> &mut Self {
        self.overrides.hidden = Some(hidden);
        self
    }

    pub fn set_disabled(&mut self, disabled: bool) -> &mut Self {
        self.overrides.disabled = Some(disabled);
        self
    }

    pub fn set_state(&mut self, state: impl Into<String>) -> &mut Self {
        self.overrides.state = Some(state.into());
        self
    }
}

/// Shallow-merge `incoming` into `target`, field by field.
pub(crate) fn merge_overrides(target: &mut Overrides, incoming: Overrides) {
    for (name, overrides) in incoming {
        target.entry(name).or_default().merge(&overrides);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_draft_records_writes_only() {
        let mut values = Record::new();
        values.insert("a".into(), json!(1));
        values.insert("b".into(), json!(2));
        let mut draft = StateDraft::new(&values);

        assert_eq!(draft.get("a"), &json!(1));
        assert_eq!(draft.get("missing"), &Value::Null);
        assert!(draft.changes().is_empty());

        draft.set("b", 2);
        draft.set("c", "x");
        assert_eq!(draft.get("c"), &json!("x"));
        let changes = draft.into_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes["b"], json!(2));
    }

    #[test]
    fn schema_draft_reports_touched_fields() {
        let fields = [FieldConfig::text("a"), FieldConfig::text("b")];
        let mut draft = SchemaDraft::new(&fields, &Overrides::new());
        assert!(draft.field_mut("missing").is_none());

        if let Some(mut field) = draft.field_mut("a") {
            field.set_hidden(true).set_width(50);
        }
        let proxy = draft.field("a").expect("declared field");
        assert!(proxy.hidden);
        assert_eq!(proxy.width, 50);

        let overrides = draft.overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["a"].hidden, Some(true));
        assert_eq!(overrides["a"].disabled, None);
    }

    #[test]
    fn schema_draft_reads_committed_overrides() {
        let fields = [FieldConfig::text("a")];
        let mut committed = Overrides::new();
        committed.insert(
            "a".into(),
            FieldOverride {
                disabled: Some(true),
                ..FieldOverride::default()
            },
        );
        let draft = SchemaDraft::new(&fields, &committed);
        assert_eq!(draft.field("a").map(|p| p.disabled), Some(true));
        assert!(draft.overrides().is_empty());
    }

    #[test]
    fn merge_is_shallow_per_field() {
        let mut target = Overrides::new();
        target.insert(
            "a".into(),
            FieldOverride {
                hidden: Some(true),
                width: Some(30),
                ..FieldOverride::default()
            },
        );
        let mut incoming = Overrides::new();
        incoming.insert(
            "a".into(),
            FieldOverride {
                hidden: Some(false),
                ..FieldOverride::default()
            },
        );
        merge_overrides(&mut target, incoming);
        assert_eq!(target["a"].hidden, Some(false));
        assert_eq!(target["a"].width, Some(30));
    }
}
