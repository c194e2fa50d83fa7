//! Action declarations.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::field::Align;
use crate::scope::Scope;
use crate::value::Record;

/// Where an action may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    Footer,
    Floating,
    /// Once per table row.
    Row,
}

/// Visual variant hint for renderers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVariant {
    #[default]
    Default,
    Primary,
    Secondary,
    Success,
    Warning,
    Danger,
    Link,
}

/// Per-record predicate deciding whether a row action applies.
#[derive(Clone)]
pub struct RecordCondition(Arc<dyn Fn(&Record) -> bool + Send + Sync>);

impl RecordCondition {
    pub fn new(f: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn test(&self, record: &Record) -> bool {
        (self.0)(record)
    }
}

impl fmt::Debug for RecordCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecordCondition(..)")
    }
}

/// Declaration of a named action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    pub name: String,
    #[serde(default)]
    pub variant: ActionVariant,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub align: Option<Align>,
    #[serde(default)]
    pub hidden: bool,
    /// Skip the permission-string check entirely.
    #[serde(default)]
    pub open: bool,
    /// Scope allow-list; `None` means every scope.
    #[serde(default)]
    pub scopes: Option<Vec<Scope>>,
    #[serde(default)]
    pub order: i32,
    /// Row actions only; only declarable in code.
    #[serde(skip)]
    pub condition: Option<RecordCondition>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl ActionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variant: ActionVariant::Default,
            positions: Vec::new(),
            align: None,
            hidden: false,
            open: false,
            scopes: None,
            order: 0,
            condition: None,
            icon: None,
        }
    }

    /// True if the action renders per record.
    pub fn is_row(&self) -> bool {
        self.positions.contains(&Position::Row)
    }

    /// Evaluate the row condition; no condition means always.
    pub fn applies_to(&self, record: &Record) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.test(record))
    }

    #[must_use]
    pub fn with_positions(mut self, positions: impl IntoIterator<Item = Position>) -> Self {
        self.positions = positions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.scopes = Some(scopes.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    #[must_use]
    pub fn with_condition(mut self, f: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        self.condition = Some(RecordCondition::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_condition_defaults_to_always() {
        let action = ActionConfig::new("edit").with_positions([Position::Row]);
        assert!(action.is_row());
        assert!(action.applies_to(&Record::new()));
    }

    #[test]
    fn row_condition_filters_records() {
        let action = ActionConfig::new("archive")
            .with_positions([Position::Row, Position::Top])
            .with_condition(|r| r.get("status") == Some(&json!("active")));
        let mut record = Record::new();
        record.insert("status".into(), json!("active"));
        assert!(action.applies_to(&record));
        record.insert("status".into(), json!("inactive"));
        assert!(!action.applies_to(&record));
    }
}
