//! Field declarations.
//!
//! A [`FieldConfig`] names a field's renderer (`component`), its data type,
//! static form/table layout defaults and its validation rules. Runtime
//! overrides never touch these values.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::scope::Scope;
use crate::value::Record;

/// Storage/data type of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Text,
    Number,
    Integer,
    Boolean,
    Date,
    Datetime,
    Array,
    Object,
}

impl DataType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Horizontal alignment for table cells and action bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Static form layout defaults for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormLayout {
    /// Width as a percentage of the row.
    pub width: u32,
    /// Height in rows.
    pub height: u32,
    pub hidden: bool,
    pub disabled: bool,
    /// Sort key among the scoped fields (ascending, stable).
    pub order: i32,
}

impl Default for FormLayout {
    fn default() -> Self {
        Self {
            width: 100,
            height: 1,
            hidden: false,
            disabled: false,
            order: 0,
        }
    }
}

/// Table column metadata for a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    /// Whether the column starts visible.
    pub show: bool,
    pub width: Option<u32>,
    pub sortable: bool,
    pub filterable: bool,
    /// Sort key among visible columns (ascending, stable).
    pub order: i32,
    pub align: Option<Align>,
    /// Cell formatter; only declarable in code.
    #[serde(skip)]
    pub format: Option<ValueFormatter>,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            show: true,
            width: None,
            sortable: false,
            filterable: false,
            order: 0,
            align: None,
            format: None,
        }
    }
}

/// Cell formatter `(value, record) -> text`.
#[derive(Clone)]
pub struct ValueFormatter(Arc<dyn Fn(&Value, &Record) -> String + Send + Sync>);

impl ValueFormatter {
    pub fn new(f: impl Fn(&Value, &Record) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn format(&self, value: &Value, record: &Record) -> String {
        (self.0)(value, record)
    }
}

impl fmt::Debug for ValueFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueFormatter(..)")
    }
}

/// One validation rule attached to a field.
///
/// `params` is either a bare scalar (`3`) or an object (`{ "value": 3 }`);
/// `message`, when set, replaces whatever text the validator produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            params: None,
            message: None,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: impl Into<Value>) -> Self {
        self.params = Some(params.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Declaration of a single field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub name: String,
    /// Renderer kind (e.g. "text", "select", "date").
    #[serde(default = "default_component")]
    pub component: String,
    #[serde(default)]
    pub data_type: DataType,
    /// Component-specific options.
    #[serde(default)]
    pub attrs: Map<String, Value>,
    #[serde(default)]
    pub form: FormLayout,
    #[serde(default)]
    pub table: TableLayout,
    #[serde(default)]
    pub validations: Vec<ValidationRule>,
    /// Group key; only meaningful when the group is declared on the schema.
    #[serde(default)]
    pub group: Option<String>,
    /// Scope allow-list; `None` means every scope.
    #[serde(default)]
    pub scopes: Option<Vec<Scope>>,
    #[serde(default)]
    pub states: Option<Vec<String>>,
    #[serde(default)]
    pub default_value: Option<Value>,
}

fn default_component() -> String {
    "text".to_string()
}

impl FieldConfig {
    /// Create a field with default layout and no rules.
    pub fn new(name: impl Into<String>, component: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            component: component.into(),
            data_type,
            attrs: Map::new(),
            form: FormLayout::default(),
            table: TableLayout::default(),
            validations: Vec::new(),
            group: None,
            scopes: None,
            states: None,
            default_value: None,
        }
    }

    /// Shorthand for a `text` component holding a string.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, "text", DataType::String)
    }

    #[must_use]
    pub fn with_validation(mut self, rule: ValidationRule) -> Self {
        self.validations.push(rule);
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.scopes = Some(scopes.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: FormLayout) -> Self {
        self.form = form;
        self
    }

    #[must_use]
    pub fn with_table(mut self, table: TableLayout) -> Self {
        self.table = table;
        self
    }

    /// Set both the form and the table order.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.form.order = order;
        self.table.order = order;
        self
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_format(
        mut self,
        f: impl Fn(&Value, &Record) -> String + Send + Sync + 'static,
    ) -> Self {
        self.table.format = Some(ValueFormatter::new(f));
        self
    }
}
