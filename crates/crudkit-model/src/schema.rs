//! The resolved schema snapshot consumed by the engines.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::ActionConfig;
use crate::error::{Result, SchemaError};
use crate::field::FieldConfig;
use crate::scope::Scope;
use crate::value::{Record, display_string};

/// The field (or ordered field list) uniquely keying a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Single(String),
    Composite(Vec<String>),
}

impl Default for Identity {
    fn default() -> Self {
        Self::Single("id".to_string())
    }
}

impl Identity {
    /// Field names making up the identity, in key order.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Composite(names) => names.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// Identity string of `record`.
    ///
    /// Composite identities join their values with `:`; missing values render
    /// as the empty string.
    ///
    /// ```
    /// use crudkit_model::{Identity, Record};
    /// use serde_json::json;
    ///
    /// let record: Record = serde_json::from_value(json!({ "org": "acme", "id": 1 })).unwrap();
    /// assert_eq!(Identity::from(["org", "id"]).of(&record), "acme:1");
    /// assert_eq!(Identity::from("id").of(&record), "1");
    /// assert_eq!(Identity::from("missing").of(&record), "");
    /// ```
    pub fn of(&self, record: &Record) -> String {
        let value_of = |name: &str| record.get(name).map(display_string).unwrap_or_default();
        match self {
            Self::Single(name) => value_of(name),
            Self::Composite(names) => names
                .iter()
                .map(|name| value_of(name))
                .collect::<Vec<_>>()
                .join(":"),
        }
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for Identity {
    fn from(names: [&str; N]) -> Self {
        Self::Composite(names.iter().map(|n| (*n).to_string()).collect())
    }
}

/// Presentational metadata for a named field cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    pub icon: Option<String>,
    pub label: Option<String>,
    pub attrs: Map<String, Value>,
}

impl GroupConfig {
    pub fn with_icon(icon: impl Into<String>) -> Self {
        Self {
            icon: Some(icon.into()),
            ..Self::default()
        }
    }
}

/// Read-only schema snapshot for one domain.
///
/// # Example
///
/// ```
/// use crudkit_model::{FieldConfig, SchemaProvide};
///
/// let schema = SchemaProvide::new("users", "id")
///     .with_field(FieldConfig::text("id"))
///     .with_field(FieldConfig::text("name"));
///
/// assert!(schema.field("name").is_some());
/// assert!(schema.check().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaProvide {
    pub domain: String,
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub display: Option<String>,
    /// Full scope set of the domain.
    #[serde(default = "Scope::all")]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub groups: BTreeMap<String, GroupConfig>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

impl SchemaProvide {
    pub fn new(domain: impl Into<String>, identity: impl Into<Identity>) -> Self {
        Self {
            domain: domain.into(),
            identity: identity.into(),
            display: None,
            scopes: Scope::all(),
            groups: BTreeMap::new(),
            fields: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Parse a TOML declaration and check it.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let schema: Self = toml::from_str(source).map_err(|e| SchemaError::Parse {
            format: "toml",
            source: Box::new(e),
        })?;
        schema.check()?;
        Ok(schema)
    }

    /// Parse a JSON declaration and check it.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let schema: Self = serde_json::from_str(source).map_err(|e| SchemaError::Parse {
            format: "json",
            source: Box::new(e),
        })?;
        schema.check()?;
        Ok(schema)
    }

    /// Reject duplicate field/action names and undeclared identity fields.
    ///
    /// Fields referencing undeclared groups are accepted; they render ungrouped.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    domain: self.domain.clone(),
                    name: field.name.clone(),
                });
            }
        }
        for name in self.identity.fields() {
            if !seen.contains(name) {
                return Err(SchemaError::UnknownIdentityField {
                    domain: self.domain.clone(),
                    name: name.to_string(),
                });
            }
        }
        let mut actions = HashSet::new();
        for action in &self.actions {
            if !actions.insert(action.name.as_str()) {
                return Err(SchemaError::DuplicateAction {
                    domain: self.domain.clone(),
                    name: action.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&ActionConfig> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// True if `name` is a declared group.
    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldConfig) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_group(mut self, name: impl Into<String>, group: GroupConfig) -> Self {
        self.groups.insert(name.into(), group);
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: ActionConfig) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}
