//! Per-field render state.
//!
//! [`FieldProxy`] is what a renderer reads for one field: the static
//! [`FormLayout`] defaults overlaid with whatever [`FieldOverride`] the
//! bootstrap hook or event handlers recorded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::FormLayout;

/// Current render state of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProxy {
    pub width: u32,
    pub height: u32,
    pub hidden: bool,
    pub disabled: bool,
    /// Interaction state tag (e.g. "loading"); empty by default.
    pub state: String,
}

impl Default for FieldProxy {
    /// The universal default, used for unknown fields.
    fn default() -> Self {
        Self::from_layout(&FormLayout::default())
    }
}

impl FieldProxy {
    /// Proxy carrying only the static defaults.
    pub fn from_layout(layout: &FormLayout) -> Self {
        Self {
            width: layout.width,
            height: layout.height,
            hidden: layout.hidden,
            disabled: layout.disabled,
            state: String::new(),
        }
    }

    /// `override ?? layout` per property.
    pub fn resolve(layout: &FormLayout, overrides: Option<&FieldOverride>) -> Self {
        let mut proxy = Self::from_layout(layout);
        if let Some(overrides) = overrides {
            overrides.apply_to(&mut proxy);
        }
        proxy
    }
}

/// Partial [`FieldProxy`]: only the properties a handler touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl FieldOverride {
    /// True if no property was touched.
    pub fn is_empty(&self) -> bool {
        self.width.is_none()
            && self.height.is_none()
            && self.hidden.is_none()
            && self.disabled.is_none()
            && self.state.is_none()
    }

    /// Shallow merge: properties set on `other` win.
    pub fn merge(&mut self, other: &FieldOverride) {
        if let Some(width) = other.width {
            self.width = Some(width);
        }
        if let Some(height) = other.height {
            self.height = Some(height);
        }
        if let Some(hidden) = other.hidden {
            self.hidden = Some(hidden);
        }
        if let Some(disabled) = other.disabled {
            self.disabled = Some(disabled);
        }
        if let Some(state) = &other.state {
            self.state = Some(state.clone());
        }
    }

    fn apply_to(&self, proxy: &mut FieldProxy) {
        if let Some(width) = self.width {
            proxy.width = width;
        }
        if let Some(height) = self.height {
            proxy.height = height;
        }
        if let Some(hidden) = self.hidden {
            proxy.hidden = hidden;
        }
        if let Some(disabled) = self.disabled {
            proxy.disabled = disabled;
        }
        if let Some(state) = &self.state {
            proxy.state.clone_from(state);
        }
    }
}

/// Overrides keyed by field name.
pub type Overrides = BTreeMap<String, FieldOverride>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universal_default() {
        let proxy = FieldProxy::default();
        assert_eq!(proxy.width, 100);
        assert_eq!(proxy.height, 1);
        assert!(!proxy.hidden);
        assert!(!proxy.disabled);
        assert_eq!(proxy.state, "");
    }

    #[test]
    fn resolve_prefers_override() {
        let layout = FormLayout {
            width: 50,
            disabled: true,
            ..FormLayout::default()
        };
        let overrides = FieldOverride {
            hidden: Some(true),
            state: Some("loading".into()),
            ..FieldOverride::default()
        };
        let proxy = FieldProxy::resolve(&layout, Some(&overrides));
        assert_eq!(proxy.width, 50);
        assert!(proxy.disabled);
        assert!(proxy.hidden);
        assert_eq!(proxy.state, "loading");
    }

    #[test]
    fn merge_is_per_property() {
        let mut current = FieldOverride {
            width: Some(30),
            hidden: Some(true),
            ..FieldOverride::default()
        };
        current.merge(&FieldOverride {
            hidden: Some(false),
            ..FieldOverride::default()
        });
        assert_eq!(current.width, Some(30));
        assert_eq!(current.hidden, Some(false));
        assert!(!current.is_empty());
        assert!(FieldOverride::default().is_empty());
    }
}
