//! UI scopes gating field and action visibility.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the fixed UI modes a surface is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Listing surface.
    Index,
    /// Create form.
    Add,
    /// Read-only detail.
    View,
    /// Edit form.
    Edit,
}

impl Scope {
    /// Every scope, in declaration order.
    pub const ALL: [Scope; 4] = [Scope::Index, Scope::Add, Scope::View, Scope::Edit];

    /// Wire name used in permission strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Add => "add",
            Self::View => "view",
            Self::Edit => "edit",
        }
    }

    /// Parse a scope name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "index" => Some(Self::Index),
            "add" => Some(Self::Add),
            "view" => Some(Self::View),
            "edit" => Some(Self::Edit),
            _ => None,
        }
    }

    pub(crate) fn all() -> Vec<Scope> {
        Self::ALL.to_vec()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| format!("unknown scope '{s}' (expected index, add, view or edit)"))
    }
}
