//! Schema loading errors.

use thiserror::Error;

/// Error raised while loading or checking a schema declaration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// The declaration could not be parsed.
    #[error("Failed to parse {format} schema")]
    Parse {
        /// Source format ("toml" or "json").
        format: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Two fields share a name.
    #[error("Field '{name}' is declared more than once in domain '{domain}'")]
    DuplicateField { domain: String, name: String },

    /// Two actions share a name.
    #[error("Action '{name}' is declared more than once in domain '{domain}'")]
    DuplicateAction { domain: String, name: String },

    /// The identity references a field that is not declared.
    #[error("Identity field '{name}' is not declared in domain '{domain}'")]
    UnknownIdentityField { domain: String, name: String },
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
