//! Persistence error types.

use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The resource was never initialized on this driver.
    #[error("Resource '{resource}' is not initialized")]
    NotInitialized { resource: String },

    /// No record carries the requested identity.
    #[error("No record '{id}' in resource '{resource}'")]
    NotFound { resource: String, id: String },

    /// A record with the same identity already exists.
    #[error("Record '{id}' already exists in resource '{resource}'")]
    Duplicate { resource: String, id: String },

    /// An identity field is missing or null.
    #[error("Record for resource '{resource}' is missing identity field '{field}'")]
    MissingIdentity { resource: String, field: String },
}

impl PersistError {
    /// Resource the failed operation targeted.
    pub fn resource(&self) -> &str {
        match self {
            Self::NotInitialized { resource }
            | Self::NotFound { resource, .. }
            | Self::Duplicate { resource, .. }
            | Self::MissingIdentity { resource, .. } => resource,
        }
    }

    /// Remediation hint, if there is an obvious one.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotInitialized { .. } => {
                Some("Call Driver::initialize for this resource first.".to_string())
            }
            Self::MissingIdentity { field, .. } => {
                Some(format!("Provide a non-null value for '{field}'."))
            }
            Self::NotFound { .. } | Self::Duplicate { .. } => None,
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistError>;
