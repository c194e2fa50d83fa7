//! Engine error types.
//!
//! Only hook and handler failures surface as errors. Missing handlers,
//! unknown validators and unpermitted actions degrade to no-ops.

use crudkit_model::Scope;
use thiserror::Error;

/// Boxed error returned by user-supplied hooks and handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error surfaced by an engine operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The bootstrap hook rejected.
    #[error("Bootstrap hook for '{domain}' ({scope}) failed")]
    Bootstrap {
        domain: String,
        scope: Scope,
        #[source]
        source: BoxError,
    },

    /// The fetch hook rejected.
    #[error("Fetch hook for '{domain}' ({scope}) failed")]
    Fetch {
        domain: String,
        scope: Scope,
        #[source]
        source: BoxError,
    },

    /// An action handler rejected.
    #[error("Action '{action}' of '{domain}' failed")]
    Action {
        domain: String,
        action: String,
        #[source]
        source: BoxError,
    },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
