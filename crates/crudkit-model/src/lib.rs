//! Schema snapshot types consumed by the crudkit form and table engines.
//!
//! A schema is declared once per domain (its fields, groups, actions and
//! identity) and handed to an engine as a read-only [`SchemaProvide`]. The
//! engines never mutate it; runtime render state lives in [`FieldOverride`]
//! overlays owned by each engine instance.
//!
//! # Module Organization
//!
//! - [`field`]: field declarations with form/table layout metadata
//! - [`action`]: action declarations (positions, permissions, row conditions)
//! - [`schema`]: the resolved schema snapshot and its loaders
//! - [`proxy`]: per-field render state and partial overrides
//! - [`query`]: pagination/sort/filter parameters shared with persistence
//! - [`value`]: record type and value display helpers

pub mod action;
pub mod error;
pub mod field;
pub mod proxy;
pub mod query;
pub mod schema;
pub mod scope;
pub mod value;

pub use action::{ActionConfig, ActionVariant, Position, RecordCondition};
pub use error::{Result, SchemaError};
pub use field::{
    Align, DataType, FieldConfig, FormLayout, TableLayout, ValidationRule, ValueFormatter,
};
pub use proxy::{FieldOverride, FieldProxy, Overrides};
pub use query::{Paginated, QueryParams, SortOrder};
pub use schema::{GroupConfig, Identity, SchemaProvide};
pub use scope::Scope;
pub use value::{Record, display_string, is_blank};
