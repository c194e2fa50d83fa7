//! Reactive form and table state for schema-driven CRUD screens.
//!
//! Both engines are handles around shared state. They are driven by a
//! [`SchemaProvide`](crudkit_model::SchemaProvide), host services in a
//! [`Component`], and user code registered as [`Hooks`] (bootstrap, fetch)
//! and [`Handlers`] (field events, actions).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use crudkit_engine::{Component, FormEngine, FormOptions};
//! use crudkit_model::{FieldConfig, SchemaProvide, Scope, ValidationRule};
//!
//! let schema = SchemaProvide::new("users", "id")
//!     .with_field(FieldConfig::text("id"))
//!     .with_field(FieldConfig::text("name").with_validation(ValidationRule::new("required")));
//! let form = FormEngine::new(Arc::new(schema), FormOptions::new(Component::new(Scope::Add)));
//!
//! assert!(!form.validate());
//! form.set_value("name", "Ada");
//! assert!(form.valid());
//! assert!(form.dirty());
//! ```

pub mod access;
mod action;
mod component;
mod draft;
mod error;
mod form;
mod handlers;
mod hooks;
mod settings;
mod store;
mod table;

pub use action::ResolvedAction;
pub use component::{Component, Dialog, LoadingIndicator, Navigator, Silent, Toast, ToastLevel};
pub use draft::{FieldProxyMut, SchemaDraft, StateDraft};
pub use error::{BoxError, EngineError, Result};
pub use form::{FieldProps, FormEngine, FormOptions, FormSnapshot, ResolvedField, Section};
pub use handlers::{
    ActionContext, ActionHandler, EventContext, EventHandler, FieldEvent, Handlers, Surface,
};
pub use hooks::{BootstrapContext, BootstrapHook, FetchContext, FetchHook, Hooks};
pub use settings::{FormSettings, Settings, SettingsError, TableSettings};
pub use store::{Listener, Subscription};
pub use table::{Column, Reload, TableEngine, TableOptions, TableSnapshot};
