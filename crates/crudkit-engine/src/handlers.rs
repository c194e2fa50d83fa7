//! Field-event and action handlers.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crudkit_model::Record;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::component::Component;
use crate::draft::{SchemaDraft, StateDraft};
use crate::error::BoxError;
use crate::form::FormEngine;
use crate::table::TableEngine;

/// Field interaction that can trigger a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEvent {
    Change,
    Blur,
    Focus,
}

impl FieldEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Blur => "blur",
            Self::Focus => "focus",
        }
    }
}

impl fmt::Display for FieldEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument of a field-event handler.
pub struct EventContext {
    /// Candidate values; writes are merged back into the form.
    pub state: StateDraft,
    /// Field render state; writes become overrides.
    pub schema: SchemaDraft,
    pub field: String,
    pub event: FieldEvent,
}

/// The surface an action was executed from.
#[derive(Clone)]
pub enum Surface {
    Form(FormEngine),
    Table(TableEngine),
}

/// Argument of an action handler.
#[derive(Clone)]
pub struct ActionContext {
    /// Form values, or the row record for row actions. Empty for
    /// table-level actions.
    pub state: Record,
    pub component: Arc<Component>,
    pub surface: Surface,
}

impl ActionContext {
    pub fn form(&self) -> Option<&FormEngine> {
        match &self.surface {
            Surface::Form(form) => Some(form),
            Surface::Table(_) => None,
        }
    }

    pub fn table(&self) -> Option<&TableEngine> {
        match &self.surface {
            Surface::Table(table) => Some(table),
            Surface::Form(_) => None,
        }
    }
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let surface = match self.surface {
            Surface::Form(_) => "form",
            Surface::Table(_) => "table",
        };
        f.debug_struct("ActionContext")
            .field("state", &self.state)
            .field("component", &self.component)
            .field("surface", &surface)
            .finish()
    }
}

pub type EventHandler = Arc<dyn Fn(&mut EventContext) + Send + Sync>;

pub type ActionHandler =
    Arc<dyn Fn(ActionContext) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Handlers registered for a surface.
#[derive(Clone, Default)]
pub struct Handlers {
    events: HashMap<(String, FieldEvent), EventHandler>,
    actions: HashMap<String, ActionHandler>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `event` on `field`.
    #[must_use]
    pub fn on(
        mut self,
        field: impl Into<String>,
        event: FieldEvent,
        handler: impl Fn(&mut EventContext) + Send + Sync + 'static,
    ) -> Self {
        self.events.insert((field.into(), event), Arc::new(handler));
        self
    }

    /// Register the handler for action `name`.
    #[must_use]
    pub fn action<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.actions
            .insert(name.into(), Arc::new(move |ctx| handler(ctx).boxed()));
        self
    }

    pub fn event_handler(&self, field: &str, event: FieldEvent) -> Option<&EventHandler> {
        self.events.get(&(field.to_string(), event))
    }

    pub fn action_handler(&self, name: &str) -> Option<&ActionHandler> {
        self.actions.get(name)
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<String> = self
            .events
            .keys()
            .map(|(field, event)| format!("{field}.{event}"))
            .collect();
        events.sort();
        let mut actions: Vec<&String> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("Handlers")
            .field("events", &events)
            .field("actions", &actions)
            .finish()
    }
}
