//! Actions resolved against a surface, ready to execute.

use std::fmt;
use std::sync::Arc;

use crudkit_model::{ActionConfig, Record};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, ready};

use crate::component::Component;
use crate::error::{EngineError, Result};
use crate::form::FormEngine;
use crate::handlers::{ActionContext, ActionHandler, Surface};
use crate::table::TableEngine;

#[derive(Clone)]
pub(crate) enum Target {
    Form(FormEngine),
    Table(TableEngine),
    Row { record: Record, table: TableEngine },
}

/// A visible action bound to its handler and surface.
#[derive(Clone)]
pub struct ResolvedAction {
    pub name: String,
    pub config: ActionConfig,
    domain: String,
    handler: Option<ActionHandler>,
    component: Arc<Component>,
    target: Target,
}

impl ResolvedAction {
    pub(crate) fn new(
        domain: &str,
        config: &ActionConfig,
        handler: Option<ActionHandler>,
        component: Arc<Component>,
        target: Target,
    ) -> Self {
        Self {
            name: config.name.clone(),
            config: config.clone(),
            domain: domain.to_string(),
            handler,
            component,
            target,
        }
    }

    /// True if a handler is registered under this action's name.
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Run the handler. Resolves immediately when none is registered.
    ///
    /// Form actions see the form values current at call time.
    pub fn execute(&self) -> BoxFuture<'static, Result<()>> {
        let Some(handler) = self.handler.clone() else {
            tracing::debug!(domain = %self.domain, action = %self.name, "no handler registered");
            return ready(Ok(())).boxed();
        };
        let (state, surface) = match &self.target {
            Target::Form(form) => (form.values(), Surface::Form(form.clone())),
            Target::Table(table) => (Record::new(), Surface::Table(table.clone())),
            Target::Row { record, table } => (record.clone(), Surface::Table(table.clone())),
        };
        let ctx = ActionContext {
            state,
            component: Arc::clone(&self.component),
            surface,
        };
        tracing::debug!(domain = %self.domain, action = %self.name, "executing action");
        let pending = handler(ctx);
        let domain = self.domain.clone();
        let action = self.name.clone();
        async move {
            pending
                .await
                .map_err(|source| EngineError::Action { domain, action, source })
        }
        .boxed()
    }
}

impl fmt::Debug for ResolvedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAction")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("has_handler", &self.has_handler())
            .finish_non_exhaustive()
    }
}
