//! Lifecycle hooks keyed by scope.
//!
//! A form runs the bootstrap hook of its scope once; a table runs the fetch
//! hook of its scope on every reload.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crudkit_model::{Paginated, QueryParams, Record, Scope};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::component::Component;
use crate::draft::SchemaDraft;
use crate::error::BoxError;
use crate::form::FormEngine;
use crate::store::lock;

pub type BootstrapHook =
    Arc<dyn Fn(BootstrapContext) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

pub type FetchHook = Arc<
    dyn Fn(FetchContext) -> BoxFuture<'static, Result<Paginated<Record>, BoxError>> + Send + Sync,
>;

/// Argument of a bootstrap hook.
#[derive(Clone)]
pub struct BootstrapContext {
    /// Opaque context supplied by the host.
    pub context: Value,
    pub component: Arc<Component>,
    form: FormEngine,
    schema: Arc<Mutex<SchemaDraft>>,
}

impl BootstrapContext {
    pub(crate) fn new(
        context: Value,
        component: Arc<Component>,
        form: FormEngine,
        schema: Arc<Mutex<SchemaDraft>>,
    ) -> Self {
        Self {
            context,
            component,
            form,
            schema,
        }
    }

    /// Replace the form's values and baseline with `data` run through the
    /// initializer. Takes effect immediately; the form is clean afterwards.
    pub fn hydrate(&self, data: &Record) {
        self.form.hydrate(data);
    }

    /// Mutate field render state. Writes are committed once the hook settles.
    pub fn with_schema<R>(&self, f: impl FnOnce(&mut SchemaDraft) -> R) -> R {
        f(&mut *lock(&self.schema))
    }
}

impl fmt::Debug for BootstrapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapContext")
            .field("context", &self.context)
            .field("component", &self.component)
            .finish_non_exhaustive()
    }
}

/// Argument of a fetch hook.
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub params: QueryParams,
    pub component: Arc<Component>,
}

/// Hooks registered for a surface.
///
/// # Example
///
/// ```
/// use crudkit_engine::Hooks;
/// use crudkit_model::{Paginated, Scope};
///
/// let hooks = Hooks::new().fetch(Scope::Index, |ctx| async move {
///     Ok(Paginated::empty(ctx.params.page, ctx.params.limit))
/// });
/// assert!(hooks.has_fetch(Scope::Index));
/// assert!(!hooks.has_bootstrap(Scope::Edit));
/// ```
#[derive(Clone, Default)]
pub struct Hooks {
    bootstrap: HashMap<Scope, BootstrapHook>,
    fetch: HashMap<Scope, FetchHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bootstrap hook for `scope`, replacing any previous one.
    #[must_use]
    pub fn bootstrap<F, Fut>(mut self, scope: Scope, hook: F) -> Self
    where
        F: Fn(BootstrapContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.bootstrap
            .insert(scope, Arc::new(move |ctx| hook(ctx).boxed()));
        self
    }

    /// Register the fetch hook for `scope`, replacing any previous one.
    #[must_use]
    pub fn fetch<F, Fut>(mut self, scope: Scope, hook: F) -> Self
    where
        F: Fn(FetchContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Paginated<Record>, BoxError>> + Send + 'static,
    {
        self.fetch.insert(scope, Arc::new(move |ctx| hook(ctx).boxed()));
        self
    }

    /// Register an already boxed fetch hook.
    #[must_use]
    pub fn with_fetch_hook(mut self, scope: Scope, hook: FetchHook) -> Self {
        self.fetch.insert(scope, hook);
        self
    }

    pub fn bootstrap_for(&self, scope: Scope) -> Option<&BootstrapHook> {
        self.bootstrap.get(&scope)
    }

    pub fn fetch_for(&self, scope: Scope) -> Option<&FetchHook> {
        self.fetch.get(&scope)
    }

    pub fn has_bootstrap(&self, scope: Scope) -> bool {
        self.bootstrap.contains_key(&scope)
    }

    pub fn has_fetch(&self, scope: Scope) -> bool {
        self.fetch.contains_key(&scope)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bootstrap: Vec<_> = self.bootstrap.keys().collect();
        bootstrap.sort();
        let mut fetch: Vec<_> = self.fetch.keys().collect();
        fetch.sort();
        f.debug_struct("Hooks")
            .field("bootstrap", &bootstrap)
            .field("fetch", &fetch)
            .finish()
    }
}
