//! Table state engine.
//!
//! A [`TableEngine`] owns one page of records plus the query that produced
//! it (page, limit, sort, filters), a selection keyed by record identity and
//! the set of visible columns.
//!
//! Setters that change the query return a [`Reload`] future which runs the
//! fetch hook of the component's scope. Every fetch is numbered; a response
//! is committed only if no later fetch was started in the meantime, so
//! overlapping requests can never leave stale rows behind.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use crudkit_model::{
    ActionConfig, FieldConfig, Paginated, QueryParams, Record, SchemaProvide, Scope, SortOrder,
    display_string, is_blank,
};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, ready};
use serde::Serialize;
use serde_json::Value;

use crate::access;
use crate::action::{ResolvedAction, Target};
use crate::component::Component;
use crate::error::{BoxError, EngineError, Result};
use crate::handlers::Handlers;
use crate::hooks::{FetchContext, Hooks};
use crate::settings::TableSettings;
use crate::store::{Listener, Listeners, Subscription, lock};

// =============================================================================
// OPTIONS
// =============================================================================

/// Everything a table needs besides its schema.
pub struct TableOptions {
    pub component: Component,
    pub hooks: Hooks,
    pub handlers: Handlers,
    /// Granted permission strings; `None` grants nothing.
    pub permissions: Option<Vec<String>>,
    pub settings: TableSettings,
}

impl TableOptions {
    pub fn new(component: Component) -> Self {
        Self {
            component,
            hooks: Hooks::default(),
            handlers: Handlers::default(),
            permissions: None,
            settings: TableSettings::default(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn with_handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: TableSettings) -> Self {
        self.settings = settings;
        self
    }
}

// =============================================================================
// RELOAD
// =============================================================================

/// Fetch triggered by a query change.
///
/// Resolves immediately when nothing changed or no fetch hook is bound.
/// The response is committed only while the future is polled; dropping it
/// unawaited leaves `loading` set until a later reload settles.
#[must_use = "a Reload does nothing unless awaited"]
pub struct Reload(BoxFuture<'static, Result<()>>);

impl Reload {
    fn ready() -> Self {
        Self(ready(Ok(())).boxed())
    }
}

impl Future for Reload {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.poll_unpin(cx)
    }
}

impl fmt::Debug for Reload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reload(..)")
    }
}

// =============================================================================
// RESOLVED VIEWS
// =============================================================================

/// A scoped field usable as a column.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub name: String,
    pub config: FieldConfig,
    pub visible: bool,
}

/// Serializable copy of the table state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub rows: Vec<Record>,
    pub loading: bool,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub filters: Record,
    pub selected_ids: Vec<String>,
    pub visible_columns: Vec<String>,
}

// =============================================================================
// ENGINE
// =============================================================================

#[derive(Debug)]
struct TableState {
    rows: Vec<Record>,
    loading: bool,
    total: u64,
    page: u32,
    limit: u32,
    sort_field: Option<String>,
    sort_order: Option<SortOrder>,
    filters: Record,
    selected_ids: BTreeSet<String>,
    visible_columns: BTreeSet<String>,
    fetch_id: u64,
    mounted: bool,
}

impl TableState {
    fn params(&self) -> QueryParams {
        QueryParams {
            page: self.page,
            limit: self.limit,
            sort: self.sort_field.clone(),
            order: self.sort_order,
            filters: self.filters.clone(),
        }
    }
}

struct TableInner {
    schema: Arc<SchemaProvide>,
    component: Arc<Component>,
    hooks: Hooks,
    handlers: Handlers,
    permissions: Option<Vec<String>>,
    settings: TableSettings,
    state: Mutex<TableState>,
    listeners: Listeners,
}

/// Handle to a table's state.
#[derive(Clone)]
pub struct TableEngine {
    inner: Arc<TableInner>,
}

impl TableEngine {
    pub fn new(schema: Arc<SchemaProvide>, options: TableOptions) -> Self {
        let scope = options.component.scope();
        let visible_columns = schema
            .fields
            .iter()
            .filter(|field| access::field_in_scope(field, scope) && field.table.show)
            .map(|field| field.name.clone())
            .collect();
        let state = TableState {
            rows: Vec::new(),
            loading: false,
            total: 0,
            page: 1,
            limit: options.settings.default_limit,
            sort_field: None,
            sort_order: None,
            filters: Record::new(),
            selected_ids: BTreeSet::new(),
            visible_columns,
            fetch_id: 0,
            mounted: false,
        };
        Self {
            inner: Arc::new(TableInner {
                schema,
                component: Arc::new(options.component),
                hooks: options.hooks,
                handlers: options.handlers,
                permissions: options.permissions,
                settings: options.settings,
                state: Mutex::new(state),
                listeners: Listeners::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        lock(&self.inner.state)
    }

    fn notify(&self) {
        self.inner.listeners.notify();
    }

    pub fn schema(&self) -> &SchemaProvide {
        &self.inner.schema
    }

    pub fn component(&self) -> &Component {
        &self.inner.component
    }

    pub fn scope(&self) -> Scope {
        self.inner.component.scope()
    }

    /// Page sizes offered to the user.
    pub fn page_sizes(&self) -> &[u32] {
        &self.inner.settings.page_sizes
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Perform the initial fetch. Later calls resolve immediately.
    pub fn mount(&self) -> Reload {
        {
            let mut state = self.lock();
            if state.mounted {
                return Reload::ready();
            }
            state.mounted = true;
        }
        self.reload()
    }

    /// Fetch the current page.
    ///
    /// The fetch hook is invoked before this returns; the returned future
    /// commits its response if no later fetch has started by then. A failed
    /// fetch propagates its error; it clears `loading` only if it was the
    /// latest one.
    pub fn reload(&self) -> Reload {
        let scope = self.scope();
        let hook = self.inner.hooks.fetch_for(scope).cloned();
        let (fetch_id, params) = {
            let mut state = self.lock();
            state.fetch_id += 1;
            if hook.is_some() {
                state.loading = true;
            }
            (state.fetch_id, state.params())
        };
        let Some(hook) = hook else {
            return Reload::ready();
        };
        self.notify();

        tracing::debug!(
            domain = %self.inner.schema.domain,
            fetch_id,
            page = params.page,
            limit = params.limit,
            "fetching table page"
        );
        let pending = hook(FetchContext {
            params,
            component: Arc::clone(&self.inner.component),
        });
        let engine = self.clone();
        Reload(
            async move {
                let outcome = pending.await;
                engine.settle(fetch_id, outcome)
            }
            .boxed(),
        )
    }

    fn settle(
        &self,
        fetch_id: u64,
        outcome: std::result::Result<Paginated<Record>, BoxError>,
    ) -> Result<()> {
        let domain = &self.inner.schema.domain;
        let latest = {
            let mut state = self.lock();
            let latest = state.fetch_id == fetch_id;
            if latest {
                state.loading = false;
                if let Ok(page) = &outcome {
                    state.rows.clone_from(&page.data);
                    state.total = page.total;
                }
            }
            latest
        };
        if latest {
            self.notify();
        } else {
            tracing::trace!(%domain, fetch_id, "discarding stale fetch response");
        }
        outcome.map(drop).map_err(|source| {
            tracing::warn!(%domain, fetch_id, error = %source, "fetch hook failed");
            EngineError::Fetch {
                domain: domain.clone(),
                scope: self.scope(),
                source,
            }
        })
    }

    // =========================================================================
    // Query
    // =========================================================================

    // Applies `change`; reloads only if it reports a change.
    fn update(&self, change: impl FnOnce(&mut TableState) -> bool) -> Reload {
        let changed = change(&mut *self.lock());
        if !changed {
            return Reload::ready();
        }
        self.notify();
        self.reload()
    }

    pub fn set_page(&self, page: u32) -> Reload {
        self.update(|state| {
            let changed = state.page != page;
            state.page = page;
            changed
        })
    }

    /// Change the page size and return to page 1.
    pub fn set_limit(&self, limit: u32) -> Reload {
        self.update(|state| {
            let changed = state.limit != limit || state.page != 1;
            state.limit = limit;
            state.page = 1;
            changed
        })
    }

    /// Cycle the sort of `field`: ascending, descending, cleared.
    ///
    /// Switching to a new field or clearing returns to page 1.
    pub fn set_sort(&self, field: &str) -> Reload {
        self.update(|state| {
            let current = state.sort_field.as_deref() == Some(field);
            match (current, state.sort_order) {
                (true, Some(SortOrder::Asc)) => {
                    state.sort_order = Some(SortOrder::Desc);
                }
                (true, Some(SortOrder::Desc)) => {
                    state.sort_field = None;
                    state.sort_order = None;
                    state.page = 1;
                }
                _ => {
                    state.sort_field = Some(field.to_string());
                    state.sort_order = Some(SortOrder::Asc);
                    state.page = 1;
                }
            }
            true
        })
    }

    /// Set or, for `""`/null, remove the filter on `field`; back to page 1.
    pub fn set_filter(&self, field: &str, value: impl Into<Value>) -> Reload {
        let value = value.into();
        self.update(|state| {
            let previous = if is_blank(&value) {
                state.filters.remove(field)
            } else {
                state.filters.insert(field.to_string(), value.clone())
            };
            let changed = previous.as_ref() != state.filters.get(field) || state.page != 1;
            state.page = 1;
            changed
        })
    }

    pub fn clear_filters(&self) -> Reload {
        self.update(|state| {
            let changed = !state.filters.is_empty() || state.page != 1;
            state.filters.clear();
            state.page = 1;
            changed
        })
    }

    pub fn params(&self) -> QueryParams {
        self.lock().params()
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    pub fn rows(&self) -> Vec<Record> {
        self.lock().rows.clone()
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    pub fn total(&self) -> u64 {
        self.lock().total
    }

    pub fn page(&self) -> u32 {
        self.lock().page
    }

    pub fn limit(&self) -> u32 {
        self.lock().limit
    }

    /// Number of pages for the current total; at least 1.
    pub fn page_count(&self) -> u64 {
        let state = self.lock();
        if state.limit == 0 {
            return 1;
        }
        state.total.div_ceil(u64::from(state.limit)).max(1)
    }

    pub fn sort(&self) -> (Option<String>, Option<SortOrder>) {
        let state = self.lock();
        (state.sort_field.clone(), state.sort_order)
    }

    pub fn filters(&self) -> Record {
        self.lock().filters.clone()
    }

    /// True if the caller may open the current scope.
    pub fn permitted(&self) -> bool {
        access::is_scope_permitted(
            &self.inner.schema.domain,
            self.scope(),
            self.inner.permissions.as_deref(),
        )
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Scoped fields in declaration order.
    pub fn available_columns(&self) -> Vec<Column> {
        let scope = self.scope();
        let state = self.lock();
        self.inner
            .schema
            .fields
            .iter()
            .filter(|field| access::field_in_scope(field, scope))
            .map(|field| Column {
                name: field.name.clone(),
                config: field.clone(),
                visible: state.visible_columns.contains(&field.name),
            })
            .collect()
    }

    /// Names of visible available columns, in declaration order.
    pub fn visible_columns(&self) -> Vec<String> {
        self.available_columns()
            .into_iter()
            .filter(|column| column.visible)
            .map(|column| column.name)
            .collect()
    }

    /// Visible columns stable-sorted by table order.
    pub fn columns(&self) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .available_columns()
            .into_iter()
            .filter(|column| column.visible)
            .collect();
        columns.sort_by_key(|column| column.config.table.order);
        columns
    }

    /// Flip the visibility of column `name`.
    pub fn toggle_column(&self, name: &str) {
        {
            let mut state = self.lock();
            if !state.visible_columns.remove(name) {
                state.visible_columns.insert(name.to_string());
            }
        }
        self.notify();
    }

    /// Render `value` of column `name` for `record`.
    pub fn format_value(&self, name: &str, value: &Value, record: &Record) -> String {
        match self
            .inner
            .schema
            .field(name)
            .and_then(|field| field.table.format.as_ref())
        {
            Some(format) => format.format(value, record),
            None => display_string(value),
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Identity string of `record` under this schema.
    pub fn get_identity(&self, record: &Record) -> String {
        self.inner.schema.identity.of(record)
    }

    pub fn toggle_select(&self, record: &Record) {
        let id = self.get_identity(record);
        {
            let mut state = self.lock();
            if !state.selected_ids.remove(&id) {
                state.selected_ids.insert(id);
            }
        }
        self.notify();
    }

    /// Select every loaded row; selections on other pages are dropped.
    pub fn select_all(&self) {
        {
            let mut state = self.lock();
            let ids = state.rows.iter().map(|row| self.get_identity(row)).collect();
            state.selected_ids = ids;
        }
        self.notify();
    }

    pub fn clear_selection(&self) {
        self.lock().selected_ids.clear();
        self.notify();
    }

    pub fn is_selected(&self, record: &Record) -> bool {
        let id = self.get_identity(record);
        self.lock().selected_ids.contains(&id)
    }

    /// Loaded rows whose identity is selected.
    pub fn selected(&self) -> Vec<Record> {
        let state = self.lock();
        state
            .rows
            .iter()
            .filter(|row| state.selected_ids.contains(&self.get_identity(row)))
            .cloned()
            .collect()
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.lock().selected_ids.iter().cloned().collect()
    }

    /// True if there are loaded rows and every one is selected.
    pub fn all_selected(&self) -> bool {
        let state = self.lock();
        !state.rows.is_empty()
            && state
                .rows
                .iter()
                .all(|row| state.selected_ids.contains(&self.get_identity(row)))
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Visible actions not rendered per row, stable-sorted by order.
    pub fn actions(&self) -> Vec<ResolvedAction> {
        self.resolve_actions(|action| !action.is_row(), |_| Target::Table(self.clone()))
    }

    /// Visible row actions whose condition accepts `record`.
    pub fn row_actions(&self, record: &Record) -> Vec<ResolvedAction> {
        self.resolve_actions(
            |action| action.is_row() && action.applies_to(record),
            |_| Target::Row {
                record: record.clone(),
                table: self.clone(),
            },
        )
    }

    fn resolve_actions(
        &self,
        keep: impl Fn(&ActionConfig) -> bool,
        target: impl Fn(&ActionConfig) -> Target,
    ) -> Vec<ResolvedAction> {
        let schema = &self.inner.schema;
        let scope = self.scope();
        let permissions = self.inner.permissions.as_deref();
        let mut actions: Vec<ResolvedAction> = schema
            .actions
            .iter()
            .filter(|&action| keep(action))
            .filter(|&action| access::is_action_visible(&schema.domain, action, scope, permissions))
            .map(|action| {
                ResolvedAction::new(
                    &schema.domain,
                    action,
                    self.inner.handlers.action_handler(&action.name).cloned(),
                    Arc::clone(&self.inner.component),
                    target(action),
                )
            })
            .collect();
        actions.sort_by_key(|action| action.config.order);
        actions
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Register `listener`; it is called after every committed mutation.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let listener: Listener = Arc::new(listener);
        self.inner.listeners.subscribe(listener)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        let visible_columns = self.visible_columns();
        let state = self.lock();
        TableSnapshot {
            rows: state.rows.clone(),
            loading: state.loading,
            total: state.total,
            page: state.page,
            limit: state.limit,
            sort_field: state.sort_field.clone(),
            sort_order: state.sort_order,
            filters: state.filters.clone(),
            selected_ids: state.selected_ids.iter().cloned().collect(),
            visible_columns,
        }
    }
}

impl fmt::Debug for TableEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEngine")
            .field("domain", &self.inner.schema.domain)
            .field("scope", &self.scope())
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}
