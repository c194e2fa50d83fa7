//! Form state engine.
//!
//! A [`FormEngine`] owns the values of one record being viewed, created or
//! edited, together with validation errors and per-field render overrides.
//! Handles are cheap to clone; every clone drives the same state.
//!
//! # Lifecycle
//!
//! 1. [`FormEngine::new`] builds values from the initial record and field
//!    defaults; that initial state is the dirty baseline.
//! 2. [`FormEngine::bootstrap`] runs the bootstrap hook of the component's
//!    scope once. The hook may hydrate loaded data and adjust field render
//!    state.
//! 3. [`FormEngine::set_value`] validates the touched field and dispatches
//!    its change handler; [`FormEngine::validate`] checks every scoped field
//!    before submit.
//!
//! Listeners registered with [`FormEngine::subscribe`] are called after every
//! committed mutation, with no engine lock held.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crudkit_model::{FieldConfig, FieldProxy, GroupConfig, Overrides, Record, SchemaProvide, Scope};
use crudkit_validate::{FieldErrors, Translator, ValidatorRegistry};
use serde::Serialize;
use serde_json::Value;

use crate::access;
use crate::action::{ResolvedAction, Target};
use crate::component::Component;
use crate::draft::{SchemaDraft, StateDraft, merge_overrides};
use crate::error::{EngineError, Result};
use crate::handlers::{EventContext, FieldEvent, Handlers};
use crate::hooks::{BootstrapContext, Hooks};
use crate::settings::FormSettings;
use crate::store::{Listener, Listeners, Subscription, lock};

// =============================================================================
// OPTIONS
// =============================================================================

/// Everything a form needs besides its schema.
pub struct FormOptions {
    pub component: Component,
    pub initial_values: Record,
    pub hooks: Hooks,
    pub handlers: Handlers,
    /// Granted permission strings; `None` grants nothing.
    pub permissions: Option<Vec<String>>,
    pub translator: Option<Arc<dyn Translator>>,
    /// Validator registry; `None` uses the process-wide one.
    pub validators: Option<Arc<ValidatorRegistry>>,
    /// Opaque value handed to the bootstrap hook.
    pub context: Value,
    pub settings: FormSettings,
}

impl FormOptions {
    pub fn new(component: Component) -> Self {
        Self {
            component,
            initial_values: Record::new(),
            hooks: Hooks::default(),
            handlers: Handlers::default(),
            permissions: None,
            translator: None,
            validators: None,
            context: Value::Null,
            settings: FormSettings::default(),
        }
    }

    #[must_use]
    pub fn with_initial_values(mut self, values: Record) -> Self {
        self.initial_values = values;
        self
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
    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    #[must_use]
    pub fn with_validators(mut self, validators: Arc<ValidatorRegistry>) -> Self {
        self.validators = Some(validators);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: FormSettings) -> Self {
        self.settings = settings;
        self
    }
}

// =============================================================================
// RESOLVED VIEWS
// =============================================================================

/// A scoped field with its current render state.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedField {
    pub name: String,
    pub config: FieldConfig,
    pub proxy: FieldProxy,
}

/// One renderable block of a form.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Section {
    /// A run of consecutive fields outside any declared group.
    Ungrouped { fields: Vec<ResolvedField> },
    /// Every scoped field of one declared group.
    Group {
        name: String,
        config: GroupConfig,
        fields: Vec<ResolvedField>,
    },
}

impl Section {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ungrouped { .. } => "ungrouped",
            Self::Group { .. } => "group",
        }
    }

    pub fn fields(&self) -> &[ResolvedField] {
        match self {
            Self::Ungrouped { fields } | Self::Group { fields, .. } => fields,
        }
    }
}

/// What a renderer needs for one field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldProps {
    pub name: String,
    pub config: Option<FieldConfig>,
    pub proxy: FieldProxy,
    pub value: Value,
    pub errors: Vec<String>,
}

/// Serializable copy of the form state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    pub values: Record,
    pub errors: FieldErrors,
    pub overrides: Overrides,
    pub loading: bool,
    pub dirty: bool,
    pub valid: bool,
}

// =============================================================================
// ENGINE
// =============================================================================

#[derive(Debug)]
struct FormState {
    values: Record,
    baseline: Record,
    overrides: Overrides,
    errors: FieldErrors,
    loading: bool,
    bootstrapped: bool,
}

impl FormState {
    fn dirty(&self) -> bool {
        self.values
            .iter()
            .any(|(key, value)| self.baseline.get(key).unwrap_or(&Value::Null) != value)
    }
}

struct FormInner {
    schema: Arc<SchemaProvide>,
    component: Arc<Component>,
    hooks: Hooks,
    handlers: Handlers,
    permissions: Option<Vec<String>>,
    translator: Option<Arc<dyn Translator>>,
    validators: Option<Arc<ValidatorRegistry>>,
    context: Value,
    settings: FormSettings,
    state: Mutex<FormState>,
    listeners: Listeners,
}

/// Handle to a form's state.
#[derive(Clone)]
pub struct FormEngine {
    inner: Arc<FormInner>,
}

impl FormEngine {
    pub fn new(schema: Arc<SchemaProvide>, options: FormOptions) -> Self {
        let values = initial_values(&schema.fields, &options.initial_values);
        let loading = options.hooks.has_bootstrap(options.component.scope());
        let state = FormState {
            baseline: values.clone(),
            values,
            overrides: Overrides::new(),
            errors: FieldErrors::new(),
            loading,
            bootstrapped: false,
        };
        Self {
            inner: Arc::new(FormInner {
                schema,
                component: Arc::new(options.component),
                hooks: options.hooks,
                handlers: options.handlers,
                permissions: options.permissions,
                translator: options.translator,
                validators: options.validators,
                context: options.context,
                settings: options.settings,
                state: Mutex::new(state),
                listeners: Listeners::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
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

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Run the bootstrap hook of the current scope.
    ///
    /// Only the first call runs the hook; later calls resolve immediately.
    /// `loading` is cleared once the hook settles, whether or not it failed.
    /// Render-state writes made by the hook are committed only on success.
    pub async fn bootstrap(&self) -> Result<()> {
        {
            let mut state = self.lock();
            if state.bootstrapped {
                return Ok(());
            }
            state.bootstrapped = true;
        }
        let scope = self.scope();
        let Some(hook) = self.inner.hooks.bootstrap_for(scope).cloned() else {
            return Ok(());
        };

        let domain = self.inner.schema.domain.clone();
        tracing::debug!(%domain, %scope, "running bootstrap hook");
        let draft = {
            let state = self.lock();
            SchemaDraft::new(&self.inner.schema.fields, &state.overrides)
        };
        let draft = Arc::new(Mutex::new(draft));
        let ctx = BootstrapContext::new(
            self.inner.context.clone(),
            Arc::clone(&self.inner.component),
            self.clone(),
            Arc::clone(&draft),
        );
        let outcome = hook(ctx).await;

        {
            let mut state = self.lock();
            if outcome.is_ok() {
                merge_overrides(&mut state.overrides, lock(&draft).overrides());
            }
            state.loading = false;
        }
        self.notify();
        outcome.map_err(|source| {
            tracing::warn!(%domain, %scope, error = %source, "bootstrap hook failed");
            EngineError::Bootstrap { domain, scope, source }
        })
    }

    /// Replace values and baseline with `data` run through the initializer.
    pub(crate) fn hydrate(&self, data: &Record) {
        let values = initial_values(&self.inner.schema.fields, data);
        {
            let mut state = self.lock();
            state.baseline = values.clone();
            state.values = values;
        }
        tracing::trace!(domain = %self.inner.schema.domain, "form hydrated");
        self.notify();
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    pub fn values(&self) -> Record {
        self.lock().values.clone()
    }

    /// Current value of `name`; missing keys read as `Null`.
    pub fn value(&self, name: &str) -> Value {
        self.lock().values.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn errors(&self) -> FieldErrors {
        self.lock().errors.clone()
    }

    pub fn overrides(&self) -> Overrides {
        self.lock().overrides.clone()
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    /// True if any value differs from the baseline.
    pub fn dirty(&self) -> bool {
        self.lock().dirty()
    }

    /// True if no field currently holds an error.
    pub fn valid(&self) -> bool {
        self.lock().errors.is_empty()
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
    // Fields
    // =========================================================================

    /// Fields visible in the current scope, stable-sorted by form order.
    pub fn fields(&self) -> Vec<ResolvedField> {
        let overrides = self.overrides();
        let scope = self.scope();
        let mut fields: Vec<ResolvedField> = self
            .inner
            .schema
            .fields
            .iter()
            .filter(|field| access::field_in_scope(field, scope))
            .map(|field| ResolvedField {
                name: field.name.clone(),
                config: field.clone(),
                proxy: FieldProxy::resolve(&field.form, overrides.get(&field.name)),
            })
            .collect();
        fields.sort_by_key(|field| field.config.form.order);
        fields
    }

    /// Fields partitioned into renderable sections.
    pub fn sections(&self) -> Vec<Section> {
        build_sections(&self.inner.schema, &self.fields())
    }

    /// Render props of `name`. Unknown names get the default proxy.
    pub fn field_props(&self, name: &str) -> FieldProps {
        let config = self.inner.schema.field(name).cloned();
        let state = self.lock();
        let proxy = match &config {
            Some(config) => FieldProxy::resolve(&config.form, state.overrides.get(name)),
            None => FieldProxy::default(),
        };
        FieldProps {
            name: name.to_string(),
            proxy,
            value: state.values.get(name).cloned().unwrap_or(Value::Null),
            errors: state.errors.get(name).cloned().unwrap_or_default(),
            config,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Set one value, validate that field and run its change handler.
    pub fn set_value(&self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        self.lock().values.insert(name.to_string(), value.clone());

        if self.inner.settings.validate_on_change {
            let messages = self.check_value(name, &value);
            let mut state = self.lock();
            if messages.is_empty() {
                state.errors.remove(name);
            } else {
                state.errors.insert(name.to_string(), messages);
            }
        }

        let candidate = self.values();
        let (merged, _) = self.dispatch(name, FieldEvent::Change, candidate);
        self.lock().values = merged;
        self.notify();
    }

    /// Run the handler for `event` on `field` against `candidate`.
    ///
    /// Returns `candidate` merged with the handler's writes. Render-state
    /// writes are committed; values are not.
    pub fn fire_event(&self, field: &str, event: FieldEvent, candidate: Record) -> Record {
        let (merged, handled) = self.dispatch(field, event, candidate);
        if handled {
            self.notify();
        }
        merged
    }

    /// Dispatch a blur event against the current values and commit.
    pub fn blur(&self, field: &str) {
        self.commit_event(field, FieldEvent::Blur);
    }

    /// Dispatch a focus event against the current values and commit.
    pub fn focus(&self, field: &str) {
        self.commit_event(field, FieldEvent::Focus);
    }

    /// Validate every scoped field and replace the error map.
    pub fn validate(&self) -> bool {
        let values = self.values();
        let scope = self.scope();
        let fields = self
            .inner
            .schema
            .fields
            .iter()
            .filter(|field| access::field_in_scope(field, scope));
        let translate = self.inner.translator.as_deref();
        let errors = match &self.inner.validators {
            Some(registry) => registry.validate_all_fields(&values, fields, translate),
            None => crudkit_validate::validate_all_fields(&values, fields, translate),
        };
        let valid = errors.is_empty();
        if !valid {
            tracing::debug!(
                domain = %self.inner.schema.domain,
                fields = errors.len(),
                "form has validation errors"
            );
        }
        self.lock().errors = errors;
        self.notify();
        valid
    }

    /// Restore `values` (or the baseline) and clear errors and overrides.
    pub fn reset(&self, values: Option<Record>) {
        {
            let mut state = self.lock();
            state.values = match values {
                Some(values) => values,
                None => state.baseline.clone(),
            };
            state.errors.clear();
            state.overrides.clear();
        }
        self.notify();
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Actions visible in the current scope, stable-sorted by order.
    pub fn actions(&self) -> Vec<ResolvedAction> {
        let schema = &self.inner.schema;
        let scope = self.scope();
        let permissions = self.inner.permissions.as_deref();
        let mut actions: Vec<ResolvedAction> = schema
            .actions
            .iter()
            .filter(|action| access::is_action_visible(&schema.domain, action, scope, permissions))
            .map(|action| {
                ResolvedAction::new(
                    &schema.domain,
                    action,
                    self.inner.handlers.action_handler(&action.name).cloned(),
                    Arc::clone(&self.inner.component),
                    Target::Form(self.clone()),
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

    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.lock();
        FormSnapshot {
            values: state.values.clone(),
            errors: state.errors.clone(),
            overrides: state.overrides.clone(),
            loading: state.loading,
            dirty: state.dirty(),
            valid: state.errors.is_empty(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_value(&self, name: &str, value: &Value) -> Vec<String> {
        let Some(field) = self.inner.schema.field(name) else {
            return Vec::new();
        };
        let translate = self.inner.translator.as_deref();
        match &self.inner.validators {
            Some(registry) => registry.validate_field(value, &field.validations, translate),
            None => crudkit_validate::validate_field(value, &field.validations, translate),
        }
    }

    fn commit_event(&self, field: &str, event: FieldEvent) {
        let (merged, handled) = self.dispatch(field, event, self.values());
        if handled {
            self.lock().values = merged;
            self.notify();
        }
    }

    // Runs the handler with no lock held.
    fn dispatch(&self, field: &str, event: FieldEvent, candidate: Record) -> (Record, bool) {
        let Some(handler) = self.inner.handlers.event_handler(field, event).cloned() else {
            return (candidate, false);
        };
        let schema = SchemaDraft::new(&self.inner.schema.fields, &self.lock().overrides);
        let mut ctx = EventContext {
            state: StateDraft::new(&candidate),
            schema,
            field: field.to_string(),
            event,
        };
        tracing::trace!(field, %event, "dispatching field event");
        handler(&mut ctx);

        let EventContext { state, schema, .. } = ctx;
        let mut merged = candidate;
        merged.extend(state.into_changes());
        merge_overrides(&mut self.lock().overrides, schema.overrides());
        (merged, true)
    }
}

impl fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEngine")
            .field("domain", &self.inner.schema.domain)
            .field("scope", &self.scope())
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

/// `source[k] ?? default ?? Null` for every declared field.
fn initial_values(fields: &[FieldConfig], source: &Record) -> Record {
    fields
        .iter()
        .map(|field| {
            let value = source
                .get(&field.name)
                .filter(|value| !value.is_null())
                .or(field.default_value.as_ref())
                .cloned()
                .unwrap_or(Value::Null);
            (field.name.clone(), value)
        })
        .collect()
}

/// Walk `fields` once, flushing ungrouped runs whenever a declared group is
/// met and emitting each group the first time one of its fields appears.
fn build_sections(schema: &SchemaProvide, fields: &[ResolvedField]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut run = Vec::new();
    let mut emitted = HashSet::new();
    for field in fields {
        let Some(group) = declared_group(schema, field) else {
            run.push(field.clone());
            continue;
        };
        if !run.is_empty() {
            sections.push(Section::Ungrouped {
                fields: std::mem::take(&mut run),
            });
        }
        if emitted.insert(group) {
            let members = fields
                .iter()
                .filter(|other| declared_group(schema, other) == Some(group))
                .cloned()
                .collect();
            sections.push(Section::Group {
                name: group.to_string(),
                config: schema.groups.get(group).cloned().unwrap_or_default(),
                fields: members,
            });
        }
    }
    if !run.is_empty() {
        sections.push(Section::Ungrouped { fields: run });
    }
    sections
}

/// Group of `field` if that group is declared on the schema.
fn declared_group<'a>(schema: &SchemaProvide, field: &'a ResolvedField) -> Option<&'a str> {
    field
        .config
        .group
        .as_deref()
        .filter(|group| schema.has_group(group))
}
