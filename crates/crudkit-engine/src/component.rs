//! The host surface an engine runs inside.
//!
//! A [`Component`] carries the active scope, the route of every scope, and
//! the UI services (navigation, dialogs, toasts, loading overlay) that hooks
//! and action handlers call into. Services not supplied by the host fall back
//! to [`Silent`], which only logs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crudkit_model::Scope;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, ready};

/// Route navigation.
pub trait Navigator: Send + Sync {
    fn push(&self, route: &str);
    fn back(&self);
    fn replace(&self, route: &str);
}

/// Modal dialogs.
pub trait Dialog: Send + Sync {
    /// Ask the user to confirm; resolves to the answer.
    fn confirm(&self, message: &str) -> BoxFuture<'static, bool>;
    fn alert(&self, message: &str) -> BoxFuture<'static, ()>;
}

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// Transient notifications.
pub trait Toast: Send + Sync {
    fn show(&self, level: ToastLevel, message: &str);

    fn success(&self, message: &str) {
        self.show(ToastLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.show(ToastLevel::Error, message);
    }

    fn warning(&self, message: &str) {
        self.show(ToastLevel::Warning, message);
    }

    fn info(&self, message: &str) {
        self.show(ToastLevel::Info, message);
    }
}

/// Global loading overlay.
pub trait LoadingIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Fallback services for headless hosts. `confirm` answers `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Navigator for Silent {
    fn push(&self, route: &str) {
        tracing::debug!(route, "navigate push");
    }

    fn back(&self) {
        tracing::debug!("navigate back");
    }

    fn replace(&self, route: &str) {
        tracing::debug!(route, "navigate replace");
    }
}

impl Dialog for Silent {
    fn confirm(&self, message: &str) -> BoxFuture<'static, bool> {
        tracing::debug!(message, "confirm dialog declined");
        ready(false).boxed()
    }

    fn alert(&self, message: &str) -> BoxFuture<'static, ()> {
        tracing::debug!(message, "alert dialog");
        ready(()).boxed()
    }
}

impl Toast for Silent {
    fn show(&self, level: ToastLevel, message: &str) {
        tracing::info!(?level, message, "toast");
    }
}

impl LoadingIndicator for Silent {
    fn show(&self) {
        tracing::trace!("loading shown");
    }

    fn hide(&self) {
        tracing::trace!("loading hidden");
    }
}

/// Host surface of one engine instance.
#[derive(Clone)]
pub struct Component {
    scope: Scope,
    routes: BTreeMap<Scope, String>,
    navigator: Arc<dyn Navigator>,
    dialog: Arc<dyn Dialog>,
    toast: Arc<dyn Toast>,
    loading: Arc<dyn LoadingIndicator>,
    on_reload: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl Component {
    /// Component for `scope` with silent services and no routes.
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            routes: BTreeMap::new(),
            navigator: Arc::new(Silent),
            dialog: Arc::new(Silent),
            toast: Arc::new(Silent),
            loading: Arc::new(Silent),
            on_reload: None,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Route registered for `scope`.
    pub fn route(&self, scope: Scope) -> Option<&str> {
        self.routes.get(&scope).map(String::as_str)
    }

    pub fn routes(&self) -> &BTreeMap<Scope, String> {
        &self.routes
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub fn dialog(&self) -> &dyn Dialog {
        self.dialog.as_ref()
    }

    pub fn toast(&self) -> &dyn Toast {
        self.toast.as_ref()
    }

    pub fn loading(&self) -> &dyn LoadingIndicator {
        self.loading.as_ref()
    }

    /// Push the route of `scope`, if one is registered.
    pub fn navigate_to(&self, scope: Scope) -> bool {
        match self.route(scope) {
            Some(route) => {
                self.navigator.push(route);
                true
            }
            None => {
                tracing::debug!(%scope, "no route registered");
                false
            }
        }
    }

    /// Ask the host to reload whatever this component shows.
    pub fn reload(&self) {
        match &self.on_reload {
            Some(on_reload) => on_reload(),
            None => tracing::debug!(scope = %self.scope, "reload requested without handler"),
        }
    }

    #[must_use]
    pub fn with_route(mut self, scope: Scope, route: impl Into<String>) -> Self {
        self.routes.insert(scope, route.into());
        self
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: impl Navigator + 'static) -> Self {
        self.navigator = Arc::new(navigator);
        self
    }

    #[must_use]
    pub fn with_dialog(mut self, dialog: impl Dialog + 'static) -> Self {
        self.dialog = Arc::new(dialog);
        self
    }

    #[must_use]
    pub fn with_toast(mut self, toast: impl Toast + 'static) -> Self {
        self.toast = Arc::new(toast);
        self
    }

    #[must_use]
    pub fn with_loading(mut self, loading: impl LoadingIndicator + 'static) -> Self {
        self.loading = Arc::new(loading);
        self
    }

    #[must_use]
    pub fn with_reload(mut self, on_reload: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_reload = Some(Arc::new(on_reload));
        self
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("scope", &self.scope)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Navigator for Recorder {
        fn push(&self, route: &str) {
            self.0.lock().unwrap().push(format!("push {route}"));
        }

        fn back(&self) {
            self.0.lock().unwrap().push("back".into());
        }

        fn replace(&self, route: &str) {
            self.0.lock().unwrap().push(format!("replace {route}"));
        }
    }

    impl Toast for Recorder {
        fn show(&self, level: ToastLevel, message: &str) {
            self.0.lock().unwrap().push(format!("{level:?} {message}"));
        }
    }

    #[test]
    fn navigates_to_registered_routes() {
        let recorder = Recorder::default();
        let component = Component::new(Scope::Index)
            .with_route(Scope::Edit, "/users/edit")
            .with_navigator(recorder.clone());

        assert!(component.navigate_to(Scope::Edit));
        assert!(!component.navigate_to(Scope::Add));
        component.navigator().back();
        assert_eq!(*recorder.0.lock().unwrap(), vec!["push /users/edit", "back"]);
    }

    #[test]
    fn toast_shorthands_forward_levels() {
        let recorder = Recorder::default();
        let component = Component::new(Scope::Edit).with_toast(recorder.clone());
        component.toast().success("Saved");
        component.toast().error("Failed");
        assert_eq!(*recorder.0.lock().unwrap(), vec!["Success Saved", "Error Failed"]);
    }

    #[test]
    fn silent_confirm_declines() {
        let component = Component::new(Scope::Edit);
        assert!(!component.dialog().confirm("Delete?").now_or_never().unwrap_or(true));
    }

    #[test]
    fn reload_calls_host_handler() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let component =
            Component::new(Scope::Index).with_reload(move || *counter.lock().unwrap() += 1);
        component.reload();
        component.reload();
        assert_eq!(*calls.lock().unwrap(), 2);
    }
}
