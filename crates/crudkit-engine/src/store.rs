//! Listener registry backing the engines' `subscribe` / `snapshot` pair.
//!
//! UI bindings subscribe once and re-read the engine snapshot whenever they
//! are notified; notification carries no payload.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback invoked after every committed mutation.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Lock a mutex, recovering the data from a poisoned lock.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<u64, Listener>>,
}

/// Set of listeners owned by one engine instance.
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    registry: Arc<Registry>,
}

impl Listeners {
    pub(crate) fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.registry.listeners).insert(id, listener);
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Call every listener. The registry lock is released first so that a
    /// listener may read the engine or unsubscribe.
    pub(crate) fn notify(&self) {
        let listeners: Vec<Listener> = lock(&self.registry.listeners).values().cloned().collect();
        for listener in listeners {
            listener();
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        lock(&self.registry.listeners).len()
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping the handle detaches the listener; call [`Subscription::forget`]
/// to keep it registered for the engine's lifetime.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Detach the listener now.
    pub fn unsubscribe(self) {}

    /// Keep the listener registered.
    pub fn forget(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry.listeners).remove(&self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Listener) {
        let count = Arc::new(AtomicUsize::new(0));
        let listener_count = Arc::clone(&count);
        let listener: Listener = Arc::new(move || {
            listener_count.fetch_add(1, Ordering::SeqCst);
        });
        (count, listener)
    }

    #[test]
    fn notify_reaches_every_listener() {
        let listeners = Listeners::default();
        let (a, la) = counter();
        let (b, lb) = counter();
        let _sa = listeners.subscribe(la);
        let _sb = listeners.subscribe(lb);
        listeners.notify();
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_subscription_detaches() {
        let listeners = Listeners::default();
        let (count, listener) = counter();
        let subscription = listeners.subscribe(listener);
        subscription.unsubscribe();
        listeners.notify();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn forgotten_subscription_stays() {
        let listeners = Listeners::default();
        let (count, listener) = counter();
        listeners.subscribe(listener).forget();
        listeners.notify();
        listeners.notify();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
