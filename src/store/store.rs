use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::record::Record;
use crate::runtime::{Gate, ReactiveRuntime, Source};
use crate::store::{Listener, ReactiveStore, Subscription};

type Listeners<T> = Arc<RwLock<Vec<(usize, Listener<T>)>>>;

/// A shared store for managing application state.
///
/// Writes are synchronous: by the time `mutate`, `update` or `set` returns,
/// every listener has been called and every render context that read the
/// store has re-rendered.
///
/// User closures passed to `read` and `update` run without any lock held,
/// so they may read or write the same store.
pub struct Store<T> {
    source: Arc<Source>,
    state: Arc<RwLock<T>>,
    listeners: Listeners<T>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    /// Create a new store with the given initial state.
    pub fn new(initial: T) -> Self {
        Self {
            source: Arc::new(Source::new()),
            state: Arc::new(RwLock::new(initial)),
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// The store's source ID.
    pub fn id(&self) -> usize {
        self.source.id()
    }

    /// Get a clone of the current state without subscribing.
    pub fn get(&self) -> T {
        read(&self.state).clone()
    }

    /// Read a snapshot of the state without subscribing.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = self.get();
        f(&state)
    }

    /// Update a copy of the state, then store it.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let mut state = self.get();
        f(&mut state);
        *write(&self.state) = state;
        self.notify();
    }

    /// Replace the whole state.
    pub fn set(&self, new_state: T) {
        *write(&self.state) = new_state;
        self.notify();
    }

    /// Subscribe to state changes.
    ///
    /// The listener is called with the new state after every write. It stays
    /// registered until [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let listener_id = ReactiveRuntime::next_id();
        write(&self.listeners).push((listener_id, Arc::new(listener)));
        tracing::debug!(store = self.id(), listener_id, "listener subscribed");

        let listeners = Arc::downgrade(&self.listeners);
        let store = self.id();
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                write(&listeners).retain(|(id, _)| *id != listener_id);
                tracing::debug!(store, listener_id, "listener unsubscribed");
            }
        })
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        read(&self.listeners).len()
    }

    /// Notify listeners, then re-run dependent render contexts.
    fn notify(&self) {
        let state = self.get();
        let listeners: Vec<Listener<T>> = read(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        tracing::trace!(store = self.id(), listeners = listeners.len(), "store changed");
        for listener in listeners {
            listener(&state);
        }
        self.source.notify();
    }
}

impl<T: Record> Store<T> {
    /// Shallow-merge a partial into the state.
    ///
    /// Always notifies, even when `partial` is empty.
    pub fn mutate(&self, partial: T::Partial) {
        write(&self.state).merge(partial);
        self.notify();
    }
}

impl<T: Record> ReactiveStore<T> for Store<T> {
    fn snapshot(&self) -> T {
        self.get()
    }

    fn mutate(&self, partial: T::Partial) {
        Store::mutate(self, partial);
    }

    fn subscribe(&self, listener: Listener<T>) -> Subscription {
        Store::subscribe(self, move |state: &T| listener(state))
    }

    fn track(&self) {
        self.source.track();
    }

    fn track_with(&self, gate: Gate) {
        self.source.track_with(gate);
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            listeners: Arc::clone(&self.listeners),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    crate::record! {
        #[derive(Clone, Debug, PartialEq)]
        struct AppState => AppStatePartial {
            count: usize,
            name: String,
        }
    }

    fn app_state() -> AppState {
        AppState {
            count: 0,
            name: "test".to_string(),
        }
    }

    #[test]
    fn store_get_set() {
        let store = Store::new(app_state());

        assert_eq!(store.get().count, 0);

        store.set(AppState {
            count: 42,
            name: "updated".to_string(),
        });

        assert_eq!(store.get().count, 42);
        assert_eq!(store.get().name, "updated");
    }

    #[test]
    fn store_update() {
        let store = Store::new(app_state());

        store.update(|state| {
            state.count += 10;
        });

        assert_eq!(store.get().count, 10);
    }

    #[test]
    fn store_mutate_merges_shallowly() {
        let store = Store::new(app_state());

        store.mutate(AppStatePartial {
            count: Some(5),
            ..Default::default()
        });

        assert_eq!(
            store.get(),
            AppState {
                count: 5,
                name: "test".to_string(),
            }
        );
    }

    #[test]
    fn store_subscribe() {
        let store = Store::new(app_state());

        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let _subscription = store.subscribe(move |_state| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(call_count.load(Ordering::SeqCst), 0);

        store.update(|state| state.count += 1);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        store.mutate(AppStatePartial::default());
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let store = Store::new(app_state());
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            let _ = store.subscribe(move |state: &AppState| {
                seen.lock().unwrap().push((tag, state.count));
            });
        }

        store.update(|state| state.count = 7);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = Store::new(app_state());
        let call_count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&call_count);

        let subscription = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.update(|state| state.count += 1);
        subscription.unsubscribe();
        store.update(|state| state.count += 1);

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn listener_may_write_back() {
        let store = Store::new(app_state());
        let writer = store.clone();

        let _ = store.subscribe(move |state: &AppState| {
            if state.count == 1 && state.name == "test" {
                writer.mutate(AppStatePartial {
                    name: Some("reached one".to_string()),
                    ..Default::default()
                });
            }
        });

        store.update(|state| state.count = 1);
        assert_eq!(store.get().name, "reached one");
    }

    #[test]
    fn update_closure_may_read_same_store() {
        let store = Store::new(app_state());
        let inner = store.clone();

        store.update(|state| state.count = inner.get().count + 1);
        store.update(|state| state.count = inner.read(|current| current.count) + 1);

        assert_eq!(store.get().count, 2);
    }

    #[test]
    fn read_closure_may_write_same_store() {
        let store = Store::new(app_state());
        let writer = store.clone();

        let seen = store.read(|state| {
            writer.mutate(AppStatePartial {
                count: Some(state.count + 5),
                ..Default::default()
            });
            state.count
        });

        assert_eq!(seen, 0);
        assert_eq!(store.get().count, 5);
    }
}
