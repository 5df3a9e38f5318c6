use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::runtime::{Gate, ReactiveRuntime};

/// Something render contexts can read and be re-run by.
///
/// A source is not bound to a runtime: a read registers the dependency with
/// the runtime of the active render context, and the source remembers every
/// runtime it was read from so that `notify` reaches them all.
pub struct Source {
    id: usize,
    watchers: Mutex<Vec<Weak<ReactiveRuntime>>>,
}

impl Source {
    pub fn new() -> Self {
        Self {
            id: ReactiveRuntime::next_id(),
            watchers: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    fn watchers(&self) -> MutexGuard<'_, Vec<Weak<ReactiveRuntime>>> {
        self.watchers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe the active render context to every change.
    pub fn track(&self) {
        self.register(None);
    }

    /// Subscribe the active render context to changes that flip `gate`.
    pub fn track_with(&self, gate: Gate) {
        self.register(Some(gate));
    }

    fn register(&self, gate: Option<Gate>) {
        let Some((runtime, observer_id)) = ReactiveRuntime::observing() else {
            return;
        };
        if !runtime.track(observer_id, self.id, gate) {
            return;
        }
        let handle = Arc::downgrade(&runtime);
        let mut watchers = self.watchers();
        watchers.retain(|watcher| watcher.strong_count() > 0);
        if !watchers.iter().any(|watcher| Weak::ptr_eq(watcher, &handle)) {
            watchers.push(handle);
        }
    }

    /// Re-run dependent render contexts in every runtime that read this
    /// source.
    pub fn notify(&self) {
        let runtimes: Vec<Arc<ReactiveRuntime>> =
            self.watchers().iter().filter_map(Weak::upgrade).collect();
        for runtime in runtimes {
            runtime.notify_observers(self.id);
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Self::new()
    }
}
