//! The reactive store primitive.
//!
//! [`ReactiveStore`] is the capability the composer and the selector factory
//! are written against: read a snapshot, merge a partial, subscribe, and
//! register the current render context as a reader. [`Store`] is the
//! implementation shipped with the crate.

mod store;
mod subscription;

use std::sync::Arc;

pub use store::Store;
pub use subscription::Subscription;

use crate::record::Record;
use crate::runtime::Gate;

/// Callback invoked with the new state after every write.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A subscribable holder of state with synchronous read, mutate and
/// subscribe.
pub trait ReactiveStore<T: Record>: Clone + Send + Sync + 'static {
    /// Current state, without subscribing.
    fn snapshot(&self) -> T;

    /// Shallow-merge `partial` into the state and notify.
    fn mutate(&self, partial: T::Partial);

    /// Register a listener for every write.
    fn subscribe(&self, listener: Listener<T>) -> Subscription;

    /// Subscribe the current render context to every change.
    fn track(&self);

    /// Subscribe the current render context to changes that flip `gate`.
    fn track_with(&self, gate: Gate);

    /// Current state, subscribing the current render context to it.
    fn use_store(&self) -> T {
        self.track();
        self.snapshot()
    }

    /// Project the current state, subscribing the current render context
    /// only to changes of the projected value.
    fn use_selector<R, F>(&self, selector: F) -> R
    where
        R: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        let selected = selector(&self.snapshot());
        let store = self.clone();
        let last = selected.clone();
        self.track_with(Arc::new(move || selector(&store.snapshot()) != last));
        selected
    }
}
