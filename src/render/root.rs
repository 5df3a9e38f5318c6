use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::runtime::ReactiveRuntime;

/// A mounted render context and its latest output.
///
/// Dropping the root unmounts it.
pub struct Root<V> {
    observer_id: usize,
    runtime: Weak<ReactiveRuntime>,
    output: Arc<RwLock<Option<V>>>,
    renders: Arc<AtomicUsize>,
}

impl<V: Clone> Root<V> {
    /// The output of the most recent render.
    pub fn output(&self) -> Option<V> {
        self.output
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<V> Root<V> {
    /// How many times the view function has run.
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Stop re-rendering and drop all subscriptions of this context.
    pub fn unmount(self) {}
}

impl<V> Drop for Root<V> {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.remove_observer(self.observer_id);
            tracing::debug!(observer_id = self.observer_id, "unmounted");
        }
    }
}

/// Mount `view` as a render context of the current runtime.
///
/// `view` runs once before this returns. Panics raised by `view` propagate
/// to the caller of `mount`, or to whoever triggered the re-render.
///
/// # Example
///
/// ```
/// use atomic_state::render::mount;
/// use atomic_state::{ReactiveStore, Store};
///
/// let store = Store::new(1_u32);
/// let root = mount({
///     let store = store.clone();
///     move || format!("value: {}", store.get())
/// });
/// assert_eq!(root.output().as_deref(), Some("value: 1"));
/// # let _ = store;
/// ```
pub fn mount<V, F>(view: F) -> Root<V>
where
    V: Send + Sync + 'static,
    F: Fn() -> V + Send + Sync + 'static,
{
    let runtime = ReactiveRuntime::current();
    let observer_id = ReactiveRuntime::next_id();
    let output = Arc::new(RwLock::new(None));
    let renders = Arc::new(AtomicUsize::new(0));

    let slot = Arc::clone(&output);
    let counter = Arc::clone(&renders);
    tracing::debug!(observer_id, "mounting");
    runtime.create_observer(observer_id, move || {
        let rendered = view();
        counter.fetch_add(1, Ordering::SeqCst);
        *slot.write().unwrap_or_else(PoisonError::into_inner) = Some(rendered);
    });

    Root {
        observer_id,
        runtime: Arc::downgrade(&runtime),
        output,
        renders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ReactiveStore, Store};

    #[test]
    fn root_rerenders_on_tracked_change() {
        ReactiveRuntime::scope(|| {
            let store = Store::new(1_u32);
            let root = mount({
                let store = store.clone();
                move || store.use_store() * 10
            });
            assert_eq!(root.output(), Some(10));
            assert_eq!(root.render_count(), 1);

            store.set(2);
            assert_eq!(root.output(), Some(20));
            assert_eq!(root.render_count(), 2);
        });
    }

    #[test]
    fn untracked_reads_do_not_rerender() {
        ReactiveRuntime::scope(|| {
            let store = Store::new(1_u32);
            let root = mount({
                let store = store.clone();
                move || store.get()
            });

            store.set(2);
            assert_eq!(root.output(), Some(1));
            assert_eq!(root.render_count(), 1);
        });
    }

    #[test]
    fn unmounted_root_stops_rendering() {
        ReactiveRuntime::scope(|| {
            let store = Store::new(1_u32);
            let renders = Arc::new(AtomicUsize::new(0));
            let root = mount({
                let store = store.clone();
                let renders = Arc::clone(&renders);
                move || {
                    renders.fetch_add(1, Ordering::SeqCst);
                    store.use_store()
                }
            });
            root.unmount();

            store.set(2);
            assert_eq!(renders.load(Ordering::SeqCst), 1);
        });
    }
}
