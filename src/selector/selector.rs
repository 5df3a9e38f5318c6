use std::fmt;
use std::sync::Arc;

use crate::record::Record;
use crate::store::ReactiveStore;

/// A zero-argument hook returning a projected value.
///
/// Hooks hold no state of their own: every [`get`](SelectorHook::get)
/// reads the store again.
pub struct SelectorHook<R> {
    hook: Arc<dyn Fn() -> R + Send + Sync>,
}

impl<R> SelectorHook<R> {
    pub(crate) fn new<H>(hook: H) -> Self
    where
        H: Fn() -> R + Send + Sync + 'static,
    {
        Self {
            hook: Arc::new(hook),
        }
    }

    /// Current projected value; subscribes the current render context to
    /// changes of that value.
    pub fn get(&self) -> R {
        (self.hook)()
    }
}

impl<R> Clone for SelectorHook<R> {
    fn clone(&self) -> Self {
        Self {
            hook: Arc::clone(&self.hook),
        }
    }
}

impl<R> fmt::Debug for SelectorHook<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorHook").finish_non_exhaustive()
    }
}

/// Create a hook that projects `store` through `selector`.
///
/// Works with any [`ReactiveStore`]. Hooks created for different stores,
/// or for the same store, are independent.
///
/// # Example
///
/// ```
/// use atomic_state::{create_selector, record, Store};
///
/// record! {
///     #[derive(Clone)]
///     struct Counter => CounterPartial { count: i64 }
/// }
///
/// let store = Store::new(Counter { count: 0 });
/// let count = create_selector(store.clone(), |state: &Counter| state.count);
/// assert_eq!(count.get(), 0);
///
/// store.mutate(CounterPartial { count: Some(5) });
/// assert_eq!(count.get(), 5);
/// ```
pub fn create_selector<T, St, R, F>(store: St, selector: F) -> SelectorHook<R>
where
    T: Record,
    St: ReactiveStore<T>,
    R: Clone + PartialEq + Send + Sync + 'static,
    F: Fn(&T) -> R + Send + Sync + 'static,
{
    let selector = Arc::new(selector);
    SelectorHook::new(move || {
        let selector = Arc::clone(&selector);
        store.use_selector(move |state: &T| selector(state))
    })
}
