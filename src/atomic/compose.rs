use std::sync::{Arc, OnceLock, Weak};

use crate::atomic::component::Component;
use crate::atomic::config::AtomicConfig;
use crate::atomic::props::{Combined, Props};
use crate::error::{AtomicError, BoxError, Result};
use crate::record::Record;
use crate::selector::SelectorHook;
use crate::store::{ReactiveStore, Store};

/// Write access to the state, handed to the action deriver.
pub struct Mutator<S> {
    store: Store<S>,
}

impl<S: Record> Mutator<S> {
    /// Shallow-merge `partial` into the state and notify.
    pub fn mutate(&self, partial: S::Partial) {
        self.store.mutate(partial);
    }

    /// Compute a partial from the current state, then merge it.
    pub fn mutate_with<F>(&self, f: F)
    where
        F: FnOnce(&S) -> S::Partial,
    {
        let partial = self.store.read(f);
        self.store.mutate(partial);
    }

    /// Replace the whole state.
    pub fn replace(&self, state: S) {
        self.store.set(state);
    }
}

impl<S> Clone for Mutator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

/// Untracked read access, handed to the action deriver.
pub struct Reader<S, A> {
    store: Store<S>,
    actions: Weak<OnceLock<A>>,
}

impl<S: Record, A: Record> Reader<S, A> {
    /// Current state snapshot.
    pub fn get(&self) -> S {
        self.store.get()
    }

    /// Read a snapshot of the current state.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        self.store.read(f)
    }

    /// Current combined state.
    ///
    /// `None` while the deriver is still running, or once the composed
    /// store has been dropped.
    pub fn combined(&self) -> Option<Combined<S, A>> {
        let actions = self.actions.upgrade()?.get()?.clone();
        Some(Combined {
            state: self.store.get(),
            actions,
        })
    }
}

impl<S, A> Clone for Reader<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            actions: Weak::clone(&self.actions),
        }
    }
}

/// Store, actions and functions shared by everything a composition returns.
pub(crate) struct Shared<S, A, F> {
    pub(crate) store: Store<S>,
    pub(crate) actions: A,
    pub(crate) functions: F,
    // Keeps `Reader::combined` working for as long as the composition lives.
    _published: Arc<OnceLock<A>>,
}

impl<S: Record, A: Record, F: Record> Shared<S, A, F> {
    pub(crate) fn combine(&self, state: S) -> Combined<S, A> {
        Combined {
            state,
            actions: self.actions.clone(),
        }
    }

    /// Combined state and functions, without overrides.
    pub(crate) fn view(&self, state: S) -> Props<S, A, F> {
        Props {
            state,
            actions: self.actions.clone(),
            functions: self.functions.clone(),
        }
    }
}

/// The result of [`compose`]: a store, a component and a selector factory
/// bound to the same state.
pub struct Atomic<S, A, F, V> {
    shared: Arc<Shared<S, A, F>>,
    component: Component<S, A, F, V>,
}

impl<S, A, F, V> Atomic<S, A, F, V>
where
    S: Record,
    A: Record,
    F: Record,
    V: 'static,
{
    /// Live combined state; subscribes the current render context.
    pub fn use_store(&self) -> Combined<S, A> {
        self.shared.combine(self.shared.store.use_store())
    }

    /// Combined state snapshot, without subscribing.
    pub fn get(&self) -> Combined<S, A> {
        self.shared.combine(self.shared.store.get())
    }

    /// The underlying store.
    pub fn store(&self) -> &Store<S> {
        &self.shared.store
    }

    /// The helper functions passed at composition.
    pub fn functions(&self) -> &F {
        &self.shared.functions
    }

    /// The component bound to this store.
    pub fn component(&self) -> &Component<S, A, F, V> {
        &self.component
    }

    /// A hook returning `selector` applied to combined state and functions.
    ///
    /// A render context calling the hook re-renders only when the selected
    /// value changes.
    pub fn select<R, Sel>(&self, selector: Sel) -> SelectorHook<R>
    where
        R: Clone + PartialEq + Send + Sync + 'static,
        Sel: Fn(&Props<S, A, F>) -> R + Send + Sync + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let selector = Arc::new(selector);
        SelectorHook::new(move || {
            let view = Arc::clone(&shared);
            let selector = Arc::clone(&selector);
            shared
                .store
                .use_selector(move |state: &S| selector(&view.view(state.clone())))
        })
    }
}

impl<S, A, F, V> Clone for Atomic<S, A, F, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            component: self.component.clone(),
        }
    }
}

/// Compose a store, its actions and a render function with the default
/// configuration.
///
/// `derive_actions` is called exactly once, before this returns, with a
/// mutator, a reader and the helper functions.
///
/// # Example
///
/// ```
/// use atomic_state::{action, compose, record, Action, Overrides};
///
/// record! {
///     #[derive(Clone)]
///     struct Counter => CounterPartial { count: i64 }
/// }
///
/// record! {
///     #[derive(Clone)]
///     struct CounterActions => CounterActionsPartial { increment: Action }
/// }
///
/// let counter = compose(
///     Counter { count: 0 },
///     |set, get, _| {
///         Ok(CounterActions {
///             increment: action(move || {
///                 let count = get.get().count;
///                 set.mutate(CounterPartial { count: Some(count + 1) });
///             }),
///         })
///     },
///     (),
///     |props| format!("count: {}", props.state.count),
/// )
/// .unwrap();
///
/// (counter.get().actions.increment)();
/// assert_eq!(counter.component().render(Overrides::none()), "count: 1");
/// ```
pub fn compose<S, A, F, V, D, R>(
    state: S,
    derive_actions: D,
    functions: F,
    render: R,
) -> Result<Atomic<S, A, F, V>>
where
    S: Record,
    A: Record,
    F: Record,
    V: 'static,
    D: FnOnce(Mutator<S>, Reader<S, A>, &F) -> std::result::Result<A, BoxError>,
    R: Fn(&Props<S, A, F>) -> V + Send + Sync + 'static,
{
    compose_with(AtomicConfig::default(), state, derive_actions, functions, render)
}

/// [`compose`] with explicit configuration.
pub fn compose_with<S, A, F, V, D, R>(
    config: AtomicConfig,
    state: S,
    derive_actions: D,
    functions: F,
    render: R,
) -> Result<Atomic<S, A, F, V>>
where
    S: Record,
    A: Record,
    F: Record,
    V: 'static,
    D: FnOnce(Mutator<S>, Reader<S, A>, &F) -> std::result::Result<A, BoxError>,
    R: Fn(&Props<S, A, F>) -> V + Send + Sync + 'static,
{
    let display_name = config.display_name();
    let store = Store::new(state);
    let published = Arc::new(OnceLock::new());

    let mutator = Mutator {
        store: store.clone(),
    };
    let reader = Reader {
        store: store.clone(),
        actions: Arc::downgrade(&published),
    };
    let actions = derive_actions(mutator, reader, &functions).map_err(|source| {
        AtomicError::Derive {
            name: display_name.clone(),
            source,
        }
    })?;
    // Freshly created, nothing else can have set it.
    let _ = published.set(actions.clone());

    tracing::debug!(name = %display_name, store = store.id(), "composed atomic store");

    let shared = Arc::new(Shared {
        store,
        actions,
        functions,
        _published: published,
    });
    let component = Component::new(Arc::clone(&shared), Arc::new(render), display_name);

    Ok(Atomic { shared, component })
}
