use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Change check attached to a selected read.
///
/// Returns `true` when the projected value no longer matches what the
/// render context last saw.
pub type Gate = Arc<dyn Fn() -> bool + Send + Sync>;

type Observer = Arc<dyn Fn() + Send + Sync>;

/// How an observer depends on a source.
enum Interest {
    /// Any change re-runs the observer.
    Whole,
    /// Only changes that flip at least one gate re-run the observer.
    Gated(Vec<Gate>),
}

impl Interest {
    fn add(&mut self, gate: Option<Gate>) {
        match gate {
            None => *self = Interest::Whole,
            Some(gate) => {
                if let Interest::Gated(gates) = self {
                    gates.push(gate);
                }
            }
        }
    }
}

/// Dependency graph between sources (stores) and observers (render contexts).
struct ReactiveContext {
    // Map from source ID to the observers that read it, in registration order
    dependencies: HashMap<usize, BTreeMap<usize, Interest>>,
    // Map from observer ID to the sources it read during its last run
    observer_deps: HashMap<usize, HashSet<usize>>,
    // Map from observer ID to its render function
    observers: HashMap<usize, Observer>,
}

impl ReactiveContext {
    fn new() -> Self {
        Self {
            dependencies: HashMap::new(),
            observer_deps: HashMap::new(),
            observers: HashMap::new(),
        }
    }

    fn clear_deps(&mut self, observer_id: usize) {
        if let Some(old_deps) = self.observer_deps.remove(&observer_id) {
            for source_id in old_deps {
                if let Some(deps) = self.dependencies.get_mut(&source_id) {
                    deps.remove(&observer_id);
                    if deps.is_empty() {
                        self.dependencies.remove(&source_id);
                    }
                }
            }
        }
    }
}

// IDs are unique across runtimes, so a source can be read from any of them.
static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

// Thread-local stacks for scoped runtimes and the observer being rendered
thread_local! {
    static RUNTIME_STACK: RefCell<Vec<Arc<ReactiveRuntime>>> = const { RefCell::new(Vec::new()) };
    static OBSERVER_STACK: RefCell<Vec<(Weak<ReactiveRuntime>, usize)>> = const { RefCell::new(Vec::new()) };
}

/// Reactive runtime owning render contexts and their dependencies.
///
/// Supports both a global runtime (default) and scoped runtimes for
/// isolation. A render context belongs to the runtime that mounted it; it
/// may read stores created under any runtime.
///
/// # Examples
///
/// ```
/// use atomic_state::runtime::ReactiveRuntime;
/// use atomic_state::Store;
///
/// ReactiveRuntime::scope(|| {
///     let store = Store::new(0_u32);
///     assert_eq!(store.get(), 0);
/// });
/// // Runtime and all its state is dropped here
/// ```
pub struct ReactiveRuntime {
    context: Mutex<ReactiveContext>,
}

impl ReactiveRuntime {
    fn new() -> Arc<Self> {
        Arc::new(ReactiveRuntime {
            context: Mutex::new(ReactiveContext::new()),
        })
    }

    /// Run a function with a fresh isolated runtime.
    ///
    /// The runtime is dropped when the function returns, unless a render
    /// context mounted inside it is still alive.
    pub fn scope<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        Self::with_runtime(Self::new(), f)
    }

    /// Get or create the global runtime (fallback).
    pub fn global() -> Arc<Self> {
        use std::sync::OnceLock;
        static RUNTIME: OnceLock<Arc<ReactiveRuntime>> = OnceLock::new();
        Arc::clone(RUNTIME.get_or_init(Self::new))
    }

    /// Get the current reactive runtime (scoped or global fallback).
    pub fn current() -> Arc<Self> {
        RUNTIME_STACK.with(|stack| stack.borrow().last().cloned().unwrap_or_else(Self::global))
    }

    /// Run a function with a specific runtime as the current context.
    pub fn with_runtime<F, R>(runtime: Arc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        RUNTIME_STACK.with(|stack| stack.borrow_mut().push(runtime));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        RUNTIME_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReactiveContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate the next unique ID for a source, listener or observer.
    pub fn next_id() -> usize {
        NEXT_ID.fetch_add(1, Ordering::SeqCst)
    }

    /// The render context active on this thread, with the runtime that
    /// owns it.
    pub fn observing() -> Option<(Arc<ReactiveRuntime>, usize)> {
        OBSERVER_STACK.with(|stack| {
            let stack = stack.borrow();
            let (runtime, observer_id) = stack.last()?;
            Some((runtime.upgrade()?, *observer_id))
        })
    }

    /// Record that `observer_id` read `source_id`, optionally gated.
    ///
    /// Returns `false` if the observer is not registered here.
    pub(crate) fn track(&self, observer_id: usize, source_id: usize, gate: Option<Gate>) -> bool {
        let mut ctx = self.lock();
        if !ctx.observers.contains_key(&observer_id) {
            return false;
        }
        let interests = ctx.dependencies.entry(source_id).or_default();
        match interests.get_mut(&observer_id) {
            Some(interest) => interest.add(gate),
            None => {
                let interest = match gate {
                    Some(gate) => Interest::Gated(vec![gate]),
                    None => Interest::Whole,
                };
                interests.insert(observer_id, interest);
            }
        }
        ctx.observer_deps
            .entry(observer_id)
            .or_default()
            .insert(source_id);
        true
    }

    /// Re-run every observer of this runtime that depends on a source.
    ///
    /// Observers run in registration order. Gated observers are skipped
    /// when none of their selections changed.
    pub fn notify_observers(self: &Arc<Self>, source_id: usize) {
        let pending: Vec<(usize, Option<Vec<Gate>>)> = {
            let ctx = self.lock();
            match ctx.dependencies.get(&source_id) {
                Some(interests) => interests
                    .iter()
                    .map(|(id, interest)| match interest {
                        Interest::Whole => (*id, None),
                        Interest::Gated(gates) => (*id, Some(gates.clone())),
                    })
                    .collect(),
                None => return,
            }
        };

        for (observer_id, gates) in pending {
            let changed = match gates {
                None => true,
                Some(gates) => gates.iter().any(|gate| gate()),
            };
            if changed {
                self.run_observer(observer_id);
            }
        }
    }

    /// Register a render function under `observer_id` and run it once.
    pub fn create_observer<F>(self: &Arc<Self>, observer_id: usize, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        {
            let mut ctx = self.lock();
            ctx.clear_deps(observer_id);
            ctx.observers.insert(observer_id, Arc::new(f));
        }
        self.run_observer(observer_id);
    }

    /// Re-run an observer, collecting its dependencies afresh.
    ///
    /// Does nothing if the observer was removed.
    pub fn run_observer(self: &Arc<Self>, observer_id: usize) {
        let observer = {
            let mut ctx = self.lock();
            let Some(observer) = ctx.observers.get(&observer_id).cloned() else {
                return;
            };
            ctx.clear_deps(observer_id);
            observer
        };
        tracing::trace!(observer_id, "running observer");
        self.with_observer(observer_id, || observer());
    }

    /// Run a function with a specific observer as the current context.
    pub fn with_observer<F, R>(self: &Arc<Self>, observer_id: usize, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        OBSERVER_STACK.with(|stack| stack.borrow_mut().push((Arc::downgrade(self), observer_id)));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        OBSERVER_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    /// Remove an observer and all of its dependencies.
    pub fn remove_observer(&self, observer_id: usize) {
        let mut ctx = self.lock();
        ctx.observers.remove(&observer_id);
        ctx.clear_deps(observer_id);
    }

    /// Number of observers of this runtime currently depending on a source.
    pub fn observer_count(&self, source_id: usize) -> usize {
        self.lock()
            .dependencies
            .get(&source_id)
            .map_or(0, BTreeMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Source;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn reads_outside_observer_are_not_tracked() {
        ReactiveRuntime::scope(|| {
            let runtime = ReactiveRuntime::current();
            let source = Source::new();
            source.track();
            assert_eq!(runtime.observer_count(source.id()), 0);
            assert!(ReactiveRuntime::observing().is_none());
        });
    }

    #[test]
    fn observer_reruns_on_notify() {
        ReactiveRuntime::scope(|| {
            let runtime = ReactiveRuntime::current();
            let source = Arc::new(Source::new());
            let observer = ReactiveRuntime::next_id();
            let runs = Arc::new(AtomicUsize::new(0));

            let read = Arc::clone(&source);
            let counter = Arc::clone(&runs);
            runtime.create_observer(observer, move || {
                read.track();
                counter.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(runs.load(Ordering::SeqCst), 1);
            assert_eq!(runtime.observer_count(source.id()), 1);

            source.notify();
            assert_eq!(runs.load(Ordering::SeqCst), 2);

            runtime.remove_observer(observer);
            source.notify();
            assert_eq!(runs.load(Ordering::SeqCst), 2);
            assert_eq!(runtime.observer_count(source.id()), 0);
        });
    }

    #[test]
    fn gated_observer_skips_unchanged_selection() {
        ReactiveRuntime::scope(|| {
            let runtime = ReactiveRuntime::current();
            let source = Arc::new(Source::new());
            let observer = ReactiveRuntime::next_id();
            let runs = Arc::new(AtomicUsize::new(0));
            let changed = Arc::new(AtomicBool::new(false));

            let read = Arc::clone(&source);
            let counter = Arc::clone(&runs);
            let flag = Arc::clone(&changed);
            runtime.create_observer(observer, move || {
                let flag = Arc::clone(&flag);
                read.track_with(Arc::new(move || flag.load(Ordering::SeqCst)));
                counter.fetch_add(1, Ordering::SeqCst);
            });

            source.notify();
            assert_eq!(runs.load(Ordering::SeqCst), 1);

            changed.store(true, Ordering::SeqCst);
            source.notify();
            assert_eq!(runs.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn observer_belongs_to_its_own_runtime() {
        let outer = ReactiveRuntime::current();
        ReactiveRuntime::scope(|| {
            let inner = ReactiveRuntime::current();
            assert!(!Arc::ptr_eq(&outer, &inner));
            inner.with_observer(0, || {
                let (runtime, observer) = ReactiveRuntime::observing().unwrap();
                assert!(Arc::ptr_eq(&runtime, &inner));
                assert_eq!(observer, 0);
            });
        });
        assert!(ReactiveRuntime::observing().is_none());
    }

    #[test]
    fn source_created_outside_scope_notifies_scoped_observer() {
        let source = Arc::new(Source::new());
        ReactiveRuntime::scope(|| {
            let runtime = ReactiveRuntime::current();
            let observer = ReactiveRuntime::next_id();
            let runs = Arc::new(AtomicUsize::new(0));

            let read = Arc::clone(&source);
            let counter = Arc::clone(&runs);
            runtime.create_observer(observer, move || {
                read.track();
                counter.fetch_add(1, Ordering::SeqCst);
            });

            source.notify();
            assert_eq!(runs.load(Ordering::SeqCst), 2);
            runtime.remove_observer(observer);
        });
    }
}
