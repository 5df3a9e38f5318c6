use std::fmt;
use std::sync::Arc;

use crate::atomic::compose::Shared;
use crate::atomic::props::{Overrides, Props};
use crate::record::Record;
use crate::render::{mount, Root};
use crate::store::ReactiveStore;

type RenderFn<S, A, F, V> = Arc<dyn Fn(&Props<S, A, F>) -> V + Send + Sync>;

/// A render function bound to a composed store.
///
/// Every render reads the store through the current render context, so a
/// mounted component re-renders whenever the store changes.
pub struct Component<S, A, F, V> {
    shared: Arc<Shared<S, A, F>>,
    render: RenderFn<S, A, F, V>,
    display_name: Arc<str>,
}

impl<S, A, F, V> Component<S, A, F, V>
where
    S: Record,
    A: Record,
    F: Record,
    V: 'static,
{
    pub(crate) fn new(
        shared: Arc<Shared<S, A, F>>,
        render: RenderFn<S, A, F, V>,
        display_name: String,
    ) -> Self {
        Self {
            shared,
            render,
            display_name: display_name.into(),
        }
    }

    /// `Atomic(<name>)`.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Props for one render: combined state, then functions, then overrides.
    pub fn props(&self, overrides: Overrides<S, A, F>) -> Props<S, A, F> {
        let combined = self.shared.combine(self.shared.store.use_store());
        Props::build(combined, &self.shared.functions, overrides)
    }

    /// Render once with the given overrides.
    pub fn render(&self, overrides: Overrides<S, A, F>) -> V {
        let props = self.props(overrides);
        (self.render)(&props)
    }

    /// Mount the component; it re-renders on every store change until the
    /// returned root is dropped.
    pub fn mount(&self, overrides: Overrides<S, A, F>) -> Root<V>
    where
        V: Send + Sync,
    {
        let component = self.clone();
        tracing::debug!(component = %self.display_name, "mounting component");
        mount(move || component.render(overrides.clone()))
    }
}

impl<S, A, F, V> Clone for Component<S, A, F, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            render: Arc::clone(&self.render),
            display_name: Arc::clone(&self.display_name),
        }
    }
}

impl<S, A, F, V> fmt::Debug for Component<S, A, F, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}
