use std::fmt;

/// Handle returned by [`Store::subscribe`](crate::Store::subscribe).
///
/// Dropping the handle leaves the listener registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
pub struct Subscription {
    unsubscribe: Box<dyn FnOnce() + Send + Sync>,
}

impl Subscription {
    pub(crate) fn new<F>(unsubscribe: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            unsubscribe: Box::new(unsubscribe),
        }
    }

    /// Remove the listener from its store.
    pub fn unsubscribe(self) {
        (self.unsubscribe)();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
