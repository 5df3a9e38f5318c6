//! # atomic-state
//!
//! Bind a reactive store to a render function, so a component can read and
//! mutate shared state without threading it through props.
//!
//! ## Composition
//!
//! [`compose`] takes four things:
//! - an initial state record,
//! - an action deriver, called once with a [`Mutator`], a [`Reader`] and the
//!   helper functions,
//! - helper functions, fixed for the store's lifetime,
//! - a render function from [`Props`] to any output.
//!
//! It returns an [`Atomic`]: the store, a [`Component`] and a selector
//! factory ([`Atomic::select`]).
//!
//! ## Primitives
//!
//! - [`Store`] - shared state with shallow-merge writes and listeners
//! - [`ReactiveStore`] - the capability the composer is written against
//! - [`create_selector`] - a projected hook over any reactive store
//! - [`render::mount`] - a render context that re-runs on store changes
//!
//! Records are declared with [`record!`], which also generates the partial
//! type used for merges and overrides.

pub mod atomic;
pub mod error;
pub mod record;
pub mod render;
pub mod runtime;
pub mod selector;
pub mod store;

// Re-export main types for convenience
pub use atomic::{
    compose, compose_with, Atomic, AtomicConfig, Combined, Component, Mutator, Overrides, Props,
    Reader,
};
pub use error::{AtomicError, BoxError};
pub use record::{action, action_with, Action, ActionWith, Record};
pub use selector::{create_selector, SelectorHook};
pub use store::{Listener, ReactiveStore, Store, Subscription};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = Store::new(0_i32);
        assert_eq!(store.get(), 0);
        store.mutate(Some(42));
        assert_eq!(store.get(), 42);
    }
}
