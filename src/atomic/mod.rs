//! Store composition.
//!
//! [`compose`] wires an initial state, an action deriver, helper functions
//! and a render function into an [`Atomic`]: a store holding the combined
//! state, a [`Component`] that renders from it, and a selector factory.
//!
//! Props precedence, from lowest to highest: combined state, helper
//! functions, caller overrides.

mod component;
mod compose;
mod config;
mod props;

pub use component::Component;
pub use compose::{compose, compose_with, Atomic, Mutator, Reader};
pub use config::AtomicConfig;
pub use props::{Combined, Overrides, Props};
