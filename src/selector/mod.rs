//! Selector hooks.
//!
//! A selector hook projects a store's state and subscribes the calling
//! render context to the projected value only.

mod selector;

pub use selector::{create_selector, SelectorHook};
