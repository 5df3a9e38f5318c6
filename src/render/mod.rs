//! A minimal render host.
//!
//! [`mount`] turns a view function into a render context: the function runs
//! once immediately and again whenever a store it read changes. The latest
//! output is kept on the returned [`Root`].

mod root;

pub use root::{mount, Root};
