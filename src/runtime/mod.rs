//! Runtime support for render contexts.
//!
//! This module provides the infrastructure for dependency tracking between
//! stores and the render contexts that read them.

mod context;
mod source;

pub use context::{Gate, ReactiveRuntime};
pub use source::Source;
