//! Error types for store composition.

use thiserror::Error;

/// Boxed error returned by an action deriver.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while composing an atomic store.
#[derive(Debug, Error)]
pub enum AtomicError {
    /// The action deriver returned an error.
    #[error("failed to derive state actions for {name}: {source}")]
    Derive {
        name: String,
        #[source]
        source: BoxError,
    },
}

/// Result type for composition.
pub type Result<T> = std::result::Result<T, AtomicError>;
