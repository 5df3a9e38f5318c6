//! Records: plain structs with a partial counterpart and a key-wise merge.
//!
//! State, actions and helper functions are all records. A partial of a
//! record carries an `Option` per field; merging it overwrites exactly the
//! fields that are `Some`.

mod macros;
mod record;

pub use record::{action, action_with, Action, ActionWith, FieldState, Record};
