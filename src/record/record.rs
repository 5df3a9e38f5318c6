use std::fmt;
use std::sync::Arc;

/// A value that can be shallow-merged with a partial of itself.
///
/// Implement it with the [`record!`](crate::record!) macro rather than by
/// hand. `()` is the empty record.
pub trait Record: Clone + Send + Sync + 'static {
    /// The same fields, each optional.
    type Partial: Default + Clone + Send + Sync + 'static;

    /// Overwrite every field that is present in `partial`.
    fn merge(&mut self, partial: Self::Partial);

    /// Return a copy of `self` with `partial` merged in.
    fn merged(&self, partial: Self::Partial) -> Self {
        let mut next = self.clone();
        next.merge(partial);
        next
    }
}

impl Record for () {
    type Partial = ();

    fn merge(&mut self, _partial: Self::Partial) {}
}

// Scalars merge by replacement.
macro_rules! scalar_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Record for $ty {
                type Partial = Option<$ty>;

                fn merge(&mut self, partial: Self::Partial) {
                    if let Some(value) = partial {
                        *self = value;
                    }
                }
            }
        )*
    };
}

scalar_record!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

/// Whether a partial field is set, as printed by a partial's `Debug`.
#[doc(hidden)]
pub struct FieldState(pub bool);

impl fmt::Debug for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 { "set" } else { "unset" })
    }
}

/// A callable record field taking no arguments.
pub type Action = Arc<dyn Fn() + Send + Sync>;

/// A callable record field taking one argument.
pub type ActionWith<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Wrap a closure as an [`Action`].
pub fn action<F>(f: F) -> Action
where
    F: Fn() + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as an [`ActionWith`].
pub fn action_with<T, F>(f: F) -> ActionWith<T>
where
    F: Fn(T) + Send + Sync + 'static,
{
    Arc::new(f)
}
