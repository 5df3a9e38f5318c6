/// Declare a record struct together with its partial type.
///
/// The struct keeps its attributes, so derive `Clone` on it (required by
/// [`Record`](crate::Record)). The partial type gets one `Option` per field,
/// derives `Clone` and `Default`, and implements `Debug` by reporting which
/// fields are set, so callable fields need no `Debug` of their own.
///
/// # Usage
///
/// ```rust
/// use atomic_state::{record, Record};
///
/// record! {
///     #[derive(Clone, Debug, PartialEq)]
///     pub struct Counter => CounterPartial {
///         pub count: i64,
///         pub label: String,
///     }
/// }
///
/// let mut counter = Counter { count: 0, label: "clicks".into() };
/// counter.merge(CounterPartial { count: Some(3), ..Default::default() });
/// assert_eq!(counter.count, 3);
/// assert_eq!(counter.label, "clicks");
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident => $partial:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        #[doc = concat!("Fields of [`", stringify!($name), "`] to overwrite on merge.")]
        #[derive(Clone, Default)]
        $vis struct $partial {
            $(
                $field_vis $field: ::core::option::Option<$ty>,
            )*
        }

        impl ::core::fmt::Debug for $partial {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct(stringify!($partial))
                    $(
                        .field(
                            stringify!($field),
                            &$crate::record::FieldState(self.$field.is_some()),
                        )
                    )*
                    .finish()
            }
        }

        impl $crate::Record for $name {
            type Partial = $partial;

            #[allow(unused_variables)]
            fn merge(&mut self, partial: Self::Partial) {
                $(
                    if let ::core::option::Option::Some(value) = partial.$field {
                        self.$field = value;
                    }
                )*
            }
        }
    };
}
