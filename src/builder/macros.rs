//! Macros for wiring entities into a state machine.

/// Implement [`Stater`](crate::core::Stater) for a struct by delegating to
/// one of its fields.
///
/// The field can be any type that already implements `Stater`, usually a
/// `String`.
///
/// # Example
///
/// ```
/// use transition::core::Stater;
/// use transition::impl_stater;
///
/// #[derive(Default)]
/// struct Order {
///     id: u64,
///     state: String,
/// }
///
/// impl_stater!(Order, state);
///
/// let mut order = Order::default();
/// order.set_state("checkout");
/// assert_eq!(Stater::state(&order), "checkout");
/// ```
#[macro_export]
macro_rules! impl_stater {
    ($ty:ty, $field:ident) => {
        impl $crate::core::Stater for $ty {
            fn state(&self) -> &str {
                $crate::core::Stater::state(&self.$field)
            }

            fn set_state(&mut self, name: &str) {
                $crate::core::Stater::set_state(&mut self.$field, name)
            }
        }
    };
}
