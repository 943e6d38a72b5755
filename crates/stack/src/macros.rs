//! Public macros

/// Captures the current call site as a [`Provenance`](crate::Provenance)
/// value.
///
/// # Examples
/// ```
/// use vigil_stack::{GuardedStack, provenance};
///
/// let stack = GuardedStack::<i32>::new(0, provenance!("numbers")).unwrap();
/// assert_eq!(stack.provenance().name(), "numbers");
/// ```
#[macro_export]
macro_rules! provenance {
    ($name:expr) => {
        $crate::Provenance::new($name, module_path!(), file!(), line!())
    };
}
