/// Early-return guard for fallible functions
///
/// Behaves like `assert!`, except that a failed condition returns `Err($err)` from the
/// enclosing function instead of panicking. Equivalent to `if !$cond { return Err($err); }`.
///
/// ```
/// # use ensure_macro::ensure;
/// #[derive(Debug, PartialEq)]
/// enum BuildError {
///     EmptyRing,
/// }
///
/// fn ring_size(ring: &[u64]) -> Result<usize, BuildError> {
///     ensure!(!ring.is_empty(), BuildError::EmptyRing);
///     Ok(ring.len())
/// }
///
/// assert_eq!(ring_size(&[1, 2, 3]), Ok(3));
/// assert_eq!(ring_size(&[]), Err(BuildError::EmptyRing));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
