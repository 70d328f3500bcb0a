use crate::error::ApiError;

/// Return type of every network operation
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Collapse a result into a single value by handling both branches
pub trait Fold<T, E> {
    /// Invoke `on_success` for `Ok` or `on_error` for `Err`, never both
    fn fold<R>(self, on_success: impl FnOnce(T) -> R, on_error: impl FnOnce(E) -> R) -> R;
}

impl<T, E> Fold<T, E> for std::result::Result<T, E> {
    #[inline]
    fn fold<R>(self, on_success: impl FnOnce(T) -> R, on_error: impl FnOnce(E) -> R) -> R {
        match self {
            Ok(value) => on_success(value),
            Err(error) => on_error(error),
        }
    }
}
