//! Shared utility functions

use nvim_oxi::api::Error as ApiError;

/// Lock a mutex, recovering the guard if a previous holder panicked.
#[macro_export]
macro_rules! lock_logged {
    ($mutex:expr, $name:literal) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("{} mutex was poisoned, recovering", $name);
                poisoned.into_inner()
            }
        }
    };
}

/// Convert any error into a Neovim API error
pub fn as_api_error(e: impl std::error::Error) -> ApiError {
    ApiError::Other(e.to_string())
}
