//! Authentication error types.

use thiserror::Error;

use crate::remote::RemoteError;

/// Errors that can occur during authentication operations.
///
/// These are returned, never thrown across the public boundary: a failed
/// sign-in leaves the caller with an `Err` value and the synchronizer in a
/// settled (non-loading) state.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] seasons_core::EmailError),

    /// The remote identity service call failed.
    #[error("remote service error: {0}")]
    Remote(#[from] RemoteError),
}
