//! Remote identity/data service boundary.
//!
//! The hosted backend owns authentication and the `profiles` table; this
//! module defines the seam the synchronizer talks through. [`IdentityService`]
//! is the trait, [`rest::RestIdentityClient`] the production implementation,
//! and tests substitute their own mock.

pub mod rest;

pub use rest::RestIdentityClient;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use seasons_core::{Email, UserId, UserType};

use crate::models::{Profile, Session};

/// Errors from the remote service.
///
/// These are always returned as values; nothing in this crate lets one
/// propagate past a public operation as a panic.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Service-provided message, best effort.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service endpoint configuration is unusable.
    #[error("invalid endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A push notification about the session changing underneath us.
///
/// Mirrors the hosted SDK's auth-state-change callback: emitted on sign-in
/// and sign-out, whichever code path triggered them.
#[derive(Debug, Clone)]
pub enum AuthChange {
    /// A session was established (sign-in or sign-up).
    SignedIn(Session),
    /// The session ended.
    SignedOut,
}

/// Identity metadata attached to the account-creation call.
///
/// The service stores this on the raw identity record; the profile row proper
/// is created separately.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpMetadata {
    pub user_type: UserType,
    pub business_name: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

/// The remote identity and profile-record service.
///
/// Every method maps to one hosted-service call. `fetch_profile` returns
/// `Ok(None)` for the distinguished not-found case (which triggers profile
/// bootstrap) and `Err` only for real failures.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// The current session, if one is established.
    async fn current_session(&self) -> Result<Option<Session>, RemoteError>;

    /// Create an account with the supplied credentials and identity metadata.
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        metadata: &SignUpMetadata,
    ) -> Result<Session, RemoteError>;

    /// Authenticate with email and password.
    async fn sign_in(&self, email: &Email, password: &SecretString)
    -> Result<Session, RemoteError>;

    /// Terminate the current session.
    async fn sign_out(&self) -> Result<(), RemoteError>;

    /// Subscribe to session-change push notifications.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;

    /// Fetch the profile row for `id`. `Ok(None)` means no row exists.
    async fn fetch_profile(&self, id: UserId) -> Result<Option<Profile>, RemoteError>;

    /// Insert a profile row.
    async fn create_profile(&self, profile: &Profile) -> Result<(), RemoteError>;
}
