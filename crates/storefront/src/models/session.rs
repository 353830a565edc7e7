//! Remote session types.
//!
//! A session is proof of authenticated identity issued by the remote service.
//! This core only reads it: the token is carried opaquely and the attached
//! user identity drives profile loading.

use secrecy::SecretString;

use seasons_core::{Email, UserId};

/// The identity attached to a session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: UserId,
    pub email: Email,
}

/// An authenticated remote session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token for the remote service. Opaque to this core.
    pub access_token: SecretString,
    pub user: SessionUser,
}

impl Session {
    /// Create a session from its parts.
    #[must_use]
    pub fn new(access_token: SecretString, user: SessionUser) -> Self {
        Self { access_token, user }
    }
}
