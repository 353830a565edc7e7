//! Application-level user profile.
//!
//! A profile is the marketplace-facing record (name, user type, business
//! fields), distinct from the raw identity record the auth service owns. It
//! lives in the remote `profiles` table and is mirrored in memory while a
//! session is active - never written to local durable storage.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use seasons_core::{Email, UserId, UserType};

/// First name assigned to lazily bootstrapped profiles.
const BOOTSTRAP_FIRST_NAME: &str = "User";
/// Last name assigned to lazily bootstrapped profiles.
const BOOTSTRAP_LAST_NAME: &str = "Account";

/// A marketplace user profile, matching the remote `profiles` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub email: Email,
    pub user_type: UserType,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

impl Profile {
    /// The default profile synthesized when a valid session exists but no
    /// profile row was found: a plain, unverified consumer account.
    #[must_use]
    pub fn bootstrap(id: UserId, email: Email) -> Self {
        Self {
            id,
            email,
            user_type: UserType::Consumer,
            business_name: None,
            first_name: Some(BOOTSTRAP_FIRST_NAME.to_owned()),
            last_name: Some(BOOTSTRAP_LAST_NAME.to_owned()),
            phone: None,
            address: None,
            city: None,
            state: None,
            country: None,
            postal_code: None,
            is_verified: false,
        }
    }

    /// `"First Last"` when both names are present and non-empty.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                Some(format!("{first} {last}"))
            }
            _ => None,
        }
    }
}

/// Identity fields supplied at account creation.
///
/// Input-shape validation (passwords match, business accounts carry a business
/// name) is the form layer's job; this core forwards the fields as given.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: SecretString,
    pub user_type: UserType,
    pub business_name: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl SignUpRequest {
    /// The profile row this request implies, for the given user id.
    #[must_use]
    pub fn profile_for(&self, id: UserId, email: Email) -> Profile {
        Profile {
            id,
            email,
            user_type: self.user_type,
            business_name: self.business_name.clone(),
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            phone: None,
            address: None,
            city: None,
            state: None,
            country: None,
            postal_code: None,
            is_verified: false,
        }
    }
}
