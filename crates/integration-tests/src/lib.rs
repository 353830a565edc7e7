//! Integration test support for Seasons.
//!
//! Provides [`MockIdentityService`], a scripted in-process stand-in for the
//! hosted identity/data service, plus small fixture helpers. The tests in
//! `tests/` drive the real [`seasons_storefront::auth::AuthContext`] and
//! [`seasons_storefront::storage::LocalStore`] against it.
//!
//! The mock does not emit session-change events from `sign_up`/`sign_in`
//! (the production client does); tests that exercise the push path inject
//! events explicitly via [`MockIdentityService::push_signed_in`] /
//! [`push_signed_out`](MockIdentityService::push_signed_out). This keeps the
//! explicit-call path and the subscription path separately observable.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;

use seasons_core::{Email, Price, ProductId, UserId};
use seasons_storefront::models::{ProductSummary, Profile, Session, SessionUser};
use seasons_storefront::remote::{AuthChange, IdentityService, RemoteError, SignUpMetadata};

/// Install a capture-friendly tracing subscriber for the current test binary.
///
/// Idempotent; every test entry point can call it and only the first call
/// installs. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("seasons_storefront=debug,info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

/// A registered account inside the mock.
#[derive(Debug, Clone)]
struct StoredAccount {
    user: SessionUser,
    password: String,
    metadata: Option<SignUpMetadata>,
}

#[derive(Default)]
struct MockState {
    accounts: HashMap<String, StoredAccount>,
    profiles: HashMap<UserId, Profile>,
    session: Option<Session>,
    sign_in_delays: HashMap<String, Duration>,
    fetch_profile_delays: HashMap<UserId, Duration>,
    fail_profile_creates: bool,
    fail_profile_fetches: bool,
    profile_create_calls: u32,
}

/// Scripted identity/data service.
pub struct MockIdentityService {
    state: Mutex<MockState>,
    events: broadcast::Sender<AuthChange>,
}

impl Default for MockIdentityService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIdentityService {
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(MockState::default()),
            events,
        }
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock")
    }

    fn session_for(user: &SessionUser) -> Session {
        Session::new(
            SecretString::from(format!("token-{}", user.id)),
            user.clone(),
        )
    }

    fn invalid_credentials() -> RemoteError {
        RemoteError::Api {
            status: 400,
            message: "Invalid login credentials".to_owned(),
        }
    }

    /// Register an account without going through `sign_up`.
    pub fn seed_account(&self, email: &str, password: &str) -> SessionUser {
        let user = SessionUser {
            id: UserId::generate(),
            email: Email::parse(email).expect("valid seed email"),
        };
        self.locked().accounts.insert(
            email.to_lowercase(),
            StoredAccount {
                user: user.clone(),
                password: password.to_owned(),
                metadata: None,
            },
        );
        user
    }

    /// Insert a profile row directly.
    pub fn seed_profile(&self, profile: Profile) {
        self.locked().profiles.insert(profile.id, profile);
    }

    /// Make `current_session` report an established session for `user`.
    pub fn set_current_session(&self, user: &SessionUser) {
        self.locked().session = Some(Self::session_for(user));
    }

    /// Delay `sign_in` for `email`, to script stale-response races.
    pub fn delay_sign_in(&self, email: &str, delay: Duration) {
        self.locked()
            .sign_in_delays
            .insert(email.to_lowercase(), delay);
    }

    /// Delay `fetch_profile` for `user`, to script races that straddle the
    /// profile-loading step.
    pub fn delay_profile_fetch(&self, user: UserId, delay: Duration) {
        self.locked().fetch_profile_delays.insert(user, delay);
    }

    /// Make every `create_profile` call fail.
    pub fn fail_profile_creates(&self) {
        self.locked().fail_profile_creates = true;
    }

    /// Make every `fetch_profile` call fail.
    pub fn fail_profile_fetches(&self) {
        self.locked().fail_profile_fetches = true;
    }

    /// Push a signed-in notification, as if a session appeared elsewhere.
    pub fn push_signed_in(&self, user: &SessionUser) {
        let session = Self::session_for(user);
        self.locked().session = Some(session.clone());
        let _ = self.events.send(AuthChange::SignedIn(session));
    }

    /// Push a signed-out notification, as if the session ended elsewhere.
    pub fn push_signed_out(&self) {
        self.locked().session = None;
        let _ = self.events.send(AuthChange::SignedOut);
    }

    /// The profile row stored for `id`, if any.
    #[must_use]
    pub fn profile_row(&self, id: UserId) -> Option<Profile> {
        self.locked().profiles.get(&id).cloned()
    }

    /// The sign-up metadata captured for `email`, if that account signed up.
    #[must_use]
    pub fn metadata_for(&self, email: &str) -> Option<SignUpMetadata> {
        self.locked()
            .accounts
            .get(&email.to_lowercase())
            .and_then(|account| account.metadata.clone())
    }

    /// How many `create_profile` calls the service has seen.
    #[must_use]
    pub fn profile_create_attempts(&self) -> u32 {
        self.locked().profile_create_calls
    }
}

#[async_trait]
impl IdentityService for MockIdentityService {
    async fn current_session(&self) -> Result<Option<Session>, RemoteError> {
        Ok(self.locked().session.clone())
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        metadata: &SignUpMetadata,
    ) -> Result<Session, RemoteError> {
        let key = email.as_str().to_lowercase();
        let mut state = self.locked();
        if state.accounts.contains_key(&key) {
            return Err(RemoteError::Api {
                status: 422,
                message: "User already registered".to_owned(),
            });
        }
        let user = SessionUser {
            id: UserId::generate(),
            email: email.clone(),
        };
        state.accounts.insert(
            key,
            StoredAccount {
                user: user.clone(),
                password: password.expose_secret().to_owned(),
                metadata: Some(metadata.clone()),
            },
        );
        let session = Self::session_for(&user);
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, RemoteError> {
        let key = email.as_str().to_lowercase();
        let (delay, outcome) = {
            let state = self.locked();
            let delay = state.sign_in_delays.get(&key).copied();
            let outcome = match state.accounts.get(&key) {
                Some(account) if account.password == password.expose_secret() => {
                    Ok(Self::session_for(&account.user))
                }
                _ => Err(Self::invalid_credentials()),
            };
            (delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let session = outcome?;
        self.locked().session = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        self.locked().session = None;
        let _ = self.events.send(AuthChange::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }

    async fn fetch_profile(&self, id: UserId) -> Result<Option<Profile>, RemoteError> {
        let (delay, outcome) = {
            let state = self.locked();
            if state.fail_profile_fetches {
                return Err(RemoteError::Api {
                    status: 500,
                    message: "fetch disabled by test".to_owned(),
                });
            }
            (
                state.fetch_profile_delays.get(&id).copied(),
                state.profiles.get(&id).cloned(),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(outcome)
    }

    async fn create_profile(&self, profile: &Profile) -> Result<(), RemoteError> {
        let mut state = self.locked();
        state.profile_create_calls += 1;
        if state.fail_profile_creates {
            return Err(RemoteError::Api {
                status: 500,
                message: "create disabled by test".to_owned(),
            });
        }
        if state.profiles.contains_key(&profile.id) {
            return Err(RemoteError::Api {
                status: 409,
                message: "duplicate key value violates unique constraint".to_owned(),
            });
        }
        state.profiles.insert(profile.id, profile.clone());
        Ok(())
    }
}

/// A product fixture with a distinct id per call.
#[must_use]
pub fn test_product(name: &str, retail_cents: i64) -> ProductSummary {
    ProductSummary {
        id: ProductId::generate(),
        name: name.to_owned(),
        sku: format!("SKU-{}", name.to_uppercase()),
        retail_price: Price::from_cents(retail_cents),
        wholesale_base_price: Some(Price::from_cents(retail_cents / 2)),
        images: vec![format!("https://img.example/{name}.jpg")],
    }
}
