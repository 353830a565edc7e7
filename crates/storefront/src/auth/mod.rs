//! Session/profile synchronizer.
//!
//! [`AuthContext`] owns the mapping from a remote identity session to the
//! locally cached [`Profile`]: it bootstraps the session on
//! [`initialize`](AuthContext::initialize), listens to session-change push
//! notifications for as long as it lives, lazily creates a default profile
//! row on first sign-in, and answers derived queries
//! ([`is_authenticated`](AuthContext::is_authenticated),
//! [`display_name`](AuthContext::display_name)).
//!
//! The context is an owned object injected into views - there is no ambient
//! global. Call [`dispose`](AuthContext::dispose) to stop the subscription
//! task when tearing it down.
//!
//! Both an explicit `sign_in` call and the resulting push notification drive
//! the same profile-loading step; re-fetching or re-creating a profile that
//! already exists is harmless, so the duplication is left undeduplicated.
//! What *is* guarded is stale responses: each sign-in/sign-up carries a
//! request id and a response is only applied while its id is still the
//! latest issued.

mod error;

pub use error::AuthError;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use seasons_core::Email;

use crate::models::{Profile, Session, SessionUser, SignUpRequest};
use crate::remote::{AuthChange, IdentityService, SignUpMetadata};

/// Label shown for a fully anonymous visitor.
pub const GUEST_LABEL: &str = "Guest";

/// Observable authentication state.
///
/// `loading` is true only during the initial session fetch and during
/// explicit sign-in/sign-up calls. A non-null `user` with a null `profile`
/// is a degraded-but-valid state (profile fetch or bootstrap failed); UI
/// treats it as "still loading/incomplete", never as an error.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub loading: bool,
    pub user: Option<SessionUser>,
    pub profile: Option<Profile>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            loading: true,
            user: None,
            profile: None,
        }
    }
}

/// The session/profile synchronizer.
pub struct AuthContext {
    inner: Arc<ContextInner>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

struct ContextInner {
    remote: Arc<dyn IdentityService>,
    state: Mutex<AuthState>,
    request_seq: AtomicU64,
}

impl ContextInner {
    fn with_state<R>(&self, f: impl FnOnce(&mut AuthState) -> R) -> Option<R> {
        match self.state.lock() {
            Ok(mut guard) => Some(f(&mut guard)),
            Err(_) => {
                tracing::error!("auth state lock poisoned");
                None
            }
        }
    }

    /// Issue a request id for a sign-in/sign-up call.
    fn issue_request(&self) -> u64 {
        self.request_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `ticket` is still the latest issued request id.
    fn is_current(&self, ticket: u64) -> bool {
        self.request_seq.load(Ordering::SeqCst) == ticket
    }

    /// Settle into the anonymous state.
    fn settle_anonymous(&self) {
        self.with_state(|state| {
            state.user = None;
            state.profile = None;
            state.loading = false;
        });
    }

    /// Load (or lazily bootstrap) the profile for an established session.
    ///
    /// Idempotent: initialization and the push subscription funnel through
    /// here. Any profile failure degrades to `profile = None` with a log
    /// line; it never unwinds.
    async fn authenticate(&self, session: Session) {
        let user = session.user;
        self.with_state(|state| {
            state.user = Some(user.clone());
        });

        let profile = self.resolve_profile(&user).await;
        self.with_state(|state| {
            state.profile = profile;
            state.loading = false;
        });
    }

    /// Ticketed variant of [`authenticate`](Self::authenticate) for explicit
    /// sign-in: the resolved state is applied atomically and only while
    /// `ticket` is still the latest issued request, so a sign-in superseded
    /// during the profile fetch cannot overwrite a newer one.
    async fn authenticate_if_current(&self, session: Session, ticket: u64) {
        let user = session.user;
        let profile = self.resolve_profile(&user).await;
        if !self.is_current(ticket) {
            tracing::debug!("ignoring superseded profile resolution");
            return;
        }
        self.with_state(|state| {
            state.user = Some(user);
            state.profile = profile;
            state.loading = false;
        });
    }

    /// Fetch the profile for `user`, lazily bootstrapping a default row when
    /// none exists. Failures degrade to `None`.
    async fn resolve_profile(&self, user: &SessionUser) -> Option<Profile> {
        match self.remote.fetch_profile(user.id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                tracing::info!(user_id = %user.id, "no profile row found, bootstrapping default");
                let profile = Profile::bootstrap(user.id, user.email.clone());
                match self.remote.create_profile(&profile).await {
                    Ok(()) => Some(profile),
                    Err(err) => {
                        tracing::warn!(user_id = %user.id, error = %err,
                            "profile bootstrap failed, continuing without profile");
                        None
                    }
                }
            }
            Err(err) => {
                tracing::warn!(user_id = %user.id, error = %err,
                    "profile fetch failed, continuing without profile");
                None
            }
        }
    }
}

impl AuthContext {
    /// Create a context over a remote identity service.
    ///
    /// The context starts in the bootstrapping state (`loading = true`);
    /// call [`initialize`](Self::initialize) to settle it.
    #[must_use]
    pub fn new(remote: Arc<dyn IdentityService>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                remote,
                state: Mutex::new(AuthState::default()),
                request_seq: AtomicU64::new(0),
            }),
            listener: Mutex::new(None),
        }
    }

    /// Fetch the current remote session, load its profile, and start the
    /// session-change subscription task.
    ///
    /// Session retrieval failure settles the context as anonymous; it is
    /// logged, not returned.
    pub async fn initialize(&self) {
        // Subscribe before the initial fetch so a change racing the fetch is
        // buffered rather than missed.
        let events = self.inner.remote.subscribe();

        match self.inner.remote.current_session().await {
            Ok(Some(session)) => self.inner.authenticate(session).await,
            Ok(None) => self.inner.settle_anonymous(),
            Err(err) => {
                tracing::warn!(error = %err, "initial session retrieval failed, starting anonymous");
                self.inner.settle_anonymous();
            }
        }

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            listen(inner, events).await;
        });
        if let Ok(mut guard) = self.listener.lock() {
            if let Some(previous) = guard.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Stop the session-change subscription task. The last settled state
    /// remains readable.
    pub fn dispose(&self) {
        if let Ok(mut guard) = self.listener.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }

    /// Create an account and its profile row.
    ///
    /// Profile-row creation failure does not fail the sign-up; the profile
    /// is lazily bootstrapped on the next sign-in instead.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email and
    /// `AuthError::Remote` when account creation itself fails.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<Session, AuthError> {
        let email = Email::parse(&request.email)?;
        let ticket = self.inner.issue_request();
        self.inner.with_state(|state| state.loading = true);

        let metadata = SignUpMetadata {
            user_type: request.user_type,
            business_name: request.business_name.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
        };
        let result = self
            .inner
            .remote
            .sign_up(&email, &request.password, &metadata)
            .await;

        if !self.inner.is_current(ticket) {
            tracing::debug!("ignoring superseded sign-up response");
            return result.map_err(AuthError::from);
        }

        let session = match result {
            Ok(session) => session,
            Err(err) => {
                self.inner.with_state(|state| state.loading = false);
                return Err(err.into());
            }
        };

        let user = session.user.clone();
        let profile = request.profile_for(user.id, user.email.clone());
        let profile = match self.inner.remote.create_profile(&profile).await {
            Ok(()) => Some(profile),
            Err(err) => {
                tracing::warn!(user_id = %user.id, error = %err,
                    "profile creation failed during sign-up, deferring to next sign-in");
                None
            }
        };

        if !self.inner.is_current(ticket) {
            tracing::debug!("sign-up superseded during profile creation, not applying state");
            return Ok(session);
        }
        self.inner.with_state(|state| {
            state.user = Some(user);
            state.profile = profile;
            state.loading = false;
        });
        Ok(session)
    }

    /// Authenticate with email and password, then load or bootstrap the
    /// profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email and
    /// `AuthError::Remote` for rejected credentials or transport failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = Email::parse(email)?;
        let ticket = self.inner.issue_request();
        self.inner.with_state(|state| state.loading = true);

        let password = SecretString::from(password.to_owned());
        let result = self.inner.remote.sign_in(&email, &password).await;

        if !self.inner.is_current(ticket) {
            tracing::debug!("ignoring superseded sign-in response");
            return result.map_err(AuthError::from);
        }

        match result {
            Ok(session) => {
                self.inner
                    .authenticate_if_current(session.clone(), ticket)
                    .await;
                Ok(session)
            }
            Err(err) => {
                self.inner.with_state(|state| state.loading = false);
                Err(err.into())
            }
        }
    }

    /// Terminate the remote session.
    ///
    /// Local `user`/`profile` are cleared by the resulting session-change
    /// notification, not by this call - the transition to anonymous is
    /// eventual.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Remote` if the service call fails; the local
    /// state is untouched in that case.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.inner.remote.sign_out().await.map_err(AuthError::from)
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.inner
            .with_state(|state| state.clone())
            .unwrap_or_default()
    }

    /// True iff both a session user and a loaded profile are present. A
    /// session alone does not count.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .with_state(|state| state.user.is_some() && state.profile.is_some())
            .unwrap_or(false)
    }

    /// Display name, first non-empty of: profile full name, profile email,
    /// session email, the guest label.
    #[must_use]
    pub fn display_name(&self) -> String {
        let state = self.snapshot();
        if let Some(profile) = &state.profile {
            if let Some(name) = profile.full_name() {
                return name;
            }
            return profile.email.to_string();
        }
        if let Some(user) = &state.user {
            return user.email.to_string();
        }
        GUEST_LABEL.to_owned()
    }

    /// Whether the context is mid-bootstrap or mid-sign-in.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.inner
            .with_state(|state| state.loading)
            .unwrap_or(false)
    }
}

/// Consume session-change notifications until the channel closes or the task
/// is aborted.
async fn listen(inner: Arc<ContextInner>, mut events: broadcast::Receiver<AuthChange>) {
    loop {
        match events.recv().await {
            Ok(AuthChange::SignedIn(session)) => {
                tracing::debug!(user_id = %session.user.id, "session change: signed in");
                inner.authenticate(session).await;
            }
            Ok(AuthChange::SignedOut) => {
                tracing::debug!("session change: signed out");
                inner.settle_anonymous();
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "session change subscription lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use seasons_core::{UserId, UserType};
    use secrecy::ExposeSecret;

    use crate::remote::RemoteError;

    /// Scripted remote service for unit tests. The richer shared mock lives
    /// in the integration-tests crate; this one only covers what the context
    /// unit tests need.
    struct ScriptedService {
        session: Option<Session>,
        profile: Mutex<Option<Profile>>,
        fail_fetch: bool,
        fail_create: bool,
        fail_session: bool,
        events: broadcast::Sender<AuthChange>,
    }

    impl ScriptedService {
        fn new(session: Option<Session>, profile: Option<Profile>) -> Self {
            let (events, _) = broadcast::channel(8);
            Self {
                session,
                profile: Mutex::new(profile),
                fail_fetch: false,
                fail_create: false,
                fail_session: false,
                events,
            }
        }

        fn service_error() -> RemoteError {
            RemoteError::Api {
                status: 500,
                message: "scripted failure".to_owned(),
            }
        }
    }

    #[async_trait]
    impl IdentityService for ScriptedService {
        async fn current_session(&self) -> Result<Option<Session>, RemoteError> {
            if self.fail_session {
                return Err(Self::service_error());
            }
            Ok(self.session.clone())
        }

        async fn sign_up(
            &self,
            _email: &Email,
            _password: &SecretString,
            _metadata: &SignUpMetadata,
        ) -> Result<Session, RemoteError> {
            self.session.clone().ok_or_else(Self::service_error)
        }

        async fn sign_in(
            &self,
            email: &Email,
            password: &SecretString,
        ) -> Result<Session, RemoteError> {
            if password.expose_secret() == "wrong" {
                return Err(RemoteError::Api {
                    status: 401,
                    message: format!("invalid login for {email}"),
                });
            }
            self.session.clone().ok_or_else(Self::service_error)
        }

        async fn sign_out(&self) -> Result<(), RemoteError> {
            let _ = self.events.send(AuthChange::SignedOut);
            Ok(())
        }

        fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
            self.events.subscribe()
        }

        async fn fetch_profile(&self, _id: UserId) -> Result<Option<Profile>, RemoteError> {
            if self.fail_fetch {
                return Err(Self::service_error());
            }
            Ok(self.profile.lock().unwrap().clone())
        }

        async fn create_profile(&self, profile: &Profile) -> Result<(), RemoteError> {
            if self.fail_create {
                return Err(Self::service_error());
            }
            *self.profile.lock().unwrap() = Some(profile.clone());
            Ok(())
        }
    }

    fn session_for(email: &str) -> Session {
        Session::new(
            SecretString::from("token"),
            SessionUser {
                id: UserId::generate(),
                email: Email::parse(email).unwrap(),
            },
        )
    }

    fn named_profile(user: &SessionUser, first: &str, last: &str) -> Profile {
        let mut profile = Profile::bootstrap(user.id, user.email.clone());
        profile.first_name = Some(first.to_owned());
        profile.last_name = Some(last.to_owned());
        profile
    }

    #[tokio::test]
    async fn initialize_without_session_settles_anonymous() {
        let context = AuthContext::new(Arc::new(ScriptedService::new(None, None)));
        assert!(context.loading());

        context.initialize().await;

        assert!(!context.loading());
        assert!(!context.is_authenticated());
        assert_eq!(context.display_name(), GUEST_LABEL);
        context.dispose();
    }

    #[tokio::test]
    async fn initialize_failure_settles_anonymous_not_stuck_loading() {
        let mut service = ScriptedService::new(None, None);
        service.fail_session = true;
        let context = AuthContext::new(Arc::new(service));

        context.initialize().await;

        assert!(!context.loading());
        assert!(!context.is_authenticated());
        context.dispose();
    }

    #[tokio::test]
    async fn initialize_with_session_and_profile_authenticates() {
        let session = session_for("a@y.com");
        let profile = named_profile(&session.user, "A", "B");
        let context = AuthContext::new(Arc::new(ScriptedService::new(
            Some(session),
            Some(profile),
        )));

        context.initialize().await;

        assert!(context.is_authenticated());
        assert_eq!(context.display_name(), "A B");
        context.dispose();
    }

    #[tokio::test]
    async fn missing_profile_is_bootstrapped_as_consumer() {
        let session = session_for("new@y.com");
        let context = AuthContext::new(Arc::new(ScriptedService::new(Some(session), None)));

        context.initialize().await;

        assert!(context.is_authenticated());
        let profile = context.snapshot().profile.expect("bootstrapped profile");
        assert_eq!(profile.user_type, UserType::Consumer);
        assert!(!profile.is_verified);
        context.dispose();
    }

    #[tokio::test]
    async fn bootstrap_failure_degrades_to_session_without_profile() {
        let session = session_for("degraded@y.com");
        let mut service = ScriptedService::new(Some(session), None);
        service.fail_create = true;
        let context = AuthContext::new(Arc::new(service));

        context.initialize().await;

        let state = context.snapshot();
        assert!(state.user.is_some());
        assert!(state.profile.is_none());
        assert!(!state.loading);
        // a session alone is not authenticated
        assert!(!context.is_authenticated());
        assert_eq!(context.display_name(), "degraded@y.com");
        context.dispose();
    }

    #[tokio::test]
    async fn profile_fetch_error_is_logged_not_fatal() {
        let session = session_for("err@y.com");
        let mut service = ScriptedService::new(Some(session), None);
        service.fail_fetch = true;
        let context = AuthContext::new(Arc::new(service));

        context.initialize().await;

        let state = context.snapshot();
        assert!(state.user.is_some());
        assert!(state.profile.is_none());
        context.dispose();
    }

    #[tokio::test]
    async fn display_name_falls_back_to_profile_email_without_names() {
        let session = session_for("x@y.com");
        let mut profile = Profile::bootstrap(session.user.id, session.user.email.clone());
        profile.first_name = None;
        profile.last_name = None;
        let context = AuthContext::new(Arc::new(ScriptedService::new(
            Some(session),
            Some(profile),
        )));

        context.initialize().await;
        assert_eq!(context.display_name(), "x@y.com");
        context.dispose();
    }

    #[tokio::test]
    async fn failed_sign_in_returns_error_and_settles() {
        let session = session_for("z@y.com");
        let context = AuthContext::new(Arc::new(ScriptedService::new(Some(session), None)));
        context.initialize().await;

        let err = context.sign_in("z@y.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Remote(RemoteError::Api { status: 401, .. })));
        assert!(!context.loading());
        context.dispose();
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_before_any_remote_call() {
        let context = AuthContext::new(Arc::new(ScriptedService::new(None, None)));
        let err = context.sign_in("not-an-email", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }
}
