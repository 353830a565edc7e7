//! REST client for the hosted identity/data service.
//!
//! Speaks the service's two surfaces: the auth endpoints (`auth/v1/...`,
//! password grant) and the generic record store (`rest/v1/...`, equality
//! filters), of which this client uses exactly one table: `profiles`.

use std::sync::Mutex;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::broadcast;
use url::Url;

use seasons_core::{Email, UserId};

use crate::config::RemoteConfig;
use crate::models::{Profile, Session, SessionUser};

use super::{AuthChange, IdentityService, RemoteError, SignUpMetadata};

/// Capacity of the session-change broadcast channel. Subscribers are UI-side
/// and drain promptly; lagging ones just miss superseded events.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Production [`IdentityService`] implementation over HTTP.
///
/// Holds the live access token in memory and emits [`AuthChange`] events on
/// local sign-in/sign-out, mirroring the hosted SDK's auth-state callback.
pub struct RestIdentityClient {
    http: reqwest::Client,
    base: Url,
    anon_key: SecretString,
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<AuthChange>,
}

/// Wire shape of the token and signup responses.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: WireUser,
}

/// Wire shape of the identity record attached to sessions.
#[derive(Debug, Deserialize)]
struct WireUser {
    id: UserId,
    email: Email,
}

/// Best-effort wire shape of service error bodies; the auth and record-store
/// surfaces use different field names.
#[derive(Debug, Default, Deserialize)]
struct WireError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl WireError {
    fn into_message(self) -> Option<String> {
        self.message.or(self.error_description).or(self.msg)
    }
}

impl From<WireUser> for SessionUser {
    fn from(user: WireUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session::new(SecretString::from(self.access_token), self.user.into())
    }
}

impl RestIdentityClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::InvalidUrl` if the configured base URL does not
    /// parse.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        // Url::join treats a path without a trailing slash as a file.
        let normalized = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };
        let base = Url::parse(&normalized)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            anon_key: config.anon_key.clone(),
            session: Mutex::new(None),
            events,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        Ok(self.base.join(path)?)
    }

    fn bearer(&self) -> String {
        let stored = self.session.lock().ok().and_then(|guard| {
            guard
                .as_ref()
                .map(|session| session.access_token.expose_secret().to_owned())
        });
        stored.unwrap_or_else(|| self.anon_key.expose_secret().to_owned())
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(self.bearer())
    }

    fn store_session(&self, session: &Session) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = Some(session.clone());
        }
    }

    fn drop_session(&self) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = None;
        }
    }

    fn emit(&self, change: AuthChange) {
        // send only fails when nobody is subscribed, which is fine
        let _ = self.events.send(change);
    }

    /// Map a non-success response to `RemoteError::Api`, extracting the
    /// service's message when the body has one.
    async fn into_api_error(response: reqwest::Response) -> RemoteError {
        let status = response.status().as_u16();
        let message = response
            .json::<WireError>()
            .await
            .ok()
            .and_then(WireError::into_message)
            .unwrap_or_else(|| "no error details provided".to_owned());
        RemoteError::Api { status, message }
    }
}

#[async_trait::async_trait]
impl IdentityService for RestIdentityClient {
    async fn current_session(&self) -> Result<Option<Session>, RemoteError> {
        let Some(stored) = self.session.lock().ok().and_then(|guard| guard.clone()) else {
            return Ok(None);
        };

        // Revalidate the token and refresh the attached identity.
        let url = self.endpoint("auth/v1/user")?;
        let response = self.request(reqwest::Method::GET, url).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("stored session token rejected, treating as signed out");
            self.drop_session();
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        let user: WireUser = response.json().await?;
        let session = Session::new(stored.access_token, user.into());
        self.store_session(&session);
        Ok(Some(session))
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        metadata: &SignUpMetadata,
    ) -> Result<Session, RemoteError> {
        let url = self.endpoint("auth/v1/signup")?;
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
            "data": metadata,
        });

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        let session = response.json::<TokenResponse>().await?.into_session();
        self.store_session(&session);
        self.emit(AuthChange::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, RemoteError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "password");
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        });

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        let session = response.json::<TokenResponse>().await?.into_session();
        self.store_session(&session);
        self.emit(AuthChange::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        let url = self.endpoint("auth/v1/logout")?;
        let response = self.request(reqwest::Method::POST, url).send().await?;
        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        self.drop_session();
        self.emit(AuthChange::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }

    async fn fetch_profile(&self, id: UserId) -> Result<Option<Profile>, RemoteError> {
        let mut url = self.endpoint("rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"))
            .append_pair("select", "*");

        let response = self.request(reqwest::Method::GET, url).send().await?;
        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        // The record store answers equality filters with an array; an empty
        // one is the distinguished not-found case.
        let mut rows: Vec<Profile> = response.json().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn create_profile(&self, profile: &Profile) -> Result<(), RemoteError> {
        let url = self.endpoint("rest/v1/profiles")?;
        let response = self
            .request(reqwest::Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(&[profile])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RestIdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestIdentityClient")
            .field("base", &self.base.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RestIdentityClient {
        let config = RemoteConfig {
            base_url: "https://demo.example.co".to_owned(),
            anon_key: SecretString::from("anon-key"),
        };
        RestIdentityClient::new(&config).unwrap()
    }

    #[test]
    fn endpoints_join_against_a_normalized_base() {
        let client = client();
        let url = client.endpoint("auth/v1/signup").unwrap();
        assert_eq!(url.as_str(), "https://demo.example.co/auth/v1/signup");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let config = RemoteConfig {
            base_url: "not a url".to_owned(),
            anon_key: SecretString::from("anon-key"),
        };
        assert!(matches!(
            RestIdentityClient::new(&config),
            Err(RemoteError::InvalidUrl(_))
        ));
    }

    #[test]
    fn wire_error_prefers_message_field() {
        let err = WireError {
            message: Some("a".to_owned()),
            error_description: Some("b".to_owned()),
            msg: None,
        };
        assert_eq!(err.into_message().as_deref(), Some("a"));

        let err = WireError {
            message: None,
            error_description: None,
            msg: Some("c".to_owned()),
        };
        assert_eq!(err.into_message().as_deref(), Some("c"));
    }

    #[test]
    fn debug_redacts_the_service_key() {
        let rendered = format!("{:?}", client());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("anon-key"));
    }

    #[test]
    fn bearer_falls_back_to_anon_key_without_a_session() {
        assert_eq!(client().bearer(), "anon-key");
    }

    #[test]
    fn token_response_becomes_a_session() {
        let raw = format!(
            r#"{{"access_token":"tok","user":{{"id":"{}","email":"z@y.com"}}}}"#,
            uuid::Uuid::new_v4()
        );
        let parsed: TokenResponse = serde_json::from_str(&raw).unwrap();
        let session = parsed.into_session();
        assert_eq!(session.user.email.as_str(), "z@y.com");
        assert_eq!(session.access_token.expose_secret(), "tok");
    }
}
