//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SEASONS_REMOTE_URL` - Base URL of the hosted identity/data service
//! - `SEASONS_REMOTE_ANON_KEY` - Public (anonymous) API key for that service
//!
//! ## Optional
//! - `SEASONS_DATA_DIR` - Directory for local collection storage
//!   (default: `.seasons`)

use std::env;
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Default local data directory, relative to the working directory.
const DEFAULT_DATA_DIR: &str = ".seasons";

/// Placeholder endpoint used when no real service is configured.
const PLACEHOLDER_URL: &str = "https://placeholder.invalid";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Connection details for the hosted identity/data service.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Service base URL.
    pub base_url: String,
    /// Public API key sent with every request.
    pub anon_key: SecretString,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote service connection.
    pub remote: RemoteConfig,
    /// Directory backing the local persistence store.
    pub data_dir: PathBuf,
}

impl StorefrontConfig {
    /// Load configuration from the environment, reading a `.env` file first
    /// if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if a required variable is unset.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from already-set environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if a required variable is unset
    /// or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = required("SEASONS_REMOTE_URL")?;
        let anon_key = required("SEASONS_REMOTE_ANON_KEY")?;
        let data_dir = env::var("SEASONS_DATA_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        Ok(Self {
            remote: RemoteConfig {
                base_url,
                anon_key: SecretString::from(anon_key),
            },
            data_dir,
        })
    }

    /// Placeholder configuration for local development without a configured
    /// service. Every remote call will fail; local collections still work.
    ///
    /// Logs a warning so a placeholder never ships silently.
    #[must_use]
    pub fn placeholder() -> Self {
        tracing::warn!(
            "remote service environment variables not set, using placeholder values"
        );
        Self {
            remote: RemoteConfig {
                base_url: PLACEHOLDER_URL.to_owned(),
                anon_key: SecretString::from("placeholder-key"),
            },
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(name.to_owned())),
    }
}
