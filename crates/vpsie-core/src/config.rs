//! Configuration structures for VPSie clients.
//!
//! [`VpsieClientConfig`] is a deserializable description of a client, for
//! applications that keep credentials in their own configuration source.

use crate::auth::{Credentials, ExpiresInUnit};
use crate::client::{self, ClientConfig, DEFAULT_BASE_URL};
use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Configuration for a VPSie client instance.
#[derive(Debug, Deserialize, Validate)]
pub struct VpsieClientConfig {
    /// API base URL
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth client id
    #[validate(length(min = 1))]
    pub client_id: String,

    /// OAuth client secret
    #[serde(deserialize_with = "deserialize_secret")]
    pub client_secret: SecretString,

    /// Log raw requests and responses
    #[serde(default)]
    pub debug: bool,

    /// Optional request timeout in seconds
    #[validate(range(min = 1, max = 3600))]
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Unit of the token endpoint's `expires_in`
    #[serde(default)]
    pub expires_in_unit: ExpiresInUnit,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl VpsieClientConfig {
    /// Create a new client configuration with required parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        let config = Self {
            base_url: default_base_url(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            debug: false,
            timeout_secs: None,
            expires_in_unit: ExpiresInUnit::default(),
        };

        config.check()?;
        Ok(config)
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Enable or disable raw request/response logging.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = Some(seconds);
        self
    }

    /// Set how `expires_in` is interpreted.
    #[must_use]
    pub const fn with_expires_in_unit(mut self, unit: ExpiresInUnit) -> Self {
        self.expires_in_unit = unit;
        self
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the failing fields.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        if self.client_secret.expose_secret().is_empty() {
            return Err(Error::ConfigError(
                "Invalid configuration: client_secret must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Parse the base URL, adding a trailing `/` when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_base_url(&self) -> Result<Url, Error> {
        client::parse_base_url(&self.base_url)
    }

    /// Derive the HTTP client configuration.
    #[must_use]
    pub fn http_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new()
            .with_logging(self.debug)
            .with_expires_in_unit(self.expires_in_unit);
        if let Some(timeout) = self.timeout() {
            config = config.with_timeout(timeout);
        }
        config
    }

    /// Build the credentials this configuration describes.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.client_id.clone(),
            self.client_secret.expose_secret().to_string(),
        )
    }
}
