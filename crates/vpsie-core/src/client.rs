//! HTTP client configuration.
//!
//! The VPSie client performs no retries and applies no timeout unless one is
//! configured here; by default requests run with the underlying HTTP
//! client's own defaults.

use crate::auth::ExpiresInUnit;
use crate::error::{Error, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.vpsie.com/v1/";

/// Relative path of the token endpoint.
pub const TOKEN_PATH: &str = "token";

/// Parse an API base URL and treat it as a directory.
///
/// A missing trailing `/` is added so relative endpoint paths resolve
/// underneath it instead of replacing its last segment.
///
/// # Errors
///
/// Returns [`Error::ConfigError`] if the URL cannot be parsed.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|err| Error::ConfigError(format!("Invalid VPSie base URL `{raw}`: {err}")))?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// HTTP client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Overall request timeout; `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,

    /// Log method, path, form body and raw response body of every call.
    pub enable_logging: bool,

    /// How the token endpoint's `expires_in` is interpreted.
    pub expires_in_unit: ExpiresInUnit,

    /// Value of the `User-Agent` header.
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: None,
            enable_logging: false,
            expires_in_unit: ExpiresInUnit::Seconds,
            user_agent: None,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable request/response logging.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Set how `expires_in` is interpreted.
    #[must_use]
    pub const fn with_expires_in_unit(mut self, unit: ExpiresInUnit) -> Self {
        self.expires_in_unit = unit;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the TLS backend cannot be initialised.
    pub fn build_http_client(&self) -> Result<Client> {
        let mut builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build VPSie HTTP client: {err}")))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
