//! Client credentials and the cached bearer token.
//!
//! The VPSie API issues short-lived bearer tokens from its `token` endpoint in
//! exchange for a client id and secret. [`TokenCache`] keeps the current
//! token and serializes refreshes so concurrent callers on one client share a
//! single round trip to the token endpoint.

use crate::envelope::null_as_default;
use crate::error::Result;
use crate::form::FormParams;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Upper bound on a token lifetime; longer declared lifetimes are clamped.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Grant type sent to the token endpoint.
pub const GRANT_TYPE: &str = "bearer";

/// Form key carrying the grant type. The provider spells it this way.
pub const GRANT_TYPE_FIELD: &str = "grand_type";

/// API client credentials.
#[derive(Debug)]
pub struct Credentials {
    client_id: String,
    client_secret: SecretString,
}

impl Credentials {
    /// Create credentials from a client id and secret.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// Returns the client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Build the credential-grant form for the token endpoint.
    #[must_use]
    pub fn grant_form(&self) -> FormParams {
        FormParams::new()
            .with(GRANT_TYPE_FIELD, GRANT_TYPE)
            .with("client_id", &self.client_id)
            .with("client_secret", self.client_secret.expose_secret())
    }
}

/// Unit applied to the token endpoint's `expires_in` value.
///
/// The provider documents `expires_in` as a lifetime without naming a unit.
/// `Nanoseconds` treats it as a raw duration value, which makes tokens
/// expire almost immediately and forces a refresh on nearly every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiresInUnit {
    /// `expires_in` counts seconds.
    #[default]
    Seconds,
    /// `expires_in` is a raw nanosecond duration.
    Nanoseconds,
}

impl ExpiresInUnit {
    /// Convert a raw `expires_in` value into a lifetime. Negative values yield
    /// zero and values past [`MAX_TOKEN_LIFETIME`] are clamped to it.
    #[must_use]
    pub fn lifetime(self, expires_in: i64) -> Duration {
        let raw = u64::try_from(expires_in).unwrap_or(0);
        let lifetime = match self {
            Self::Seconds => Duration::from_secs(raw),
            Self::Nanoseconds => Duration::from_nanos(raw),
        };
        lifetime.min(MAX_TOKEN_LIFETIME)
    }
}

/// Token object as returned by the token endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenResponse {
    /// Bearer access token.
    #[serde(deserialize_with = "null_as_default")]
    pub access_token: String,
    /// Declared lifetime; see [`ExpiresInUnit`].
    #[serde(deserialize_with = "null_as_default")]
    pub expires_in: i64,
    /// Refresh token.
    #[serde(deserialize_with = "null_as_default")]
    pub refresh_token: String,
    /// Token type, normally `bearer`.
    #[serde(deserialize_with = "null_as_default")]
    pub token_type: String,
}

/// Payload of the token endpoint's envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenPayload {
    /// The issued token.
    #[serde(deserialize_with = "null_as_default")]
    pub token: TokenResponse,
}

/// A cached bearer token with its absolute expiry.
#[derive(Debug)]
pub struct Token {
    access_token: SecretString,
    refresh_token: SecretString,
    expires_at: Instant,
}

impl Token {
    /// Create a token that expires at `expires_at`.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: Instant,
    ) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
            expires_at,
        }
    }

    /// Build a token from the endpoint response, measuring the lifetime from `issued_at`.
    #[must_use]
    pub fn from_response(response: TokenResponse, unit: ExpiresInUnit, issued_at: Instant) -> Self {
        let expires_at = issued_at
            .checked_add(unit.lifetime(response.expires_in))
            .unwrap_or(issued_at);
        Self::new(response.access_token, response.refresh_token, expires_at)
    }

    /// Returns the access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Returns the refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }

    /// Returns the absolute expiry.
    #[must_use]
    pub const fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// A token is usable only if it is non-empty and `now` is strictly before its expiry.
    #[must_use]
    pub fn is_valid_at(&self, now: Instant) -> bool {
        !self.access_token().is_empty() && now < self.expires_at
    }

    /// Checks validity against the current time.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Instant::now())
    }
}

/// Per-client bearer token state.
///
/// The lock is held across a refresh, so at most one token request is in
/// flight per cache and waiting callers reuse its result.
#[derive(Debug, Default)]
pub struct TokenCache {
    token: Mutex<Option<Token>>,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached access token if it is still valid, otherwise run
    /// `refresh`, store its result wholesale, and return the new access token.
    ///
    /// # Errors
    ///
    /// Propagates any error from `refresh`; the cache is left untouched.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Token>>,
    {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|token| token.is_valid()) {
            return Ok(token.access_token().to_string());
        }

        let token = refresh().await?;
        let access_token = token.access_token().to_string();
        *guard = Some(token);
        Ok(access_token)
    }

    /// Returns true if a valid token is cached.
    pub async fn has_valid_token(&self) -> bool {
        self.token
            .lock()
            .await
            .as_ref()
            .is_some_and(Token::is_valid)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn clear(&self) {
        *self.token.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn token_for(lifetime: Duration) -> Token {
        Token::new("access", "refresh", Instant::now() + lifetime)
    }

    #[test]
    fn grant_form_uses_provider_field_names() {
        let form = Credentials::new("id-1", "s3cret").grant_form();
        assert_eq!(
            form.encode(),
            "grand_type=bearer&client_id=id-1&client_secret=s3cret"
        );
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let debug = format!("{:?}", Credentials::new("id-1", "s3cret"));
        assert!(debug.contains("id-1"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn lifetime_units() {
        assert_eq!(ExpiresInUnit::Seconds.lifetime(3600), Duration::from_secs(3600));
        assert_eq!(
            ExpiresInUnit::Nanoseconds.lifetime(3600),
            Duration::from_nanos(3600)
        );
        assert_eq!(ExpiresInUnit::Seconds.lifetime(-5), Duration::ZERO);
        assert_eq!(ExpiresInUnit::default(), ExpiresInUnit::Seconds);
    }

    #[test]
    fn validity_is_strict_at_expiry() {
        let now = Instant::now();
        let token = Token::new("access", "refresh", now);
        assert!(!token.is_valid_at(now));
        assert!(token.is_valid_at(now - Duration::from_millis(1)));
    }

    #[test]
    fn empty_token_is_never_valid() {
        let token = Token::new("", "refresh", Instant::now() + Duration::from_secs(60));
        assert!(!token.is_valid());
    }

    #[test]
    fn from_response_computes_expiry() {
        let issued = Instant::now();
        let token = Token::from_response(
            TokenResponse {
                access_token: "a".into(),
                expires_in: 60,
                refresh_token: "r".into(),
                token_type: "bearer".into(),
            },
            ExpiresInUnit::Seconds,
            issued,
        );
        assert_eq!(token.expires_at(), issued + Duration::from_secs(60));
        assert_eq!(token.refresh_token(), "r");
    }

    #[test]
    fn huge_expires_in_is_clamped() {
        let issued = Instant::now();
        let token = Token::from_response(
            TokenResponse {
                access_token: "a".into(),
                expires_in: i64::MAX,
                ..TokenResponse::default()
            },
            ExpiresInUnit::Seconds,
            issued,
        );
        assert_eq!(token.expires_at(), issued + MAX_TOKEN_LIFETIME);
        assert!(token.is_valid_at(issued + Duration::from_secs(86_400)));
        assert_eq!(ExpiresInUnit::Seconds.lifetime(i64::MAX), MAX_TOKEN_LIFETIME);
        assert_eq!(
            ExpiresInUnit::Nanoseconds.lifetime(i64::MAX),
            MAX_TOKEN_LIFETIME
        );
    }

    #[test]
    fn token_response_accepts_nulls() {
        let payload: TokenPayload = serde_json::from_value(serde_json::json!({
            "token": {
                "access_token": "a",
                "expires_in": null,
                "refresh_token": null,
                "token_type": null
            }
        }))
        .unwrap();
        assert_eq!(payload.token.access_token, "a");
        assert_eq!(payload.token.expires_in, 0);
        assert!(payload.token.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn cache_reuses_valid_token() {
        let cache = TokenCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let token = cache
                .get_or_refresh(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(token_for(Duration::from_secs(60)))
                })
                .await
                .unwrap();
            assert_eq!(token, "access");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.has_valid_token().await);
    }

    #[tokio::test]
    async fn cache_refreshes_expired_token() {
        let cache = TokenCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_refresh(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(token_for(Duration::ZERO))
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_error_leaves_cache_empty() {
        let cache = TokenCache::new();
        let err = cache
            .get_or_refresh(|| async { Err(Error::Timeout("token".into())) })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout(_)));
        assert!(!cache.has_valid_token().await);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let cache = Arc::new(TokenCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_refresh(|| async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::task::yield_now().await;
                            Ok(token_for(Duration::from_secs(60)))
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "access");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clear_forces_refresh() {
        let cache = TokenCache::new();
        cache
            .get_or_refresh(|| async { Ok(token_for(Duration::from_secs(60))) })
            .await
            .unwrap();
        cache.clear().await;
        assert!(!cache.has_valid_token().await);
    }
}
