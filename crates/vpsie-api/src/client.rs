//! Asynchronous VPSie client implementation.

use crate::models::{
    ActionResponse, BackupRequest, BackupResponse, CreateVpsRequest, Datacenter,
    DatacentersPayload, Image, ImagesPayload, Offer, OffersPayload, PasswordResponse,
    RebuildResponse, ResizeRequest, SnapshotRequest, SnapshotResponse, StatisticsGraph,
    StatisticsPayload, StatusPayload, Vps, VpsListPayload,
};
use crate::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;
use vpsie_core::auth::{Credentials, ExpiresInUnit, Token, TokenCache, TokenPayload};
use vpsie_core::client::{parse_base_url, ClientConfig, DEFAULT_BASE_URL, TOKEN_PATH};
use vpsie_core::config::VpsieClientConfig;
use vpsie_core::envelope::Envelope;
use vpsie_core::form::{FormParams, FORM_CONTENT_TYPE};
use vpsie_core::Error;

const USER_AGENT: &str = concat!("vpsie-api/", env!("CARGO_PKG_VERSION"));

/// Builder for [`VpsieClient`].
#[derive(Debug)]
pub struct VpsieClientBuilder {
    base_url: Url,
    credentials: Credentials,
    http_config: ClientConfig,
}

impl VpsieClientBuilder {
    /// Create a builder for the given API credentials against the production API.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            credentials: Credentials::new(client_id, client_secret),
            http_config: ClientConfig::new().with_user_agent(USER_AGENT),
        })
    }

    /// Create a builder from a validated configuration.
    pub fn from_config(config: &VpsieClientConfig) -> Result<Self> {
        config.check()?;
        Ok(Self {
            base_url: config.parse_base_url()?,
            credentials: config.credentials(),
            http_config: config.http_config().with_user_agent(USER_AGENT),
        })
    }

    /// Override the API base URL.
    ///
    /// The URL is treated as a directory: a missing trailing `/` is added so
    /// relative endpoint paths resolve underneath it.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        self.base_url = parse_base_url(base_url.as_ref())?;
        Ok(self)
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Log method, path, form body and raw response body of every call.
    #[must_use]
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.http_config = self.http_config.with_logging(enabled);
        self
    }

    /// Apply an overall request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_config = self.http_config.with_timeout(timeout);
        self
    }

    /// Choose how the token endpoint's `expires_in` is interpreted.
    #[must_use]
    pub fn with_expires_in_unit(mut self, unit: ExpiresInUnit) -> Self {
        self.http_config = self.http_config.with_expires_in_unit(unit);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<VpsieClient> {
        let http = self.http_config.build_http_client()?;

        Ok(VpsieClient {
            http,
            base_url: self.base_url,
            credentials: Arc::new(self.credentials),
            tokens: Arc::new(TokenCache::new()),
            config: self.http_config,
        })
    }
}

/// Asynchronous VPSie client.
///
/// Clones share the HTTP connection pool and the bearer token.
#[derive(Clone)]
pub struct VpsieClient {
    http: Client,
    base_url: Url,
    credentials: Arc<Credentials>,
    tokens: Arc<TokenCache>,
    config: ClientConfig,
}

impl VpsieClient {
    /// Create a client for the production API.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        VpsieClientBuilder::new(client_id, client_secret)?.build()
    }

    /// Access the underlying base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List purchasable offers.
    pub async fn offers(&self) -> Result<Vec<Offer>> {
        self.get::<OffersPayload>("offers")
            .await
            .map(|payload| payload.offers)
    }

    /// List datacenters.
    pub async fn datacenters(&self) -> Result<Vec<Datacenter>> {
        self.get::<DatacentersPayload>("datacenters")
            .await
            .map(|payload| payload.datacenters)
    }

    /// List operating system images.
    pub async fn images(&self) -> Result<Vec<Image>> {
        self.get::<ImagesPayload>("images")
            .await
            .map(|payload| payload.images)
    }

    /// Create a VPS.
    pub async fn create_vps(&self, request: &CreateVpsRequest) -> Result<Vps> {
        self.post_form("vpsie", &request.to_form()).await
    }

    /// List all VPSes on the account.
    pub async fn list_vps(&self) -> Result<Vec<Vps>> {
        self.get::<VpsListPayload>("vpsies")
            .await
            .map(|payload| payload.vpsies)
    }

    /// Fetch a single VPS.
    pub async fn get_vps(&self, id: &str) -> Result<Vps> {
        self.get(&vps_path("vpsie", id)?).await
    }

    /// Delete a VPS, returning the reported status.
    pub async fn delete_vps(&self, id: &str) -> Result<String> {
        self.delete::<StatusPayload>(&vps_path("vpsie", id)?)
            .await
            .map(|payload| payload.status)
    }

    /// Power on a VPS, returning the reported status.
    pub async fn start_vps(&self, id: &str) -> Result<String> {
        self.post_status(&vps_path("vpsie/start", id)?).await
    }

    /// Shut down a VPS.
    pub async fn shutdown_vps(&self, id: &str) -> Result<ActionResponse> {
        self.post_form(&vps_path("vpsie/shutdown", id)?, &FormParams::new())
            .await
    }

    /// Restart a VPS, returning the reported status.
    pub async fn restart_vps(&self, id: &str) -> Result<String> {
        self.post_status(&vps_path("vpsie/restart", id)?).await
    }

    /// Hard-reset a VPS, returning the reported status.
    pub async fn force_restart_vps(&self, id: &str) -> Result<String> {
        self.post_status(&vps_path("vpsie/force/restart", id)?).await
    }

    /// Change the hostname of a VPS.
    pub async fn rename_vps(&self, id: &str, hostname: &str) -> Result<ActionResponse> {
        let form = FormParams::new().with("hostname", hostname);
        self.post_form(&vps_path("vpsie/rename", id)?, &form).await
    }

    /// Reset the root password of a VPS.
    pub async fn reset_password(&self, id: &str) -> Result<PasswordResponse> {
        self.post_form(&vps_path("vpsie/password", id)?, &FormParams::new())
            .await
    }

    /// Take a backup of a VPS.
    pub async fn backup_vps(&self, id: &str, request: &BackupRequest) -> Result<BackupResponse> {
        self.post_form(&vps_path("vpsie/backup", id)?, &request.to_form())
            .await
    }

    /// Take a snapshot of a VPS.
    pub async fn snapshot_vps(
        &self,
        id: &str,
        request: &SnapshotRequest,
    ) -> Result<SnapshotResponse> {
        self.post_form(&vps_path("vpsie/snapshot", id)?, &request.to_form())
            .await
    }

    /// Resize a VPS.
    pub async fn resize_vps(&self, id: &str, request: ResizeRequest) -> Result<ActionResponse> {
        self.post_form(&vps_path("vpsie/resize", id)?, &request.to_form())
            .await
    }

    /// Reinstall a VPS from its image.
    pub async fn rebuild_vps(&self, id: &str) -> Result<RebuildResponse> {
        self.post_form(&vps_path("vpsie/rebuild", id)?, &FormParams::new())
            .await
    }

    /// Fetch resource usage graphs for a VPS.
    pub async fn statistics(&self, id: &str) -> Result<StatisticsGraph> {
        self.post_form::<StatisticsPayload>(&vps_path("vpsie/statistics", id)?, &FormParams::new())
            .await
            .map(|payload| payload.graph)
    }

    async fn post_status(&self, path: &str) -> Result<String> {
        self.post_form::<StatusPayload>(path, &FormParams::new())
            .await
            .map(|payload| payload.status)
    }

    async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::GET, path, None).await
    }

    async fn post_form<T>(&self, path: &str, form: &FormParams) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, Some(form)).await
    }

    async fn delete<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::DELETE, path, None).await
    }

    async fn execute<T>(&self, method: Method, path: &str, form: Option<&FormParams>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let token = self.bearer_token().await?;
        let url = self.build_url(path)?;
        let log = self.config.enable_logging;

        if log {
            debug!(%method, path, "VPSie request");
        }

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(form) = form {
            let body = form.encode();
            if log {
                debug!(path, form = %body, "VPSie request body");
            }
            request = request.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body);
        }

        let response = request.send().await?;
        let envelope = decode_response::<T>(response, path, log).await?;
        unwrap_envelope(envelope, path)
    }

    /// Return a valid bearer token, authenticating when the cached one has expired.
    async fn bearer_token(&self) -> Result<String> {
        self.tokens.get_or_refresh(|| self.request_token()).await
    }

    async fn request_token(&self) -> Result<Token> {
        let url = self.build_url(TOKEN_PATH)?;
        info!(
            client_id = self.credentials.client_id(),
            "Requesting VPSie bearer token"
        );

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(self.credentials.grant_form().encode())
            .send()
            .await?;

        // The token response carries credentials, so its body is never logged.
        let envelope = decode_response::<TokenPayload>(response, TOKEN_PATH, false).await?;
        let payload = unwrap_envelope(envelope, TOKEN_PATH)?;
        if payload.token.access_token.is_empty() {
            return Err(Error::Unauthorized(
                "VPSie token endpoint returned no access token".to_string(),
            ));
        }

        Ok(Token::from_response(
            payload.token,
            self.config.expires_in_unit,
            Instant::now(),
        ))
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let normalized = path.strip_prefix('/').unwrap_or(path);

        self.base_url
            .join(normalized)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid VPSie path `{path}`: {err}")))
    }
}

fn vps_path(prefix: &str, id: &str) -> Result<String> {
    if id.trim().is_empty() {
        return Err(Error::ValidationError("VPSie id must not be empty".to_string()));
    }
    Ok(format!("{prefix}/{id}"))
}

/// Decode an API envelope. A non-2xx status is always a failure: the
/// envelope's own error code wins when it reports one, otherwise the status
/// picks the error.
async fn decode_response<T>(response: Response, path: &str, log_body: bool) -> Result<Envelope<T>>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let text = response.text().await?;

    if log_body {
        debug!(path, %status, body = %text, "VPSie response");
    }

    match serde_json::from_str::<Envelope<T>>(&text) {
        Ok(envelope) if status.is_success() || envelope.error => Ok(envelope),
        Ok(_) => {
            warn!(path, %status, "VPSie request failed");
            Err(Error::from_status(status, text))
        }
        Err(_) if !status.is_success() => Err(Error::from_status(status, text)),
        Err(err) => Err(Error::ParseError(format!(
            "Failed to parse VPSie response for `{path}`: {err}"
        ))),
    }
}

fn unwrap_envelope<T>(envelope: Envelope<T>, path: &str) -> Result<T> {
    if envelope.error {
        warn!(path, code = %envelope.error_code, "VPSie API reported an error");
    }
    envelope.into_result()
}

/// The full VPSie operation set.
///
/// [`VpsieClient`] implements this trait; depend on it where callers need to
/// substitute a fake client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VpsieApi: Send + Sync {
    /// List purchasable offers.
    async fn offers(&self) -> Result<Vec<Offer>>;
    /// List datacenters.
    async fn datacenters(&self) -> Result<Vec<Datacenter>>;
    /// List operating system images.
    async fn images(&self) -> Result<Vec<Image>>;
    /// Create a VPS.
    async fn create_vps(&self, request: &CreateVpsRequest) -> Result<Vps>;
    /// List all VPSes on the account.
    async fn list_vps(&self) -> Result<Vec<Vps>>;
    /// Fetch a single VPS.
    async fn get_vps(&self, id: &str) -> Result<Vps>;
    /// Delete a VPS.
    async fn delete_vps(&self, id: &str) -> Result<String>;
    /// Power on a VPS.
    async fn start_vps(&self, id: &str) -> Result<String>;
    /// Shut down a VPS.
    async fn shutdown_vps(&self, id: &str) -> Result<ActionResponse>;
    /// Restart a VPS.
    async fn restart_vps(&self, id: &str) -> Result<String>;
    /// Hard-reset a VPS.
    async fn force_restart_vps(&self, id: &str) -> Result<String>;
    /// Change the hostname of a VPS.
    async fn rename_vps(&self, id: &str, hostname: &str) -> Result<ActionResponse>;
    /// Reset the root password of a VPS.
    async fn reset_password(&self, id: &str) -> Result<PasswordResponse>;
    /// Take a backup of a VPS.
    async fn backup_vps(&self, id: &str, request: &BackupRequest) -> Result<BackupResponse>;
    /// Take a snapshot of a VPS.
    async fn snapshot_vps(&self, id: &str, request: &SnapshotRequest)
        -> Result<SnapshotResponse>;
    /// Resize a VPS.
    async fn resize_vps(&self, id: &str, request: ResizeRequest) -> Result<ActionResponse>;
    /// Reinstall a VPS from its image.
    async fn rebuild_vps(&self, id: &str) -> Result<RebuildResponse>;
    /// Fetch resource usage graphs for a VPS.
    async fn statistics(&self, id: &str) -> Result<StatisticsGraph>;
}

#[async_trait]
impl VpsieApi for VpsieClient {
    async fn offers(&self) -> Result<Vec<Offer>> {
        VpsieClient::offers(self).await
    }

    async fn datacenters(&self) -> Result<Vec<Datacenter>> {
        VpsieClient::datacenters(self).await
    }

    async fn images(&self) -> Result<Vec<Image>> {
        VpsieClient::images(self).await
    }

    async fn create_vps(&self, request: &CreateVpsRequest) -> Result<Vps> {
        VpsieClient::create_vps(self, request).await
    }

    async fn list_vps(&self) -> Result<Vec<Vps>> {
        VpsieClient::list_vps(self).await
    }

    async fn get_vps(&self, id: &str) -> Result<Vps> {
        VpsieClient::get_vps(self, id).await
    }

    async fn delete_vps(&self, id: &str) -> Result<String> {
        VpsieClient::delete_vps(self, id).await
    }

    async fn start_vps(&self, id: &str) -> Result<String> {
        VpsieClient::start_vps(self, id).await
    }

    async fn shutdown_vps(&self, id: &str) -> Result<ActionResponse> {
        VpsieClient::shutdown_vps(self, id).await
    }

    async fn restart_vps(&self, id: &str) -> Result<String> {
        VpsieClient::restart_vps(self, id).await
    }

    async fn force_restart_vps(&self, id: &str) -> Result<String> {
        VpsieClient::force_restart_vps(self, id).await
    }

    async fn rename_vps(&self, id: &str, hostname: &str) -> Result<ActionResponse> {
        VpsieClient::rename_vps(self, id, hostname).await
    }

    async fn reset_password(&self, id: &str) -> Result<PasswordResponse> {
        VpsieClient::reset_password(self, id).await
    }

    async fn backup_vps(&self, id: &str, request: &BackupRequest) -> Result<BackupResponse> {
        VpsieClient::backup_vps(self, id, request).await
    }

    async fn snapshot_vps(
        &self,
        id: &str,
        request: &SnapshotRequest,
    ) -> Result<SnapshotResponse> {
        VpsieClient::snapshot_vps(self, id, request).await
    }

    async fn resize_vps(&self, id: &str, request: ResizeRequest) -> Result<ActionResponse> {
        VpsieClient::resize_vps(self, id, request).await
    }

    async fn rebuild_vps(&self, id: &str) -> Result<RebuildResponse> {
        VpsieClient::rebuild_vps(self, id).await
    }

    async fn statistics(&self, id: &str) -> Result<StatisticsGraph> {
        VpsieClient::statistics(self, id).await
    }
}
