use std::{fmt, sync::Arc, time::Duration};

use arc_swap::ArcSwapOption;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE, USER_AGENT},
    StatusCode,
};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::{
    api_keys::ApiKeysClient,
    audiences::AudiencesClient,
    domains::DomainsClient,
    emails::EmailsClient,
    errors::{Error, Result, TransportError},
    http::{classify_error, decode_json, ApiRequest},
    rate_limit::RateLimitInfo,
    suppressions::SuppressionsClient,
    templates::TemplatesClient,
    verifications::VerificationsClient,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, IDEMPOTENCY_KEY_HEADER,
};

pub(crate) const ENV_API_KEY: &str = "EMAILIT_API_KEY";
pub(crate) const ENV_BASE_URL: &str = "EMAILIT_BASE_URL";
pub(crate) const ENV_TIMEOUT_SECONDS: &str = "EMAILIT_TIMEOUT_SECONDS";

/// Client configuration. Validated once by [`Client::new`].
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Emailit API key (required).
    pub api_key: Option<String>,
    /// API base URL (defaults to production).
    pub base_url: Option<String>,
    /// Override the request timeout (defaults to 30s).
    pub timeout: Option<Duration>,
    /// Bring your own transport; its connection pool is shared by every call.
    pub http_client: Option<reqwest::Client>,
    /// Override the User-Agent header.
    pub user_agent: Option<String>,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Reads `EMAILIT_API_KEY`, `EMAILIT_BASE_URL` and `EMAILIT_TIMEOUT_SECONDS`.
    ///
    /// Unset variables are left as `None`; a timeout that is not a whole number
    /// of seconds is rejected.
    pub fn from_env() -> Result<Self> {
        let timeout = match std::env::var(ENV_TIMEOUT_SECONDS) {
            Ok(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|err| {
                    Error::Config(format!("{ENV_TIMEOUT_SECONDS} must be whole seconds: {err}"))
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };
        Ok(Self {
            api_key: std::env::var(ENV_API_KEY).ok(),
            base_url: std::env::var(ENV_BASE_URL).ok(),
            timeout,
            ..Default::default()
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

pub(crate) fn resolve_base_url(raw: Option<&str>) -> Result<reqwest::Url> {
    let raw = raw.unwrap_or(DEFAULT_BASE_URL);
    if raw.trim().is_empty() {
        return Err(Error::Config("base url cannot be empty".to_string()));
    }
    let url = reqwest::Url::parse(raw.trim())
        .map_err(|err| Error::Config(format!("invalid base url: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("invalid base url: {raw}")));
    }
    Ok(url)
}

pub(crate) fn resolve_timeout(timeout: Option<Duration>) -> Result<Duration> {
    let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
    if timeout.is_zero() {
        return Err(Error::Config("timeout must be greater than zero".to_string()));
    }
    Ok(timeout)
}

/// Emailit API client.
///
/// Cheap to clone; clones share the connection pool and the last observed
/// rate-limit snapshot.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    cancel: Option<CancellationToken>,
}

pub(crate) struct ClientInner {
    base_url: reqwest::Url,
    api_key: String,
    user_agent: String,
    http: reqwest::Client,
    timeout: Duration,
    last_rate_limit: ArcSwapOption<RateLimitInfo>,
}

/// A completed exchange with a 2xx status.
pub(crate) struct RawResponse {
    pub(crate) url: reqwest::Url,
    pub(crate) rate_limit: RateLimitInfo,
    pub(crate) body: Vec<u8>,
}

/// Response types decoded by the executor.
///
/// The rate-limit hook is a no-op except for types that carry the snapshot
/// observed during their own creation.
pub(crate) trait ApiResponse: DeserializeOwned {
    fn attach_rate_limit(&mut self, _rate_limit: RateLimitInfo) {}
}

impl Client {
    /// Builds a client, failing immediately on an invalid configuration.
    pub fn new(cfg: Config) -> Result<Self> {
        let api_key = cfg
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("api key is required".to_string()))?;
        let base_url = resolve_base_url(cfg.base_url.as_deref())?;
        let timeout = resolve_timeout(cfg.timeout)?;

        let http = match cfg.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(TransportError::from)?,
        };

        let user_agent = cfg
            .user_agent
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                api_key,
                user_agent,
                http,
                timeout,
                last_rate_limit: ArcSwapOption::empty(),
            }),
            cancel: None,
        })
    }

    /// Shorthand for a production client with default settings.
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(Config::new(api_key))
    }

    /// Returns a view of this client whose calls abort when `token` is cancelled.
    ///
    /// The view shares the connection pool and rate-limit snapshot. An aborted
    /// call fails with [`Error::Cancelled`] and leaves the snapshot untouched.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            inner: self.inner.clone(),
            cancel: Some(token),
        }
    }

    /// Rate-limit snapshot from the most recently completed call, if any.
    pub fn last_rate_limit(&self) -> Option<RateLimitInfo> {
        self.inner.last_rate_limit.load_full().map(|info| *info)
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Whether both handles share the same underlying client.
    pub fn ptr_eq(&self, other: &Client) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn emails(&self) -> EmailsClient {
        EmailsClient {
            client: self.clone(),
        }
    }

    pub fn domains(&self) -> DomainsClient {
        DomainsClient {
            client: self.clone(),
        }
    }

    pub fn api_keys(&self) -> ApiKeysClient {
        ApiKeysClient {
            client: self.clone(),
        }
    }

    pub fn audiences(&self) -> AudiencesClient {
        AudiencesClient {
            client: self.clone(),
        }
    }

    pub fn templates(&self) -> TemplatesClient {
        TemplatesClient {
            client: self.clone(),
        }
    }

    pub fn suppressions(&self) -> SuppressionsClient {
        SuppressionsClient {
            client: self.clone(),
        }
    }

    pub fn verifications(&self) -> VerificationsClient {
        VerificationsClient {
            client: self.clone(),
        }
    }

    /// Best-effort reachability check against `GET /v2/domains`.
    ///
    /// Returns the rate-limit snapshot on success and `None` on any failure.
    pub async fn test_connection(&self) -> Option<RateLimitInfo> {
        self.send(ApiRequest::get(&["domains"]))
            .await
            .ok()
            .map(|raw| raw.rate_limit)
    }

    pub(crate) async fn execute<T: ApiResponse>(&self, req: ApiRequest) -> Result<T> {
        let raw = self.send(req).await?;
        let mut parsed = decode_json::<T>(&raw.body).map_err(Error::Deserialization)?;
        parsed.attach_rate_limit(raw.rate_limit);
        Ok(parsed)
    }

    pub(crate) async fn send(&self, req: ApiRequest) -> Result<RawResponse> {
        self.inner.send(req, self.cancel.as_ref()).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .field("cancellable", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}

struct Exchange {
    status: StatusCode,
    url: reqwest::Url,
    rate_limit: RateLimitInfo,
    body: Vec<u8>,
}

impl ClientInner {
    fn request(&self, req: ApiRequest) -> Result<reqwest::RequestBuilder> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(req.segments.iter());
        if !req.query.is_empty() {
            url.query_pairs_mut().extend_pairs(req.query.iter());
        }

        let mut builder = self
            .http
            .request(req.method, url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, self.user_agent.as_str())
            .timeout(self.timeout);
        if let Some(key) = req.idempotency_key {
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, key);
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }
        Ok(builder)
    }

    async fn send(
        &self,
        req: ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<RawResponse> {
        #[cfg(feature = "tracing")]
        let (method, path, start) = (req.method.clone(), req.path(), std::time::Instant::now());
        let builder = self.request(req)?;

        let exchange = async move {
            let resp = builder.send().await.map_err(TransportError::from)?;
            let status = resp.status();
            let url = resp.url().clone();
            let rate_limit = RateLimitInfo::from_headers(resp.headers());
            let body = resp.bytes().await.map_err(TransportError::from)?.to_vec();
            Ok::<_, Error>(Exchange {
                status,
                url,
                rate_limit,
                body,
            })
        };
        #[cfg(feature = "tracing")]
        let exchange = tracing::Instrument::instrument(
            exchange,
            tracing::debug_span!("emailit.http", method = %method, path = %path),
        );

        let result = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(Error::Cancelled),
                    result = exchange => result,
                }
            }
            None => exchange.await,
        };
        let exchange = match result {
            Ok(exchange) => exchange,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(method = %method, path = %path, error = %err, "request aborted");
                return Err(err);
            }
        };

        self.last_rate_limit
            .store(Some(Arc::new(exchange.rate_limit)));

        if !exchange.status.is_success() {
            let body = String::from_utf8_lossy(&exchange.body);
            let err = classify_error(
                exchange.status.as_u16(),
                &body,
                Some(exchange.rate_limit),
            );
            #[cfg(feature = "tracing")]
            tracing::warn!(
                method = %method,
                path = %path,
                status = exchange.status.as_u16(),
                error = %err,
                "request failed"
            );
            return Err(err.into());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            method = %method,
            path = %path,
            status = exchange.status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request completed"
        );
        Ok(RawResponse {
            url: exchange.url,
            rate_limit: exchange.rate_limit,
            body: exchange.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let client = Client::new(Config::new("em_test_key")).expect("client");
        assert_eq!(client.base_url(), "https://api.emailit.com/");
        assert_eq!(client.timeout(), Duration::from_secs(30));
        assert!(client.last_rate_limit().is_none());
    }

    #[test]
    fn new_rejects_missing_or_blank_api_key() {
        for cfg in [Config::default(), Config::new(""), Config::new("   ")] {
            let err = Client::new(cfg).expect_err("should fail");
            assert!(matches!(err, Error::Config(_)), "got {err:?}");
        }
    }

    #[test]
    fn new_rejects_blank_base_url() {
        let err = Client::new(Config::new("em_test_key").with_base_url(" "))
            .expect_err("should fail");
        assert!(matches!(err, Error::Config(msg) if msg.contains("base url")));
    }

    #[test]
    fn new_rejects_unparseable_base_url() {
        let err = Client::new(Config::new("em_test_key").with_base_url("not a url"))
            .expect_err("should fail");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn new_rejects_zero_timeout() {
        let err = Client::new(Config::new("em_test_key").with_timeout(Duration::ZERO))
            .expect_err("should fail");
        assert!(matches!(err, Error::Config(msg) if msg.contains("timeout")));
    }

    #[test]
    fn cancellation_view_shares_state() {
        let client = Client::from_api_key("em_test_key").expect("client");
        let view = client.with_cancellation(CancellationToken::new());
        assert!(client.ptr_eq(&view));
        assert!(!client.ptr_eq(&Client::from_api_key("em_test_key").expect("client")));
    }

    #[test]
    fn request_joins_segments_onto_base_path() {
        let client = Client::new(
            Config::new("em_test_key").with_base_url("https://proxy.example.com/emailit/"),
        )
        .expect("client");
        let mut query = crate::http::QueryParams::new();
        query.push("page", 1);
        let req = ApiRequest::get(&["emails", "em 1"]).query(query);
        let built = client
            .inner
            .request(req)
            .expect("builder")
            .build()
            .expect("request");
        assert_eq!(
            built.url().as_str(),
            "https://proxy.example.com/emailit/v2/emails/em%201?page=1"
        );
        assert_eq!(
            built.headers()["authorization"].to_str().unwrap(),
            "Bearer em_test_key"
        );
        assert_eq!(
            built.headers()["content-type"].to_str().unwrap(),
            "application/json"
        );
        assert!(built.headers().get(IDEMPOTENCY_KEY_HEADER).is_none());
    }

    #[test]
    fn debug_output_hides_api_key() {
        let client = Client::from_api_key("em_secret_value").expect("client");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("em_secret_value"));
    }
}
