//! The JSON-over-HTTP boundary.
//!
//! [`GithubOrgClient`](crate::GithubOrgClient) only talks to the network
//! through [`JsonFetcher`], so tests hand it a fake instead of patching
//! anything at runtime.

use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("kata/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid authorization token")]
    InvalidToken,
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// HTTP status for [`FetchError::Status`], otherwise `None`.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type FetchFut<'a> = Pin<Box<dyn Future<Output = Result<Value, FetchError>> + Send + 'a>>;

/// Fetches a URL and decodes the body as JSON.
pub trait JsonFetcher: Send + Sync {
    fn get_json<'a>(&'a self, url: &'a str) -> FetchFut<'a>;
}

/// Settings for [`HttpFetcher`].
#[derive(Clone, Default)]
pub struct HttpFetcherConfig {
    pub timeout: Option<Duration>,
    /// Sent as `Authorization: Bearer <token>`.
    pub token: Option<String>,
}

// Manual Debug impl to prevent leaking the token in logs.
impl std::fmt::Debug for HttpFetcherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcherConfig")
            .field("timeout", &self.timeout)
            .field(
                "token",
                &if self.token.is_some() { "[REDACTED]" } else { "None" },
            )
            .finish()
    }
}

/// [`JsonFetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpFetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        if let Some(token) = config.token.as_deref().filter(|t| !t.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|_| FetchError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = client_builder(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Wrap an existing client as-is.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Process-wide fetcher with default settings.
    pub fn shared() -> &'static HttpFetcher {
        static FETCHER: OnceLock<HttpFetcher> = OnceLock::new();
        FETCHER.get_or_init(|| {
            HttpFetcher::new(&HttpFetcherConfig::default()).unwrap_or_else(|e| {
                tracing::error!("Failed to build HTTP client: {e}. Falling back to reqwest defaults.");
                HttpFetcher::from_client(reqwest::Client::new())
            })
        })
    }
}

fn client_builder(timeout: Option<Duration>) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
}

impl JsonFetcher for HttpFetcher {
    fn get_json<'a>(&'a self, url: &'a str) -> FetchFut<'a> {
        Box::pin(async move {
            tracing::debug!(%url, "GET");
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|source| FetchError::Request {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(%url, status = status.as_u16(), "non-success response");
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            response
                .json::<Value>()
                .await
                .map_err(|source| FetchError::Decode {
                    url: url.to_string(),
                    source,
                })
        })
    }
}

/// Fetch `url` with the shared [`HttpFetcher`].
pub async fn get_json(url: &str) -> Result<Value, FetchError> {
    HttpFetcher::shared().get_json(url).await
}
