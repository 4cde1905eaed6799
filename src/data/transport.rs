//! HTTP transport for the users API
//!
//! Wraps a `reqwest::Client` with the base URL, `x-api-key` header and request
//! timeout already applied. Callers get the raw status and body back and
//! decide what they mean.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::config::ApiSettings;
use crate::error::ConfigError;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// User agent sent with every request
const USER_AGENT: &str = concat!("reqres-users/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    /// Reason phrase for the status, e.g. "Not Found"
    pub fn reason(&self) -> String {
        self.status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string()
    }
}

/// GET-only HTTP client bound to one API base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport from API settings.
    ///
    /// Fails if the API key is not a valid header value or the client cannot
    /// be built.
    pub fn new(settings: &ApiSettings) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&settings.api_key)?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(client, &settings.base_url))
    }

    /// Creates a transport around an existing client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a path relative to the base URL
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Performs a GET request and reads the whole body.
    ///
    /// Any non-success status is still `Ok`; only failures below HTTP
    /// (connect, DNS, reset, timeout, body read) are `Err`.
    #[instrument(skip(self), fields(base = %self.base_url))]
    pub async fn get(&self, path: &str) -> Result<RawResponse, reqwest::Error> {
        let url = self.url_for(path);
        debug!(%url, "GET request");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "Response received");

        Ok(RawResponse { status, body })
    }
}
