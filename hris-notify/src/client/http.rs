//! HTTP client configuration and request execution.

use crate::error::{Error, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default HRIS API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/api/v1";

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("hris-notify/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL for API requests, including the version prefix.
    pub base_url: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read timeout.
    pub read_timeout: Duration,
    /// Custom user agent.
    pub custom_user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(20),
            custom_user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Get the user agent to send.
    pub fn user_agent(&self) -> &str {
        self.custom_user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Parse the configured base URL.
    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(Error::Url)
    }

    /// Resolve a relative API path to a full URL.
    pub fn resolve_url(&self, api: &str) -> Result<Url> {
        if api.starts_with("http://") || api.starts_with("https://") {
            return Url::parse(api).map_err(Error::Url);
        }

        let mut base = self.base()?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        base.join(api.trim_start_matches('/')).map_err(Error::Url)
    }
}

/// Build a reqwest client with the given configuration.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .user_agent(config.user_agent())
        .gzip(true)
        .build()
        .map_err(Error::Network)
}

/// Response envelope used by every HRIS endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    message: String,
    data: Option<T>,
}

/// HTTP request executor.
pub struct HttpExecutor<'a> {
    client: &'a Client,
    config: &'a HttpConfig,
}

impl<'a> HttpExecutor<'a> {
    /// Create a new executor.
    pub fn new(client: &'a Client, config: &'a HttpConfig) -> Self {
        Self { client, config }
    }

    /// Build a request with common headers.
    fn build_request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header("Accept", "application/json");

        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Execute a GET request and return the envelope's `data`.
    pub async fn get_json<T: DeserializeOwned>(&self, api: &str, token: Option<&str>) -> Result<T> {
        let url = self.config.resolve_url(api)?;
        let response = self
            .build_request(Method::GET, url, token)
            .send()
            .await
            .map_err(Error::Network)?;

        let text = self.handle_response(response).await?;
        parse_envelope(&text)
    }

    /// Execute a PUT request without a body, discarding the response data.
    pub async fn put(&self, api: &str, token: Option<&str>) -> Result<()> {
        let url = self.config.resolve_url(api)?;
        let response = self
            .build_request(Method::PUT, url, token)
            .send()
            .await
            .map_err(Error::Network)?;

        self.handle_response(response).await?;
        Ok(())
    }

    /// Map non-success statuses to API errors and return the body text.
    async fn handle_response(&self, response: Response) -> Result<String> {
        let status = response.status();
        let text = response.text().await.map_err(Error::Network)?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&text)
                .ok()
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_owned()
                });
            return Err(Error::api(status.as_u16(), message));
        }

        Ok(text)
    }
}

/// Parse a response envelope and take its `data`.
fn parse_envelope<T: DeserializeOwned>(text: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(text).map_err(Error::Json)?;
    envelope.data.ok_or_else(|| Error::missing("data"))
}
