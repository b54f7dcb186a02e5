//! HTTP client and configuration.

mod auth;
mod http;

pub use auth::{AuthInfo, Session};
pub(crate) use auth::unquote as unquote_token;
pub use http::{HttpConfig, DEFAULT_BASE_URL};

use crate::api::{NotificationApi, UserApi};
use crate::error::{Error, Result};
use crate::realtime::NotifierBuilder;
use http::{build_client, HttpExecutor};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating HrisClient.
pub struct HrisClientBuilder {
    session: Option<Session>,
    http_config: HttpConfig,
}

impl std::fmt::Debug for HrisClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HrisClientBuilder")
            .field("uid", &self.session.as_ref().and_then(|s| s.user_id()))
            .field("http_config", &self.http_config)
            .finish()
    }
}

impl Default for HrisClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HrisClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            session: None,
            http_config: HttpConfig::default(),
        }
    }

    /// Sign in with a bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.session = Some(Session::with_auth(AuthInfo::new(token)));
        self
    }

    /// Share an existing session.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Set base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.http_config.base_url = url.into();
        self
    }

    /// Set custom user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.http_config.custom_user_agent = Some(ua.into());
        self
    }

    /// Set connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.connect_timeout = timeout;
        self
    }

    /// Set read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.read_timeout = timeout;
        self
    }

    /// Build HrisClient.
    pub fn build(self) -> Result<HrisClient> {
        let http_client = build_client(&self.http_config)?;

        Ok(HrisClient {
            inner: Arc::new(HrisClientInner {
                http: http_client,
                config: self.http_config,
                session: self.session.unwrap_or_default(),
            }),
        })
    }
}

/// Internal client state.
pub(crate) struct HrisClientInner {
    pub http: reqwest::Client,
    pub config: HttpConfig,
    pub session: Session,
}

impl std::fmt::Debug for HrisClientInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HrisClientInner")
            .field("base_url", &self.config.base_url)
            .field("uid", &self.session.user_id())
            .finish()
    }
}

impl HrisClientInner {
    /// Get the bearer token or error.
    pub fn require_token(&self) -> Result<String> {
        self.session.token().ok_or(Error::AuthRequired)
    }

    /// Create HTTP executor.
    pub fn executor(&self) -> HttpExecutor<'_> {
        HttpExecutor::new(&self.http, &self.config)
    }

    /// Execute authenticated GET request.
    pub async fn get_authed<T: DeserializeOwned>(&self, api: &str) -> Result<T> {
        let token = self.require_token()?;
        self.executor().get_json(api, Some(&token)).await
    }

    /// Execute authenticated PUT request.
    pub async fn put_authed(&self, api: &str) -> Result<()> {
        let token = self.require_token()?;
        self.executor().put(api, Some(&token)).await
    }
}

/// HRIS client for interacting with the backend.
#[derive(Clone)]
pub struct HrisClient {
    pub(crate) inner: Arc<HrisClientInner>,
}

impl HrisClient {
    /// Create a new client builder.
    pub fn builder() -> HrisClientBuilder {
        HrisClientBuilder::new()
    }

    /// Get the notification API.
    pub fn notifications(&self) -> NotificationApi {
        NotificationApi::new(self.inner.clone())
    }

    /// Get the user API.
    pub fn users(&self) -> UserApi {
        UserApi::new(self.inner.clone())
    }

    /// Start configuring a real-time notifier bound to this client's session.
    pub fn notifier(&self) -> NotifierBuilder {
        NotifierBuilder::new(
            self.inner.session.clone(),
            self.inner.config.base_url.clone(),
            Arc::new(self.notifications()),
        )
    }

    /// The session this client authenticates with.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Check if the client is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.inner.session.is_authenticated()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.inner.config.base_url
    }
}

impl std::fmt::Debug for HrisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HrisClient")
            .field("authenticated", &self.is_authenticated())
            .field("base_url", &self.inner.config.base_url)
            .finish()
    }
}
