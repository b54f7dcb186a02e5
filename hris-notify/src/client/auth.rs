//! Authentication state management.

use std::sync::Arc;
use tokio::sync::watch;

use crate::models::UserId;

/// Authentication information for the HRIS backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthInfo {
    /// Access token, possibly still wrapped in quotes as stored by the web UI.
    pub token: String,
    /// Resolved user ID. `None` until the profile has been fetched.
    pub uid: Option<UserId>,
}

impl AuthInfo {
    /// Create new auth info without a resolved identity.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            uid: None,
        }
    }

    /// Attach a resolved user ID.
    pub fn with_uid(mut self, uid: impl Into<UserId>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Token ready for transmission.
    pub fn bearer(&self) -> &str {
        unquote(&self.token)
    }

    /// Check if auth looks valid.
    pub fn is_valid(&self) -> bool {
        !self.bearer().is_empty()
    }
}

/// Strip one leading and one trailing double quote.
pub(crate) fn unquote(token: &str) -> &str {
    let token = token.strip_prefix('"').unwrap_or(token);
    token.strip_suffix('"').unwrap_or(token)
}

/// Shared, observable authentication session.
///
/// Cloning yields another handle to the same session. Consumers that follow
/// login and logout subscribe to it instead of polling.
#[derive(Debug, Clone)]
pub struct Session {
    state: Arc<watch::Sender<Option<AuthInfo>>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a signed-out session.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Create a session that is already signed in.
    pub fn with_auth(auth: AuthInfo) -> Self {
        let session = Self::new();
        session.login(auth);
        session
    }

    /// Replace the current credentials.
    pub fn login(&self, auth: AuthInfo) {
        self.state.send_replace(Some(auth));
    }

    /// Record the resolved identity for the current credentials.
    ///
    /// Ignored while signed out.
    pub fn set_user(&self, uid: impl Into<UserId>) {
        let uid = uid.into();
        self.state.send_if_modified(|state| match state {
            Some(auth) if auth.uid != Some(uid) => {
                auth.uid = Some(uid);
                true
            }
            _ => false,
        });
    }

    /// Clear credentials and identity.
    pub fn logout(&self) {
        self.state.send_if_modified(|state| state.take().is_some());
    }

    /// Snapshot of the current credentials.
    pub fn current(&self) -> Option<AuthInfo> {
        self.state.borrow().clone()
    }

    /// Current bearer token, unquoted.
    pub fn token(&self) -> Option<String> {
        self.state
            .borrow()
            .as_ref()
            .filter(|a| a.is_valid())
            .map(|a| a.bearer().to_owned())
    }

    /// Current user identity, if resolved.
    pub fn user_id(&self) -> Option<UserId> {
        self.state.borrow().as_ref().and_then(|a| a.uid)
    }

    /// Check if credentials are present.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Follow changes to the session.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthInfo>> {
        self.state.subscribe()
    }
}
