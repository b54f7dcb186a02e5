//! User API.

use std::sync::Arc;

use crate::{client::HrisClientInner, error::Result, models::UserProfile};

/// API for user operations.
#[derive(Debug, Clone)]
pub struct UserApi {
    client: Arc<HrisClientInner>,
}

impl UserApi {
    pub(crate) fn new(client: Arc<HrisClientInner>) -> Self {
        Self { client }
    }

    /// Get the profile of the signed-in user.
    pub async fn me(&self) -> Result<UserProfile> {
        self.client.get_authed("users/me").await
    }

    /// Fetch the profile and record its ID on the session.
    ///
    /// A real-time notifier following the session starts connecting once
    /// this succeeds.
    pub async fn resolve_identity(&self) -> Result<UserProfile> {
        let profile = self.me().await?;
        self.client.session.set_user(profile.id);
        log::debug!("resolved identity uid={}", profile.id);
        Ok(profile)
    }
}
