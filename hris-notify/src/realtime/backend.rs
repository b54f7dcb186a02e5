//! Request/response side of the notification channel.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Notification, NotificationId};

/// Source of truth for notifications outside the push connection.
///
/// [`NotificationApi`](crate::api::NotificationApi) is the HTTP
/// implementation.
#[async_trait]
pub trait NotificationBackend: Send + Sync + std::fmt::Debug {
    /// Fetch all notifications of the current user, newest first.
    async fn fetch_notifications(&self) -> Result<Vec<Notification>>;

    /// Acknowledge a notification as read.
    async fn mark_read(&self, id: NotificationId) -> Result<()>;
}
