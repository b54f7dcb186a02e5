//! Notification API.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::{
    client::HrisClientInner,
    error::Result,
    models::{Notification, NotificationId, NotificationPayload},
    realtime::NotificationBackend,
};

/// API for notification operations.
#[derive(Debug, Clone)]
pub struct NotificationApi {
    client: Arc<HrisClientInner>,
}

impl NotificationApi {
    pub(crate) fn new(client: Arc<HrisClientInner>) -> Self {
        Self { client }
    }

    /// Get all notifications of the current user, newest first.
    pub async fn list(&self) -> Result<Vec<Notification>> {
        let payloads: Vec<NotificationPayload> = self.client.get_authed("notifications").await?;
        Ok(parse_notification_list(payloads))
    }

    /// Mark notification as read.
    pub async fn mark_read(&self, id: NotificationId) -> Result<()> {
        self.client
            .put_authed(&format!("notifications/{}/read", id))
            .await
    }
}

#[async_trait]
impl NotificationBackend for NotificationApi {
    async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        self.list().await
    }

    async fn mark_read(&self, id: NotificationId) -> Result<()> {
        NotificationApi::mark_read(self, id).await
    }
}

fn parse_notification_list(payloads: Vec<NotificationPayload>) -> Vec<Notification> {
    let received_at = Utc::now();

    payloads
        .into_iter()
        .filter_map(|payload| match payload.normalize(received_at) {
            Ok(noti) => Some(noti),
            Err(e) => {
                log::warn!("skipping malformed notification in list: {}", e);
                None
            }
        })
        .collect()
}
