//! Transient user-facing alerts.

use serde::Serialize;

use crate::error::Error;
use crate::models::{Notification, NotificationId, Severity};

/// Title used when a pushed notification has none.
const FALLBACK_TITLE: &str = "Notification";

/// A transient message for the user, styled by severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub severity: Severity,
    pub title: String,
    pub message: String,
    /// Notification this alert is about, if any.
    pub notification_id: Option<NotificationId>,
}

impl Alert {
    /// Alert announcing a freshly pushed notification.
    pub fn for_notification(noti: &Notification) -> Self {
        let title = if noti.title.is_empty() {
            FALLBACK_TITLE.to_owned()
        } else {
            noti.title.clone()
        };

        Self {
            severity: noti.severity(),
            title,
            message: noti.message.clone(),
            notification_id: Some(noti.id),
        }
    }

    /// Alert reporting that a mark-as-read request failed.
    pub fn mark_read_failed(id: NotificationId, error: &Error) -> Self {
        Self {
            severity: Severity::Error,
            title: "Failed to mark notification as read".to_owned(),
            message: error.to_string(),
            notification_id: Some(id),
        }
    }
}
