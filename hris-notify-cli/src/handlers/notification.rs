//! Notification handlers.

use anyhow::{Context, Result};
use colored::Colorize;
use hris_notify::{Alert, HrisClient, Notification, NotificationId, Severity};
use rust_i18n::t;
use serde::Serialize;

use crate::output::{format_relative_time, paint, PlainPrint, TableRow};

/// Notification info.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationInfo {
    pub id: u64,
    pub kind: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub related_id: Option<u64>,
    pub created_at: String,
    #[serde(skip)]
    pub time: String,
}

impl From<&Notification> for NotificationInfo {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.get(),
            kind: n.kind.tag().to_string(),
            severity: n.severity(),
            title: n.title.clone(),
            message: n.message.clone(),
            is_read: n.is_read,
            related_id: n.related_id,
            created_at: n.created_at.to_rfc3339(),
            time: format_relative_time(&n.created_at),
        }
    }
}

impl TableRow for NotificationInfo {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Type", "Title", "Message", "Read", "Time"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.kind.clone(),
            self.title.clone(),
            self.message.clone(),
            if self.is_read { "yes" } else { "no" }.to_string(),
            self.time.clone(),
        ]
    }
}

impl PlainPrint for NotificationInfo {
    fn plain_print(&self) {
        let marker = if self.is_read {
            " ".normal()
        } else {
            "●".yellow()
        };
        println!(
            "{} [{}] {} {}",
            marker,
            self.id.to_string().cyan(),
            paint(&self.title, self.severity).bold(),
            self.time.dimmed()
        );
        if !self.message.is_empty() {
            for line in self.message.lines() {
                if !line.trim().is_empty() {
                    println!("   {}", line);
                }
            }
        }
    }
}

/// Alert info.
#[derive(Debug, Clone, Serialize)]
pub struct AlertInfo {
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub notification_id: Option<u64>,
}

impl From<&Alert> for AlertInfo {
    fn from(a: &Alert) -> Self {
        Self {
            severity: a.severity,
            title: a.title.clone(),
            message: a.message.clone(),
            notification_id: a.notification_id.map(|id| id.get()),
        }
    }
}

impl PlainPrint for AlertInfo {
    fn plain_print(&self) {
        let id = self
            .notification_id
            .map(|id| format!(" #{}", id))
            .unwrap_or_default();
        println!(
            "{}{} {}",
            paint(&self.title, self.severity).bold(),
            id.dimmed(),
            self.message
        );
    }
}

/// Notification list result.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationListResult {
    pub unread: usize,
    pub notifications: Vec<NotificationInfo>,
}

/// Mark read result.
#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResult {
    pub id: u64,
    pub success: bool,
}

/// Mark all read result.
#[derive(Debug, Clone, Serialize)]
pub struct MarkAllReadResult {
    pub marked: usize,
    pub ids: Vec<u64>,
    pub success: bool,
}

/// Parse a notification ID argument.
pub fn parse_id(id: &str) -> Result<NotificationId> {
    let id: NotificationId = id
        .parse()
        .with_context(|| t!("invalid_id", id = id).to_string())?;
    if id.is_empty() {
        anyhow::bail!("{}", t!("invalid_id", id = id));
    }
    Ok(id)
}

/// List notifications, optionally only unread ones.
pub async fn list_notifications(
    client: &HrisClient,
    unread_only: bool,
) -> Result<NotificationListResult> {
    let list = client.notifications().list().await?;
    let unread = list.iter().filter(|n| !n.is_read).count();

    Ok(NotificationListResult {
        unread,
        notifications: list
            .iter()
            .filter(|n| !unread_only || !n.is_read)
            .map(NotificationInfo::from)
            .collect(),
    })
}

/// Mark a notification as read.
pub async fn mark_read(client: &HrisClient, id: &str) -> Result<MarkReadResult> {
    let id = parse_id(id)?;
    client.notifications().mark_read(id).await?;
    Ok(MarkReadResult {
        id: id.get(),
        success: true,
    })
}

/// Mark every unread notification as read.
pub async fn mark_all_read(client: &HrisClient) -> Result<MarkAllReadResult> {
    let notifier = client.notifier().build();
    notifier.refresh().await?;
    let ids = notifier
        .notifications()
        .iter()
        .filter(|n| !n.is_read)
        .map(|n| n.id.get())
        .collect();
    let marked = notifier.mark_all_as_read().await?;
    Ok(MarkAllReadResult {
        marked,
        ids,
        success: true,
    })
}
