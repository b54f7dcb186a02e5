//! Notification models.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{NotificationId, UserId};
use crate::error::{Error, Result};

/// A notification for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification ID.
    pub id: NotificationId,
    /// Recipient of the notification.
    pub user_id: Option<UserId>,
    /// Type of notification.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Notification body.
    pub message: String,
    /// Business entity (leave request, reimbursement, ...) this refers to.
    pub related_id: Option<u64>,
    /// Whether notification has been read.
    pub is_read: bool,
    /// Time when notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Alert severity for this notification.
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Type of notification, carried in the `type` field on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    /// A request of yours was approved.
    Approved,
    /// A request of yours was rejected.
    Rejected,
    /// A leave request awaits your approval.
    LeaveApprovalRequest,
    /// A reimbursement awaits your approval.
    ReimburseApprovalRequest,
    /// A loan awaits your approval.
    LoanApprovalRequest,
    /// Payroll has been paid out.
    PayrollPaid,
    /// Any tag this client does not know about.
    Other(String),
}

impl NotificationKind {
    /// Parse from the wire tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "APPROVED" => NotificationKind::Approved,
            "REJECTED" => NotificationKind::Rejected,
            "LEAVE_APPROVAL_REQ" => NotificationKind::LeaveApprovalRequest,
            "REIMBURSE_APPROVAL_REQ" => NotificationKind::ReimburseApprovalRequest,
            "LOAN_APPROVAL_REQ" => NotificationKind::LoanApprovalRequest,
            "PAYROLL_PAID" => NotificationKind::PayrollPaid,
            other => NotificationKind::Other(other.to_owned()),
        }
    }

    /// Get the wire tag.
    pub fn tag(&self) -> &str {
        match self {
            NotificationKind::Approved => "APPROVED",
            NotificationKind::Rejected => "REJECTED",
            NotificationKind::LeaveApprovalRequest => "LEAVE_APPROVAL_REQ",
            NotificationKind::ReimburseApprovalRequest => "REIMBURSE_APPROVAL_REQ",
            NotificationKind::LoanApprovalRequest => "LOAN_APPROVAL_REQ",
            NotificationKind::PayrollPaid => "PAYROLL_PAID",
            NotificationKind::Other(tag) => tag.as_str(),
        }
    }

    /// Whether this notification asks the user to approve something.
    pub fn is_approval_request(&self) -> bool {
        self.tag().ends_with("_APPROVAL_REQ")
    }

    /// Alert severity used when presenting this kind.
    pub fn severity(&self) -> Severity {
        match self {
            NotificationKind::Approved => Severity::Success,
            NotificationKind::Rejected => Severity::Error,
            kind if kind.is_approval_request() => Severity::Info,
            _ => Severity::Neutral,
        }
    }
}

impl From<String> for NotificationKind {
    fn from(s: String) -> Self {
        NotificationKind::from_tag(&s)
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.tag().to_owned()
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Visual severity of a user-facing alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
    Neutral,
}

/// Notification as it appears on the wire, before normalization.
///
/// Pushed frames and the REST list share this shape. Pushes from the
/// backend leave `created_at` at its zero value and omit `is_read`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationPayload {
    pub id: Option<NotificationId>,
    pub user_id: Option<UserId>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub related_id: Option<u64>,
    pub is_read: Option<bool>,
    pub created_at: Option<String>,
}

impl NotificationPayload {
    /// Whether the payload carries a usable `type` discriminator.
    pub fn has_kind(&self) -> bool {
        self.kind.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Normalize into a [`Notification`], stamping `received_at` when the
    /// payload has no meaningful creation time.
    pub fn normalize(self, received_at: DateTime<Utc>) -> Result<Notification> {
        let kind = self
            .kind
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::missing("type"))?;
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::missing("id"))?;

        Ok(Notification {
            id,
            user_id: self.user_id.filter(|u| !u.is_empty()),
            kind: NotificationKind::from_tag(&kind),
            title: self.title.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            related_id: self.related_id.filter(|r| *r != 0),
            is_read: self.is_read.unwrap_or(false),
            created_at: self
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(received_at),
        })
    }
}

/// Parse an RFC 3339 timestamp, treating the zero time as absent.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(s).ok()?.with_timezone(&Utc);
    if ts.year() <= 1 {
        None
    } else {
        Some(ts)
    }
}
