//! Data models for HRIS entities.

mod ids;
mod notification;
mod user;

pub use ids::{NotificationId, UserId};
pub use notification::{Notification, NotificationKind, NotificationPayload, Severity};
pub use user::UserProfile;
