//! Rust client library for HRIS real-time notifications.

pub mod api;
pub mod client;
pub mod error;
pub mod models;
pub mod realtime;

// Re-export main types
pub use client::{AuthInfo, HrisClient, HrisClientBuilder, HttpConfig, Session, DEFAULT_BASE_URL};
pub use error::{Error, Result};

// Re-export commonly used models
pub use models::{
    Notification, NotificationId, NotificationKind, NotificationPayload, Severity, UserId,
    UserProfile,
};

// Re-export API types
pub use api::{NotificationApi, UserApi};

// Re-export real-time types
pub use realtime::{
    Alert, ConnectionState, NotificationBackend, NotificationStore, Notifier, NotifierBuilder,
    RealtimeConfig,
};
