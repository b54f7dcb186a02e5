//! API modules.

mod notification;
mod user;

pub use notification::NotificationApi;
pub use user::UserApi;
