//! Handlers shared by the one-shot commands and `watch`.

pub mod notification;
pub mod user;
