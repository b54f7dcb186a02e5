//! Real-time notification delivery over a push connection.

mod alert;
mod backend;
mod endpoint;
mod frame;
mod notifier;
mod session;
mod state;
mod store;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use alert::Alert;
pub use backend::NotificationBackend;
pub use endpoint::{websocket_url, WS_PATH};
pub use frame::parse_frame;
pub use notifier::{
    Notifier, NotifierBuilder, RealtimeConfig, DEFAULT_ALERT_CAPACITY, DEFAULT_RECONNECT_INTERVAL,
};
pub use state::ConnectionState;
pub use store::NotificationStore;
pub use transport::{Connection, Connector, WsConnector};
