//! Per-identity connection loop.

use std::sync::Arc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::endpoint::websocket_url;
use super::notifier::Shared;
use super::transport::{Connection, Connector};
use super::{ConnectionState, NotificationBackend, RealtimeConfig};
use crate::client::AuthInfo;

/// Everything one session task owns.
pub(crate) struct SessionTask {
    pub auth: AuthInfo,
    pub base_url: String,
    pub config: RealtimeConfig,
    pub connector: Arc<dyn Connector>,
    pub backend: Arc<dyn NotificationBackend>,
    pub shared: Arc<Shared>,
    pub cancel: CancellationToken,
}

enum PumpExit {
    /// Teardown was requested; the connection must be closed deliberately.
    Cancelled,
    /// The connection went away on its own.
    Closed,
}

impl SessionTask {
    /// Drive the connection until cancelled.
    ///
    /// This task holds at most one connection at a time and only dials when
    /// it holds none, so a session never has two live transports.
    pub async fn run(self) {
        let uid = self.auth.uid.map(|u| u.to_string()).unwrap_or_default();
        log::info!("[ws] session started uid={}", uid);

        let url = match websocket_url(&self.base_url, &self.auth.token) {
            Ok(url) => Some(url),
            Err(e) => {
                log::error!("[ws] cannot build endpoint from {}: {}", self.base_url, e);
                self.shared.set_state(ConnectionState::Disconnected);
                None
            }
        };

        // The initial list load does not hold up the first connect.
        tokio::join!(self.refresh(), async {
            match &url {
                Some(url) => self.connect_loop(url).await,
                None => self.cancel.cancelled().await,
            }
        });

        log::info!("[ws] session ended uid={}", uid);
    }

    async fn connect_loop(&self, url: &Url) {
        let target = redact(url);

        loop {
            self.shared.set_state(ConnectionState::Connecting);
            log::debug!("[ws] connecting to {}", target);

            let attempt = tokio::select! {
                _ = self.cancel.cancelled() => return,
                res = self.connector.connect(url) => res,
            };

            match attempt {
                Ok(mut conn) => {
                    self.shared.set_state(ConnectionState::Connected);
                    log::info!("[ws] connected to {}", target);

                    if let PumpExit::Cancelled = self.pump(conn.as_mut()).await {
                        conn.close().await;
                        return;
                    }
                }
                Err(e) => log::warn!("[ws] connect to {} failed: {}", target, e),
            }

            self.shared.set_state(ConnectionState::Disconnected);
            log::info!(
                "[ws] disconnected, reconnecting in {:?}",
                self.config.reconnect_interval
            );

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = time::sleep(self.config.reconnect_interval) => {
                    log::info!("[ws] attempting reconnect");
                }
            }
        }
    }

    async fn pump(&self, conn: &mut dyn Connection) -> PumpExit {
        let mut resync = self.config.resync_interval.map(|period| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return PumpExit::Cancelled,
                _ = next_tick(&mut resync) => self.refresh().await,
                frame = conn.recv() => match frame {
                    Some(Ok(text)) => {
                        self.shared.ingest(&text);
                    }
                    Some(Err(e)) => {
                        log::error!("[ws] transport error: {}", e);
                        conn.close().await;
                        return PumpExit::Closed;
                    }
                    None => {
                        log::info!("[ws] connection closed by server");
                        return PumpExit::Closed;
                    }
                },
            }
        }
    }

    /// Load the server's list into the store. Failures leave it untouched.
    async fn refresh(&self) {
        self.shared.begin_snapshot();
        let result = tokio::select! {
            _ = self.cancel.cancelled() => return,
            res = self.backend.fetch_notifications() => res,
        };

        match result {
            Ok(list) => {
                log::debug!("[ws] loaded {} notifications", list.len());
                self.shared.apply_snapshot(list);
            }
            Err(e) => log::warn!("failed to load notifications: {}", e),
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Endpoint without the credential, for logs.
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
