//! Real-time notification client.

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::alert::Alert;
use super::frame::parse_frame;
use super::session::SessionTask;
use super::store::NotificationStore;
use super::transport::{Connector, WsConnector};
use super::{ConnectionState, NotificationBackend};
use crate::client::{AuthInfo, Session};
use crate::error::Result;
use crate::models::{Notification, NotificationId};

/// Delay before reconnecting after the connection drops.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(3000);

/// Default number of alerts buffered per subscriber.
pub const DEFAULT_ALERT_CAPACITY: usize = 64;

/// Tuning for the real-time client.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Fixed delay between a close and the next connect attempt.
    pub reconnect_interval: Duration,
    /// Re-fetch the full list on this period while connected.
    pub resync_interval: Option<Duration>,
    /// Alerts buffered per subscriber before the oldest are dropped.
    pub alert_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            resync_interval: None,
            alert_capacity: DEFAULT_ALERT_CAPACITY,
        }
    }
}

/// State shared between the notifier handle and its background tasks.
#[derive(Debug)]
pub(crate) struct Shared {
    store: RwLock<NotificationStore>,
    state: watch::Sender<ConnectionState>,
    alerts: broadcast::Sender<Alert>,
}

impl Shared {
    fn new(alert_capacity: usize) -> Self {
        let (state, _) = watch::channel(ConnectionState::Idle);
        let (alerts, _) = broadcast::channel(alert_capacity.max(1));
        Self {
            store: RwLock::new(NotificationStore::new()),
            state,
            alerts,
        }
    }

    fn read_store(&self) -> RwLockReadGuard<'_, NotificationStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, NotificationStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_state(&self, next: ConnectionState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
    }

    /// Emit an alert. Nobody listening is fine.
    fn alert(&self, alert: Alert) {
        let _ = self.alerts.send(alert);
    }

    /// Merge a pushed text frame into the store. Returns how many entries
    /// were added.
    pub fn ingest(&self, text: &str) -> usize {
        let mut added = 0;

        for noti in parse_frame(text, Utc::now()) {
            let alert = Alert::for_notification(&noti);
            let id = noti.id;

            if self.write_store().push(noti) {
                added += 1;
                self.alert(alert);
            } else {
                log::debug!("[ws] ignoring duplicate notification id={}", id);
            }
        }

        added
    }

    /// Mark the start of a list fetch. Pushes from here on outlive it.
    pub fn begin_snapshot(&self) {
        self.write_store().begin_snapshot();
    }

    pub fn apply_snapshot(&self, list: Vec<Notification>) {
        self.write_store().replace_with_snapshot(list);
    }

    fn reset(&self) {
        self.write_store().clear();
        self.set_state(ConnectionState::Idle);
    }
}

/// Builder for [`Notifier`].
#[derive(Debug)]
pub struct NotifierBuilder {
    session: Session,
    base_url: String,
    backend: Arc<dyn NotificationBackend>,
    connector: Arc<dyn Connector>,
    config: RealtimeConfig,
}

impl NotifierBuilder {
    /// Create a builder following `session`, connecting to the origin of
    /// `base_url`, and using `backend` for the list and mark-as-read.
    pub fn new(
        session: Session,
        base_url: impl Into<String>,
        backend: Arc<dyn NotificationBackend>,
    ) -> Self {
        Self {
            session,
            base_url: base_url.into(),
            backend,
            connector: Arc::new(WsConnector),
            config: RealtimeConfig::default(),
        }
    }

    /// Replace the push transport.
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Set the reconnect delay.
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.config.reconnect_interval = interval;
        self
    }

    /// Periodically re-fetch the full list while connected.
    pub fn resync_interval(mut self, interval: Option<Duration>) -> Self {
        self.config.resync_interval = interval;
        self
    }

    /// Set the alert buffer size.
    pub fn alert_capacity(mut self, capacity: usize) -> Self {
        self.config.alert_capacity = capacity;
        self
    }

    /// Apply a whole configuration.
    pub fn config(mut self, config: RealtimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the notifier. It stays idle until [`Notifier::start`].
    pub fn build(self) -> Notifier {
        let shared = Arc::new(Shared::new(self.config.alert_capacity));
        Notifier {
            inner: Arc::new(NotifierInner {
                session: self.session,
                base_url: self.base_url,
                backend: self.backend,
                connector: self.connector,
                config: self.config,
                shared,
                supervisor: Mutex::new(None),
            }),
        }
    }
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct NotifierInner {
    session: Session,
    base_url: String,
    backend: Arc<dyn NotificationBackend>,
    connector: Arc<dyn Connector>,
    config: RealtimeConfig,
    shared: Arc<Shared>,
    supervisor: Mutex<Option<Running>>,
}

impl NotifierInner {
    fn supervisor(&self) -> MutexGuard<'_, Option<Running>> {
        self.supervisor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for NotifierInner {
    fn drop(&mut self) {
        if let Some(running) = self.supervisor().take() {
            running.cancel.cancel();
        }
    }
}

/// Keeps one push connection per signed-in identity and a local,
/// newest-first cache of notifications.
///
/// The notifier follows its [`Session`]: it connects once a user ID is
/// known, reconnects after a fixed delay whenever the connection drops, and
/// tears everything down on logout.
///
/// Cloning yields another handle to the same notifier.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("state", &self.state())
            .field("notifications", &self.inner.shared.read_store().len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl Notifier {
    /// Begin following the session. Calling it again while running is a
    /// no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut supervisor = self.inner.supervisor();
        if supervisor.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return;
        }

        let cancel = CancellationToken::new();
        let task = Supervisor {
            session: self.inner.session.subscribe(),
            base_url: self.inner.base_url.clone(),
            backend: self.inner.backend.clone(),
            connector: self.inner.connector.clone(),
            config: self.inner.config.clone(),
            shared: self.inner.shared.clone(),
        };
        let handle = tokio::spawn(task.run(cancel.clone()));
        *supervisor = Some(Running { cancel, handle });
    }

    /// Close the connection, cancel any pending reconnect and clear the
    /// store. Safe to call when already stopped.
    pub async fn stop(&self) {
        let running = self.inner.supervisor().take();
        if let Some(running) = running {
            running.cancel.cancel();
            if let Err(e) = running.handle.await {
                log::error!("[ws] supervisor task failed: {}", e);
            }
        }
        self.inner.shared.reset();
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.shared.state.borrow()
    }

    /// Whether the push connection is open.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Follow connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.shared.state.subscribe()
    }

    /// Receive alerts for new notifications and failed requests.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.inner.shared.alerts.subscribe()
    }

    /// Snapshot of cached notifications, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.shared.read_store().as_slice().to_vec()
    }

    /// Number of cached notifications not yet read.
    pub fn unread_count(&self) -> usize {
        self.inner.shared.read_store().unread_count()
    }

    /// Re-fetch the full list from the backend.
    pub async fn refresh(&self) -> Result<()> {
        self.inner.shared.begin_snapshot();
        let list = self.inner.backend.fetch_notifications().await?;
        self.inner.shared.apply_snapshot(list);
        Ok(())
    }

    /// Mark one notification as read.
    ///
    /// The cache changes only after the backend acknowledges. Returns
    /// whether a cached entry flipped from unread to read; an ID that is not
    /// cached is acknowledged but changes nothing. On failure an error alert
    /// is emitted and the cache is left as it was.
    pub async fn mark_as_read(&self, id: NotificationId) -> Result<bool> {
        match self.inner.backend.mark_read(id).await {
            Ok(()) => Ok(self.inner.shared.write_store().mark_read(id)),
            Err(e) => {
                log::warn!("failed to mark notification {} as read: {}", id, e);
                self.inner.shared.alert(Alert::mark_read_failed(id, &e));
                Err(e)
            }
        }
    }

    /// Mark every cached unread notification as read, one request each.
    ///
    /// Stops at the first failure; entries acknowledged before it stay read.
    pub async fn mark_all_as_read(&self) -> Result<usize> {
        let ids = self.inner.shared.read_store().unread_ids();
        let mut marked = 0;

        for id in ids {
            if self.mark_as_read(id).await? {
                marked += 1;
            }
        }

        Ok(marked)
    }
}

/// Follows the session and owns the per-identity session task.
struct Supervisor {
    session: watch::Receiver<Option<AuthInfo>>,
    base_url: String,
    backend: Arc<dyn NotificationBackend>,
    connector: Arc<dyn Connector>,
    config: RealtimeConfig,
    shared: Arc<Shared>,
}

struct Active {
    auth: AuthInfo,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Active {
    async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            log::error!("[ws] session task failed: {}", e);
        }
    }
}

impl Supervisor {
    async fn run(mut self, cancel: CancellationToken) {
        let mut active: Option<Active> = None;

        loop {
            let wanted = self
                .session
                .borrow_and_update()
                .clone()
                .filter(|auth| auth.is_valid() && auth.uid.is_some());

            let unchanged = match (&active, &wanted) {
                (Some(a), Some(w)) => a.auth == *w,
                (None, None) => true,
                _ => false,
            };

            if !unchanged {
                if let Some(previous) = active.take() {
                    log::info!("[ws] identity changed, tearing down session");
                    previous.shutdown().await;
                    self.shared.reset();
                }
                if let Some(auth) = wanted {
                    active = Some(self.spawn_session(auth));
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = self.session.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        if let Some(active) = active.take() {
            active.shutdown().await;
        }
        self.shared.reset();
    }

    fn spawn_session(&self, auth: AuthInfo) -> Active {
        let cancel = CancellationToken::new();
        let task = SessionTask {
            auth: auth.clone(),
            base_url: self.base_url.clone(),
            config: self.config.clone(),
            connector: self.connector.clone(),
            backend: self.backend.clone(),
            shared: self.shared.clone(),
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(task.run());
        Active {
            auth,
            cancel,
            handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{NotificationKind, Severity};
    use crate::realtime::testing::{notification, MockBackend, MockConnector};
    use pretty_assertions::assert_eq;
    use tokio::time::{sleep, timeout, Instant};

    const BASE_URL: &str = "http://localhost:8081/api/v1";

    fn build(
        session: &Session,
        connector: Arc<MockConnector>,
        backend: Arc<MockBackend>,
    ) -> Notifier {
        NotifierBuilder::new(session.clone(), BASE_URL, backend)
            .connector(connector)
            .build()
    }

    fn sign_in(session: &Session, uid: u64) {
        session.login(AuthInfo::new("\"tok\"").with_uid(uid));
    }

    async fn wait_for(notifier: &Notifier, want: ConnectionState) {
        let mut rx = notifier.subscribe_state();
        timeout(Duration::from_secs(600), rx.wait_for(|s| *s == want))
            .await
            .expect("timed out waiting for state")
            .expect("state channel closed");
    }

    fn ids(notifier: &Notifier) -> Vec<u64> {
        notifier.notifications().iter().map(|n| n.id.get()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_then_mark_read() {
        let (connector, mut accepted) = MockConnector::new();
        let backend = Arc::new(MockBackend::default());
        let session = Session::new();
        let notifier = build(&session, connector, backend.clone());
        let mut alerts = notifier.subscribe_alerts();

        notifier.start();
        assert_eq!(notifier.state(), ConnectionState::Idle);

        sign_in(&session, 1);
        let server = accepted.recv().await.unwrap();
        assert_eq!(server.url.as_str(), "ws://localhost:8081/api/v1/ws?token=tok");
        wait_for(&notifier, ConnectionState::Connected).await;
        assert!(notifier.is_connected());

        server.send(
            r#"{"type":"APPROVED","id":1,"title":"Leave Approved","message":"Your leave was approved"}"#,
        );
        let alert = alerts.recv().await.unwrap();
        assert_eq!(alert.severity, Severity::Success);
        assert_eq!(alert.title, "Leave Approved");
        assert_eq!(alert.message, "Your leave was approved");
        assert_eq!(notifier.notifications().len(), 1);
        assert_eq!(notifier.unread_count(), 1);

        assert!(notifier.mark_as_read(NotificationId::new(1)).await.unwrap());
        assert!(notifier.notifications()[0].is_read);
        assert_eq!(notifier.unread_count(), 0);
        assert_eq!(backend.marked(), vec![NotificationId::new(1)]);

        notifier.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_pushes_are_newest_first_and_typeless_frames_ignored() {
        let (connector, mut accepted) = MockConnector::new();
        let session = Session::new();
        let notifier = build(&session, connector, Arc::new(MockBackend::default()));
        let mut alerts = notifier.subscribe_alerts();
        notifier.start();
        sign_in(&session, 1);

        let server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;

        for id in 1..=5 {
            server.send(&format!(r#"{{"id":{},"type":"LEAVE_APPROVAL_REQ"}}"#, id));
        }
        server.send(r#"{"id":9,"title":"no discriminator"}"#);
        server.send("garbage");
        server.send(r#"{"id":6,"type":"REJECTED"}"#);

        let mut received = Vec::new();
        while received.len() < 6 {
            received.push(alerts.recv().await.unwrap());
        }
        assert_eq!(received[0].severity, Severity::Info);
        assert_eq!(received[5].severity, Severity::Error);
        assert_eq!(received[5].notification_id, Some(NotificationId::new(6)));
        assert!(alerts.try_recv().is_err());

        assert_eq!(ids(&notifier), vec![6, 5, 4, 3, 2, 1]);
        assert_eq!(notifier.unread_count(), 6);
        assert!(notifier.is_connected());

        notifier.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_and_unknown_pushes() {
        let (connector, mut accepted) = MockConnector::new();
        let session = Session::new();
        let notifier = build(&session, connector, Arc::new(MockBackend::default()));
        let mut alerts = notifier.subscribe_alerts();
        notifier.start();
        sign_in(&session, 1);

        let server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;

        server.send(r#"{"id":1,"type":"APPROVED"}"#);
        server.send(r#"{"id":1,"type":"APPROVED"}"#);
        server.send(r#"{"id":2,"type":"OVERTIME_ADJUSTED"}"#);

        let first = alerts.recv().await.unwrap();
        let second = alerts.recv().await.unwrap();
        assert_eq!(first.notification_id, Some(NotificationId::new(1)));
        assert_eq!(first.title, "Notification");
        assert_eq!(second.severity, Severity::Neutral);

        let list = notifier.notifications();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].kind, NotificationKind::Other("OVERTIME_ADJUSTED".into()));

        notifier.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnects_after_fixed_interval() {
        let (connector, mut accepted) = MockConnector::new();
        let session = Session::new();
        let notifier = build(&session, connector.clone(), Arc::new(MockBackend::default()));
        notifier.start();
        sign_in(&session, 1);

        let server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;

        let closed_at = Instant::now();
        drop(server);
        wait_for(&notifier, ConnectionState::Disconnected).await;
        assert!(!notifier.is_connected());

        let _server = accepted.recv().await.unwrap();
        assert!(closed_at.elapsed() >= DEFAULT_RECONNECT_INTERVAL);
        wait_for(&notifier, ConnectionState::Connected).await;
        assert_eq!(connector.attempts(), 2);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(connector.attempts(), 2);
        assert!(accepted.try_recv().is_err());
        assert!(notifier.is_connected());

        notifier.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_timer_fires_cancels_reconnect() {
        let (connector, mut accepted) = MockConnector::new();
        let session = Session::new();
        let notifier = build(&session, connector.clone(), Arc::new(MockBackend::default()));
        notifier.start();
        sign_in(&session, 1);

        let server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;
        drop(server);
        wait_for(&notifier, ConnectionState::Disconnected).await;

        notifier.stop().await;
        assert_eq!(notifier.state(), ConnectionState::Idle);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(connector.attempts(), 1);

        // idempotent
        notifier.stop().await;
        assert_eq!(notifier.state(), ConnectionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_forces_close_and_reconnect() {
        let (connector, mut accepted) = MockConnector::new();
        let session = Session::new();
        let notifier = build(&session, connector.clone(), Arc::new(MockBackend::default()));
        notifier.start();
        sign_in(&session, 1);

        let server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;

        server.fail();
        wait_for(&notifier, ConnectionState::Disconnected).await;
        assert!(server.closed_by_client());

        let _server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;
        assert_eq!(connector.attempts(), 2);

        notifier.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_connects_keep_retrying() {
        let (connector, mut accepted) = MockConnector::new();
        connector.refuse_next(3);
        let session = Session::new();
        let notifier = build(&session, connector.clone(), Arc::new(MockBackend::default()));
        notifier.start();

        let started = Instant::now();
        sign_in(&session, 1);
        let _server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;

        assert_eq!(connector.attempts(), 4);
        assert!(started.elapsed() >= DEFAULT_RECONNECT_INTERVAL * 3);

        notifier.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_identity_and_tears_down_on_logout() {
        let (connector, mut accepted) = MockConnector::new();
        let session = Session::new();
        let notifier = build(&session, connector.clone(), Arc::new(MockBackend::default()));
        notifier.start();

        // token without a resolved identity is not enough
        session.login(AuthInfo::new("tok"));
        sleep(Duration::from_secs(10)).await;
        assert_eq!(connector.attempts(), 0);
        assert_eq!(notifier.state(), ConnectionState::Idle);

        session.set_user(1u64);
        let server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;
        server.send(r#"{"id":1,"type":"APPROVED"}"#);
        while notifier.unread_count() == 0 {
            tokio::task::yield_now().await;
        }

        session.logout();
        wait_for(&notifier, ConnectionState::Idle).await;
        assert!(server.closed_by_client());
        assert!(notifier.notifications().is_empty());

        sleep(Duration::from_secs(10)).await;
        assert_eq!(connector.attempts(), 1);

        notifier.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_identity_change_replaces_connection() {
        let (connector, mut accepted) = MockConnector::new();
        let session = Session::new();
        let notifier = build(&session, connector.clone(), Arc::new(MockBackend::default()));
        notifier.start();
        notifier.start();

        sign_in(&session, 1);
        let first = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;
        assert_eq!(connector.attempts(), 1);

        session.login(AuthInfo::new("other").with_uid(2u64));
        let second = accepted.recv().await.unwrap();
        assert!(first.closed_by_client());
        assert!(second.url.as_str().ends_with("token=other"));
        wait_for(&notifier, ConnectionState::Connected).await;
        assert_eq!(connector.attempts(), 2);

        notifier.stop().await;
        assert!(second.closed_by_client());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_then_merge_pushes() {
        let (connector, mut accepted) = MockConnector::new();
        let backend = MockBackend::with_list(vec![
            notification(3, "REJECTED", true),
            notification(2, "APPROVED", false),
        ]);
        let session = Session::new();
        let notifier = build(&session, connector, backend.clone());
        let mut alerts = notifier.subscribe_alerts();
        notifier.start();
        sign_in(&session, 1);

        let server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;
        assert_eq!(backend.fetches(), 1);
        assert_eq!(ids(&notifier), vec![3, 2]);
        assert_eq!(notifier.unread_count(), 1);

        server.send(r#"{"id":2,"type":"APPROVED"}"#);
        server.send(r#"{"id":4,"type":"PAYROLL_PAID"}"#);
        let alert = alerts.recv().await.unwrap();
        assert_eq!(alert.notification_id, Some(NotificationId::new(4)));
        assert_eq!(ids(&notifier), vec![4, 3, 2]);
        assert_eq!(notifier.unread_count(), 2);

        notifier.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_initial_load_does_not_delay_connect() {
        let (connector, mut accepted) = MockConnector::new();
        let backend = MockBackend::with_list(vec![notification(1, "APPROVED", true)]);
        backend.stall_fetches();
        let session = Session::new();
        let notifier = build(&session, connector, backend.clone());
        let mut alerts = notifier.subscribe_alerts();
        notifier.start();
        sign_in(&session, 1);

        let server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;
        assert_eq!(backend.fetches(), 1);
        assert!(notifier.notifications().is_empty());

        // arrives while the list request is still pending
        server.send(r#"{"id":2,"type":"PAYROLL_PAID"}"#);
        alerts.recv().await.unwrap();

        backend.release();
        while notifier.notifications().len() < 2 {
            tokio::task::yield_now().await;
        }
        assert_eq!(ids(&notifier), vec![2, 1]);
        assert_eq!(notifier.unread_count(), 1);

        notifier.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_resync() {
        let (connector, mut accepted) = MockConnector::new();
        let backend = MockBackend::with_list(vec![notification(1, "APPROVED", false)]);
        let session = Session::new();
        let notifier = NotifierBuilder::new(session.clone(), BASE_URL, backend.clone())
            .connector(connector)
            .resync_interval(Some(Duration::from_secs(60)))
            .build();
        notifier.start();
        sign_in(&session, 1);

        let _server = accepted.recv().await.unwrap();
        wait_for(&notifier, ConnectionState::Connected).await;
        assert_eq!(ids(&notifier), vec![1]);

        backend.set_list(vec![
            notification(2, "APPROVED", false),
            notification(1, "APPROVED", true),
        ]);
        sleep(Duration::from_secs(61)).await;

        assert_eq!(backend.fetches(), 2);
        assert_eq!(ids(&notifier), vec![2, 1]);
        assert_eq!(notifier.unread_count(), 1);

        notifier.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_base_url_never_connects() {
        let (connector, _accepted) = MockConnector::new();
        let session = Session::new();
        let notifier = NotifierBuilder::new(
            session.clone(),
            "localhost:8081",
            Arc::new(MockBackend::default()),
        )
        .connector(connector.clone())
        .build();
        notifier.start();
        sign_in(&session, 1);

        wait_for(&notifier, ConnectionState::Disconnected).await;
        sleep(Duration::from_secs(30)).await;
        assert_eq!(connector.attempts(), 0);
        assert_eq!(notifier.state(), ConnectionState::Disconnected);

        notifier.stop().await;
        assert_eq!(notifier.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_mark_unknown_id_is_noop() {
        let backend = Arc::new(MockBackend::default());
        let (connector, _accepted) = MockConnector::new();
        let notifier = build(&Session::new(), connector, backend.clone());
        notifier
            .inner
            .shared
            .ingest(r#"{"id":1,"type":"APPROVED","title":"a"}"#);
        let before = notifier.notifications();

        assert!(!notifier.mark_as_read(NotificationId::new(42)).await.unwrap());
        assert_eq!(notifier.notifications(), before);
        assert_eq!(notifier.unread_count(), 1);
        assert_eq!(backend.marked(), vec![NotificationId::new(42)]);
    }

    #[tokio::test]
    async fn test_mark_read_failure_leaves_store_and_alerts() {
        let backend = Arc::new(MockBackend::default());
        backend.set_fail_mark(true);
        let (connector, _accepted) = MockConnector::new();
        let notifier = build(&Session::new(), connector, backend.clone());
        let mut alerts = notifier.subscribe_alerts();
        notifier
            .inner
            .shared
            .ingest(r#"{"id":1,"type":"APPROVED","title":"a"}"#);
        let _ = alerts.recv().await.unwrap();

        let err = notifier.mark_as_read(NotificationId::new(1)).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, .. }));
        assert_eq!(notifier.unread_count(), 1);
        assert!(!notifier.notifications()[0].is_read);

        let alert = alerts.recv().await.unwrap();
        assert_eq!(alert.severity, Severity::Error);
        assert_eq!(alert.notification_id, Some(NotificationId::new(1)));
    }

    #[tokio::test]
    async fn test_mark_all_as_read() {
        let backend = Arc::new(MockBackend::default());
        let (connector, _accepted) = MockConnector::new();
        let notifier = build(&Session::new(), connector, backend.clone());
        notifier.inner.shared.ingest(concat!(
            r#"{"id":1,"type":"APPROVED"}"#,
            "\n",
            r#"{"id":2,"type":"REJECTED","is_read":true}"#,
            "\n",
            r#"{"id":3,"type":"LOAN_APPROVAL_REQ"}"#
        ));
        assert_eq!(notifier.unread_count(), 2);

        assert_eq!(notifier.mark_all_as_read().await.unwrap(), 2);
        assert_eq!(notifier.unread_count(), 0);
        assert_eq!(ids(&notifier), vec![3, 2, 1]);
        assert_eq!(
            backend.marked(),
            vec![NotificationId::new(3), NotificationId::new(1)]
        );
    }

    #[tokio::test]
    async fn test_refresh_applies_snapshot() {
        let backend = MockBackend::with_list(vec![notification(5, "APPROVED", false)]);
        let (connector, _accepted) = MockConnector::new();
        let notifier = build(&Session::new(), connector, backend);

        notifier.refresh().await.unwrap();
        assert_eq!(ids(&notifier), vec![5]);
        assert_eq!(notifier.unread_count(), 1);
    }
}
