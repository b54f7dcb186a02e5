//! In-memory transport and backend for exercising the notifier.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Notify};
use url::Url;

use super::transport::{Connection, Connector};
use super::NotificationBackend;
use crate::error::{Error, Result};
use crate::models::{Notification, NotificationId, NotificationKind};

enum MockFrame {
    Text(String),
    Fail,
}

/// Server side of one accepted mock connection. Dropping it closes the
/// connection from the server's end.
pub struct MockServer {
    frames: mpsc::UnboundedSender<MockFrame>,
    closed_by_client: Arc<AtomicBool>,
    pub url: Url,
}

impl MockServer {
    /// Push a text frame to the client.
    pub fn send(&self, text: &str) {
        let _ = self.frames.send(MockFrame::Text(text.to_owned()));
    }

    /// Make the client's next read fail with a transport error.
    pub fn fail(&self) {
        let _ = self.frames.send(MockFrame::Fail);
    }

    /// Whether the client closed this connection deliberately.
    pub fn closed_by_client(&self) -> bool {
        self.closed_by_client.load(Ordering::SeqCst)
    }
}

/// Connector handing every accepted connection to the test.
#[derive(Debug)]
pub struct MockConnector {
    accepted: mpsc::UnboundedSender<MockServer>,
    attempts: AtomicUsize,
    refuse: AtomicUsize,
}

impl MockConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<MockServer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Self {
            accepted: tx,
            attempts: AtomicUsize::new(0),
            refuse: AtomicUsize::new(0),
        };
        (Arc::new(connector), rx)
    }

    /// Number of connect attempts so far, refused ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Refuse the next `n` attempts.
    pub fn refuse_next(&self, n: usize) {
        self.refuse.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Connection>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let refused = self
            .refuse
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(Error::Internal("connection refused".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let closed_by_client = Arc::new(AtomicBool::new(false));
        let _ = self.accepted.send(MockServer {
            frames: tx,
            closed_by_client: closed_by_client.clone(),
            url: url.clone(),
        });

        Ok(Box::new(MockConnection {
            frames: rx,
            closed_by_client,
        }))
    }
}

struct MockConnection {
    frames: mpsc::UnboundedReceiver<MockFrame>,
    closed_by_client: Arc<AtomicBool>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn recv(&mut self) -> Option<Result<String>> {
        match self.frames.recv().await? {
            MockFrame::Text(text) => Some(Ok(text)),
            MockFrame::Fail => Some(Err(Error::Internal("connection reset".into()))),
        }
    }

    async fn close(&mut self) {
        self.closed_by_client.store(true, Ordering::SeqCst);
        self.frames.close();
    }
}

/// Backend serving a fixed list and recording acknowledgements.
#[derive(Debug, Default)]
pub struct MockBackend {
    list: Mutex<Vec<Notification>>,
    marked: Mutex<Vec<NotificationId>>,
    fail_mark: AtomicBool,
    fetches: AtomicUsize,
    stall: AtomicBool,
    release: Notify,
}

impl MockBackend {
    pub fn with_list(list: Vec<Notification>) -> Arc<Self> {
        let backend = Self::default();
        backend.set_list(list);
        Arc::new(backend)
    }

    pub fn set_list(&self, list: Vec<Notification>) {
        *self.list.lock().unwrap() = list;
    }

    pub fn set_fail_mark(&self, fail: bool) {
        self.fail_mark.store(fail, Ordering::SeqCst);
    }

    /// Hold every fetch until [`release`](Self::release) is called.
    pub fn stall_fetches(&self) {
        self.stall.store(true, Ordering::SeqCst);
    }

    /// Let one stalled fetch complete.
    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn marked(&self) -> Vec<NotificationId> {
        self.marked.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationBackend for MockBackend {
    async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.stall.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        Ok(self.list.lock().unwrap().clone())
    }

    async fn mark_read(&self, id: NotificationId) -> Result<()> {
        if self.fail_mark.load(Ordering::SeqCst) {
            return Err(Error::api(500, "Failed to mark as read"));
        }
        self.marked.lock().unwrap().push(id);
        Ok(())
    }
}

/// A stored notification with the given ID and tag.
pub fn notification(id: u64, tag: &str, is_read: bool) -> Notification {
    Notification {
        id: NotificationId::new(id),
        user_id: None,
        kind: NotificationKind::from_tag(tag),
        title: format!("notification {}", id),
        message: String::new(),
        related_id: None,
        is_read,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}
