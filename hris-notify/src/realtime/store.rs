//! Local notification cache.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::models::{Notification, NotificationId};

/// Ordered, de-duplicated notification cache, newest first.
///
/// The unread count is always computed from the entries.
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    entries: Vec<Notification>,
    /// IDs pushed since the last snapshot request began.
    pushed: HashSet<NotificationId>,
}

impl NotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, newest first.
    pub fn as_slice(&self) -> &[Notification] {
        &self.entries
    }

    /// Iterate entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Look up an entry by ID.
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    /// Check if an entry with this ID exists.
    pub fn contains(&self, id: NotificationId) -> bool {
        self.get(id).is_some()
    }

    /// Count of entries not yet read.
    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.is_read).count()
    }

    /// IDs of unread entries, newest first.
    pub fn unread_ids(&self) -> Vec<NotificationId> {
        self.entries
            .iter()
            .filter(|n| !n.is_read)
            .map(|n| n.id)
            .collect()
    }

    /// Prepend a notification. Returns `false` if its ID is already present.
    pub fn push(&mut self, noti: Notification) -> bool {
        if self.contains(noti.id) {
            return false;
        }
        self.pushed.insert(noti.id);
        self.entries.insert(0, noti);
        true
    }

    /// Flag an entry as read in place. Returns `true` if it was unread.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(noti) if !noti.is_read => {
                noti.is_read = true;
                true
            }
            _ => false,
        }
    }

    /// Note that a snapshot request is about to be sent.
    ///
    /// Pushes recorded after this call survive the next
    /// [`replace_with_snapshot`](Self::replace_with_snapshot) even when the
    /// snapshot does not list them yet.
    pub fn begin_snapshot(&mut self) {
        self.pushed.clear();
    }

    /// Adopt a server snapshot as the source of truth.
    ///
    /// Cached entries the snapshot lacks are dropped, except pushes received
    /// since [`begin_snapshot`](Self::begin_snapshot). The result is ordered
    /// newest first by `created_at`; ties keep their relative order.
    pub fn replace_with_snapshot(&mut self, snapshot: Vec<Notification>) {
        let mut seen = HashSet::with_capacity(snapshot.len());
        let snapshot: Vec<Notification> = snapshot
            .into_iter()
            .filter(|n| seen.insert(n.id))
            .collect();

        let pushed = &self.pushed;
        let mut merged: Vec<Notification> = self
            .entries
            .drain(..)
            .filter(|n| pushed.contains(&n.id) && !seen.contains(&n.id))
            .collect();
        merged.extend(snapshot);
        merged.sort_by_key(|n| Reverse(n.created_at));
        self.entries = merged;
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pushed.clear();
    }
}
