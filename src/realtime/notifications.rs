use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

use crate::api::events::{IncomingEvent, PushEvent};

const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub event: PushEvent,
    pub headline: String,
    pub received_at: DateTime<Utc>,
    pub read: bool,
}

/// What subscribers (the navbar badge, open screens) are told.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelUpdate {
    Connected,
    Disconnected,
    Notification(Notification),
    Cleared,
}

struct Inner {
    items: VecDeque<Notification>,
    connected: bool,
    next_id: u64,
    capacity: usize,
}

/// Connection flag plus the received notifications, newest first.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Inner>>,
    updates: broadcast::Sender<ChannelUpdate>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl NotificationCenter {
    pub fn new(capacity: usize) -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                items: VecDeque::new(),
                connected: false,
                next_id: 1,
                capacity: capacity.max(1),
            })),
            updates,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn broadcast(&self, update: ChannelUpdate) {
        // no subscribers is fine
        let _ = self.updates.send(update);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelUpdate> {
        self.updates.subscribe()
    }

    pub fn connected(&self) -> bool {
        self.lock().connected
    }

    /// Broadcasts only when the flag actually changes.
    pub fn set_connected(&self, connected: bool) {
        {
            let mut inner = self.lock();
            if inner.connected == connected {
                return;
            }
            inner.connected = connected;
        }
        self.broadcast(if connected {
            ChannelUpdate::Connected
        } else {
            ChannelUpdate::Disconnected
        });
    }

    pub fn push(&self, event: &IncomingEvent) -> Notification {
        let notification = {
            let mut inner = self.lock();
            let notification = Notification {
                id: inner.next_id,
                event: event.classify(),
                headline: event.headline(),
                received_at: Utc::now(),
                read: false,
            };
            inner.next_id += 1;
            inner.items.push_front(notification.clone());
            let capacity = inner.capacity;
            inner.items.truncate(capacity);
            notification
        };
        log::debug!("Notification: {}", notification.headline);
        self.broadcast(ChannelUpdate::Notification(notification.clone()));
        notification
    }

    /// Handles one text frame. Frames that are not events are dropped.
    pub fn receive(&self, text: &str) -> Option<Notification> {
        match IncomingEvent::parse(text) {
            Ok(event) => Some(self.push(&event)),
            Err(e) => {
                log::debug!("Ignoring push frame: {e}");
                None
            }
        }
    }

    pub fn items(&self) -> Vec<Notification> {
        self.lock().items.iter().cloned().collect()
    }

    pub fn unread(&self) -> usize {
        self.lock().items.iter().filter(|n| !n.read).count()
    }

    pub fn mark_all_read(&self) {
        for item in self.lock().items.iter_mut() {
            item.read = true;
        }
    }

    /// Drops everything received, e.g. when the user changes.
    pub fn clear(&self) {
        self.lock().items.clear();
        self.broadcast(ChannelUpdate::Cleared);
    }
}
