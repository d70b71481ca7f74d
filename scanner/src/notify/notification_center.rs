use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::models::{Notification, NotificationId, NotificationKind};
use crate::config::DEFAULT_NOTIFICATION_TTL_MS;
use crate::ids::generate_id;

pub const MAX_NOTIFICATIONS: usize = 5;

#[derive(Default)]
struct Queue {
    live: Vec<Notification>,
    timers: HashMap<NotificationId, JoinHandle<()>>,
    closed: bool,
}

impl Queue {
    fn cancel_timer(&mut self, id: NotificationId) {
        if let Some(timer) = self.timers.remove(&id) {
            timer.abort();
        }
    }

    fn cancel_all(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Bounded, newest-first toast queue. Every entry is removed after the TTL
/// by its own timer task; timers only hold a weak handle to the queue.
#[derive(Clone)]
pub struct NotificationCenter {
    queue: Arc<Mutex<Queue>>,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_NOTIFICATION_TTL_MS))
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: Arc::new(Mutex::new(Queue::default())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        // A poisoned queue only ever holds plain data, keep using it.
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let notification = Notification::new(generate_id(), message, kind);
        let id = notification.id;

        let mut queue = self.lock();
        if queue.closed {
            log::debug!("Notification dropped after shutdown: {}", notification.message);
            return id;
        }

        log::debug!("Notification [{:?}] {}", kind, notification.message);
        queue.live.insert(0, notification);

        while queue.live.len() > MAX_NOTIFICATIONS {
            if let Some(evicted) = queue.live.pop() {
                queue.cancel_timer(evicted.id);
            }
        }

        match Handle::try_current() {
            Ok(runtime) => {
                let timer = runtime.spawn(expire_after(Arc::downgrade(&self.queue), id, self.ttl));
                queue.timers.insert(id, timer);
            }
            Err(_) => {
                log::warn!("No async runtime available, notification {} will not expire", id);
            }
        }

        id
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.push(message, NotificationKind::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.push(message, NotificationKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.push(message, NotificationKind::Error)
    }

    /// Removes an entry before its TTL and cancels its timer.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut queue = self.lock();
        queue.cancel_timer(id);
        let before = queue.live.len();
        queue.live.retain(|n| n.id != id);
        queue.live.len() != before
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().live.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().live.is_empty()
    }

    pub fn pending_timers(&self) -> usize {
        self.lock().timers.len()
    }

    /// Tears the queue down: pending timers are cancelled and later pushes
    /// are ignored.
    pub fn shutdown(&self) {
        let mut queue = self.lock();
        queue.closed = true;
        queue.cancel_all();
        queue.live.clear();
    }
}

async fn expire_after(queue: Weak<Mutex<Queue>>, id: NotificationId, ttl: Duration) {
    tokio::time::sleep(ttl).await;

    let Some(queue) = queue.upgrade() else {
        return;
    };
    let mut queue = queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    queue.timers.remove(&id);
    queue.live.retain(|n| n.id != id);
}
