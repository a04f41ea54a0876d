use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::events::StreamEvent;

struct QueueInner {
    buf: VecDeque<StreamEvent>,
    closed: bool,
}

/// Ordered hand-off between the transport read task and the consumer.
///
/// Single logical producer, single consumer. A batch is enqueued in full
/// under the lock before the waiter is signalled, so a consumer woken by
/// the first event of a batch observes the rest already buffered. After
/// [`close`](Self::close), `pull` drains the remaining events and then
/// yields `None` instead of suspending.
pub struct DeliveryQueue {
    inner: Mutex<QueueInner>,
    notify: Notify,
}

impl DeliveryQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                buf: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Append an ordered batch and wake the consumer once.
    pub fn push_batch(&self, batch: Vec<StreamEvent>) {
        if batch.is_empty() {
            return;
        }
        {
            let mut inner = self.inner.lock().unwrap();
            inner.buf.extend(batch);
        }
        self.notify.notify_one();
    }

    /// Mark the stream finished. Already-buffered events remain deliverable.
    pub fn close(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.closed = true;
        }
        self.notify.notify_one();
    }

    /// Take the oldest buffered event, suspending while the queue is empty
    /// and unfinished. `None` signals end of stream.
    pub async fn pull(&self) -> Option<StreamEvent> {
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().unwrap();
                if let Some(event) = inner.buf.pop_front() {
                    return Some(event);
                }
                if inner.closed {
                    return None;
                }
            }
            notified.await;
        }
    }
}

impl Default for DeliveryQueue {
    fn default() -> Self {
        Self::new()
    }
}
