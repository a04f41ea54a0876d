use std::sync::Arc;

use futures_util::Stream;
use tokio::task::JoinHandle;

use crate::events::StreamEvent;
use crate::queue::DeliveryQueue;

/// Lazily consumed, single-pass event sequence for one request.
///
/// Events arrive in transport order and end with exactly one terminal event
/// (`Finished` or `Errored`). Dropping the handle aborts the transport read
/// task, which closes the connection; events already delivered stay valid.
pub struct EventStream {
    queue: Arc<DeliveryQueue>,
    task: JoinHandle<()>,
    session_id: String,
}

impl EventStream {
    pub(crate) fn new(queue: Arc<DeliveryQueue>, task: JoinHandle<()>, session_id: String) -> Self {
        Self {
            queue,
            task,
            session_id,
        }
    }

    /// The session identifier this request runs under.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Next event, or `None` at end of stream.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.queue.pull().await
    }

    /// Adapt to a `futures_util::Stream` for combinator-style consumption.
    pub fn into_stream(mut self) -> impl Stream<Item = StreamEvent> {
        async_stream::stream! {
            while let Some(event) = self.next().await {
                yield event;
            }
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}
