use clawlink_protocol::TransportEvent;

use crate::error::StreamError;
use crate::events::{FinishReason, StreamEvent};
use crate::ids::IdSource;

/// Whether a free-text segment is currently open.
enum SegmentState {
    Idle,
    Open(String),
}

/// Tracks text-segment lifecycle across interleaved tool activity.
///
/// Pure step function: each transport event maps to an ordered batch of
/// caller-facing events, computed synchronously. Text before and after a
/// tool boundary never shares a segment id, and a terminal event always
/// closes any open segment first.
pub struct SegmentTracker {
    state: SegmentState,
    finished: bool,
    ids: Box<dyn IdSource>,
}

impl SegmentTracker {
    pub fn new(ids: Box<dyn IdSource>) -> Self {
        Self {
            state: SegmentState::Idle,
            finished: false,
            ids,
        }
    }

    /// True once a terminal batch has been produced. Later events are
    /// ignored.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance the state machine by one transport event and return the
    /// events to deliver, in order.
    ///
    /// Tool-call ids: a gateway-supplied id is reused verbatim; when absent
    /// a fresh one is generated at that occurrence only. A `tool_request`
    /// without an id followed by a `tool_response` with one (or vice versa)
    /// therefore yields mismatched requested/completed ids — there is no
    /// reliable correlation to recover, so none is invented.
    pub fn handle(&mut self, event: TransportEvent) -> Vec<StreamEvent> {
        if self.finished {
            return Vec::new();
        }

        let mut out = Vec::new();
        match event {
            TransportEvent::Text { content } => match &self.state {
                SegmentState::Idle => {
                    let id = self.ids.next_id();
                    out.push(StreamEvent::SegmentOpen { id: id.clone() });
                    out.push(StreamEvent::SegmentAppend {
                        id: id.clone(),
                        delta: content,
                    });
                    self.state = SegmentState::Open(id);
                }
                SegmentState::Open(id) => {
                    out.push(StreamEvent::SegmentAppend {
                        id: id.clone(),
                        delta: content,
                    });
                }
            },

            TransportEvent::ToolInvocation {
                id,
                name,
                arguments,
            } => {
                self.close_open_segment(&mut out);
                let call_id = id.unwrap_or_else(|| self.ids.next_id());
                out.push(StreamEvent::ToolCallRequested {
                    id: call_id,
                    name,
                    arguments_json: arguments.to_string(),
                });
            }

            // A tool outcome ends any ambiguity about segment continuity,
            // even without a preceding tool_request.
            TransportEvent::ToolOutcome {
                id, name, result, ..
            } => {
                self.close_open_segment(&mut out);
                let call_id = id.unwrap_or_else(|| self.ids.next_id());
                out.push(StreamEvent::ToolCallCompleted {
                    id: call_id,
                    name,
                    result_text: result,
                });
            }

            TransportEvent::Completed { usage } => {
                self.close_open_segment(&mut out);
                out.push(StreamEvent::Finished {
                    reason: FinishReason::Stop,
                    usage,
                });
                self.finished = true;
            }

            TransportEvent::Failed { message } => {
                self.close_open_segment(&mut out);
                out.push(StreamEvent::Errored {
                    error: StreamError::remote(message),
                });
                self.finished = true;
            }
        }
        out
    }

    /// Terminate the stream from outside the transport event flow (response
    /// deadline expiry, connection loss). Closes any open segment first.
    pub fn fail(&mut self, error: StreamError) -> Vec<StreamEvent> {
        if self.finished {
            return Vec::new();
        }
        let mut out = Vec::new();
        self.close_open_segment(&mut out);
        out.push(StreamEvent::Errored { error });
        self.finished = true;
        out
    }

    fn close_open_segment(&mut self, out: &mut Vec<StreamEvent>) {
        if let SegmentState::Open(id) = std::mem::replace(&mut self.state, SegmentState::Idle) {
            out.push(StreamEvent::SegmentClose { id });
        }
    }
}
