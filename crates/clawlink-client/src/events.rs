use clawlink_protocol::Usage;

use crate::error::StreamError;

/// Events delivered to streaming consumers.
///
/// Lifecycle contract: every `SegmentAppend`/`SegmentClose` is preceded by a
/// `SegmentOpen` with the same id, each id covers exactly one contiguous run
/// of appends, and no id is reused after its close. A terminal event
/// (`Finished` or `Errored`) is always last.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A new free-text segment begins.
    SegmentOpen { id: String },

    /// Incremental text for the currently open segment.
    SegmentAppend { id: String, delta: String },

    /// The segment ends — on a tool boundary or at stream end.
    SegmentClose { id: String },

    /// The agent requested a tool invocation.
    ToolCallRequested {
        id: String,
        name: String,
        arguments_json: String,
    },

    /// A tool invocation finished. The id may not match the corresponding
    /// `ToolCallRequested` when the gateway omitted its correlation id
    /// (see [`crate::segment::SegmentTracker::handle`]).
    ToolCallCompleted {
        id: String,
        name: String,
        result_text: String,
    },

    /// Terminal: the request completed successfully.
    Finished { reason: FinishReason, usage: Usage },

    /// Terminal: the request failed mid-stream.
    Errored { error: StreamError },
}

impl StreamEvent {
    /// True for the two events that end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Finished { .. } | StreamEvent::Errored { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Stop => "stop",
        }
    }
}
