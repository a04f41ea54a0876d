use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("connect timeout after {ms}ms ({url})")]
    ConnectTimeout { url: String, ms: u64 },

    #[error("connect failed ({url}): {reason}")]
    Connect { url: String, reason: String },

    #[error("no terminal event within {ms}ms (session {session_id})")]
    ResponseTimeout { ms: u64, session_id: String },

    #[error("gateway reported failure (session {session_id}): {message}")]
    Remote { session_id: String, message: String },

    #[error("transport failure ({url}, session {session_id}): {message}")]
    Transport {
        url: String,
        session_id: String,
        message: String,
    },

    #[error("session ensure failed: {0}")]
    Session(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),
}

impl GatewayError {
    /// Short error code string for logs and structured diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::ConnectTimeout { .. } => "CONNECT_TIMEOUT",
            GatewayError::Connect { .. } => "CONNECT_FAILED",
            GatewayError::ResponseTimeout { .. } => "RESPONSE_TIMEOUT",
            GatewayError::Remote { .. } => "REMOTE_ERROR",
            GatewayError::Transport { .. } => "TRANSPORT_ERROR",
            GatewayError::Session(_) => "SESSION_ERROR",
            GatewayError::Http(_) => "HTTP_ERROR",
            GatewayError::Serialization(_) => "SERIALIZATION_ERROR",
            GatewayError::Ws(_) => "WEBSOCKET_ERROR",
        }
    }

    /// Whether the caller may reasonably retry the whole request.
    /// Remote-reported failures are not automatically retryable.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::ConnectTimeout { .. }
                | GatewayError::Connect { .. }
                | GatewayError::ResponseTimeout { .. }
                | GatewayError::Transport { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Terminal failure carried inside a [`crate::StreamEvent::Errored`] event.
/// Cloneable so the streaming path can hand it to the consumer while the
/// aggregated path maps it back into a [`GatewayError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamError {
    pub kind: StreamErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamErrorKind {
    /// No terminal frame arrived within the response deadline.
    Timeout,
    /// The gateway sent an explicit `error` frame.
    Remote,
    /// The connection failed or closed before a terminal frame.
    Transport,
}

impl StreamError {
    pub fn timeout(ms: u64) -> Self {
        Self {
            kind: StreamErrorKind::Timeout,
            message: format!("no terminal event within {ms}ms"),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self {
            kind: StreamErrorKind::Remote,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: StreamErrorKind::Transport,
            message: message.into(),
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StreamErrorKind::Timeout => write!(f, "timeout: {}", self.message),
            StreamErrorKind::Remote => write!(f, "remote error: {}", self.message),
            StreamErrorKind::Transport => write!(f, "transport error: {}", self.message),
        }
    }
}
