use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use clawlink_protocol::{extract_json, flatten, ChatMessage, ClientFrame, Role, Usage};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result, StreamError, StreamErrorKind};
use crate::events::{FinishReason, StreamEvent};
use crate::ids::UuidIds;
use crate::queue::DeliveryQueue;
use crate::segment::SegmentTracker;
use crate::session::{HttpSessionClient, SessionEnsurer};
use crate::stream::EventStream;
use crate::transport;

/// One logical generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub messages: Vec<ChatMessage>,
    /// When set, a JSON-format instruction and the schema are appended to
    /// the prompt, and the aggregated result is post-processed with
    /// [`extract_json`].
    pub schema: Option<Value>,
    /// Session to continue; validated (and replaced if stale) before the
    /// connection opens.
    pub session_id: Option<String>,
}

impl GenerateRequest {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::text(Role::User, text)],
            schema: None,
            session_id: None,
        }
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            schema: None,
            session_id: None,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_session(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }
}

/// Aggregated result of [`GatewayClient::generate`].
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub text: String,
    pub finish_reason: FinishReason,
    pub usage: Usage,
    pub session_id: String,
}

/// Entry point for talking to one gateway.
///
/// Every call opens a fresh connection that lives exactly as long as the
/// request — no pooling, no shared state between requests.
pub struct GatewayClient {
    config: GatewayConfig,
    sessions: Box<dyn SessionEnsurer>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Self {
        let sessions = Box::new(HttpSessionClient::new(&config));
        Self { config, sessions }
    }

    /// Swap the session-ensure collaborator (tests, custom auth flows).
    pub fn with_session_ensurer(config: GatewayConfig, sessions: Box<dyn SessionEnsurer>) -> Self {
        Self { config, sessions }
    }

    /// Run one request and return the incremental event stream.
    pub async fn stream(&self, request: GenerateRequest) -> Result<EventStream> {
        let prompt = build_prompt(&request);
        let session = self.sessions.ensure(request.session_id.as_deref()).await?;
        info!(
            session_id = %session.id,
            replaced = session.was_replaced,
            prompt_len = prompt.len(),
            "opening gateway request"
        );

        let mut ws = transport::open(
            &self.config.gateway_url,
            self.config.token.as_deref(),
            Duration::from_millis(self.config.connect_timeout_ms),
        )
        .await?;

        let frame = ClientFrame::message(prompt, &session.id);
        transport::send_text(&mut ws, serde_json::to_string(&frame)?).await?;
        debug!(session_id = %session.id, "request frame sent");

        // Response deadline arms now that the request is on the wire.
        let queue = Arc::new(DeliveryQueue::new());
        let tracker = SegmentTracker::new(Box::new(UuidIds));
        let task = tokio::spawn(transport::run_stream(
            ws,
            tracker,
            Arc::clone(&queue),
            Duration::from_millis(self.config.response_timeout_ms),
            self.config.max_payload_bytes,
        ));

        Ok(EventStream::new(queue, task, session.id))
    }

    /// Run one request to completion and return the aggregated result.
    ///
    /// Tool activity is observed but not surfaced on this path; only the
    /// final text (optionally post-processed for structured output) comes
    /// back.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let wants_json = request.schema.is_some();
        let mut stream = self.stream(request).await?;
        let session_id = stream.session_id().to_string();

        let mut text = String::new();
        while let Some(event) = stream.next().await {
            match event {
                StreamEvent::SegmentAppend { delta, .. } => text.push_str(&delta),
                StreamEvent::Finished { reason, usage } => {
                    let text = if wants_json { extract_json(&text) } else { text };
                    return Ok(GenerateResponse {
                        text,
                        finish_reason: reason,
                        usage,
                        session_id,
                    });
                }
                StreamEvent::Errored { error } => {
                    return Err(self.terminal_error(error, &session_id));
                }
                _ => {}
            }
        }

        Err(GatewayError::Transport {
            url: self.config.gateway_url.clone(),
            session_id,
            message: "stream ended without a terminal event".to_string(),
        })
    }

    fn terminal_error(&self, error: StreamError, session_id: &str) -> GatewayError {
        match error.kind {
            StreamErrorKind::Timeout => GatewayError::ResponseTimeout {
                ms: self.config.response_timeout_ms,
                session_id: session_id.to_string(),
            },
            StreamErrorKind::Remote => GatewayError::Remote {
                session_id: session_id.to_string(),
                message: error.message,
            },
            StreamErrorKind::Transport => GatewayError::Transport {
                url: self.config.gateway_url.clone(),
                session_id: session_id.to_string(),
                message: error.message,
            },
        }
    }
}

fn build_prompt(request: &GenerateRequest) -> String {
    let mut prompt = flatten(&request.messages);
    if let Some(schema) = &request.schema {
        prompt.push_str("\n\nRespond with a single JSON value matching this schema:\n");
        prompt.push_str(&schema.to_string());
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_is_appended_to_the_prompt() {
        let request = GenerateRequest::from_text("list three birds")
            .with_schema(json!({"type": "array", "items": {"type": "string"}}));
        let prompt = build_prompt(&request);
        assert!(prompt.starts_with("list three birds"));
        assert!(prompt.contains("Respond with a single JSON value"));
        assert!(prompt.contains(r#""type":"array""#));
    }

    #[test]
    fn plain_request_has_no_schema_suffix() {
        let prompt = build_prompt(&GenerateRequest::from_text("hello"));
        assert_eq!(prompt, "hello");
    }
}
