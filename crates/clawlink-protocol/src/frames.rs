use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Client → Gateway request frame, sent once per request right after the
/// connection opens.
///
/// Wire: `{ "kind": "message", "content": "...", "session_id": "s-1", "ts": 1712345678901 }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFrame {
    pub kind: String,
    pub content: String,
    pub session_id: String,
    /// Epoch milliseconds at send time.
    pub ts: i64,
}

impl ClientFrame {
    /// Build the single `message` frame for one request.
    pub fn message(content: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            kind: "message".to_string(),
            content: content.into(),
            session_id: session_id.into(),
            ts: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Token counts reported by the gateway on `complete`. Zeros when the
/// gateway sends none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub tokens_in: u32,
    pub tokens_out: u32,
}

/// One inbound gateway message, decoded into its semantic meaning.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Incremental free-text content.
    Text { content: String },

    /// The agent wants a tool executed. `id` is absent when the gateway
    /// omits the correlation id.
    ToolInvocation {
        id: Option<String>,
        name: String,
        arguments: Value,
    },

    /// Result of a tool execution, rendered to plain text.
    ToolOutcome {
        id: Option<String>,
        name: String,
        result: String,
        is_error: bool,
    },

    /// Terminal: the agent finished successfully.
    Completed { usage: Usage },

    /// Terminal: the agent reported a failure.
    Failed { message: String },
}

/// A single undecodable inbound message. Logged and dropped by the caller —
/// never fatal to the request (the gateway may emit message kinds this
/// version does not know).
#[derive(Debug, Error)]
#[error("unrecognized gateway message: {0}")]
pub struct ParseError(pub String);

/// Raw wire shapes for the closed inbound tag set.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawFrame {
    Response {
        #[serde(default)]
        content: String,
    },
    ToolRequest {
        #[serde(default)]
        id: Option<String>,
        tool_name: String,
        #[serde(default)]
        arguments: Value,
    },
    ToolResponse {
        #[serde(default)]
        id: Option<String>,
        tool_name: String,
        #[serde(default)]
        result: Value,
        #[serde(default)]
        is_error: bool,
    },
    Complete {
        #[serde(default)]
        tokens_in: u32,
        #[serde(default)]
        tokens_out: u32,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    // Forward-compatibility placeholders: accepted, no observable effect.
    Thinking {
        #[serde(default)]
        content: String,
    },
    Cancelled,
}

/// Decode one inbound gateway message.
///
/// `Ok(None)` means the message was valid but carries no observable effect
/// (`thinking`, `cancelled`). A decode failure or unknown `kind` is a
/// non-fatal [`ParseError`].
pub fn classify(raw: &str) -> Result<Option<TransportEvent>, ParseError> {
    let frame: RawFrame =
        serde_json::from_str(raw).map_err(|e| ParseError(format!("{e} in {}", snippet(raw))))?;

    let event = match frame {
        RawFrame::Response { content } => TransportEvent::Text { content },
        RawFrame::ToolRequest {
            id,
            tool_name,
            arguments,
        } => TransportEvent::ToolInvocation {
            id,
            name: tool_name,
            arguments,
        },
        RawFrame::ToolResponse {
            id,
            tool_name,
            result,
            is_error,
        } => TransportEvent::ToolOutcome {
            id,
            name: tool_name,
            result: render_result(&result),
            is_error,
        },
        RawFrame::Complete {
            tokens_in,
            tokens_out,
        } => TransportEvent::Completed {
            usage: Usage {
                tokens_in,
                tokens_out,
            },
        },
        RawFrame::Error { message } => TransportEvent::Failed { message },
        RawFrame::Thinking { .. } | RawFrame::Cancelled => return Ok(None),
    };

    Ok(Some(event))
}

/// Render a `tool_response` result to text.
///
/// The gateway sends either a single value or an ordered list of
/// `{ "text": ... }` fragments; fragments are joined with newlines and
/// entries without text are skipped.
fn render_result(result: &Value) -> String {
    match result {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let fragments: Vec<&str> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(map) => map.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect();
            fragments.join("\n")
        }
        other => other.to_string(),
    }
}

/// Short prefix of a raw message for error context.
fn snippet(raw: &str) -> &str {
    let max = 120;
    if raw.len() <= max {
        raw
    } else {
        let mut end = max;
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        &raw[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_frame_becomes_text() {
        let ev = classify(r#"{"kind":"response","content":"Hello"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            ev,
            TransportEvent::Text {
                content: "Hello".to_string()
            }
        );
    }

    #[test]
    fn tool_request_keeps_optional_id() {
        let ev = classify(r#"{"kind":"tool_request","id":"t1","tool_name":"fetch","arguments":{"url":"x"}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            ev,
            TransportEvent::ToolInvocation {
                id: Some("t1".to_string()),
                name: "fetch".to_string(),
                arguments: json!({"url": "x"}),
            }
        );
    }

    #[test]
    fn tool_request_without_id_is_valid() {
        let ev = classify(r#"{"kind":"tool_request","tool_name":"fetch"}"#)
            .unwrap()
            .unwrap();
        match ev {
            TransportEvent::ToolInvocation { id, name, .. } => {
                assert_eq!(id, None);
                assert_eq!(name, "fetch");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn tool_response_joins_text_fragments_with_newlines() {
        let raw = r#"{"kind":"tool_response","tool_name":"fetch","result":[{"text":"line one"},{"other":1},{"text":"line two"}]}"#;
        let ev = classify(raw).unwrap().unwrap();
        match ev {
            TransportEvent::ToolOutcome { result, is_error, .. } => {
                assert_eq!(result, "line one\nline two");
                assert!(!is_error);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn tool_response_scalar_result() {
        let ev = classify(r#"{"kind":"tool_response","tool_name":"calc","result":"42","is_error":true}"#)
            .unwrap()
            .unwrap();
        match ev {
            TransportEvent::ToolOutcome { result, is_error, .. } => {
                assert_eq!(result, "42");
                assert!(is_error);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn complete_without_usage_defaults_to_zero() {
        let ev = classify(r#"{"kind":"complete"}"#).unwrap().unwrap();
        assert_eq!(
            ev,
            TransportEvent::Completed {
                usage: Usage::default()
            }
        );
    }

    #[test]
    fn complete_carries_token_counts() {
        let ev = classify(r#"{"kind":"complete","tokens_in":10,"tokens_out":25}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            ev,
            TransportEvent::Completed {
                usage: Usage {
                    tokens_in: 10,
                    tokens_out: 25
                }
            }
        );
    }

    #[test]
    fn error_frame_becomes_failed() {
        let ev = classify(r#"{"kind":"error","message":"boom"}"#).unwrap().unwrap();
        assert_eq!(
            ev,
            TransportEvent::Failed {
                message: "boom".to_string()
            }
        );
    }

    #[test]
    fn thinking_and_cancelled_are_accepted_but_inert() {
        assert!(classify(r#"{"kind":"thinking","content":"hmm"}"#).unwrap().is_none());
        assert!(classify(r#"{"kind":"cancelled"}"#).unwrap().is_none());
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let err = classify(r#"{"kind":"telemetry","data":1}"#).unwrap_err();
        assert!(err.to_string().contains("telemetry"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(classify("not json at all").is_err());
    }

    #[test]
    fn client_frame_wire_shape() {
        let frame = ClientFrame::message("hi there", "s-1");
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["kind"], "message");
        assert_eq!(value["content"], "hi there");
        assert_eq!(value["session_id"], "s-1");
        assert!(value["ts"].as_i64().unwrap() > 0);
    }
}
