use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use clawlink_protocol::classify;

use crate::error::{GatewayError, Result, StreamError};
use crate::queue::DeliveryQueue;
use crate::segment::SegmentTracker;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Open one fresh connection for one request.
///
/// Exactly one connect attempt, bounded by `connect_timeout`; no retries at
/// this layer. The bearer credential is attached when configured.
pub(crate) async fn open(
    url: &str,
    token: Option<&str>,
    connect_timeout: Duration,
) -> Result<WsStream> {
    let mut request = url.into_client_request().map_err(|e| GatewayError::Connect {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if let Some(token) = token {
        let value =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| GatewayError::Connect {
                url: url.to_string(),
                reason: format!("invalid bearer token: {e}"),
            })?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    match tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(request)).await {
        Ok(Ok((ws, _response))) => {
            info!(url = %url, "gateway connection open");
            Ok(ws)
        }
        Ok(Err(e)) => Err(GatewayError::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(GatewayError::ConnectTimeout {
            url: url.to_string(),
            ms: connect_timeout.as_millis() as u64,
        }),
    }
}

/// Per-request read loop — owns the connection until a terminal event.
///
/// Inbound messages arrive strictly in order on this one socket; each is
/// classified, folded through the tracker, and the resulting batch is
/// enqueued before the consumer is woken. The response deadline is armed
/// once, at entry (the request frame has already been sent).
pub(crate) async fn run_stream(
    mut ws: WsStream,
    mut tracker: SegmentTracker,
    queue: Arc<DeliveryQueue>,
    response_timeout: Duration,
    max_payload_bytes: usize,
) {
    let deadline = tokio::time::sleep(response_timeout);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > max_payload_bytes {
                            warn!(size = text.len(), max = max_payload_bytes, "dropping oversized gateway message");
                            continue;
                        }
                        match classify(&text) {
                            Ok(Some(event)) => {
                                debug!(len = text.len(), "gateway message");
                                queue.push_batch(tracker.handle(event));
                                if tracker.is_finished() {
                                    queue.close();
                                    break;
                                }
                            }
                            // Valid but inert (thinking, cancelled).
                            Ok(None) => {}
                            Err(e) => {
                                warn!(error = %e, "dropping malformed gateway message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        queue.push_batch(
                            tracker.fail(StreamError::transport("connection closed before completion")),
                        );
                        queue.close();
                        break;
                    }
                    Some(Ok(_)) => {} // ping/pong/binary — nothing to deliver
                    Some(Err(e)) => {
                        queue.push_batch(tracker.fail(StreamError::transport(e.to_string())));
                        queue.close();
                        break;
                    }
                }
            }

            _ = &mut deadline => {
                warn!(ms = response_timeout.as_millis() as u64, "response deadline expired");
                queue.push_batch(tracker.fail(StreamError::timeout(
                    response_timeout.as_millis() as u64,
                )));
                queue.close();
                break;
            }
        }
    }

    let _ = ws.close(None).await;
}

/// Send the single request frame for this connection.
pub(crate) async fn send_text(ws: &mut WsStream, text: String) -> Result<()> {
    ws.send(Message::Text(text)).await?;
    Ok(())
}
