//! Client bridge for OpenClaw-style agent gateways.
//!
//! One logical request (a flattened prompt, optionally with a
//! structured-output schema) is carried over a dedicated WebSocket
//! connection; the gateway answers with an interleaved sequence of text
//! fragments, tool activity, and a terminal frame. This crate reassembles
//! that into either a single aggregated result ([`GatewayClient::generate`])
//! or an ordered, lifecycle-correct event stream
//! ([`GatewayClient::stream`]).
//!
//! There is no process-wide default client: build a [`GatewayConfig`] and a
//! [`GatewayClient`] once at your composition root and pass it down.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod queue;
pub mod segment;
pub mod session;
pub mod stream;

mod transport;

pub use client::{GatewayClient, GenerateRequest, GenerateResponse};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result, StreamError, StreamErrorKind};
pub use events::{FinishReason, StreamEvent};
pub use session::{EnsuredSession, HttpSessionClient, SessionEnsurer};
pub use stream::EventStream;

pub use clawlink_protocol as protocol;
