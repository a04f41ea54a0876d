use serde::{Deserialize, Serialize};

// Protocol constants — must match the gateway's wire limits.
pub const DEFAULT_GATEWAY_URL: &str = "ws://127.0.0.1:18789/ws";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:18789";
pub const CONNECT_TIMEOUT_MS: u64 = 10_000; // give up if the socket doesn't open in 10s
pub const RESPONSE_TIMEOUT_MS: u64 = 120_000; // give up if no terminal frame in 2min
pub const MAX_PAYLOAD_BYTES: usize = 128 * 1024; // 128 KB hard cap per inbound frame

/// Connection settings for one gateway.
///
/// Built explicitly at the composition root; the library reads no files and
/// no environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// WebSocket endpoint for request streaming.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// HTTP base URL for the session-ensure endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer credential attached to both channels when set.
    pub token: Option<String>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            api_url: default_api_url(),
            token: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            response_timeout_ms: default_response_timeout_ms(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_connect_timeout_ms() -> u64 {
    CONNECT_TIMEOUT_MS
}
fn default_response_timeout_ms() -> u64 {
    RESPONSE_TIMEOUT_MS
}
fn default_max_payload_bytes() -> usize {
    MAX_PAYLOAD_BYTES
}
