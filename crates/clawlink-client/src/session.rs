use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};

/// Outcome of a session-ensure call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredSession {
    pub id: String,
    /// True when the caller supplied an id the gateway no longer accepts
    /// and a fresh one was created instead.
    pub was_replaced: bool,
}

/// Validates a session identifier against the gateway before a request
/// opens its connection, creating a fresh one when needed. Idempotent.
#[async_trait]
pub trait SessionEnsurer: Send + Sync {
    async fn ensure(&self, id: Option<&str>) -> Result<EnsuredSession>;
}

/// HTTP implementation over the gateway's session endpoint.
pub struct HttpSessionClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct SessionCreated {
    id: String,
}

impl HttpSessionClient {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn create(&self) -> Result<String> {
        let url = format!("{}/v1/sessions", self.api_url);
        let resp = self.auth(self.http.post(&url)).send().await?;
        if !resp.status().is_success() {
            return Err(GatewayError::Session(format!(
                "create returned {} ({url})",
                resp.status()
            )));
        }
        let created: SessionCreated = resp.json().await?;
        debug!(session_id = %created.id, "created gateway session");
        Ok(created.id)
    }
}

#[async_trait]
impl SessionEnsurer for HttpSessionClient {
    async fn ensure(&self, id: Option<&str>) -> Result<EnsuredSession> {
        if let Some(id) = id {
            let url = format!("{}/v1/sessions/{}", self.api_url, id);
            let resp = self.auth(self.http.get(&url)).send().await?;
            let status = resp.status();
            if status.is_success() {
                debug!(session_id = %id, "session id still valid");
                return Ok(EnsuredSession {
                    id: id.to_string(),
                    was_replaced: false,
                });
            }
            if status != reqwest::StatusCode::NOT_FOUND
                && status != reqwest::StatusCode::GONE
            {
                return Err(GatewayError::Session(format!(
                    "validate returned {status} ({url})"
                )));
            }
            warn!(session_id = %id, "stale session id, creating a fresh one");
        }

        let fresh = self.create().await?;
        Ok(EnsuredSession {
            id: fresh,
            was_replaced: id.is_some(),
        })
    }
}
