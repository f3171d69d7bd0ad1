//! Blocking JSON client for the guardian daemon control API
//!
//! Every failure (transport, non-2xx status, malformed JSON) surfaces as
//! `GuardianError::Client`.

use crate::config::DaemonConfig;
use crate::error::{GuardianError, GuardianResult};
use serde_json::{json, Value};
use tracing::debug;
use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder};

/// Session id used when none is given
pub const DEFAULT_SESSION_ID: &str = "default";

/// Client for the daemon's `/v1` HTTP API
pub struct GuardianClient {
    config: DaemonConfig,
    agent: Agent,
}

impl GuardianClient {
    pub fn new(config: DaemonConfig) -> Self {
        let agent_config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global((!config.timeout.is_zero()).then_some(config.timeout))
            .build();

        Self {
            config,
            agent: Agent::new_with_config(agent_config),
        }
    }

    /// Client configured from `GUARDIAN_DAEMON_*` environment variables
    pub fn from_env() -> Self {
        Self::new(DaemonConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn health(&self) -> GuardianResult<Value> {
        self.get("/health")
    }

    pub fn metrics(&self) -> GuardianResult<Value> {
        self.get("/metrics")
    }

    pub fn list_sessions(&self) -> GuardianResult<Value> {
        self.get("/sessions")
    }

    pub fn get_session(&self, session_id: &str) -> GuardianResult<Value> {
        self.get(&format!("/sessions/{}", session_id))
    }

    pub fn get_session_telemetry(&self, session_id: &str) -> GuardianResult<Value> {
        self.get(&format!("/sessions/{}/telemetry", session_id))
    }

    /// Start a session; `None` sends an empty JSON object
    pub fn start_session(&self, payload: Option<Value>) -> GuardianResult<Value> {
        let payload = payload.unwrap_or_else(|| json!({}));
        self.post("/sessions", Some(&payload))
    }

    pub fn stop_session(&self, session_id: &str) -> GuardianResult<Value> {
        self.post(&format!("/sessions/{}/stop", session_id), None)
    }

    /// Send a control action such as `"stop"`
    pub fn control(&self, action: &str) -> GuardianResult<Value> {
        self.post("/control", Some(&json!({ "action": action })))
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authorize<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match &self.config.api_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    fn get(&self, path: &str) -> GuardianResult<Value> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .authorize(self.agent.get(url.as_str()))
            .call()
            .map_err(|e| request_failed(&url, e))?;
        decode(response)
    }

    fn post(&self, path: &str, payload: Option<&Value>) -> GuardianResult<Value> {
        let url = self.url(path);
        debug!("POST {}", url);

        let request = self.authorize(self.agent.post(url.as_str()));
        let response = match payload {
            Some(body) => request.send_json(body),
            None => request.send_empty(),
        }
        .map_err(|e| request_failed(&url, e))?;
        decode(response)
    }
}

fn request_failed(url: &str, err: ureq::Error) -> GuardianError {
    GuardianError::Client(format!("daemon request failed: {}: {}", url, err))
}

fn decode(mut response: Response<Body>) -> GuardianResult<Value> {
    let status = response.status();
    let raw = response
        .body_mut()
        .read_to_string()
        .map_err(|e| GuardianError::Client(format!("daemon request failed: {}", e)))?;

    if !status.is_success() {
        return Err(GuardianError::Client(format!(
            "daemon request failed: {} {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            raw
        )));
    }

    if raw.trim().is_empty() {
        return Ok(json!({}));
    }

    serde_json::from_str(&raw)
        .map_err(|e| GuardianError::Client(format!("invalid JSON response from daemon: {}", e)))
}
