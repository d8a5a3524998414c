/// HTTP client for the sentiment backend.
///
/// Uses the synchronous `ureq` client with a per-request timeout so a hung
/// backend can never stall the refresh loop for longer than one timeout.
/// Every request and response body is JSON; any non-2xx status is a
/// failure regardless of its body.
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    ResetRequest, SaveConfigRequest, StartMonitoringRequest, TrendsResponse,
};
use super::{
    BackendError, ChannelConfig, EmotionOverview, HealthStatus, ResetResponse, Result,
    SaveConfigResponse, SentimentBackend, StartMonitoringResponse, StoredChannelConfig,
    TrendEndpoint,
};
use crate::config::schema::BackendConfig;
use crate::series::EmotionBucket;

/// Synchronous sentiment backend client.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    /// Build a client from the resolved config.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        // On Windows "localhost" may resolve to ::1 first while the backend
        // only listens on IPv4.
        format!("{}{}", self.base_url, path).replace("://localhost", "://127.0.0.1")
    }

    fn get(&self, path: &str) -> ureq::Request {
        ureq::get(&self.url(path)).timeout(self.timeout)
    }

    fn post(&self, path: &str) -> ureq::Request {
        ureq::post(&self.url(path))
            .timeout(self.timeout)
            .set("Content-Type", "application/json")
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.get(path);
        let url = request.url().to_string();
        let response = request.call().map_err(|e| classify(&url, e))?;
        parse_json(&url, response)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.post(path);
        let url = request.url().to_string();
        let response = request.send_json(body).map_err(|e| classify(&url, e))?;
        parse_json(&url, response)
    }
}

impl SentimentBackend for HttpBackend {
    fn fetch_trends(&self, endpoint: TrendEndpoint) -> Result<Vec<EmotionBucket>> {
        let parsed: TrendsResponse = self.get_json(&endpoint.path())?;
        Ok(parsed.trends)
    }

    fn start_live_monitoring(&self, user_id: &str) -> Result<StartMonitoringResponse> {
        self.post_json(
            "/api/start-live-monitoring",
            &StartMonitoringRequest {
                user_id,
                reset_data: true,
            },
        )
    }

    fn reset_emotion_data(&self, user_id: &str) -> Result<ResetResponse> {
        self.post_json("/api/reset-emotion-data", &ResetRequest { user_id })
    }

    fn save_channel_config(
        &self,
        config: &ChannelConfig,
        user_id: &str,
    ) -> Result<SaveConfigResponse> {
        self.post_json("/api/email-config", &SaveConfigRequest { config, user_id })
    }

    fn channel_config(&self, user_id: &str) -> Result<Option<StoredChannelConfig>> {
        let request = self.get("/api/email-config").query("user_id", user_id);
        let url = request.url().to_string();
        match request.call() {
            Ok(response) => parse_json(&url, response).map(Some),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(classify(&url, e)),
        }
    }

    fn emotion_overview(&self) -> Result<EmotionOverview> {
        self.get_json("/api/emotion-overview")
    }

    fn health(&self) -> Result<HealthStatus> {
        self.get_json("/health")
    }
}

/// Map a `ureq` error onto the backend's failure classes.
fn classify(url: &str, error: ureq::Error) -> BackendError {
    match error {
        ureq::Error::Status(status, _) => BackendError::Status {
            url: url.to_string(),
            status,
        },
        ureq::Error::Transport(transport) => BackendError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

fn parse_json<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T> {
    response
        .into_json::<T>()
        .map_err(|e| BackendError::Malformed {
            url: url.to_string(),
            message: e.to_string(),
        })
}
