//! Remote sentiment backend.
//!
//! All analysis, storage and alerting live in an external REST service.
//! This module defines the calls moodwatch makes against it
//! ([`SentimentBackend`]), their wire types, and the one error type every
//! call returns. [`http::HttpBackend`] is the real client; the poller only
//! sees the trait.

pub mod http;
pub mod types;

use thiserror::Error;

use crate::config::schema::{BackendConfig, TrendSource};
use crate::series::EmotionBucket;

pub use http::HttpBackend;
pub use types::{
    ChannelConfig, EmotionOverview, HealthStatus, ResetResponse, SaveConfigResponse,
    StartMonitoringResponse, StoredChannelConfig,
};

pub type Result<T> = std::result::Result<T, BackendError>;

/// Why a backend call failed.
///
/// Callers may log the variant but recover from all three the same way.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The backend answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// A 2xx response whose body is not what the endpoint promises.
    #[error("malformed response from {url}: {message}")]
    Malformed { url: String, message: String },
}

impl BackendError {
    /// Short machine-friendly name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// Which trend endpoint to read, with its query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendEndpoint {
    /// `GET /api/emotion-trends`
    Live,
    /// `GET /api/historical/trends?hours=N`
    Historical { hours: u32 },
}

impl TrendEndpoint {
    pub fn from_config(config: &BackendConfig) -> Self {
        match config.trend_source {
            TrendSource::Live => Self::Live,
            TrendSource::Historical => Self::Historical {
                hours: config.history_hours,
            },
        }
    }

    /// Request path including the query string.
    pub fn path(&self) -> String {
        match self {
            Self::Live => "/api/emotion-trends".to_string(),
            Self::Historical { hours } => format!("/api/historical/trends?hours={hours}"),
        }
    }
}

/// Calls the dashboard makes against the sentiment backend.
///
/// Implementations must be shareable with the poller's refresh thread.
pub trait SentimentBackend: Send + Sync {
    /// Read the raw per-bucket emotion counts.
    fn fetch_trends(&self, endpoint: TrendEndpoint) -> Result<Vec<EmotionBucket>>;

    /// Ask the backend to start monitoring the user's channels, resetting
    /// accumulated data first.
    fn start_live_monitoring(&self, user_id: &str) -> Result<StartMonitoringResponse>;

    /// Drop all accumulated emotion data for the user.
    fn reset_emotion_data(&self, user_id: &str) -> Result<ResetResponse>;

    /// Store mailbox and alert-channel credentials for the user.
    fn save_channel_config(
        &self,
        config: &ChannelConfig,
        user_id: &str,
    ) -> Result<SaveConfigResponse>;

    /// Read the stored channel configuration. `Ok(None)` when the user has
    /// none.
    fn channel_config(&self, user_id: &str) -> Result<Option<StoredChannelConfig>>;

    /// Per-emotion totals across all stored messages.
    fn emotion_overview(&self) -> Result<EmotionOverview>;

    /// Backend and database liveness.
    fn health(&self) -> Result<HealthStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_endpoint_paths() {
        assert_eq!(TrendEndpoint::Live.path(), "/api/emotion-trends");
        assert_eq!(
            TrendEndpoint::Historical { hours: 12 }.path(),
            "/api/historical/trends?hours=12"
        );
    }

    #[test]
    fn trend_endpoint_follows_config() {
        let mut config = BackendConfig::default();
        assert_eq!(TrendEndpoint::from_config(&config), TrendEndpoint::Live);

        config.trend_source = TrendSource::Historical;
        config.history_hours = 48;
        assert_eq!(
            TrendEndpoint::from_config(&config),
            TrendEndpoint::Historical { hours: 48 }
        );
    }

    #[test]
    fn error_kinds_and_messages() {
        let err = BackendError::Status {
            url: "http://h/api/emotion-trends".to_string(),
            status: 503,
        };
        assert_eq!(err.kind(), "status");
        assert_eq!(err.to_string(), "http://h/api/emotion-trends returned HTTP 503");

        let err = BackendError::Malformed {
            url: "u".to_string(),
            message: "missing field `trends`".to_string(),
        };
        assert_eq!(err.kind(), "malformed");
        assert!(err.to_string().contains("missing field"));
    }
}
