//! Request and response bodies for the sentiment backend's JSON API.
//!
//! Response types only name the fields moodwatch reads; everything else the
//! backend sends is ignored. Optional fields default so that older backend
//! builds still parse.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::series::EmotionBucket;

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

/// Body of both trend endpoints. `trends` is required; a 2xx without it is
/// a malformed response.
#[derive(Debug, Deserialize)]
pub(crate) struct TrendsResponse {
    pub trends: Vec<EmotionBucket>,
}

// ---------------------------------------------------------------------------
// Live monitoring / reset
// ---------------------------------------------------------------------------

/// Request body for `POST /api/start-live-monitoring`.
#[derive(Debug, Serialize)]
pub(crate) struct StartMonitoringRequest<'a> {
    pub user_id: &'a str,
    pub reset_data: bool,
}

/// Response from `POST /api/start-live-monitoring`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartMonitoringResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Whether the backend wiped accumulated data before starting.
    #[serde(default)]
    pub data_reset: bool,
}

/// Request body for `POST /api/reset-emotion-data`.
#[derive(Debug, Serialize)]
pub(crate) struct ResetRequest<'a> {
    pub user_id: &'a str,
}

/// Response from `POST /api/reset-emotion-data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub deleted_messages: Option<u64>,
    #[serde(default)]
    pub reset_timestamp: Option<String>,
}

// ---------------------------------------------------------------------------
// Channel configuration
// ---------------------------------------------------------------------------

/// Mailbox and alert-channel credentials the backend monitors with.
///
/// Serialized with the backend's camelCase field names. `Debug` masks the
/// app password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    pub email: String,
    pub app_password: String,
    pub telegram_user_id: String,
}

impl std::fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("email", &self.email)
            .field("app_password", &"********")
            .field("telegram_user_id", &self.telegram_user_id)
            .finish()
    }
}

/// Request body for `POST /api/email-config`.
#[derive(Debug, Serialize)]
pub(crate) struct SaveConfigRequest<'a> {
    #[serde(flatten)]
    pub config: &'a ChannelConfig,
    pub user_id: &'a str,
}

/// Response from `POST /api/email-config`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveConfigResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Set when the credentials changed and the backend started from zero.
    #[serde(default)]
    pub data_reset: bool,
}

/// Response from `GET /api/email-config`. The backend never returns the
/// app password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoredChannelConfig {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "telegramUserId")]
    pub telegram_user_id: Option<String>,
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub user_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Overview / health
// ---------------------------------------------------------------------------

/// One emotion's share of all stored messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewEntry {
    #[serde(default)]
    pub count: u64,
    /// Share of all messages, in whole percent.
    #[serde(default)]
    pub change_percent: i64,
    #[serde(default)]
    pub total_messages: u64,
    /// Pre-rendered `"count/total (pct%)"`.
    #[serde(default)]
    pub percentage_text: Option<String>,
}

/// Response from `GET /api/emotion-overview`, keyed by emotion name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionOverview(pub BTreeMap<String, OverviewEntry>);

impl EmotionOverview {
    /// The dashboard's four emotion cards, in display order. Emotions the
    /// backend omitted show as zero.
    pub fn cards(&self) -> Vec<(&'static str, OverviewEntry)> {
        ["anger", "joy", "confusion", "neutral"]
            .into_iter()
            .map(|name| (name, self.0.get(name).cloned().unwrap_or_default()))
            .collect()
    }
}

/// Response from `GET /health`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub message_count: Option<u64>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ChannelConfig {
        ChannelConfig {
            email: "support@example.com".to_string(),
            app_password: "abcd efgh".to_string(),
            telegram_user_id: "123456".to_string(),
        }
    }

    #[test]
    fn save_request_uses_backend_field_names() {
        let config = sample_config();
        let body = serde_json::to_value(SaveConfigRequest {
            config: &config,
            user_id: "user_1",
        })
        .unwrap();

        assert_eq!(body["email"], "support@example.com");
        assert_eq!(body["appPassword"], "abcd efgh");
        assert_eq!(body["telegramUserId"], "123456");
        assert_eq!(body["user_id"], "user_1");
    }

    #[test]
    fn debug_masks_password() {
        let rendered = format!("{:?}", sample_config());
        assert!(!rendered.contains("abcd efgh"));
        assert!(rendered.contains("support@example.com"));
    }

    #[test]
    fn trends_response_requires_trends() {
        assert!(serde_json::from_str::<TrendsResponse>(r#"{"time_range_hours": 6}"#).is_err());
        let parsed: TrendsResponse = serde_json::from_str(
            r#"{"trends": [{"time": "09:00", "joy": 1, "anger": 0, "confusion": 0, "neutral": 2}], "time_range_hours": 6}"#,
        )
        .unwrap();
        assert_eq!(parsed.trends.len(), 1);
    }

    #[test]
    fn start_monitoring_response_defaults() {
        let parsed: StartMonitoringResponse = serde_json::from_str("{}").unwrap();
        assert!(!parsed.data_reset);
        let parsed: StartMonitoringResponse =
            serde_json::from_str(r#"{"status": "live_monitoring_active", "data_reset": true}"#)
                .unwrap();
        assert!(parsed.data_reset);
        assert_eq!(parsed.status.as_deref(), Some("live_monitoring_active"));
    }

    #[test]
    fn overview_fills_missing_cards() {
        let parsed: EmotionOverview = serde_json::from_str(
            r#"{"anger": {"count": 3, "change_percent": 30, "total_messages": 10, "percentage_text": "3/10 (30%)"},
                "joy": {"count": 7, "change_percent": 70, "total_messages": 10}}"#,
        )
        .unwrap();

        let cards = parsed.cards();
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].0, "anger");
        assert_eq!(cards[0].1.count, 3);
        assert_eq!(cards[2].0, "confusion");
        assert_eq!(cards[2].1.count, 0);
    }

    #[test]
    fn stored_config_reads_camel_case_telegram_id() {
        let parsed: StoredChannelConfig = serde_json::from_str(
            r#"{"email": "a@b.c", "telegramUserId": "42", "configured": true, "user_id": null}"#,
        )
        .unwrap();
        assert_eq!(parsed.telegram_user_id.as_deref(), Some("42"));
        assert!(parsed.configured);
        assert_eq!(parsed.user_id, None);
    }
}
