/// Configuration schema and defaults for moodwatch.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[general]`, `[backend]`, `[poller]`, `[logging]`, and `[dashboard]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level moodwatch configuration.
///
/// Maps directly to the `~/.moodwatch/config.toml` and `.moodwatch.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodwatchConfig {
    pub general: GeneralConfig,
    pub backend: BackendConfig,
    pub poller: PollerConfig,
    pub logging: LoggingConfig,
    pub dashboard: DashboardConfig,
}

// ---------------------------------------------------------------------------
// [general]
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Identity sent as `user_id` with every backend call that scopes data
    /// to a user.
    pub user_id: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            user_id: "default_user".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Which aggregation endpoint the poller reads trend buckets from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendSource {
    /// `GET /api/emotion-trends`: the live email-monitoring buckets.
    #[default]
    Live,
    /// `GET /api/historical/trends?hours=N`: chat and ticket history.
    Historical,
}

impl std::fmt::Display for TrendSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Historical => write!(f, "historical"),
        }
    }
}

/// Remote sentiment backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the sentiment backend. The host is configuration, the
    /// paths are fixed by the backend's API.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Trend endpoint: `live` or `historical`.
    pub trend_source: TrendSource,
    /// Look-back window for the historical trend endpoint.
    pub history_hours: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_ms: 10_000,
            trend_source: TrendSource::default(),
            history_hours: 12,
        }
    }
}

// ---------------------------------------------------------------------------
// [poller]
// ---------------------------------------------------------------------------

/// Live aggregate poller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Seconds between refreshes while live mode is on.
    pub interval_secs: u64,
    /// Number of most recent chart points kept for display.
    pub max_points: usize,
    /// Show the built-in sample series when the backend has never answered.
    pub seed_on_failure: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            max_points: 6,
            seed_on_failure: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether event logging is enabled.
    pub enabled: bool,
    /// Path to the log file. `~` is expanded to the home directory.
    pub path: String,
    /// Log level: `"debug"`, `"info"`, `"warn"`, `"error"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.moodwatch/moodwatch.log".to_string(),
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

/// Local web dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listen address for `moodwatch dashboard`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl MoodwatchConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `moodwatch config init`.
    pub fn default_toml() -> String {
        r#"# moodwatch Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (MOODWATCH_*)
#   2. Project config (.moodwatch.toml in current directory)
#   3. User global config (~/.moodwatch/config.toml)
#   4. Built-in defaults

[general]
user_id = "default_user"

[backend]
base_url = "http://localhost:5000"
timeout_ms = 10000
trend_source = "live"                 # live | historical
history_hours = 12                    # Only used by the historical source

[poller]
interval_secs = 10                    # Refresh period while live
max_points = 6                        # Most recent buckets kept for display
seed_on_failure = true                # Show sample data until the backend answers

[logging]
enabled = true
path = "~/.moodwatch/moodwatch.log"
level = "info"                        # debug | info | warn | error

[dashboard]
addr = "127.0.0.1:9747"
open_browser = true
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
