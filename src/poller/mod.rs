//! Live aggregate poller.
//!
//! Keeps a local [`Series`] of emotion shares in sync with the backend's
//! trend endpoint. A fetch runs once at mount, once after every reset, and
//! every `interval` while live mode is on. Failures never escape: they are
//! logged, turned into an error string on the [`Snapshot`], and the last
//! good series stays on display (or the seed series if the backend has
//! never answered).
//!
//! # Ordering
//!
//! Fetches may overlap: a slow refresh can still be in flight when the next
//! tick fires. Every fetch takes a sequence number when it is issued, and a
//! completion is applied only if it is newer than everything applied so
//! far. Clearing the series (live start, reset) also moves that mark up to
//! the latest issued number, so a response requested before the clear can
//! never repaint old data over it.
//!
//! The mark only moves on success, so the rule is "newer than the last
//! applied fetch" (last write wins), not "latest issued". An older fetch
//! that succeeds after a newer one failed is still applied, and it clears
//! the error that the newer failure set.
//!
//! # Locking
//!
//! Series, error and session sit behind one mutex that is only held for
//! short state updates, never across a backend call. Observers are notified
//! after the lock is released.

pub mod session;
pub mod ticker;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::{SentimentBackend, TrendEndpoint};
use crate::config::MoodwatchConfig;
use crate::series::Series;

pub use session::{Activation, LiveSession, StartGuard};
pub use ticker::Ticker;

const START_FAILED: &str =
    "Failed to start live monitoring. Please check your email configuration.";
const RESET_FAILED: &str = "Failed to reset data. Please try again.";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Receives the poller's state after every visible change.
///
/// Called from whichever thread made the change, including the refresh
/// thread, so implementations must not call back into the poller.
pub trait SeriesObserver: Send + Sync {
    fn on_update(&self, snapshot: &Snapshot);
}

/// Point-in-time copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub series: Series,
    /// Message for the most recent failure; cleared by the next successful
    /// fetch.
    pub error: Option<String>,
    pub live: bool,
    pub monitoring_started: bool,
    /// When a fetch was last applied.
    pub updated_at: Option<DateTime<Utc>>,
}

/// What happened to one trend fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the series.
    Applied,
    /// A newer response, or a clear, got there first.
    Discarded,
    /// The fetch failed; the message is on the snapshot.
    Failed(String),
}

/// Result of [`LivePoller::reset_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    /// Whether the backend accepted the reset.
    pub remote_reset: bool,
    /// Outcome of the follow-up fetch.
    pub refresh: FetchOutcome,
}

/// Resolved poller settings.
#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub user_id: String,
    pub endpoint: TrendEndpoint,
    pub interval: Duration,
    pub max_points: usize,
    pub seed_on_failure: bool,
}

impl PollerSettings {
    pub fn from_config(config: &MoodwatchConfig) -> Self {
        Self {
            user_id: config.general.user_id.clone(),
            endpoint: TrendEndpoint::from_config(&config.backend),
            interval: Duration::from_secs(config.poller.interval_secs.max(1)),
            max_points: config.poller.max_points.max(1),
            seed_on_failure: config.poller.seed_on_failure,
        }
    }
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self::from_config(&MoodwatchConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct State {
    series: Series,
    error: Option<String>,
    session: LiveSession,
    ever_succeeded: bool,
    /// Sequence number of the most recently issued fetch.
    issued: u64,
    /// Completions at or below this number are stale.
    applied: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl State {
    fn new() -> Self {
        Self {
            series: Series::seed(),
            error: None,
            session: LiveSession::default(),
            ever_succeeded: false,
            issued: 0,
            applied: 0,
            updated_at: None,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            series: self.series.clone(),
            error: self.error.clone(),
            live: self.session.is_active(),
            monitoring_started: self.session.monitoring_started(),
            updated_at: self.updated_at,
        }
    }

    /// Empty the series and invalidate every fetch issued so far.
    fn clear_series(&mut self) {
        self.series = Series::empty();
        self.applied = self.issued;
    }
}

/// State reachable from both the owner and the refresh thread.
struct Shared {
    backend: Box<dyn SentimentBackend>,
    settings: PollerSettings,
    state: Mutex<State>,
    observers: Mutex<Vec<Arc<dyn SeriesObserver>>>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self) {
        let snapshot = self.state().snapshot();
        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &Snapshot) {
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.on_update(snapshot);
        }
    }

    fn fetch_trends(&self) -> FetchOutcome {
        let seq = {
            let mut state = self.state();
            state.issued += 1;
            state.issued
        };

        let result = self.backend.fetch_trends(self.settings.endpoint);

        let (outcome, snapshot) = {
            let mut state = self.state();
            if seq <= state.applied {
                debug!(seq, "fetch discarded: superseded");
                return FetchOutcome::Discarded;
            }

            let outcome = match result {
                Ok(buckets) => {
                    state.series = Series::from_buckets(&buckets, self.settings.max_points);
                    state.applied = seq;
                    state.error = None;
                    state.ever_succeeded = true;
                    state.updated_at = Some(Utc::now());
                    debug!(
                        seq,
                        buckets = buckets.len(),
                        points = state.series.len(),
                        "fetch applied"
                    );
                    FetchOutcome::Applied
                }
                Err(err) => {
                    warn!(seq, kind = err.kind(), "fetch failed: {err}");
                    if !state.ever_succeeded && self.settings.seed_on_failure {
                        state.series = Series::seed();
                    }
                    let message = format!("Failed to fetch emotion trends: {err}");
                    state.error = Some(message.clone());
                    FetchOutcome::Failed(message)
                }
            };
            (outcome, state.snapshot())
        };

        self.notify(&snapshot);
        outcome
    }

    fn start_monitoring(&self) {
        match self.backend.start_live_monitoring(&self.settings.user_id) {
            Ok(response) => {
                info!(
                    user_id = %self.settings.user_id,
                    data_reset = response.data_reset,
                    "live monitoring started"
                );
                let mut state = self.state();
                state.error = None;
                state.clear_series();
            }
            Err(err) => {
                warn!(kind = err.kind(), "start live monitoring failed: {err}");
                self.state().error = Some(START_FAILED.to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Owner of the live dashboard state.
///
/// Live-mode transitions take `&mut self`, so start, stop and reset never
/// interleave with each other. Dropping the poller stops the refresh loop.
pub struct LivePoller {
    shared: Arc<Shared>,
    ticker: Option<Ticker>,
}

impl LivePoller {
    /// Create a poller showing the seed series. No request is made until
    /// [`mount`](Self::mount).
    pub fn new(backend: Box<dyn SentimentBackend>, settings: PollerSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend,
                settings,
                state: Mutex::new(State::new()),
                observers: Mutex::new(Vec::new()),
            }),
            ticker: None,
        }
    }

    pub fn add_observer(&self, observer: Arc<dyn SeriesObserver>) {
        self.shared
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn settings(&self) -> &PollerSettings {
        &self.shared.settings
    }

    /// The backend this poller talks to, for one-off calls outside the
    /// polling cycle.
    pub fn backend(&self) -> &dyn SentimentBackend {
        self.shared.backend.as_ref()
    }

    /// Initial fetch. Observers see the seed series first, then the result.
    pub fn mount(&self) -> FetchOutcome {
        self.shared.publish();
        self.fetch_trends()
    }

    /// Fetch trend buckets once and apply them.
    pub fn fetch_trends(&self) -> FetchOutcome {
        self.shared.fetch_trends()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.state().snapshot()
    }

    pub fn is_live(&self) -> bool {
        self.shared.state().session.is_active()
    }

    /// Switch live mode on.
    ///
    /// On the inactive→active edge with the guard armed, asks the backend to
    /// start monitoring (with a data reset). The guard is consumed even if
    /// that call fails; a failure sets the error but live mode still starts.
    /// A successful start clears the series for a fresh chart. Then the
    /// refresh loop begins; its first fetch runs one interval later.
    pub fn start_live(&mut self) -> Activation {
        let activation = self.shared.state().session.activate();
        let Activation::Activated { fire_start } = activation else {
            return activation;
        };

        info!("live mode on");
        if fire_start {
            self.shared.start_monitoring();
        }

        let shared = Arc::clone(&self.shared);
        self.ticker = Some(Ticker::spawn(self.shared.settings.interval, move || {
            shared.fetch_trends();
        }));

        self.shared.publish();
        activation
    }

    /// Switch live mode off, stop the refresh loop and re-arm the start
    /// guard. Returns whether live mode was on.
    pub fn stop_live(&mut self) -> bool {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }

        let was_active = self.shared.state().session.deactivate();
        if was_active {
            info!("live mode off");
            self.shared.publish();
        }
        was_active
    }

    /// Stop live mode, clear the series, ask the backend to drop its data,
    /// then fetch whatever the backend holds now. The fetch runs whether or
    /// not the reset succeeded.
    pub fn reset_all(&mut self) -> ResetReport {
        self.stop_live();
        {
            let mut state = self.shared.state();
            state.error = None;
            state.clear_series();
        }
        self.shared.publish();

        let remote_reset = match self
            .shared
            .backend
            .reset_emotion_data(&self.shared.settings.user_id)
        {
            Ok(response) => {
                info!(
                    user_id = %self.shared.settings.user_id,
                    deleted_messages = ?response.deleted_messages,
                    "emotion data reset"
                );
                true
            }
            Err(err) => {
                warn!(kind = err.kind(), "reset failed: {err}");
                self.shared.state().error = Some(RESET_FAILED.to_string());
                self.shared.publish();
                false
            }
        };

        ResetReport {
            remote_reset,
            refresh: self.fetch_trends(),
        }
    }
}

impl Drop for LivePoller {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
            debug!("poller dropped while live; refresh loop stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let mut config = MoodwatchConfig::default();
        config.general.user_id = "user_42".to_string();
        config.poller.interval_secs = 30;
        config.poller.max_points = 12;

        let settings = PollerSettings::from_config(&config);
        assert_eq!(settings.user_id, "user_42");
        assert_eq!(settings.interval, Duration::from_secs(30));
        assert_eq!(settings.max_points, 12);
        assert_eq!(settings.endpoint, TrendEndpoint::Live);
    }

    #[test]
    fn settings_clamp_degenerate_values() {
        let mut config = MoodwatchConfig::default();
        config.poller.interval_secs = 0;
        config.poller.max_points = 0;

        let settings = PollerSettings::from_config(&config);
        assert_eq!(settings.interval, Duration::from_secs(1));
        assert_eq!(settings.max_points, 1);
    }

    #[test]
    fn clear_series_invalidates_issued_fetches() {
        let mut state = State::new();
        state.issued = 4;
        state.applied = 2;
        state.clear_series();
        assert!(state.series.is_empty());
        assert_eq!(state.applied, 4);
    }

    #[test]
    fn fresh_state_shows_seed() {
        let snapshot = State::new().snapshot();
        assert_eq!(snapshot.series, Series::seed());
        assert!(!snapshot.live);
        assert!(!snapshot.monitoring_started);
        assert!(snapshot.error.is_none());
        assert!(snapshot.updated_at.is_none());
    }
}
