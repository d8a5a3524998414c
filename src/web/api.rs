//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content. Control endpoints answer
//! with the poller snapshot after the action so the page can redraw without
//! a second request.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use crate::poller::{Activation, FetchOutcome, LivePoller, Snapshot};

use super::{content_type_json, error_response};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Response for control endpoints.
#[derive(Serialize)]
struct ActionResponse {
    /// What the action did, e.g. `"started"`, `"applied"`, `"failed"`.
    result: &'static str,
    snapshot: Snapshot,
}

/// Response for `POST /api/reset`.
#[derive(Serialize)]
struct ResetResponse {
    remote_reset: bool,
    refresh: &'static str,
    snapshot: Snapshot,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

fn outcome_label(outcome: &FetchOutcome) -> &'static str {
    match outcome {
        FetchOutcome::Applied => "applied",
        FetchOutcome::Discarded => "discarded",
        FetchOutcome::Failed(_) => "failed",
    }
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/snapshot`: current series, error and live state.
pub fn get_snapshot(poller: &LivePoller) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&poller.snapshot())
}

/// `POST /api/live/start`: switch live mode on.
pub fn post_live_start(poller: &mut LivePoller) -> Result<Response<Cursor<Vec<u8>>>> {
    let result = match poller.start_live() {
        Activation::AlreadyActive => "already_live",
        Activation::Activated { .. } => "started",
    };
    json_response(&ActionResponse {
        result,
        snapshot: poller.snapshot(),
    })
}

/// `POST /api/live/stop`: switch live mode off.
pub fn post_live_stop(poller: &mut LivePoller) -> Result<Response<Cursor<Vec<u8>>>> {
    let result = if poller.stop_live() {
        "stopped"
    } else {
        "not_live"
    };
    json_response(&ActionResponse {
        result,
        snapshot: poller.snapshot(),
    })
}

/// `POST /api/reset`: stop live mode, wipe backend data, refetch.
pub fn post_reset(poller: &mut LivePoller) -> Result<Response<Cursor<Vec<u8>>>> {
    let report = poller.reset_all();
    json_response(&ResetResponse {
        remote_reset: report.remote_reset,
        refresh: outcome_label(&report.refresh),
        snapshot: poller.snapshot(),
    })
}

/// `POST /api/refresh`: fetch trends once now.
pub fn post_refresh(poller: &LivePoller) -> Result<Response<Cursor<Vec<u8>>>> {
    let outcome = poller.fetch_trends();
    json_response(&ActionResponse {
        result: outcome_label(&outcome),
        snapshot: poller.snapshot(),
    })
}

/// `GET /api/overview`: per-emotion totals from the backend.
///
/// A backend failure is reported as `502` rather than an internal error.
pub fn get_overview(poller: &LivePoller) -> Result<Response<Cursor<Vec<u8>>>> {
    match poller.backend().emotion_overview() {
        Ok(overview) => json_response(&overview),
        Err(e) => Ok(error_response(502, &e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Series;

    #[test]
    fn outcome_labels() {
        assert_eq!(outcome_label(&FetchOutcome::Applied), "applied");
        assert_eq!(outcome_label(&FetchOutcome::Discarded), "discarded");
        assert_eq!(
            outcome_label(&FetchOutcome::Failed("x".to_string())),
            "failed"
        );
    }

    #[test]
    fn action_response_serializes() {
        let resp = ActionResponse {
            result: "started",
            snapshot: Snapshot {
                series: Series::seed(),
                error: None,
                live: true,
                monitoring_started: true,
                updated_at: None,
            },
        };
        let json: serde_json::Value = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["result"], "started");
        assert_eq!(json["snapshot"]["live"], true);
        assert_eq!(json["snapshot"]["series"][0]["time"], "09:00");
        assert!(json["snapshot"]["error"].is_null());
    }
}
