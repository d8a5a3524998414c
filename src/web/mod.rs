//! Local web dashboard for moodwatch.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page sentiment chart with live/pause/reset controls
//! - JSON endpoints backed by one shared [`LivePoller`]
//!
//! Launched via `moodwatch dashboard` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{error, info};

use crate::poller::LivePoller;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address.
///
/// Blocks the current thread. Requests are handled one at a time, which is
/// also what serializes live-mode transitions on the poller. The poller is
/// mounted before the first request and dropped (stopping any refresh loop)
/// when the server exits.
pub fn serve(addr: &str, mut poller: LivePoller, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    poller.mount();

    println!("moodwatch dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");
    info!("dashboard listening on {addr}");

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Bodies are not used by any route, but drain them so keep-alive
        // connections stay in sync.
        if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut sink = String::new();
            let _ = request.as_reader().read_to_string(&mut sink);
        }

        let response = match dispatch(&mut poller, &method, &url) {
            Ok(resp) => resp,
            Err(e) => {
                error!("{method} {url} failed: {e:#}");
                error_response(500, &e.to_string())
            }
        };
        let _ = request.respond(response);

        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    poller: &mut LivePoller,
    method: &Method,
    url: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // API: chart state and controls
        (&Method::Get, "/api/snapshot") => api::get_snapshot(poller),
        (&Method::Post, "/api/live/start") => api::post_live_start(poller),
        (&Method::Post, "/api/live/stop") => api::post_live_stop(poller),
        (&Method::Post, "/api/reset") => api::post_reset(poller),
        (&Method::Post, "/api/refresh") => api::post_refresh(poller),

        // API: backend passthrough
        (&Method::Get, "/api/overview") => api::get_overview(poller),

        _ => Ok(error_response(404, "not found")),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// JSON `{"error": ...}` response with the given status.
pub(crate) fn error_response(status: u16, message: &str) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8")
        .expect("static header is valid")
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").expect("static header is valid")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        BackendError, ChannelConfig, EmotionOverview, HealthStatus, ResetResponse,
        SaveConfigResponse, SentimentBackend, StartMonitoringResponse, StoredChannelConfig,
        TrendEndpoint,
    };
    use crate::poller::PollerSettings;
    use crate::series::EmotionBucket;

    /// Backend whose trend endpoint always answers with one bucket and whose
    /// other calls always fail.
    struct OneBucket;

    fn down() -> BackendError {
        BackendError::Transport {
            url: "http://stub".to_string(),
            message: "connection refused".to_string(),
        }
    }

    impl SentimentBackend for OneBucket {
        fn fetch_trends(&self, _: TrendEndpoint) -> crate::backend::Result<Vec<EmotionBucket>> {
            Ok(vec![EmotionBucket {
                time: "09:00".to_string(),
                joy: 65,
                anger: 20,
                confusion: 0,
                neutral: 15,
            }])
        }
        fn start_live_monitoring(&self, _: &str) -> crate::backend::Result<StartMonitoringResponse> {
            Err(down())
        }
        fn reset_emotion_data(&self, _: &str) -> crate::backend::Result<ResetResponse> {
            Err(down())
        }
        fn save_channel_config(
            &self,
            _: &ChannelConfig,
            _: &str,
        ) -> crate::backend::Result<SaveConfigResponse> {
            Err(down())
        }
        fn channel_config(&self, _: &str) -> crate::backend::Result<Option<StoredChannelConfig>> {
            Ok(None)
        }
        fn emotion_overview(&self) -> crate::backend::Result<EmotionOverview> {
            Err(down())
        }
        fn health(&self) -> crate::backend::Result<HealthStatus> {
            Err(down())
        }
    }

    fn poller() -> LivePoller {
        LivePoller::new(Box::new(OneBucket), PollerSettings::default())
    }

    #[test]
    fn unknown_route_is_404() {
        let mut poller = poller();
        let resp = dispatch(&mut poller, &Method::Get, "/api/nope").unwrap();
        assert_eq!(resp.status_code(), StatusCode(404));
    }

    #[test]
    fn frontend_is_served_at_root() {
        let mut poller = poller();
        let resp = dispatch(&mut poller, &Method::Get, "/").unwrap();
        assert_eq!(resp.status_code(), StatusCode(200));
    }

    #[test]
    fn refresh_then_snapshot() {
        let mut poller = poller();
        let resp = dispatch(&mut poller, &Method::Post, "/api/refresh").unwrap();
        assert_eq!(resp.status_code(), StatusCode(200));
        let resp = dispatch(&mut poller, &Method::Get, "/api/snapshot?t=1").unwrap();
        assert_eq!(resp.status_code(), StatusCode(200));
        assert_eq!(poller.snapshot().series.len(), 1);
    }

    #[test]
    fn overview_failure_is_bad_gateway() {
        let mut poller = poller();
        let resp = dispatch(&mut poller, &Method::Get, "/api/overview").unwrap();
        assert_eq!(resp.status_code(), StatusCode(502));
    }

    #[test]
    fn start_and_stop_toggle_live_mode() {
        let mut poller = poller();
        dispatch(&mut poller, &Method::Post, "/api/live/start").unwrap();
        assert!(poller.is_live());
        dispatch(&mut poller, &Method::Post, "/api/live/stop").unwrap();
        assert!(!poller.is_live());
    }
}
