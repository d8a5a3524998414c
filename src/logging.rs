//! Diagnostic log file (`~/.moodwatch/moodwatch.log` by default).
//!
//! Library code logs through the `tracing` macros. [`init`] installs a
//! `tracing_subscriber` fmt subscriber writing plain text to the configured
//! file, filtered by `logging.level`. Without it every event is dropped,
//! which keeps library use and tests free of log files. Logging problems
//! never surface as errors to the caller.

use std::fs::{File, OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use tracing_subscriber::EnvFilter;

use crate::config::expand_home;
use crate::config::schema::LoggingConfig;

/// Path of the file the installed subscriber writes to.
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Install the process-wide subscriber from config.
///
/// Does nothing when logging is disabled, the file cannot be opened, or a
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) {
    if !config.enabled {
        return;
    }
    let Some(path) = expand_home(&config.path) else {
        return;
    };
    let Some(file) = open_log_file(&path) else {
        return;
    };

    if tracing::subscriber::set_global_default(subscriber(file, &config.level)).is_ok() {
        let _ = LOG_PATH.set(path);
    }
}

/// Path of the active log file, if logging was initialized.
pub fn log_path() -> Option<PathBuf> {
    LOG_PATH.get().cloned()
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Plain-text fmt subscriber appending to `file`.
fn subscriber(file: File, level: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_env_filter(EnvFilter::new(filter_directive(level)))
        .with_ansi(false)
        .with_target(false)
        .finish()
}

/// Map a configured level name onto a filter directive. Unknown names fall
/// back to `info`.
fn filter_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_log(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "moodwatch-{name}-{}.log",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn filter_directive_variants() {
        assert_eq!(filter_directive("debug"), "debug");
        assert_eq!(filter_directive("WARN"), "warn");
        assert_eq!(filter_directive("warning"), "warn");
        assert_eq!(filter_directive(" error "), "error");
        assert_eq!(filter_directive("info"), "info");
        assert_eq!(filter_directive("verbose"), "info");
    }

    #[test]
    fn subscriber_writes_events_at_or_above_level() {
        let path = scratch_log("level");
        let file = open_log_file(&path).unwrap();

        tracing::subscriber::with_default(subscriber(file, "info"), || {
            tracing::debug!("poll tick details");
            tracing::info!("live mode on");
            tracing::warn!(seq = 3, "fetch failed");
        });

        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(written.contains("INFO"), "{written}");
        assert!(written.contains("live mode on"), "{written}");
        assert!(written.contains("fetch failed"), "{written}");
        assert!(written.contains("seq=3"), "{written}");
        assert!(!written.contains("poll tick details"), "{written}");
        assert!(!written.contains('\u{1b}'), "no ANSI escapes in the file");
    }

    #[test]
    fn disabled_logging_installs_nothing() {
        let config = LoggingConfig {
            enabled: false,
            path: scratch_log("disabled").display().to_string(),
            level: "debug".to_string(),
        };
        init(&config);
        assert!(!Path::new(&config.path).exists());
    }
}
