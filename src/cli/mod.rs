//! CLI command implementations for moodwatch.
//!
//! Provides subcommand handlers for:
//! - `moodwatch watch`: live chart in the terminal
//! - `moodwatch trends`: one-shot trend table
//! - `moodwatch overview`: per-emotion totals
//! - `moodwatch reset`: wipe accumulated backend data
//! - `moodwatch channel show|set`: mailbox / Telegram configuration
//! - `moodwatch dashboard`: local web dashboard
//! - `moodwatch health`: config, backend and log checks
//! - `moodwatch config show|init|set|reset`: configuration management

use std::io::{BufRead, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use crate::backend::{HttpBackend, SentimentBackend, TrendEndpoint};
use crate::channel;
use crate::config::{self, MoodwatchConfig};
use crate::logging;
use crate::poller::{Activation, FetchOutcome, LivePoller, PollerSettings};
use crate::render::{self, OutputFormat, TerminalRenderer};
use crate::series::Series;
use crate::web;

// ---------------------------------------------------------------------------
// moodwatch watch
// ---------------------------------------------------------------------------

/// A line typed at the `watch` prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    Live,
    Pause,
    Reset,
    Refresh,
    Help,
    Quit,
}

impl WatchCommand {
    /// Parse one input line. Blank or unknown input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "live" | "l" | "start" => Some(Self::Live),
            "pause" | "p" | "stop" => Some(Self::Pause),
            "reset" | "r" => Some(Self::Reset),
            "refresh" | "f" => Some(Self::Refresh),
            "help" | "h" | "?" => Some(Self::Help),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Run the live chart in the terminal until `quit` or end of input.
pub fn run_watch(cfg: &MoodwatchConfig, live: bool, interval_secs: Option<u64>) -> Result<()> {
    let mut settings = PollerSettings::from_config(cfg);
    if let Some(secs) = interval_secs {
        settings.interval = Duration::from_secs(secs.max(1));
    }

    let backend = HttpBackend::from_config(&cfg.backend);
    println!(
        "{} {} (refresh every {}s)",
        "Watching".bold().cyan(),
        backend.base_url(),
        settings.interval.as_secs()
    );
    print_watch_help();

    let mut poller = LivePoller::new(Box::new(backend), settings);
    poller.add_observer(Arc::new(TerminalRenderer::new()));
    poller.mount();

    if live {
        poller.start_live();
    }

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed reading from stdin")?;
        match WatchCommand::parse(&line) {
            Some(WatchCommand::Live) => {
                if poller.start_live() == Activation::AlreadyActive {
                    println!("{}", "Already live.".dimmed());
                }
            }
            Some(WatchCommand::Pause) => {
                if !poller.stop_live() {
                    println!("{}", "Not live.".dimmed());
                }
            }
            Some(WatchCommand::Reset) => {
                let report = poller.reset_all();
                if !report.remote_reset {
                    println!("{}", "Backend reset failed; showing current data.".yellow());
                }
            }
            Some(WatchCommand::Refresh) => {
                let outcome = poller.fetch_trends();
                if outcome == FetchOutcome::Discarded {
                    println!("{}", describe_outcome(&outcome).dimmed());
                }
            }
            Some(WatchCommand::Help) => print_watch_help(),
            Some(WatchCommand::Quit) => break,
            None if line.trim().is_empty() => {}
            None => println!("{} '{}' (type 'help')", "Unknown command".yellow(), line.trim()),
        }
    }

    // Dropping the poller stops the refresh loop.
    drop(poller);
    Ok(())
}

fn print_watch_help() {
    println!(
        "  {}",
        "Commands: live | pause | reset | refresh | help | quit".dimmed()
    );
}

// ---------------------------------------------------------------------------
// moodwatch trends
// ---------------------------------------------------------------------------

/// Fetch trend buckets once and print them.
pub fn run_trends(
    cfg: &MoodwatchConfig,
    historical: bool,
    hours: Option<u32>,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let endpoint = if historical || hours.is_some() {
        TrendEndpoint::Historical {
            hours: hours.unwrap_or(cfg.backend.history_hours),
        }
    } else {
        TrendEndpoint::from_config(&cfg.backend)
    };

    let backend = HttpBackend::from_config(&cfg.backend);
    let buckets = backend
        .fetch_trends(endpoint)
        .context("failed to fetch emotion trends")?;
    let series = Series::from_buckets(&buckets, limit.unwrap_or(cfg.poller.max_points).max(1));

    if series.is_empty() && format == OutputFormat::Table {
        println!("{}", "No emotion data yet.".yellow());
        return Ok(());
    }
    render::print_series(&series, format)
}

// ---------------------------------------------------------------------------
// moodwatch overview
// ---------------------------------------------------------------------------

/// Print per-emotion totals.
pub fn run_overview(cfg: &MoodwatchConfig, format: OutputFormat) -> Result<()> {
    let backend = HttpBackend::from_config(&cfg.backend);
    let overview = backend
        .emotion_overview()
        .context("failed to fetch emotion overview")?;
    render::print_overview(&overview, format)
}

// ---------------------------------------------------------------------------
// moodwatch reset
// ---------------------------------------------------------------------------

/// Wipe the user's accumulated emotion data on the backend.
pub fn run_reset(cfg: &MoodwatchConfig) -> Result<()> {
    let backend = HttpBackend::from_config(&cfg.backend);
    let user_id = &cfg.general.user_id;
    let response = backend
        .reset_emotion_data(user_id)
        .context("failed to reset emotion data")?;
    info!(user_id = %user_id, "emotion data reset from the CLI");

    println!(
        "{} {}",
        "✓".green().bold(),
        response
            .message
            .unwrap_or_else(|| format!("Emotion data reset for user {user_id}"))
    );
    if let Some(deleted) = response.deleted_messages {
        println!("  {}", format!("{deleted} messages deleted").dimmed());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// moodwatch channel show | set
// ---------------------------------------------------------------------------

/// Show the channel configuration stored on the backend.
pub fn run_channel_show(cfg: &MoodwatchConfig) -> Result<()> {
    let backend = HttpBackend::from_config(&cfg.backend);
    let user_id = &cfg.general.user_id;

    match backend
        .channel_config(user_id)
        .context("failed to read channel configuration")?
    {
        Some(stored) => {
            println!("{}", "Channel Configuration".bold().cyan());
            println!("{}", "=".repeat(40));
            println!("  {:<18} {}", "Email:", stored.email.as_deref().unwrap_or("-"));
            println!(
                "  {:<18} {}",
                "Telegram user id:",
                stored.telegram_user_id.as_deref().unwrap_or("-")
            );
            println!("  {:<18} {}", "Configured:", stored.configured);
        }
        None => println!(
            "{}",
            format!(
                "No channel configured for {user_id}. Run `moodwatch channel set` to add one."
            )
            .yellow()
        ),
    }
    Ok(())
}

/// Validate and save a channel configuration.
///
/// When `app_password` is not given it is read from stdin so it stays out of
/// shell history. On a terminal the typed password is not echoed; piped input
/// is read as the first line.
pub fn run_channel_set(
    cfg: &MoodwatchConfig,
    email: &str,
    app_password: Option<&str>,
    telegram_user_id: &str,
) -> Result<()> {
    let app_password = match app_password {
        Some(p) => p.to_string(),
        None => prompt_secret("App password: ")?,
    };

    let config = channel::build(email, &app_password, telegram_user_id);
    channel::validate(&config)?;

    let backend = HttpBackend::from_config(&cfg.backend);
    let response = backend
        .save_channel_config(&config, &cfg.general.user_id)
        .context("failed to save email configuration")?;
    info!(
        user_id = %cfg.general.user_id,
        email = %config.email,
        data_reset = response.data_reset,
        "channel configuration saved"
    );

    println!("{} Configuration saved for {}", "✓".green().bold(), config.email);
    if response.data_reset {
        println!(
            "  {}",
            "New credentials detected: backend data was reset to start from zero.".dimmed()
        );
    }
    Ok(())
}

/// Read a secret from stdin. Interactive input is hidden with `rpassword`.
fn prompt_secret(prompt: &str) -> Result<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return rpassword::prompt_password(prompt).context("failed to read password");
    }
    read_secret_line(stdin.lock())
}

/// First line of `reader` without its line ending. Leading and inner spaces
/// are kept.
fn read_secret_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("failed reading from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

// ---------------------------------------------------------------------------
// moodwatch dashboard
// ---------------------------------------------------------------------------

/// Run the local web dashboard until interrupted.
pub fn run_dashboard(cfg: &MoodwatchConfig, addr: Option<&str>, no_open: bool) -> Result<()> {
    let addr = addr.unwrap_or(&cfg.dashboard.addr);
    let backend = HttpBackend::from_config(&cfg.backend);
    let poller = LivePoller::new(Box::new(backend), PollerSettings::from_config(cfg));
    web::serve(addr, poller, cfg.dashboard.open_browser && !no_open)
}

// ---------------------------------------------------------------------------
// moodwatch health
// ---------------------------------------------------------------------------

/// Check config files, backend reachability and the log file.
pub fn run_health(cfg: &MoodwatchConfig) -> Result<()> {
    println!("{}", "moodwatch Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    // 1. Config files
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.moodwatch/config.toml found"
        } else {
            "not found (run `moodwatch config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".moodwatch.toml found"
        } else {
            "none (optional)"
        },
    );
    print_health_item(
        "User / source",
        true,
        &format!("{} / {}", cfg.general.user_id, cfg.backend.trend_source),
    );

    // 2. Backend
    let backend = HttpBackend::from_config(&cfg.backend);
    match backend.health() {
        Ok(status) => {
            let detail = format!(
                "{} at {} (database {}, {} messages)",
                status.status,
                backend.base_url(),
                status.database.as_deref().unwrap_or("unknown"),
                status
                    .message_count
                    .map_or_else(|| "?".to_string(), |n| n.to_string())
            );
            print_health_item("Backend", status.is_healthy(), &detail);
        }
        Err(e) => print_health_item("Backend", false, &e.to_string()),
    }

    // 3. Trend endpoint
    let endpoint = TrendEndpoint::from_config(&cfg.backend);
    match backend.fetch_trends(endpoint) {
        Ok(buckets) => print_health_item(
            "Trend endpoint",
            true,
            &format!("{} ({} buckets)", endpoint.path(), buckets.len()),
        ),
        Err(e) => print_health_item("Trend endpoint", false, &e.to_string()),
    }

    // 4. Log file
    match logging::log_path() {
        Some(path) => print_health_item(
            "Event log",
            true,
            &format!(
                "{}{}",
                path.display(),
                if path.exists() { "" } else { " (not written yet)" }
            ),
        ),
        None => print_health_item("Event log", false, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// moodwatch config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective moodwatch Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.moodwatch/config.toml", global_exists);
    print_source(".moodwatch.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "MOODWATCH_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.moodwatch/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Set backend.base_url to your sentiment backend.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Describe a fetch outcome for one-line status output.
pub fn describe_outcome(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Applied => "updated".to_string(),
        FetchOutcome::Discarded => "superseded by a newer update".to_string(),
        FetchOutcome::Failed(message) => message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_commands_parse() {
        assert_eq!(WatchCommand::parse("live"), Some(WatchCommand::Live));
        assert_eq!(WatchCommand::parse(" L \n"), Some(WatchCommand::Live));
        assert_eq!(WatchCommand::parse("pause"), Some(WatchCommand::Pause));
        assert_eq!(WatchCommand::parse("stop"), Some(WatchCommand::Pause));
        assert_eq!(WatchCommand::parse("reset"), Some(WatchCommand::Reset));
        assert_eq!(WatchCommand::parse("f"), Some(WatchCommand::Refresh));
        assert_eq!(WatchCommand::parse("?"), Some(WatchCommand::Help));
        assert_eq!(WatchCommand::parse("EXIT"), Some(WatchCommand::Quit));
        assert_eq!(WatchCommand::parse(""), None);
        assert_eq!(WatchCommand::parse("dance"), None);
    }

    #[test]
    fn piped_secret_keeps_spaces_and_drops_line_ending() {
        let input = std::io::Cursor::new("abcd efgh ijkl\r\nnext line\n");
        assert_eq!(read_secret_line(input).unwrap(), "abcd efgh ijkl");
        assert_eq!(read_secret_line(std::io::Cursor::new("")).unwrap(), "");
    }

    #[test]
    fn outcome_descriptions() {
        assert_eq!(describe_outcome(&FetchOutcome::Applied), "updated");
        assert_eq!(
            describe_outcome(&FetchOutcome::Failed("boom".to_string())),
            "boom"
        );
    }
}
