use anyhow::Result;
use clap::{Parser, Subcommand};

use moodwatch::render::OutputFormat;
use moodwatch::{cli, config, logging};

#[derive(Debug, Parser)]
#[command(name = "moodwatch")]
#[command(about = "Live customer sentiment dashboard for the emotion-analysis backend")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the emotion chart in the terminal and control live mode interactively
    Watch {
        /// Switch live mode on immediately
        #[arg(long)]
        live: bool,
        /// Refresh interval in seconds while live (default from config: 10)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Fetch trend buckets once and print them
    Trends {
        /// Use the historical endpoint instead of the live one
        #[arg(long)]
        historical: bool,
        /// Hours of history to request (implies --historical)
        #[arg(long)]
        hours: Option<u32>,
        /// Keep only the last N points (default from config: 6)
        #[arg(long)]
        limit: Option<usize>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show per-emotion message totals
    Overview {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Delete all accumulated emotion data for the configured user
    Reset,
    /// Manage the mailbox and Telegram configuration on the backend
    Channel {
        #[command(subcommand)]
        action: ChannelAction,
    },
    /// Launch the local web dashboard
    Dashboard {
        /// Address to bind (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
        /// Don't open the browser
        #[arg(long)]
        no_open: bool,
    },
    /// Check system health: config, backend, event log
    Health,
    /// Manage moodwatch configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ChannelAction {
    /// Show the stored configuration (never includes the app password)
    Show,
    /// Validate and save a new configuration
    Set {
        /// Mailbox address to monitor
        #[arg(long)]
        email: String,
        /// Mailbox app password (prompted on stdin when omitted)
        #[arg(long)]
        app_password: Option<String>,
        /// Telegram user id that receives alerts
        #[arg(long)]
        telegram_user_id: String,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Create a default config file at ~/.moodwatch/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a configuration value (e.g., poller.interval_secs 5)
    Set {
        /// Dotted key path (e.g., backend.base_url)
        key: String,
        /// Value to set
        value: String,
    },
    /// Reset configuration to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    let cfg = config::load();
    logging::init(&cfg.logging);

    match app.command {
        Commands::Watch { live, interval } => cli::run_watch(&cfg, live, interval),
        Commands::Trends {
            historical,
            hours,
            limit,
            format,
        } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_trends(&cfg, historical, hours, limit, fmt)
        }
        Commands::Overview { format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_overview(&cfg, fmt)
        }
        Commands::Reset => cli::run_reset(&cfg),
        Commands::Channel { action } => match action {
            ChannelAction::Show => cli::run_channel_show(&cfg),
            ChannelAction::Set {
                email,
                app_password,
                telegram_user_id,
            } => cli::run_channel_set(&cfg, &email, app_password.as_deref(), &telegram_user_id),
        },
        Commands::Dashboard { addr, no_open } => {
            cli::run_dashboard(&cfg, addr.as_deref(), no_open)
        }
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
