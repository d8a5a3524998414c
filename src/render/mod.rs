//! Terminal output: the live chart renderer and one-shot table/JSON/CSV
//! printers.

use std::io::Write;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::backend::EmotionOverview;
use crate::poller::{SeriesObserver, Snapshot};
use crate::series::Series;

/// Width of a 100% share bar, in characters.
const BAR_WIDTH: usize = 20;

/// Output format for one-shot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// Live renderer
// ---------------------------------------------------------------------------

/// Redraws the chart on stdout after every poller update.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl SeriesObserver for TerminalRenderer {
    fn on_update(&self, snapshot: &Snapshot) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", render_snapshot(snapshot));
        let _ = out.flush();
    }
}

/// Full chart block for one snapshot: header, table, error line.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut lines = Vec::new();

    let status = if snapshot.live {
        "● LIVE".green().bold().to_string()
    } else {
        "○ paused".dimmed().to_string()
    };
    let updated = snapshot
        .updated_at
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("updated %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "no data from backend yet".to_string());
    lines.push(format!(
        "{}  {}  {}",
        "Customer Sentiment".bold().cyan(),
        status,
        updated.dimmed()
    ));
    if snapshot.monitoring_started {
        lines.push(
            "  Live monitoring active - tracking customer emotions in real-time"
                .dimmed()
                .to_string(),
        );
    }

    lines.push(render_series_table(&snapshot.series));

    if let Some(error) = &snapshot.error {
        lines.push(format!("  {} {}", "!".red().bold(), error.red()));
    }

    lines.join("\n")
}

fn render_series_table(series: &Series) -> String {
    if series.is_empty() {
        return format!("  {}", "No emotion data yet.".yellow());
    }

    let mut lines = vec![
        format!(
            "  {:<6} {:<26} {:<26} {:<26} {:>6}",
            "Time", "Positive", "Negative", "Neutral", "Alerts"
        ),
        format!("  {}", "-".repeat(94)),
    ];

    for point in series.points() {
        lines.push(format!(
            "  {:<6} {} {} {} {:>6}",
            point.time,
            share_cell(point.positive).green(),
            share_cell(point.negative).red(),
            share_cell(point.neutral).yellow(),
            point.alerts,
        ));
    }
    lines.join("\n")
}

/// `"65% █████████████    "` padded to a fixed width.
fn share_cell(pct: u32) -> String {
    format!("{:>4} {:<width$}", format!("{pct}%"), bar(pct), width = BAR_WIDTH + 1)
}

/// Horizontal bar proportional to a percentage, capped at 100%.
fn bar(pct: u32) -> String {
    let filled = (pct.min(100) as usize * BAR_WIDTH + 50) / 100;
    "█".repeat(filled)
}

// ---------------------------------------------------------------------------
// One-shot printers
// ---------------------------------------------------------------------------

pub fn print_series(series: &Series, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_series_table(series)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(series).context("failed to serialize series")?
        ),
        OutputFormat::Csv => print!("{}", series_csv(series)),
    }
    Ok(())
}

fn series_csv(series: &Series) -> String {
    let mut out = String::from("time,positive,negative,neutral,alerts\n");
    for p in series.points() {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&p.time),
            p.positive,
            p.negative,
            p.neutral,
            p.alerts
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn print_overview(overview: &EmotionOverview, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(overview).context("failed to serialize overview")?
        ),
        OutputFormat::Csv => {
            println!("emotion,count,percent,total_messages");
            for (name, entry) in overview.cards() {
                println!(
                    "{name},{},{},{}",
                    entry.count, entry.change_percent, entry.total_messages
                );
            }
        }
        OutputFormat::Table => {
            println!("{}", "Emotion Overview".bold().cyan());
            println!("{}", "=".repeat(40));
            for (name, entry) in overview.cards() {
                let text = entry.percentage_text.clone().unwrap_or_else(|| {
                    format!(
                        "{}/{} ({}%)",
                        entry.count, entry.total_messages, entry.change_percent
                    )
                });
                let label = format!("{:<10}", capitalize(name));
                let label = match name {
                    "anger" => label.red(),
                    "joy" => label.green(),
                    "confusion" => label.yellow(),
                    _ => label.normal(),
                };
                println!("  {label} {text}");
            }
        }
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::EmotionBucket;

    #[test]
    fn bar_scales_to_width() {
        assert_eq!(bar(0), "");
        assert_eq!(bar(100).chars().count(), BAR_WIDTH);
        assert_eq!(bar(50).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(250).chars().count(), BAR_WIDTH);
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("table")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
    }

    #[test]
    fn csv_lists_points_in_order() {
        let buckets = vec![
            EmotionBucket {
                time: "10:00".to_string(),
                joy: 1,
                anger: 1,
                confusion: 0,
                neutral: 0,
            },
            EmotionBucket {
                time: "09:00".to_string(),
                joy: 65,
                anger: 20,
                confusion: 0,
                neutral: 15,
            },
        ];
        let csv = series_csv(&Series::from_buckets(&buckets, 6));
        assert_eq!(
            csv,
            "time,positive,negative,neutral,alerts\n09:00,65,20,15,20\n10:00,50,50,0,1\n"
        );
    }

    #[test]
    fn csv_quotes_awkward_fields() {
        assert_eq!(csv_field("09:00"), "09:00");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn snapshot_render_shows_error_and_empty_state() {
        colored::control::set_override(false);
        let snapshot = Snapshot {
            series: Series::empty(),
            error: Some("Failed to reset data. Please try again.".to_string()),
            live: false,
            monitoring_started: false,
            updated_at: None,
        };
        let text = render_snapshot(&snapshot);
        assert!(text.contains("paused"));
        assert!(text.contains("No emotion data yet."));
        assert!(text.contains("Failed to reset data. Please try again."));
    }

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("anger"), "Anger");
        assert_eq!(capitalize(""), "");
    }
}
