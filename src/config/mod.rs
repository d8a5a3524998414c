/// Configuration system for moodwatch.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::MoodwatchConfig::default()`]
/// 2. **User global config**: `~/.moodwatch/config.toml`
/// 3. **Project local config**: `.moodwatch.toml` in the current working directory
/// 4. **Environment variables**: `MOODWATCH_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use moodwatch::config;
///
/// let cfg = config::load();
/// let client = HttpBackend::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::MoodwatchConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved moodwatch configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> MoodwatchConfig {
    let mut layered = toml::Table::new();

    // Layer 2: user global config (~/.moodwatch/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        merge_tables(&mut layered, global);
    }

    // Layer 3: project local config (.moodwatch.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        merge_tables(&mut layered, project);
    }

    // Layer 1 fills whatever neither file set.
    let mut config: MoodwatchConfig = toml::Value::Table(layered)
        .try_into()
        .unwrap_or_default();

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A broken config file must not stop the dashboard
/// from coming up, so a file that does not parse as a config on its own is
/// skipped as a whole.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Table> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str::<MoodwatchConfig>(&content).ok()?;
    toml::from_str(&content).ok()
}

/// Merge one config layer into the layers below it.
///
/// Only keys present in `overlay` are replaced; sub-tables merge key by key,
/// so a project file that sets `[poller] interval_secs` keeps the global
/// file's `[backend]` and the rest of `[poller]`.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.moodwatch/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".moodwatch").join("config.toml"))
}

/// Path to the project local config: `.moodwatch.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".moodwatch.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~` to the user's home directory.
///
/// Returns `None` only when the path needs the home directory and it cannot
/// be determined.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `MOODWATCH_USER_ID`: user id sent to the backend
/// - `MOODWATCH_BACKEND_URL`: backend base URL
/// - `MOODWATCH_TIMEOUT_MS`: per-request timeout
/// - `MOODWATCH_TREND_SOURCE`: `live` or `historical`
/// - `MOODWATCH_INTERVAL_SECS`: live refresh period
/// - `MOODWATCH_LOGGING`: logging on/off (`1`/`true`/`yes`/`on`)
/// - `MOODWATCH_LOG_LEVEL`: `debug`, `info`, `warn`, `error`
fn apply_env_overrides(config: &mut MoodwatchConfig) {
    if let Ok(val) = std::env::var("MOODWATCH_USER_ID")
        && !val.is_empty()
    {
        config.general.user_id = val;
    }

    // Backend
    if let Ok(val) = std::env::var("MOODWATCH_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("MOODWATCH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("MOODWATCH_TREND_SOURCE")
        && let Some(source) = parse_trend_source(&val)
    {
        config.backend.trend_source = source;
    }

    // Poller
    if let Ok(val) = std::env::var("MOODWATCH_INTERVAL_SECS")
        && let Ok(secs) = val.parse::<u64>()
        && secs > 0
    {
        config.poller.interval_secs = secs;
    }

    // Logging
    if let Ok(val) = std::env::var("MOODWATCH_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("MOODWATCH_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val.to_ascii_lowercase();
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a trend source string.
fn parse_trend_source(val: &str) -> Option<schema::TrendSource> {
    match val.to_ascii_lowercase().as_str() {
        "live" => Some(schema::TrendSource::Live),
        "historical" | "history" => Some(schema::TrendSource::Historical),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.moodwatch/config.toml`.
///
/// Creates the `~/.moodwatch/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.moodwatch/ directory")?;
    }

    fs::write(&path, MoodwatchConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config layered over the defaults, updates the
/// specified key, and writes the result back. Supports dotted keys like `backend.base_url`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    // Start from the defaults so keys missing from a partial file can be set.
    let mut table: toml::Table = toml::from_str(
        &toml::to_string_pretty(&MoodwatchConfig::default())
            .context("failed to serialize default config")?,
    )
    .context("failed to parse default config")?;
    if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        let current: toml::Table =
            toml::from_str(&content).context("failed to parse config as TOML value")?;
        merge_tables(&mut table, current);
    }
    let mut value_table = toml::Value::Table(table);

    set_toml_value(&mut value_table, key, value)?;

    // Refuse to write a file that would no longer load.
    let output =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;
    toml::from_str::<MoodwatchConfig>(&output)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key: '{key}'");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    // Parse according to the type already stored under the key
    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn parse_trend_source_handles_variants() {
        assert_eq!(parse_trend_source("live"), Some(schema::TrendSource::Live));
        assert_eq!(parse_trend_source("LIVE"), Some(schema::TrendSource::Live));
        assert_eq!(
            parse_trend_source("historical"),
            Some(schema::TrendSource::Historical)
        );
        assert_eq!(
            parse_trend_source("history"),
            Some(schema::TrendSource::Historical)
        );
        assert_eq!(parse_trend_source("weekly"), None);
    }

    #[test]
    fn expand_home_leaves_plain_paths_alone() {
        assert_eq!(
            expand_home("/var/log/moodwatch.log"),
            Some(PathBuf::from("/var/log/moodwatch.log"))
        );
        assert_eq!(expand_home("rel.log"), Some(PathBuf::from("rel.log")));
    }

    #[test]
    fn expand_home_expands_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home("~/.moodwatch/x.log"),
                Some(home.join(".moodwatch").join("x.log"))
            );
        }
    }

    #[test]
    fn set_toml_value_updates_string() {
        let toml_str = r#"
[backend]
base_url = "http://localhost:5000"
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "backend.base_url", "https://api.example.com").unwrap();

        let backend = root["backend"].as_table().unwrap();
        assert_eq!(backend["base_url"].as_str(), Some("https://api.example.com"));
    }

    #[test]
    fn set_toml_value_updates_bool() {
        let toml_str = r#"
[poller]
seed_on_failure = true
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "poller.seed_on_failure", "off").unwrap();

        let poller = root["poller"].as_table().unwrap();
        assert_eq!(poller["seed_on_failure"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let toml_str = r#"
[poller]
interval_secs = 10
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "poller.interval_secs", "30").unwrap();

        let poller = root["poller"].as_table().unwrap();
        assert_eq!(poller["interval_secs"].as_integer(), Some(30));
    }

    #[test]
    fn set_toml_value_rejects_bad_integer() {
        let toml_str = r#"
[poller]
interval_secs = 10
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        assert!(set_toml_value(&mut root, "poller.interval_secs", "soon").is_err());
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let toml_str = r#"
[general]
user_id = "default_user"
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "general.nickname", "value").is_err());
        assert!(set_toml_value(&mut root, "general.", "value").is_err());
    }

    #[test]
    fn merge_tables_keeps_unset_keys_from_lower_layers() {
        let mut base: toml::Table = toml::from_str(
            r#"
[backend]
base_url = "http://sentiment.internal:5000"
timeout_ms = 5000

[poller]
interval_secs = 30
"#,
        )
        .unwrap();
        let overlay: toml::Table = toml::from_str(
            r#"
[poller]
interval_secs = 5

[general]
user_id = "support_team"
"#,
        )
        .unwrap();

        merge_tables(&mut base, overlay);
        let config: MoodwatchConfig = toml::Value::Table(base).try_into().unwrap();

        assert_eq!(config.backend.base_url, "http://sentiment.internal:5000");
        assert_eq!(config.backend.timeout_ms, 5000);
        assert_eq!(config.poller.interval_secs, 5);
        assert_eq!(config.poller.max_points, 6);
        assert_eq!(config.general.user_id, "support_team");
    }

    #[test]
    fn empty_layers_yield_defaults() {
        let config: MoodwatchConfig = toml::Value::Table(toml::Table::new()).try_into().unwrap();
        assert_eq!(config.general.user_id, "default_user");
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.poller.interval_secs, 10);
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: MoodwatchConfig = toml::from_str(&toml_str).unwrap();
    }
}
