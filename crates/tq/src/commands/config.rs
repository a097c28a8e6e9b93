//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/tq/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use taskq_query::convert::{ConvertOptions, Keyword, SearchMode, SortKey, SortOrder};
use taskq_query::repository::DEFAULT_SEARCH_THRESHOLD;

use super::{CommandContext, CommandError, Outcome, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Keys accepted by `tq config set`.
const VALID_KEYS: &str = "search.mode, search.fuzzy_limit, search.fuzzy_threshold, sort.key, sort.order, output.color";

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Default result ordering.
    #[serde(default)]
    pub sort: SortConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            search: SearchConfig::default(),
            sort: SortConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Builds converter options, filling unset values with defaults.
    pub fn convert_options(&self) -> ConvertOptions {
        let defaults = ConvertOptions::default();
        ConvertOptions {
            fuzzy_limit: self.search.fuzzy_limit.unwrap_or(defaults.fuzzy_limit),
            search_mode: self.search.mode.unwrap_or(defaults.search_mode),
            sort_by: self.sort.key.unwrap_or(defaults.sort_by),
            sort_order: self.sort.order.unwrap_or(defaults.sort_order),
        }
    }

    /// Minimum fuzzy score for project search.
    pub fn search_threshold(&self) -> u8 {
        self.search
            .fuzzy_threshold
            .unwrap_or(DEFAULT_SEARCH_THRESHOLD)
    }
}

/// Search configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// How free text is matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SearchMode>,

    /// Candidates requested from fuzzy project search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy_limit: Option<usize>,

    /// Minimum fuzzy score for a project to match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy_threshold: Option<u8>,
}

/// Sort configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SortConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<SortKey>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/tq/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("tq"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("tq"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    // Check for override env var first
    if let Ok(path) = env::var("TQ_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
///
/// A missing file yields the defaults.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    migrate_config(config)
}

/// Migrates config to current version if needed.
/// Returns the config as-is if already at current version.
fn migrate_config(mut config: Config) -> Result<Config> {
    // Version 1 is the initial schema
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Saves the configuration to disk, creating the directory if needed.
fn save_config(config: &Config) -> Result<()> {
    let path = get_config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| CommandError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&path, content)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<Outcome> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        // Effective values, defaults included
        let options = config.convert_options();
        println!("[search]");
        println!("  mode: {}", options.search_mode);
        println!("  fuzzy_limit: {}", options.fuzzy_limit);
        println!("  fuzzy_threshold: {}", config.search_threshold());

        println!("\n[sort]");
        println!("  key: {}", options.sort_by);
        println!("  order: {}", options.sort_order);

        println!("\n[output]");
        println!("  color: {}", config.output.color.unwrap_or(true));
    }

    Ok(Outcome::Clean)
}

/// Options for the config set command.
pub struct ConfigSetOptions {
    /// Configuration key.
    pub key: String,
    /// Configuration value.
    pub value: String,
}

/// Executes the config set command.
pub fn execute_set(ctx: &CommandContext, opts: &ConfigSetOptions) -> Result<Outcome> {
    let mut config = load_config()?;
    apply_setting(&mut config, &opts.key, &opts.value)?;
    save_config(&config)?;

    let path = get_config_path()?;
    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "key": opts.key,
            "value": opts.value,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Set {} = {}", opts.key, opts.value);
    }

    Ok(Outcome::Clean)
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<Outcome> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(Outcome::Clean)
}

/// Sets one `section.field` key from its string form.
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "search.mode" => config.search.mode = Some(parse_keyword(key, value)?),
        "search.fuzzy_limit" => config.search.fuzzy_limit = Some(parse_number(key, value)?),
        "search.fuzzy_threshold" => {
            let threshold: u8 = parse_number(key, value)?;
            if threshold > 100 {
                return Err(CommandError::Config(format!(
                    "Invalid search.fuzzy_threshold value '{}'. Use a number from 0 to 100",
                    value
                )));
            }
            config.search.fuzzy_threshold = Some(threshold);
        }
        "sort.key" => config.sort.key = Some(parse_keyword(key, value)?),
        "sort.order" => config.sort.order = Some(parse_keyword(key, value)?),
        "output.color" => config.output.color = Some(parse_bool(value)?),
        _ => {
            return Err(CommandError::Config(format!(
                "Unknown config key '{}'. Valid keys: {}",
                key, VALID_KEYS
            )));
        }
    }
    Ok(())
}

fn parse_keyword<K: Keyword>(key: &str, value: &str) -> Result<K> {
    K::from_keyword(value).ok_or_else(|| {
        CommandError::Config(format!(
            "Invalid {} value '{}'. Valid values: {}",
            key,
            value,
            K::expected()
        ))
    })
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CommandError::Config(format!("Invalid {} value '{}'. Expected a number", key, value)))
}

/// Parses a boolean value from string.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "Invalid boolean value '{}'. Use true/false, yes/no, 1/0, or on/off",
            s
        ))),
    }
}
