//! Command implementations for the tq CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod filter;
pub mod matching;
pub mod parse;
pub mod tokens;

use std::path::PathBuf;

use crate::cli::Cli;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Query could not be processed at all.
    #[error("query error: {0}")]
    Query(#[from] taskq_query::QueryError),

    /// Projects file could not be loaded.
    #[error("projects file {}: {message}", .path.display())]
    Projects { path: PathBuf, message: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// How a successful command went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything was processed.
    Clean,
    /// Output was produced, but some clauses were rejected.
    Partial,
}

impl Outcome {
    /// Returns [`Outcome::Partial`] if `has_errors` is set.
    pub fn from_errors(has_errors: bool) -> Self {
        if has_errors {
            Outcome::Partial
        } else {
            Outcome::Clean
        }
    }
}

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    ///
    /// Colors are on unless `--no-color` is given, `NO_COLOR` is set, or the
    /// config file turns them off.
    pub fn from_cli(cli: &Cli, config_color: Option<bool>) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && !no_color_env && config_color.unwrap_or(true),
            quiet: cli.quiet,
        }
    }
}
