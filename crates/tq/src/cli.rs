//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the tq CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use taskq_query::convert::{SearchMode, SortKey, SortOrder};

/// tq - inspect and run task queries
#[derive(Parser, Debug)]
#[command(name = "tq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the tokens of a query
    #[command(alias = "t")]
    Tokens {
        /// Query text
        query: String,
    },

    /// Show the clauses and errors of a parsed query
    #[command(alias = "p")]
    Parse {
        /// Query text
        query: String,
    },

    /// Turn a query or search text into a task filter
    #[command(alias = "f")]
    Filter {
        /// Query or plain search text
        query: String,

        /// JSON file with projects: [{"id", "name", "aliases"}]
        #[arg(long, env = "TQ_PROJECTS")]
        projects: Option<PathBuf>,

        /// Search mode (default: from config)
        #[arg(long, value_enum)]
        search: Option<SearchArg>,

        /// Sort key (default: from config)
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Sort order (default: from config)
        #[arg(long, value_enum)]
        order: Option<OrderArg>,
    },

    /// Fuzzy-match a pattern against candidate texts
    #[command(alias = "m")]
    Match {
        /// Pattern to look for
        pattern: String,

        /// Candidate texts
        #[arg(required = true)]
        texts: Vec<String>,

        /// Minimum score (0-100)
        #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: u8,
    },

    /// View and edit configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key, e.g. search.mode
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}

/// Search modes for the filter command
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SearchArg {
    Substring,
    Fuzzy,
}

impl From<SearchArg> for SearchMode {
    fn from(arg: SearchArg) -> Self {
        match arg {
            SearchArg::Substring => SearchMode::Substring,
            SearchArg::Fuzzy => SearchMode::Fuzzy,
        }
    }
}

/// Sort keys for the filter command
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortArg {
    Created,
    Updated,
    Due,
    Priority,
    Title,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Created => SortKey::Created,
            SortArg::Updated => SortKey::Updated,
            SortArg::Due => SortKey::Due,
            SortArg::Priority => SortKey::Priority,
            SortArg::Title => SortKey::Title,
        }
    }
}

/// Sort orders for the filter command
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}
