//! Output formatting utilities for the tq CLI.
//!
//! Every command prints either a table meant for people or pretty JSON.
//! The submodules are organized by what is being printed:
//!
//! - [`query`] - Tokens and parsed clauses
//! - [`filter`] - Task filters and the errors behind them
//! - [`matches`] - Fuzzy match results

mod filter;
mod matches;
mod query;

pub use filter::{format_interpretation_json, format_interpretation_table};
pub use matches::{format_matches_json, format_matches_table};
pub use query::{
    format_parsed_json, format_parsed_table, format_tokens_json, format_tokens_table,
};

use owo_colors::OwoColorize;

/// Formats a section header, bold when colors are on.
fn header(text: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{}\n", text.bold())
    } else {
        format!("{}\n", text)
    }
}

/// Formats one error line, red when colors are on.
fn error_line(text: &str, use_colors: bool) -> String {
    if use_colors {
        format!("  {} {}\n", "✗".red(), text)
    } else {
        format!("  ✗ {}\n", text)
    }
}
