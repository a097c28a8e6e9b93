//! Match command implementation.
//!
//! Scores candidate texts against a pattern with the same fuzzy matcher
//! used for project lookups.

use taskq_query::fuzzy::match_many;

use super::{CommandContext, Outcome, Result};
use crate::output::{format_matches_json, format_matches_table};

/// Options for the match command.
pub struct MatchOptions {
    /// Pattern to look for.
    pub pattern: String,
    /// Candidate texts.
    pub texts: Vec<String>,
    /// Minimum score to keep.
    pub threshold: u8,
}

/// Executes the match command.
pub fn execute(ctx: &CommandContext, opts: &MatchOptions) -> Result<Outcome> {
    let matches = match_many(&opts.pattern, &opts.texts, opts.threshold);
    tracing::debug!(
        candidates = opts.texts.len(),
        kept = matches.len(),
        threshold = opts.threshold,
        "scored candidates"
    );

    if ctx.json_output {
        println!("{}", format_matches_json(&opts.pattern, &matches)?);
    } else {
        print!("{}", format_matches_table(&matches, ctx.use_colors));
    }

    Ok(Outcome::Clean)
}
