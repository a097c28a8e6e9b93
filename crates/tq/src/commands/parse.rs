//! Parse command implementation.
//!
//! Shows the clauses, free text and errors of a query without resolving
//! anything.

use taskq_query::query::QueryParser;
use taskq_query::QueryError;

use super::{CommandContext, Outcome, Result};
use crate::output::{format_parsed_json, format_parsed_table};

/// Executes the parse command.
///
/// Returns [`Outcome::Partial`] when some clauses failed to parse; the rest
/// are still printed.
pub fn execute(ctx: &CommandContext, query: &str) -> Result<Outcome> {
    let parsed = QueryParser::parse_str(query).map_err(QueryError::from)?;
    tracing::debug!(
        clauses = parsed.clauses.len(),
        errors = parsed.errors.len(),
        "parsed query"
    );

    if ctx.json_output {
        println!("{}", format_parsed_json(&parsed)?);
    } else {
        print!("{}", format_parsed_table(&parsed, ctx.use_colors));
    }

    Ok(Outcome::from_errors(parsed.has_errors()))
}
