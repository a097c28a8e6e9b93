//! Tokens command implementation.
//!
//! Shows how the lexer splits a query.

use taskq_query::query::tokenize;
use taskq_query::QueryError;

use super::{CommandContext, Outcome, Result};
use crate::output::{format_tokens_json, format_tokens_table};

/// Executes the tokens command.
///
/// # Errors
///
/// Returns an error if the query cannot be tokenized.
pub fn execute(ctx: &CommandContext, query: &str) -> Result<Outcome> {
    let tokens = tokenize(query).map_err(QueryError::from)?;
    tracing::debug!(count = tokens.len(), "tokenized query");

    if ctx.json_output {
        println!("{}", format_tokens_json(&tokens)?);
    } else {
        print!("{}", format_tokens_table(&tokens, ctx.use_colors));
    }

    Ok(Outcome::Clean)
}
