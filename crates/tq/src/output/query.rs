//! Token and clause output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use taskq_query::query::{ParsedQuery, PositionedToken};

use super::{error_line, header};

/// JSON output structure for the tokens command.
#[derive(Serialize)]
pub struct TokensOutput<'a> {
    pub tokens: Vec<TokenOutput<'a>>,
}

/// JSON output structure for a single token.
#[derive(Serialize)]
pub struct TokenOutput<'a> {
    pub kind: &'static str,
    pub text: &'a str,
    pub position: usize,
}

/// Formats tokens as JSON.
pub fn format_tokens_json(tokens: &[PositionedToken]) -> Result<String, serde_json::Error> {
    let output = TokensOutput {
        tokens: tokens
            .iter()
            .map(|t| TokenOutput {
                kind: t.token.kind(),
                text: t.token.text(),
                position: t.position,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats tokens as a table, one row per token.
pub fn format_tokens_table(tokens: &[PositionedToken], use_colors: bool) -> String {
    let mut output = String::new();

    let head = format!("{:<5} {:<14} {}", "Pos", "Kind", "Text");
    if use_colors {
        output.push_str(&format!("{}\n", head.dimmed()));
    } else {
        output.push_str(&head);
        output.push('\n');
    }

    for positioned in tokens {
        let kind = positioned.token.kind();
        let kind = if use_colors {
            format!("{:<14}", kind).cyan().to_string()
        } else {
            format!("{:<14}", kind)
        };
        let line = format!("{:<5} {} {}", positioned.position, kind, positioned.token.text());
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output
}

/// Formats a parsed query as JSON.
pub fn format_parsed_json(query: &ParsedQuery) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(query)
}

/// Formats a parsed query as a table of clauses, followed by free text
/// and errors when there are any.
pub fn format_parsed_table(query: &ParsedQuery, use_colors: bool) -> String {
    if query.is_empty() {
        return "No clauses found.\n".to_string();
    }

    let mut output = String::new();

    if !query.clauses.is_empty() {
        let head = format!("{:<8} {:<4} {:<4} {:<5} {}", "Field", "Op", "Neg", "Fuzzy", "Value");
        if use_colors {
            output.push_str(&format!("{}\n", head.dimmed()));
        } else {
            output.push_str(&head);
            output.push('\n');
        }

        for clause in &query.clauses {
            let line = format!(
                "{:<8} {:<4} {:<4} {:<5} {}",
                clause.field.as_str(),
                clause.operator.as_str(),
                if clause.negated { "yes" } else { "" },
                if clause.fuzzy { "yes" } else { "" },
                clause.value
            );
            output.push_str(&line);
            output.push('\n');
        }
    }

    if !query.free_text.is_empty() {
        output.push('\n');
        output.push_str(&header("Free text", use_colors));
        output.push_str(&format!("  {}\n", query.free_text.join(" ")));
    }

    if !query.errors.is_empty() {
        output.push('\n');
        output.push_str(&header("Errors", use_colors));
        for error in &query.errors {
            output.push_str(&error_line(&error.to_string(), use_colors));
        }
    }

    output
}
