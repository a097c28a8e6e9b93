//! Task filter output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use taskq_query::convert::{ClauseError, TaskFilter};
use taskq_query::date::DateCondition;
use taskq_query::engine::InputKind;
use taskq_query::query::{FilterClause, ParseError};
use taskq_query::Interpretation;

use super::{error_line, header};

/// JSON output structure for the filter command.
#[derive(Serialize)]
pub struct InterpretationOutput<'a> {
    /// `query` or `text`.
    pub input: &'static str,
    pub filter: &'a TaskFilter,
    pub parse_errors: &'a [ParseError],
    pub convert_errors: Vec<ClauseErrorOutput<'a>>,
}

/// JSON output structure for one rejected clause.
#[derive(Serialize)]
pub struct ClauseErrorOutput<'a> {
    pub clause: &'a FilterClause,
    /// The clause written back in query syntax.
    pub text: String,
    pub message: String,
}

fn input_name(kind: InputKind) -> &'static str {
    match kind {
        InputKind::Query => "query",
        InputKind::Text => "text",
    }
}

fn clause_error_output(error: &ClauseError) -> ClauseErrorOutput<'_> {
    ClauseErrorOutput {
        clause: &error.clause,
        text: error.clause.to_string(),
        message: error.error.to_string(),
    }
}

/// Formats an interpretation as JSON.
pub fn format_interpretation_json(
    interpretation: &Interpretation,
) -> Result<String, serde_json::Error> {
    let output = InterpretationOutput {
        input: input_name(interpretation.kind),
        filter: &interpretation.filter,
        parse_errors: &interpretation.parse_errors,
        convert_errors: interpretation
            .convert_errors
            .iter()
            .map(clause_error_output)
            .collect(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats an interpretation for display.
///
/// Only the restrictions that are set are listed; ordering is always shown.
pub fn format_interpretation_table(interpretation: &Interpretation, use_colors: bool) -> String {
    let filter = &interpretation.filter;
    let mut output = String::new();

    output.push_str(&header(
        &format!("Filter ({} input)", input_name(interpretation.kind)),
        use_colors,
    ));

    if filter.is_unrestricted() {
        output.push_str("  (matches every task)\n");
    }

    let mut rows: Vec<(&str, String)> = Vec::new();
    if let Some(status) = filter.status {
        rows.push(("Status", status.to_string()));
    }
    if let Some(priority) = filter.priority {
        rows.push(("Priority", priority.to_string()));
    }
    if let Some(project_id) = &filter.project_id {
        rows.push(("Project", project_id.clone()));
    }
    if !filter.tags.is_empty() {
        rows.push(("Tags", filter.tags.join(", ")));
    }
    if !filter.exclude_tags.is_empty() {
        rows.push(("Not tags", filter.exclude_tags.join(", ")));
    }
    for (label, condition) in [
        ("Due", &filter.due),
        ("Created", &filter.created),
        ("Updated", &filter.updated),
    ] {
        if let Some(text) = format_condition(condition) {
            rows.push((label, text));
        }
    }
    if let Some(search) = &filter.search_query {
        rows.push(("Search", format!("\"{}\" ({})", search, filter.search_mode)));
    }
    rows.push(("Sort", format!("{} {}", filter.sort_by, filter.sort_order)));

    for (label, value) in rows {
        let label = format!("{:<10}", format!("{label}:"));
        if use_colors {
            output.push_str(&format!("  {} {}\n", label.dimmed(), value));
        } else {
            output.push_str(&format!("  {} {}\n", label, value));
        }
    }

    if interpretation.has_errors() {
        output.push('\n');
        output.push_str(&header("Errors", use_colors));
        for error in &interpretation.parse_errors {
            output.push_str(&error_line(&error.to_string(), use_colors));
        }
        for error in &interpretation.convert_errors {
            output.push_str(&error_line(&error.to_string(), use_colors));
        }
    }

    output
}

/// Formats a date condition, or `None` when it does not restrict anything.
///
/// Ranges use interval notation: `[` and `]` include the bound, `(` and `)`
/// exclude it or mark an open side.
fn format_condition(condition: &DateCondition) -> Option<String> {
    match condition {
        DateCondition::Any => None,
        DateCondition::Missing => Some("none".to_string()),
        DateCondition::Range(range) => {
            let bound = |b: Option<&chrono::DateTime<chrono::FixedOffset>>| {
                b.map_or_else(|| "*".to_string(), |d| d.to_rfc3339())
            };
            let open = if range.from.is_none() || range.from_exclusive { '(' } else { '[' };
            let close = if range.to.is_none() || range.to_exclusive { ')' } else { ']' };
            Some(format!(
                "{}{} .. {}{}",
                open,
                bound(range.from.as_ref()),
                bound(range.to.as_ref()),
                close
            ))
        }
    }
}
