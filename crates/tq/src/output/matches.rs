//! Fuzzy match output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use taskq_query::fuzzy::MatchResult;

/// JSON output structure for the match command.
#[derive(Serialize)]
pub struct MatchesOutput<'a> {
    pub pattern: &'a str,
    pub matches: &'a [MatchResult],
}

/// Formats match results as JSON.
pub fn format_matches_json(
    pattern: &str,
    matches: &[MatchResult],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&MatchesOutput { pattern, matches })
}

/// Formats match results as a table, best match first.
pub fn format_matches_table(matches: &[MatchResult], use_colors: bool) -> String {
    if matches.is_empty() {
        return "No matches found.\n".to_string();
    }

    let mut output = String::new();

    let head = format!("{:<6} {:<6} {}", "Score", "Index", "Text");
    if use_colors {
        output.push_str(&format!("{}\n", head.dimmed()));
    } else {
        output.push_str(&head);
        output.push('\n');
    }

    for m in matches {
        let score = format!("{:<6}", m.score);
        let score = if !use_colors {
            score
        } else if m.score >= 80 {
            score.green().to_string()
        } else if m.score >= 50 {
            score.yellow().to_string()
        } else {
            score.dimmed().to_string()
        };
        output.push_str(&format!("{} {:<6} {}\n", score, m.index, m.text));
    }

    output
}
