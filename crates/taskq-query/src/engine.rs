//! Entry point from raw search-box text to a task filter.
//!
//! Text that uses query syntax goes through the lexer, parser and converter.
//! Anything else is plain search text: project mentions are pulled out and
//! the rest becomes the search query.

use chrono::{DateTime, Local, TimeZone};

use crate::convert::{ClauseError, ConvertOptions, Converter, TaskFilter};
use crate::mention::extract_mentions;
use crate::query::{Lexer, ParseError, QueryParser, Token};
use crate::repository::ProjectRepository;
use crate::Result;

/// How the input was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Query syntax, e.g. `status:pending tag:bug`.
    Query,
    /// Plain text with optional `@project` mentions.
    Text,
}

/// The filter for one input, with everything that went wrong on the way.
///
/// The filter reflects every clause that parsed and converted; failed
/// clauses are listed, not silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub kind: InputKind,
    pub filter: TaskFilter,
    pub parse_errors: Vec<ParseError>,
    pub convert_errors: Vec<ClauseError>,
}

impl Interpretation {
    /// Returns true if any clause failed to parse or convert.
    pub fn has_errors(&self) -> bool {
        !self.parse_errors.is_empty() || !self.convert_errors.is_empty()
    }
}

/// Returns true if `text` uses query syntax.
///
/// That is the case when a field keyword is followed by `:` or a comparator,
/// or a `-` is followed by a field keyword. Only the tokens before a lexer
/// failure are considered, so `status:"pending` counts as query syntax.
///
/// # Example
///
/// ```
/// use taskq_query::engine::looks_like_dsl;
///
/// assert!(looks_like_dsl("status:pending"));
/// assert!(looks_like_dsl("-tag:wontfix"));
/// assert!(!looks_like_dsl("fix the status page @backend"));
/// ```
pub fn looks_like_dsl(text: &str) -> bool {
    let mut lexer = Lexer::new(text);
    let mut previous: Option<Token> = None;

    while let Ok(positioned) = lexer.next_token() {
        let token = positioned.token;
        let found = match (&previous, &token) {
            (Some(Token::Field(_)), next) => *next == Token::Colon || next.is_comparator(),
            (Some(Token::Minus), Token::Field(_)) => true,
            _ => false,
        };
        if found {
            return true;
        }
        if token == Token::Eof {
            break;
        }
        previous = Some(token);
    }
    false
}

/// Interprets search text against a project repository.
///
/// # Example
///
/// ```
/// use taskq_query::engine::{InputKind, QueryEngine};
/// use taskq_query::repository::{MemoryProjects, Project};
///
/// let projects = MemoryProjects::new(vec![Project::new("p1", "Backend")]);
/// let engine = QueryEngine::new(&projects);
///
/// let result = engine.interpret("@backend login bug").unwrap();
/// assert_eq!(result.kind, InputKind::Text);
/// assert_eq!(result.filter.project_id.as_deref(), Some("p1"));
/// assert_eq!(result.filter.search_query.as_deref(), Some("login bug"));
/// ```
pub struct QueryEngine<'a, R: ?Sized, Tz: TimeZone = Local> {
    converter: Converter<'a, R, Tz>,
}

impl<'a, R: ProjectRepository + ?Sized> QueryEngine<'a, R, Local> {
    /// Creates an engine with default options and the local clock.
    pub fn new(repo: &'a R) -> Self {
        Self {
            converter: Converter::new(repo),
        }
    }
}

impl<'a, R: ProjectRepository + ?Sized, Tz: TimeZone> QueryEngine<'a, R, Tz> {
    /// Replaces the conversion options.
    pub fn with_options(self, options: ConvertOptions) -> Self {
        Self {
            converter: self.converter.with_options(options),
        }
    }

    /// Resolves relative dates against `now`.
    pub fn at<Tz2: TimeZone>(self, now: DateTime<Tz2>) -> QueryEngine<'a, R, Tz2> {
        QueryEngine {
            converter: self.converter.at(now),
        }
    }

    /// Turns `text` into a filter.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Lex`](crate::QueryError::Lex) if the text uses
    /// query syntax but cannot be tokenized. Clause-level problems do not
    /// fail the call; they are listed in the [`Interpretation`].
    pub fn interpret(&self, text: &str) -> Result<Interpretation> {
        if looks_like_dsl(text) {
            tracing::debug!(text, "interpreting as query");
            let query = QueryParser::parse_str(text)?;
            let conversion = self.converter.convert(&query);
            Ok(Interpretation {
                kind: InputKind::Query,
                filter: conversion.filter,
                parse_errors: query.errors,
                convert_errors: conversion.errors,
            })
        } else {
            tracing::debug!(text, "interpreting as search text");
            let conversion = self.converter.convert_mentions(&extract_mentions(text));
            Ok(Interpretation {
                kind: InputKind::Text,
                filter: conversion.filter,
                parse_errors: Vec::new(),
                convert_errors: conversion.errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::TaskStatus;
    use crate::query::LexError;
    use crate::repository::{MemoryProjects, Project};
    use crate::QueryError;

    fn projects() -> MemoryProjects {
        MemoryProjects::new(vec![
            Project::new("p1", "Backend"),
            Project::new("p2", "Frontend"),
        ])
    }

    // ==================== Detection ====================

    #[test]
    fn test_detects_field_operators() {
        for text in [
            "status:pending",
            "priority=high",
            "due<today",
            "due>=-7d",
            "status!=done",
            "fix bug tag:ui",
            "STATUS:done",
        ] {
            assert!(looks_like_dsl(text), "{text}");
        }
    }

    #[test]
    fn test_detects_negation() {
        assert!(looks_like_dsl("-tag wontfix"));
    }

    #[test]
    fn test_plain_text_is_not_dsl() {
        for text in [
            "",
            "fix login bug",
            "@backend deploy",
            "update the status page",
            "status report",
            "-foo:bar",
            "project - tag",
            "11:30 standup",
        ] {
            assert!(!looks_like_dsl(text), "{text}");
        }
    }

    #[test]
    fn test_detection_before_lexer_failure() {
        assert!(looks_like_dsl("status:\"pending"));
        assert!(!looks_like_dsl("fix \"login"));
        assert!(!looks_like_dsl("wow! tag:x"));
    }

    // ==================== Interpretation ====================

    #[test]
    fn test_interpret_query() {
        let repo = projects();
        let result = QueryEngine::new(&repo)
            .interpret("status:pending @frontend")
            .unwrap();

        assert_eq!(result.kind, InputKind::Query);
        assert_eq!(result.filter.status, Some(TaskStatus::Pending));
        assert_eq!(result.filter.project_id.as_deref(), Some("p2"));
        assert!(!result.has_errors());
    }

    #[test]
    fn test_interpret_text_with_fuzzy_mention() {
        let repo = projects();
        let result = QueryEngine::new(&repo)
            .interpret("@~back  flaky tests")
            .unwrap();

        assert_eq!(result.kind, InputKind::Text);
        assert_eq!(result.filter.project_id.as_deref(), Some("p1"));
        assert_eq!(result.filter.search_query.as_deref(), Some("flaky tests"));
    }

    #[test]
    fn test_interpret_keeps_both_error_lists() {
        let repo = projects();
        let result = QueryEngine::new(&repo)
            .interpret("status:bogus tag: -due:today")
            .unwrap();

        assert_eq!(result.parse_errors.len(), 1);
        assert_eq!(result.convert_errors.len(), 2);
        assert!(result.has_errors());
    }

    #[test]
    fn test_interpret_lexer_failure_is_fatal() {
        let repo = projects();
        let err = QueryEngine::new(&repo)
            .interpret("status:\"pending")
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::Lex(LexError::UnterminatedQuote {
                quote: '"',
                position: 7
            })
        );
    }

    #[test]
    fn test_lexer_error_displays_through_query_error() {
        let err = QueryError::from(LexError::UnterminatedQuote {
            quote: '"',
            position: 7,
        });
        assert_eq!(
            err.to_string(),
            "unterminated quoted value starting at position 7 (missing \")"
        );
    }

    #[test]
    fn test_bad_dates_and_projects_are_not_fatal() {
        let repo = projects();
        let result = QueryEngine::new(&repo)
            .interpret("due:someday project:Nowhere tag:ops")
            .unwrap();

        assert_eq!(result.convert_errors.len(), 2);
        assert_eq!(result.filter.tags, vec!["ops".to_string()]);
    }

    #[test]
    fn test_interpret_text_ignores_lexer_problems() {
        let repo = projects();
        let result = QueryEngine::new(&repo).interpret("what's up!").unwrap();
        assert_eq!(result.kind, InputKind::Text);
        assert_eq!(result.filter.search_query.as_deref(), Some("what's up!"));
    }
}
