//! Integration tests for the full text-to-filter pipeline.
//!
//! These go through the public API only: tokenize, parse, convert and the
//! engine, against both the in-memory repository and a custom one.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

use taskq_query::convert::{ConvertOptions, FieldError, Priority, SearchMode, TaskStatus};
use taskq_query::date::DateCondition;
use taskq_query::engine::InputKind;
use taskq_query::fuzzy::match_many;
use taskq_query::query::{tokenize, Field, Operator, QueryParser, Token};
use taskq_query::repository::RepositoryResult;
use taskq_query::{Converter, MemoryProjects, Project, ProjectRepository, QueryEngine, QueryError};

const PROJECTS_JSON: &str = r#"[
    {"id": "1", "name": "Backend", "aliases": ["be", "api"]},
    {"id": "2", "name": "Frontend", "aliases": ["fe"]},
    {"id": "3", "name": "Infrastructure"},
    {"id": "4", "name": "Home Renovation", "aliases": ["house"]}
]"#;

fn load_projects() -> MemoryProjects {
    let projects: Vec<Project> =
        serde_json::from_str(PROJECTS_JSON).expect("projects fixture is valid JSON");
    MemoryProjects::new(projects)
}

/// Tuesday 2025-03-04 09:00 in New York.
fn now() -> DateTime<Tz> {
    New_York
        .with_ymd_and_hms(2025, 3, 4, 9, 0, 0)
        .single()
        .expect("valid fixture time")
}

/// Projects keyed by id, looked up case-sensitively.
struct ById(HashMap<String, Project>);

impl ProjectRepository for ById {
    fn get_by_name(&self, name: &str) -> RepositoryResult<Option<Project>> {
        Ok(self.0.values().find(|p| p.name == name).cloned())
    }

    fn get_by_alias(&self, alias: &str) -> RepositoryResult<Option<Project>> {
        Ok(self.0.get(alias).cloned())
    }

    fn search(&self, _text: &str, _limit: usize) -> RepositoryResult<Vec<Project>> {
        Ok(Vec::new())
    }
}

// ============================================================================
// Tokens and Clauses
// ============================================================================

#[test]
fn test_tokenize_simple_filter() {
    let tokens: Vec<Token> = tokenize("status:pending")
        .expect("tokenizes")
        .into_iter()
        .map(|t| t.token)
        .collect();

    assert_eq!(
        tokens,
        vec![
            Token::Field(Field::Status),
            Token::Colon,
            Token::Value("pending".to_string()),
            Token::Eof,
        ]
    );
}

#[test]
fn test_unterminated_quote_is_fatal() {
    assert!(tokenize("status:\"pending").is_err());
    assert!(QueryParser::parse_str("status:\"pending").is_err());
}

#[test]
fn test_five_clause_query() {
    let query = QueryParser::parse_str("status:pending priority:high @backend tag:bug -tag:wontfix")
        .expect("tokenizes");

    let fields: Vec<Field> = query.clauses.iter().map(|c| c.field).collect();
    assert_eq!(
        fields,
        vec![
            Field::Status,
            Field::Priority,
            Field::Project,
            Field::Tag,
            Field::Tag
        ]
    );
    assert!(query.clauses[4].negated);
}

// ============================================================================
// Engine
// ============================================================================

#[test]
fn test_engine_full_query() {
    let projects = load_projects();
    let engine = QueryEngine::new(&projects).at(now());

    let result = engine
        .interpret("status:in_progress priority:urgent @be tag:bug -tag:wontfix due:<=+1w")
        .expect("no lexer failure");

    assert_eq!(result.kind, InputKind::Query);
    assert!(!result.has_errors(), "{result:?}");

    let filter = result.filter;
    assert_eq!(filter.status, Some(TaskStatus::InProgress));
    assert_eq!(filter.priority, Some(Priority::Urgent));
    assert_eq!(filter.project_id.as_deref(), Some("1"));
    assert_eq!(filter.tags, vec!["bug"]);
    assert_eq!(filter.exclude_tags, vec!["wontfix"]);

    let to = filter.due.upper_bound().expect("upper bound");
    assert_eq!(
        to.naive_local(),
        NaiveDate::from_ymd_opt(2025, 3, 11)
            .unwrap()
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap()
    );
    // DST starts in New York on 2025-03-09
    assert_eq!(to.offset().local_minus_utc(), -4 * 3600);
}

#[test]
fn test_engine_plain_text() {
    let projects = load_projects();
    let options = ConvertOptions {
        search_mode: SearchMode::Fuzzy,
        ..ConvertOptions::default()
    };
    let engine = QueryEngine::new(&projects).with_options(options).at(now());

    let result = engine
        .interpret("  paint   walls @~reno ")
        .expect("no lexer failure");

    assert_eq!(result.kind, InputKind::Text);
    assert_eq!(result.filter.project_id.as_deref(), Some("4"));
    assert_eq!(result.filter.search_query.as_deref(), Some("paint walls"));
    assert_eq!(result.filter.search_mode, SearchMode::Fuzzy);
}

#[test]
fn test_engine_partial_results() {
    let projects = load_projects();
    let engine = QueryEngine::new(&projects).at(now());

    let result = engine
        .interpret("due:none status:waiting priority:<> tag:ops")
        .expect("no lexer failure");

    assert_eq!(result.filter.due, DateCondition::Missing);
    assert_eq!(result.filter.tags, vec!["ops"]);
    assert!(result.filter.status.is_none());
    assert_eq!(result.parse_errors.len(), 1);
    assert_eq!(result.convert_errors.len(), 1);
    assert_eq!(result.convert_errors[0].clause.field, Field::Status);
}

#[test]
fn test_engine_lexer_failure() {
    let projects = load_projects();
    let err = QueryEngine::new(&projects)
        .interpret("tag:ok # status:x")
        .expect_err("'#' is not a token");
    assert!(matches!(err, QueryError::Lex(_)));
    assert!(err.to_string().contains("'#'"));
}

// ============================================================================
// Custom Repository
// ============================================================================

#[test]
fn test_custom_repository_is_used_for_lookups() {
    let repo = ById(HashMap::from([(
        "p-42".to_string(),
        Project::new("p-42", "Research"),
    )]));

    let query = QueryParser::parse_str("project:Research @p-42 @~res").expect("tokenizes");
    let conversion = Converter::new(&repo).at(now()).convert(&query);

    assert_eq!(conversion.filter.project_id.as_deref(), Some("p-42"));
    assert_eq!(conversion.errors.len(), 1);
    assert_eq!(conversion.errors[0].error, FieldError::no_fuzzy_match("res"));
    assert_eq!(conversion.errors[0].clause.operator, Operator::Colon);
}

#[test]
fn test_trait_object_repository() {
    let projects = load_projects();
    let repo: &dyn ProjectRepository = &projects;

    let query = QueryParser::parse_str("@house").expect("tokenizes");
    let filter = Converter::new(repo)
        .convert(&query)
        .into_result()
        .expect("converts");
    assert_eq!(filter.project_id.as_deref(), Some("4"));
}

// ============================================================================
// Fuzzy Matching
// ============================================================================

#[test]
fn test_match_many_over_project_names() {
    let projects = load_projects();
    let names: Vec<&str> = projects.projects().iter().map(|p| p.name.as_str()).collect();

    let results = match_many("fr", &names, 40);
    assert_eq!(results[0].text, "Frontend");
    assert_eq!(results[0].index, 1);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}
