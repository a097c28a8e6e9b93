//! Tests for the query parser.

use super::*;

fn parse_str(input: &str) -> ParsedQuery {
    QueryParser::parse_str(input).unwrap()
}

fn clause(field: Field, operator: Operator, value: &str) -> FilterClause {
    FilterClause::new(field, operator, value)
}

// ==================== Empty Input ====================

#[test]
fn test_parse_empty() {
    let query = parse_str("");
    assert!(query.clauses.is_empty());
    assert!(query.errors.is_empty());
    assert!(query.is_empty());
}

#[test]
fn test_parse_whitespace_only() {
    let query = parse_str("   ");
    assert!(query.clauses.is_empty());
    assert!(query.errors.is_empty());
}

#[test]
fn test_parser_appends_missing_eof() {
    let mut tokens = tokenize("tag:bug").unwrap();
    tokens.pop();
    let query = parse(tokens);
    assert_eq!(query.clauses, vec![clause(Field::Tag, Operator::Colon, "bug")]);
}

// ==================== Field Filters ====================

#[test]
fn test_parse_field_colon_value() {
    let query = parse_str("status:pending");
    assert_eq!(
        query.clauses,
        vec![clause(Field::Status, Operator::Colon, "pending")]
    );
}

#[test]
fn test_parse_field_equals_value() {
    let query = parse_str("priority=high");
    assert_eq!(
        query.clauses,
        vec![clause(Field::Priority, Operator::Eq, "high")]
    );
}

#[test]
fn test_parse_comparator_with_and_without_colon() {
    let query = parse_str("due:<2025-01-15 due<2025-02-01");
    assert_eq!(
        query.clauses,
        vec![
            clause(Field::Due, Operator::Lt, "2025-01-15"),
            clause(Field::Due, Operator::Lt, "2025-02-01"),
        ]
    );
}

#[test]
fn test_parse_inclusive_comparators() {
    let query = parse_str("due:<=today created>=-7d");
    assert_eq!(
        query.clauses,
        vec![
            clause(Field::Due, Operator::Le, "today"),
            clause(Field::Created, Operator::Ge, "-7d"),
        ]
    );
}

#[test]
fn test_parse_separated_equals_is_not_inclusive() {
    // "< =" is a strict comparator followed by a stray '='
    let query = parse_str("due:< =today");
    assert!(query.clauses.is_empty());
    assert_eq!(query.errors.len(), 1);
    assert_eq!(query.errors[0].position, 6);
}

#[test]
fn test_parse_not_equals() {
    let query = parse_str("status!=done");
    assert_eq!(
        query.clauses,
        vec![clause(Field::Status, Operator::Ne, "done")]
    );
}

#[test]
fn test_parse_field_keyword_as_value() {
    let query = parse_str("project:status");
    assert_eq!(
        query.clauses,
        vec![clause(Field::Project, Operator::Colon, "status")]
    );
}

#[test]
fn test_parse_number_as_value() {
    let query = parse_str("tag:2025");
    assert_eq!(
        query.clauses,
        vec![clause(Field::Tag, Operator::Colon, "2025")]
    );
}

#[test]
fn test_parse_quoted_value() {
    let query = parse_str("project:\"Home Renovation\"");
    assert_eq!(
        query.clauses,
        vec![clause(Field::Project, Operator::Colon, "Home Renovation")]
    );
}

#[test]
fn test_parse_field_case_insensitive() {
    let query = parse_str("STATUS:Pending");
    assert_eq!(
        query.clauses,
        vec![clause(Field::Status, Operator::Colon, "Pending")]
    );
}

// ==================== Mentions ====================

#[test]
fn test_parse_mention() {
    let query = parse_str("@backend");
    assert_eq!(query.clauses, vec![FilterClause::mention("backend", false)]);
}

#[test]
fn test_parse_fuzzy_mention() {
    let query = parse_str("@~backend");
    assert_eq!(query.clauses.len(), 1);
    let c = &query.clauses[0];
    assert_eq!(c.field, Field::Project);
    assert_eq!(c.operator, Operator::Colon);
    assert_eq!(c.value, "backend");
    assert!(c.fuzzy);
    assert!(!c.negated);
}

#[test]
fn test_parse_mention_accepts_field_and_number() {
    let query = parse_str("@tag @42");
    assert_eq!(
        query.clauses,
        vec![
            FilterClause::mention("tag", false),
            FilterClause::mention("42", false)
        ]
    );
}

#[test]
fn test_parse_mention_without_name() {
    let query = parse_str("@ : status:done");
    assert_eq!(query.errors.len(), 1);
    assert_eq!(query.errors[0].position, 2);
    // Recovery resumes at the field keyword
    assert_eq!(
        query.clauses,
        vec![clause(Field::Status, Operator::Colon, "done")]
    );
}

// ==================== Negation ====================

#[test]
fn test_parse_negated_tag() {
    let query = parse_str("-tag:wontfix");
    assert_eq!(query.clauses.len(), 1);
    let c = &query.clauses[0];
    assert_eq!(c.field, Field::Tag);
    assert_eq!(c.value, "wontfix");
    assert!(c.negated);
    assert!(!c.fuzzy);
}

#[test]
fn test_parse_negated_requires_colon() {
    let query = parse_str("-tag=wontfix");
    assert!(query.clauses.is_empty());
    assert_eq!(query.errors.len(), 1);
    assert_eq!(query.errors[0].position, 4);
    assert!(query.errors[0].message.contains("must use ':'"));
}

#[test]
fn test_parse_negated_rejects_comparator() {
    let query = parse_str("-due:<today");
    assert!(query.clauses.is_empty());
    assert_eq!(query.errors.len(), 1);
    assert_eq!(query.errors[0].position, 5);
}

#[test]
fn test_parse_negated_requires_field() {
    let query = parse_str("-foo:bar tag:ok");
    assert_eq!(query.errors.len(), 1);
    assert_eq!(query.errors[0].position, 1);
    assert_eq!(query.clauses, vec![clause(Field::Tag, Operator::Colon, "ok")]);
}

// ==================== Combined ====================

#[test]
fn test_parse_full_query_keeps_order() {
    let query = parse_str("status:pending priority:high @backend tag:bug -tag:wontfix");
    assert!(query.errors.is_empty());

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

    let (bug, wontfix) = (&query.clauses[3], &query.clauses[4]);
    assert!(!bug.negated);
    assert!(wontfix.negated);
    assert_eq!(bug.operator, wontfix.operator);
    assert_eq!(bug.fuzzy, wontfix.fuzzy);
}

#[test]
fn test_parse_clauses_for() {
    let query = parse_str("tag:a status:done tag:b");
    let tags: Vec<&str> = query
        .clauses_for(Field::Tag)
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(tags, vec!["a", "b"]);
}

// ==================== Skipping and Recovery ====================

#[test]
fn test_parse_skips_stray_tokens_without_error() {
    let query = parse_str("fix login ( AND ) | : status:done");
    assert!(query.errors.is_empty());
    assert_eq!(
        query.clauses,
        vec![clause(Field::Status, Operator::Colon, "done")]
    );
    assert_eq!(query.free_text, vec!["fix", "login"]);
}

#[test]
fn test_parse_boolean_keywords_are_not_combinators() {
    let query = parse_str("tag:a OR tag:b");
    assert!(query.errors.is_empty());
    assert_eq!(
        query.clauses,
        vec![
            clause(Field::Tag, Operator::Colon, "a"),
            clause(Field::Tag, Operator::Colon, "b")
        ]
    );
}

#[test]
fn test_parse_missing_operator() {
    let query = parse_str("status pending");
    assert!(query.clauses.is_empty());
    assert_eq!(query.errors.len(), 1);
    assert_eq!(query.errors[0].position, 7);
    assert!(query.errors[0].message.contains("expected ':'"));
}

#[test]
fn test_parse_missing_value_at_end() {
    let query = parse_str("tag:");
    assert_eq!(query.errors.len(), 1);
    assert_eq!(query.errors[0].position, 4);
    assert!(query.errors[0].message.contains("end of input"));
}

#[test]
fn test_parse_keeps_clauses_around_failure() {
    let query = parse_str("status:pending priority:<> junk tag:bug");
    assert_eq!(
        query.clauses,
        vec![
            clause(Field::Status, Operator::Colon, "pending"),
            clause(Field::Tag, Operator::Colon, "bug"),
        ]
    );
    assert_eq!(query.errors.len(), 1);
    // Fails at '>' after '<' was taken as the comparator
    assert_eq!(query.errors[0].position, 25);
    // "junk" is consumed by recovery, not recorded as free text
    assert!(query.free_text.is_empty());
}

#[test]
fn test_parse_multiple_errors_in_order() {
    let query = parse_str("status due: @");
    assert!(query.clauses.is_empty());
    let positions: Vec<usize> = query.errors.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![7, 12, 13]);
}

// ==================== Rendering ====================

#[test]
fn test_clause_display() {
    assert_eq!(
        clause(Field::Due, Operator::Le, "today").to_string(),
        "due<=today"
    );
    assert_eq!(
        FilterClause::negated(Field::Tag, "wontfix").to_string(),
        "-tag:wontfix"
    );
    assert_eq!(FilterClause::mention("web app", true).to_string(), "@~\"web app\"");
}

#[test]
fn test_field_from_str() {
    assert_eq!("Due".parse::<Field>().unwrap(), Field::Due);
    let err = "assignee".parse::<Field>().unwrap_err();
    assert_eq!(err.field, "assignee");
    assert!(err.to_string().contains("unknown field 'assignee'"));
}
