//! Parsed representation of a query.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::UnknownField;

/// A filterable task field.
///
/// Field names are matched case-insensitively by the lexer, which always
/// hands the parser the lower-cased spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Status,
    Priority,
    Project,
    Tag,
    Due,
    Created,
    Updated,
}

impl Field {
    /// All fields, in the order they are documented.
    pub const ALL: [Field; 7] = [
        Field::Status,
        Field::Priority,
        Field::Project,
        Field::Tag,
        Field::Due,
        Field::Created,
        Field::Updated,
    ];

    /// Returns the canonical (lower-case) keyword for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Status => "status",
            Field::Priority => "priority",
            Field::Project => "project",
            Field::Tag => "tag",
            Field::Due => "due",
            Field::Created => "created",
            Field::Updated => "updated",
        }
    }

    /// Looks up a field by keyword, ignoring case.
    pub fn from_keyword(word: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_keyword(s).ok_or_else(|| UnknownField::new(s))
    }
}

/// Comparison operator of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    /// `:` - exact match.
    #[serde(rename = ":")]
    Colon,
    /// `=` - exact match, interchangeable with `:`.
    #[serde(rename = "=")]
    Eq,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `<=`
    #[serde(rename = "<=")]
    Le,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `>=`
    #[serde(rename = ">=")]
    Ge,
    /// `!=` - reserved, no field accepts it yet.
    #[serde(rename = "!=")]
    Ne,
}

impl Operator {
    /// Returns the operator as it is written in a query.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Colon => ":",
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Ne => "!=",
        }
    }

    /// Returns true for `:` and `=`.
    pub fn is_exact(self) -> bool {
        matches!(self, Operator::Colon | Operator::Eq)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterClause {
    pub field: Field,
    pub operator: Operator,
    pub value: String,
    /// Set only by the leading `-` form.
    pub negated: bool,
    /// Set only by the `@~name` form.
    pub fuzzy: bool,
}

impl FilterClause {
    /// Creates a plain (non-negated, non-fuzzy) clause.
    pub fn new(field: Field, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
            negated: false,
            fuzzy: false,
        }
    }

    /// Creates a project clause from an `@name` or `@~name` mention.
    pub fn mention(name: impl Into<String>, fuzzy: bool) -> Self {
        Self {
            fuzzy,
            ..Self::new(Field::Project, Operator::Colon, name)
        }
    }

    /// Creates a negated `-field:value` clause.
    pub fn negated(field: Field, value: impl Into<String>) -> Self {
        Self {
            negated: true,
            ..Self::new(field, Operator::Colon, value)
        }
    }
}

impl fmt::Display for FilterClause {
    /// Writes the clause back in query syntax. This is a readable rendering,
    /// not a canonical serialization: quoting is only added around values
    /// containing whitespace.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.value.chars().any(char::is_whitespace) {
            format!("\"{}\"", self.value.replace('"', "\\\""))
        } else {
            self.value.clone()
        };

        if self.field == Field::Project && self.fuzzy {
            return write!(f, "@~{value}");
        }
        if self.negated {
            f.write_str("-")?;
        }
        write!(f, "{}{}{}", self.field, self.operator, value)
    }
}

/// A recoverable error for one clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    pub message: String,
    /// Code-point index of the token the parser was looking at.
    pub position: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Result of parsing a token stream.
///
/// Every clause that parsed is present even when `errors` is non-empty; the
/// caller decides whether a partial query is worth applying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    /// Clauses in the order they appear in the input.
    pub clauses: Vec<FilterClause>,
    /// Errors in the order they were encountered.
    pub errors: Vec<ParseError>,
    /// Bare words that started no clause.
    pub free_text: Vec<String>,
}

impl ParsedQuery {
    /// Returns true if nothing was parsed and nothing failed.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.errors.is_empty() && self.free_text.is_empty()
    }

    /// Returns true if any clause failed to parse.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the clauses for a given field, in input order.
    pub fn clauses_for(&self, field: Field) -> impl Iterator<Item = &FilterClause> {
        self.clauses.iter().filter(move |c| c.field == field)
    }
}
