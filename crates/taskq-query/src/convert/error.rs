//! Error types for filter conversion.

use std::fmt;

use thiserror::Error;

use crate::date::DateError;
use crate::query::{Field, FilterClause, Operator};
use crate::repository::RepositoryError;

/// Why a single clause could not be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The value is not one of the field's keywords.
    #[error("invalid {field} '{value}' (expected one of: {expected}){}", did_you_mean(.suggestion))]
    InvalidValue {
        field: Field,
        value: String,
        /// Accepted keywords, comma separated.
        expected: String,
        /// Closest accepted keyword, if one is close enough.
        suggestion: Option<String>,
    },

    /// The operator has no meaning for the field.
    #[error("operator '{operator}' is not supported for {field} (use ':' or '=')")]
    UnsupportedOperator { field: Field, operator: Operator },

    /// The `-field:value` form on a field other than `tag`.
    #[error("negating '{field}' is not supported yet")]
    NegationUnsupported { field: Field },

    /// No project has this name or alias.
    #[error("project '{name}' not found by name or alias{}", did_you_mean(.suggestion))]
    ProjectNotFound {
        name: String,
        suggestion: Option<String>,
    },

    /// Fuzzy project search returned nothing.
    #[error("no project matches '~{name}'")]
    NoFuzzyMatch { name: String },

    /// A tag value that is empty after trimming.
    #[error("tag name cannot be empty")]
    EmptyTag,

    /// A date field value that could not be parsed.
    #[error("invalid {field} filter: {source}")]
    InvalidDate {
        field: Field,
        #[source]
        source: DateError,
    },

    /// The project repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(". Did you mean '{s}'?"),
        None => String::new(),
    }
}

impl FieldError {
    /// Creates a project not found error.
    pub fn project_not_found(name: impl Into<String>, suggestion: Option<String>) -> Self {
        FieldError::ProjectNotFound {
            name: name.into(),
            suggestion,
        }
    }

    /// Creates a fuzzy project search error.
    pub fn no_fuzzy_match(name: impl Into<String>) -> Self {
        FieldError::NoFuzzyMatch { name: name.into() }
    }
}

/// A clause together with the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseError {
    pub clause: FilterClause,
    pub error: FieldError,
}

impl fmt::Display for ClauseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.clause, self.error)
    }
}

impl std::error::Error for ClauseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Every clause that failed during one conversion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{} of the query's clauses could not be applied: {}", .errors.len(), join(.errors))]
pub struct ConvertError {
    /// Failures in clause order.
    pub errors: Vec<ClauseError>,
}

fn join(errors: &[ClauseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
