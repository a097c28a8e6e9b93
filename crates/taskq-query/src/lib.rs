//! Query language and fuzzy matching for a terminal task manager.
//!
//! This crate turns one line of search-box text into a [`TaskFilter`]:
//!
//! - [`query`]: lexer and parser for `field:value` queries
//! - [`date`]: date values and day-granular ranges
//! - [`mention`]: `@project` mentions in plain text
//! - [`fuzzy`]: subsequence scoring used for project search
//! - [`convert`]: clauses to filter, resolving projects through a
//!   [`ProjectRepository`]
//! - [`engine`]: picks the query or plain-text path and runs it
//!
//! # Example
//!
//! ```
//! use taskq_query::convert::Priority;
//! use taskq_query::engine::QueryEngine;
//! use taskq_query::repository::{MemoryProjects, Project};
//!
//! let projects = MemoryProjects::new(vec![
//!     Project::new("p1", "Backend").with_alias("api"),
//! ]);
//! let engine = QueryEngine::new(&projects);
//!
//! let result = engine.interpret("priority:high @api due:<=tomorrow").unwrap();
//! assert!(!result.has_errors());
//! assert_eq!(result.filter.priority, Some(Priority::High));
//! assert_eq!(result.filter.project_id.as_deref(), Some("p1"));
//! ```

use thiserror::Error;

pub mod convert;
pub mod date;
pub mod engine;
pub mod fuzzy;
pub mod mention;
pub mod query;
pub mod repository;

pub use convert::{Converter, TaskFilter};
pub use engine::{looks_like_dsl, Interpretation, QueryEngine};
pub use repository::{MemoryProjects, Project, ProjectRepository};

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Fatal errors from query processing.
///
/// Per-clause problems are not fatal; they are returned alongside the
/// filter in an [`Interpretation`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryError {
    /// The input could not be tokenized.
    #[error(transparent)]
    Lex(#[from] query::LexError),
}
