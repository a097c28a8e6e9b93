//! Lexer and parser for the task query language.
//!
//! A query is a single line of `field:value` clauses, implicitly combined
//! with AND.
//!
//! # Supported Syntax
//!
//! ## Fields
//! - `status:pending`, `priority=high`
//! - `project:backend`, `tag:bug`
//! - `due:<2025-01-15`, `created:>=-7d`, `updated:2025-01-01..2025-01-31`
//!
//! ## Operators
//! - `:` and `=` - exact match (interchangeable)
//! - `<`, `<=`, `>`, `>=` - date comparisons
//! - `!=` - reserved
//!
//! ## Negation
//! - `-tag:wontfix` - a leading `-` directly in front of a field
//!
//! ## Project Mentions
//! - `@backend` - exact project
//! - `@~bknd` - fuzzy project
//!
//! ## Quoting
//! - `project:"My Project"` or `'...'`; `\"` escapes the opening quote
//!
//! ## Reserved
//! - `AND`, `OR`, `NOT`, `|`, `(`, `)` are recognized by the lexer but have
//!   no meaning to the parser.
//!
//! # Example
//!
//! ```
//! use taskq_query::query::{tokenize, parse, Field, Operator};
//!
//! let tokens = tokenize("due:<2025-01-15 @~backend").unwrap();
//! let query = parse(tokens);
//!
//! assert!(query.errors.is_empty());
//! assert_eq!(query.clauses[0].field, Field::Due);
//! assert_eq!(query.clauses[0].operator, Operator::Lt);
//! assert!(query.clauses[1].fuzzy);
//! ```

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{Field, FilterClause, Operator, ParseError, ParsedQuery};
pub use error::{LexError, LexResult, UnknownField};
pub use lexer::{tokenize, Lexer, PositionedToken, Token};
pub use parser::{parse, QueryParser};

#[cfg(test)]
mod tests;
