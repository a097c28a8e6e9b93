//! Error types for the query lexer.

use thiserror::Error;

/// A specialized Result type for tokenizing.
pub type LexResult<T> = Result<T, LexError>;

/// Fatal tokenizer failures.
///
/// Unlike [`ParseError`](super::ParseError), these abort the whole input: no
/// partial token stream is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    /// A character that cannot start any token.
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Code-point index of the character.
        position: usize,
    },

    /// A quoted value reached the end of input without its closing quote.
    #[error("unterminated quoted value starting at position {position} (missing {quote})")]
    UnterminatedQuote {
        /// The quote character that was opened.
        quote: char,
        /// Code-point index of the opening quote.
        position: usize,
    },
}

impl LexError {
    /// Returns the code-point position the error points at.
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::UnterminatedQuote { position, .. } => *position,
        }
    }
}

/// A field keyword that is not one of the known fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown field '{field}' (expected one of: status, priority, project, tag, due, created, updated)")]
pub struct UnknownField {
    /// The unrecognized name, as written.
    pub field: String,
}

impl UnknownField {
    /// Creates an unknown field error.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}
