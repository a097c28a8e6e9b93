//! Recursive descent parser for query text.

use super::ast::{FilterClause, Operator, ParseError, ParsedQuery};
use super::error::LexResult;
use super::lexer::{Lexer, PositionedToken, Token};

/// Result of parsing a single clause.
type ClauseResult = Result<FilterClause, ParseError>;

/// Parser for task queries.
///
/// A query is a flat sequence of clauses that are implicitly combined with
/// AND. The boolean keywords, `|` and parentheses are tokenized but carry no
/// meaning here; like any other token that cannot start a clause they are
/// skipped.
///
/// # Grammar
///
/// ```text
/// query        ::= filter*
/// filter       ::= at_mention | negated | field_filter
/// at_mention   ::= "@" "~"? value
/// negated      ::= "-" field ":" value
/// field_filter ::= field ":"? comparator? value
/// comparator   ::= "<" "="? | ">" "="? | "=" | "!="
/// value        ::= VALUE | NUMBER | field
/// ```
///
/// A `field_filter` needs at least one of the colon and the comparator.
///
/// # Error Recovery
///
/// A clause that fails to parse is recorded as a [`ParseError`] and the
/// parser skips ahead to the next `@`, `-`, field keyword or end of input.
/// Clauses parsed before and after the failure are kept.
///
/// # Example
///
/// ```
/// use taskq_query::query::{Field, QueryParser};
///
/// let query = QueryParser::parse_str("status:pending -tag:wontfix").unwrap();
/// assert_eq!(query.clauses.len(), 2);
/// assert_eq!(query.clauses[1].field, Field::Tag);
/// assert!(query.clauses[1].negated);
/// ```
pub struct QueryParser {
    tokens: Vec<PositionedToken>,
    position: usize,
}

impl QueryParser {
    /// Creates a parser over a token list.
    ///
    /// An end-of-input token is appended if the list does not already end
    /// with one.
    pub fn new(mut tokens: Vec<PositionedToken>) -> Self {
        if tokens.last().map(|pt| &pt.token) != Some(&Token::Eof) {
            let position = tokens.last().map_or(0, |pt| pt.position + 1);
            tokens.push(PositionedToken {
                token: Token::Eof,
                position,
            });
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// Tokenizes and parses `input`.
    ///
    /// # Errors
    ///
    /// Returns the lexer error if `input` cannot be tokenized. Clause-level
    /// problems never fail this call; they are reported in
    /// [`ParsedQuery::errors`].
    pub fn parse_str(input: &str) -> LexResult<ParsedQuery> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self::new(tokens).parse())
    }

    /// Parses every clause in the token list.
    pub fn parse(mut self) -> ParsedQuery {
        let mut query = ParsedQuery::default();

        while !self.at_end() {
            let result = match self.peek() {
                Token::At => self.parse_mention(),
                Token::Minus => self.parse_negated(),
                Token::Field(_) => self.parse_field_filter(),
                Token::Value(word) | Token::Number(word) => {
                    query.free_text.push(word.clone());
                    self.advance();
                    continue;
                }
                other => {
                    tracing::debug!(
                        token = %other,
                        position = self.current_position(),
                        "skipping token outside a clause"
                    );
                    self.advance();
                    continue;
                }
            };

            match result {
                Ok(clause) => query.clauses.push(clause),
                Err(error) => {
                    tracing::debug!(%error, "clause failed to parse");
                    query.errors.push(error);
                    self.synchronize();
                }
            }
        }

        query
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.position)
            .map_or(&Token::Eof, |pt| &pt.token)
    }

    /// Returns the position of the current token.
    fn current_position(&self) -> usize {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map_or(0, |pt| pt.position)
    }

    /// Consumes the current token. Never moves past end of input.
    fn advance(&mut self) {
        if !self.at_end() {
            self.position += 1;
        }
    }

    /// Checks if the current token matches the expected token.
    fn check(&self, expected: &Token) -> bool {
        self.peek() == expected
    }

    fn at_end(&self) -> bool {
        self.check(&Token::Eof)
    }

    /// Builds an error pointing at the current token.
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.current_position(),
        }
    }

    /// Skips tokens until one that can start a clause.
    fn synchronize(&mut self) {
        while !matches!(
            self.peek(),
            Token::At | Token::Minus | Token::Field(_) | Token::Eof
        ) {
            self.advance();
        }
    }

    /// Parses `"@" "~"? value`.
    fn parse_mention(&mut self) -> ClauseResult {
        self.advance(); // consume '@'

        let fuzzy = self.check(&Token::Tilde);
        if fuzzy {
            self.advance(); // consume '~'
        }

        let name = self.expect_value("a project name after '@'")?;
        Ok(FilterClause::mention(name, fuzzy))
    }

    /// Parses `"-" field ":" value`.
    fn parse_negated(&mut self) -> ClauseResult {
        self.advance(); // consume '-'

        let Token::Field(field) = *self.peek() else {
            return Err(self.error(format!(
                "expected a field name after '-', found {}",
                self.peek()
            )));
        };
        self.advance();

        if !self.check(&Token::Colon) {
            return Err(self.error(format!(
                "negated filter on '{field}' must use ':', found {}",
                self.peek()
            )));
        }
        self.advance(); // consume ':'

        if self.is_comparator() {
            return Err(self.error(format!(
                "negated filter on '{field}' only supports ':', found {}",
                self.peek()
            )));
        }

        let value = self.expect_value(&format!("a value for '-{field}'"))?;
        Ok(FilterClause::negated(field, value))
    }

    /// Parses `field ":"? comparator? value`.
    fn parse_field_filter(&mut self) -> ClauseResult {
        let Token::Field(field) = *self.peek() else {
            return Err(self.error(format!("expected a field name, found {}", self.peek())));
        };
        self.advance();

        let has_colon = self.check(&Token::Colon);
        if has_colon {
            self.advance(); // consume ':'
        }

        let operator = match self.parse_comparator() {
            Some(op) => op,
            None if has_colon => Operator::Colon,
            None => {
                return Err(self.error(format!(
                    "expected ':' or an operator after '{field}', found {}",
                    self.peek()
                )))
            }
        };

        let value = self.expect_value(&format!("a value for '{field}'"))?;
        Ok(FilterClause::new(field, operator, value))
    }

    fn is_comparator(&self) -> bool {
        self.peek().is_comparator()
    }

    /// Consumes a comparator if one is next.
    ///
    /// `<` and `>` directly followed by `=` (no whitespace between) are read
    /// as `<=` and `>=`.
    fn parse_comparator(&mut self) -> Option<Operator> {
        let (strict, inclusive) = match self.peek() {
            Token::LessThan => (Operator::Lt, Operator::Le),
            Token::GreaterThan => (Operator::Gt, Operator::Ge),
            Token::Equals => {
                self.advance();
                return Some(Operator::Eq);
            }
            Token::NotEquals => {
                self.advance();
                return Some(Operator::Ne);
            }
            _ => return None,
        };

        let start = self.current_position();
        self.advance();
        if self.check(&Token::Equals) && self.current_position() == start + 1 {
            self.advance();
            return Some(inclusive);
        }
        Some(strict)
    }

    /// Consumes a value token. Field keywords are accepted as literal values.
    fn expect_value(&mut self, what: &str) -> Result<String, ParseError> {
        let value = match self.peek() {
            Token::Value(s) | Token::Number(s) => s.clone(),
            Token::Field(field) => field.as_str().to_string(),
            other => return Err(self.error(format!("expected {what}, found {other}"))),
        };
        self.advance();
        Ok(value)
    }
}

/// Parses a token list. Shorthand for `QueryParser::new(tokens).parse()`.
pub fn parse(tokens: Vec<PositionedToken>) -> ParsedQuery {
    QueryParser::new(tokens).parse()
}
