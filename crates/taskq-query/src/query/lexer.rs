//! Lexer (tokenizer) for query text.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::ast::Field;
use super::error::{LexError, LexResult};

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    /// The token.
    pub token: Token,
    /// The code-point index where the token starts (0-indexed).
    pub position: usize,
}

/// A token in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // ==================== Words ====================
    /// One of the known field keywords.
    Field(Field),

    /// A bare or quoted value, original casing preserved.
    Value(String),

    /// A run made only of ASCII digits.
    Number(String),

    // ==================== Punctuation ====================
    /// `:`
    Colon,

    /// `@`
    At,

    /// `~`
    Tilde,

    /// `-` directly followed by a letter.
    Minus,

    /// `<`
    LessThan,

    /// `>`
    GreaterThan,

    /// `=`
    Equals,

    /// `!=`
    NotEquals,

    /// `|`
    Pipe,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    // ==================== Reserved Keywords ====================
    /// `AND`, spelled as written.
    And(String),

    /// `OR`, spelled as written.
    Or(String),

    /// `NOT`, spelled as written.
    Not(String),

    /// Always the last token.
    Eof,
}

impl Token {
    /// Returns the source text this token stands for.
    pub fn text(&self) -> &str {
        match self {
            Token::Field(field) => field.as_str(),
            Token::Value(s) | Token::Number(s) => s,
            Token::And(s) | Token::Or(s) | Token::Not(s) => s,
            Token::Colon => ":",
            Token::At => "@",
            Token::Tilde => "~",
            Token::Minus => "-",
            Token::LessThan => "<",
            Token::GreaterThan => ">",
            Token::Equals => "=",
            Token::NotEquals => "!=",
            Token::Pipe => "|",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Eof => "",
        }
    }

    /// Returns a short name for the kind of token.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Field(_) => "field",
            Token::Value(_) => "value",
            Token::Number(_) => "number",
            Token::Colon => "colon",
            Token::At => "at",
            Token::Tilde => "tilde",
            Token::Minus => "minus",
            Token::LessThan => "less_than",
            Token::GreaterThan => "greater_than",
            Token::Equals => "equals",
            Token::NotEquals => "not_equals",
            Token::Pipe => "pipe",
            Token::OpenParen => "open_paren",
            Token::CloseParen => "close_paren",
            Token::And(_) => "and",
            Token::Or(_) => "or",
            Token::Not(_) => "not",
            Token::Eof => "eof",
        }
    }

    /// Returns true for `<`, `>`, `=` and `!=`.
    pub fn is_comparator(&self) -> bool {
        matches!(
            self,
            Token::LessThan | Token::GreaterThan | Token::Equals | Token::NotEquals
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => f.write_str("end of input"),
            Token::Field(field) => write!(f, "field '{field}'"),
            Token::Value(s) => write!(f, "value '{s}'"),
            Token::Number(s) => write!(f, "number '{s}'"),
            other => write!(f, "'{}'", other.text()),
        }
    }
}

/// Returns true for characters that may appear in a bare word.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')
}

/// Lexer for tokenizing query text.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current code-point position in the input string.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Peeks one character past [`peek`](Self::peek).
    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.next_char();
        }
    }

    /// Reads a maximal run of word characters.
    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if !is_word_char(c) {
                break;
            }
            word.push(c);
            self.next_char();
        }
        word
    }

    /// Reads a quoted value. The opening quote has not been consumed yet.
    ///
    /// A backslash escapes the quote character that opened the value; any
    /// other backslash is kept as is.
    fn read_quoted(&mut self, quote: char, start: usize) -> LexResult<String> {
        self.next_char();

        let mut value = String::new();
        loop {
            match self.next_char() {
                None => {
                    return Err(LexError::UnterminatedQuote {
                        quote,
                        position: start,
                    })
                }
                Some('\\') if self.peek() == Some(quote) => {
                    self.next_char();
                    value.push(quote);
                }
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
            }
        }
    }

    /// Classifies a bare word.
    fn classify(word: String) -> Token {
        match word.to_lowercase().as_str() {
            "and" => Token::And(word),
            "or" => Token::Or(word),
            "not" => Token::Not(word),
            lower => {
                if let Some(field) = Field::from_keyword(lower) {
                    Token::Field(field)
                } else if word.chars().all(|c| c.is_ascii_digit()) {
                    Token::Number(word)
                } else {
                    Token::Value(word)
                }
            }
        }
    }

    /// Consumes one character and returns `token` positioned at `start`.
    fn single(&mut self, token: Token, start: usize) -> PositionedToken {
        self.next_char();
        PositionedToken {
            token,
            position: start,
        }
    }

    /// Returns the next token with its position.
    ///
    /// Returns [`Token::Eof`] once the input is exhausted; callers stop there.
    pub fn next_token(&mut self) -> LexResult<PositionedToken> {
        self.skip_whitespace();

        let start = self.position;
        let Some(c) = self.peek() else {
            return Ok(PositionedToken {
                token: Token::Eof,
                position: start,
            });
        };

        let token = match c {
            ':' => self.single(Token::Colon, start),
            '@' => self.single(Token::At, start),
            '~' => self.single(Token::Tilde, start),
            '<' => self.single(Token::LessThan, start),
            '>' => self.single(Token::GreaterThan, start),
            '=' => self.single(Token::Equals, start),
            '|' => self.single(Token::Pipe, start),
            '(' => self.single(Token::OpenParen, start),
            ')' => self.single(Token::CloseParen, start),

            // Only valid as the first half of `!=`
            '!' => {
                if self.peek_second() != Some('=') {
                    return Err(LexError::UnexpectedCharacter {
                        character: '!',
                        position: start,
                    });
                }
                self.next_char();
                self.single(Token::NotEquals, start)
            }

            // Negation prefix, but only directly in front of a word
            '-' if self.peek_second().is_some_and(char::is_alphabetic) => {
                self.single(Token::Minus, start)
            }

            '"' | '\'' => PositionedToken {
                token: Token::Value(self.read_quoted(c, start)?),
                position: start,
            },

            _ if is_word_char(c) => PositionedToken {
                token: Self::classify(self.read_word()),
                position: start,
            },

            _ => {
                return Err(LexError::UnexpectedCharacter {
                    character: c,
                    position: start,
                })
            }
        };

        Ok(token)
    }

    /// Collects all tokens, ending with [`Token::Eof`].
    ///
    /// Any lexer error aborts tokenization; no partial token list is returned.
    pub fn tokenize(mut self) -> LexResult<Vec<PositionedToken>> {
        let mut tokens = Vec::new();
        loop {
            let positioned = self.next_token()?;
            let done = positioned.token == Token::Eof;
            tokens.push(positioned);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Tokenizes `input`. Shorthand for `Lexer::new(input).tokenize()`.
pub fn tokenize(input: &str) -> LexResult<Vec<PositionedToken>> {
    Lexer::new(input).tokenize()
}
