use std::fmt::{self, Display};

use serde::Serialize;
use thiserror::Error;

/// 1-based position of the first character of a token
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReservedWord {
    /// `->`
    Arrow,
    /// `:=`
    Assign,
}

impl ReservedWord {
    pub fn text(self) -> &'static str {
        match self {
            ReservedWord::Arrow => "->",
            ReservedWord::Assign => ":=",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(String),
    SingleQuoted(String),
    DoubleQuoted(String),
    Reserved(ReservedWord),
    Delimiter(char),
    EndOfFile,
    Error(LexError),
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "identifier `{}`", name),
            TokenKind::SingleQuoted(text) => write!(f, "string '{}'", text),
            TokenKind::DoubleQuoted(text) => write!(f, "string \"{}\"", text),
            TokenKind::Reserved(word) => write!(f, "`{}`", word.text()),
            TokenKind::Delimiter(c) => write!(f, "`{}`", c),
            TokenKind::EndOfFile => write!(f, "end of file"),
            TokenKind::Error(e) => write!(f, "lex error ({})", e),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfFile)
    }
}

// anything the grammar loader can pull tokens from. comments are already gone,
// and once EndOfFile is produced it is produced forever
pub trait TokenStream {
    fn advance(&mut self) -> Token;
    fn peek(&mut self) -> &Token;
}

// lets tests and callers feed a pre-built token list
impl TokenStream for std::collections::VecDeque<Token> {
    fn advance(&mut self) -> Token {
        match self.pop_front() {
            Some(tok) => tok,
            None => Token::new(TokenKind::EndOfFile, Location::default()),
        }
    }

    fn peek(&mut self) -> &Token {
        if self.is_empty() {
            self.push_back(Token::new(TokenKind::EndOfFile, Location::default()));
        }
        &self[0]
    }
}
