use lrgen_lex::{LexError, Location};
use thiserror::Error;

use crate::limits::Capacity;

pub type Result<T> = std::result::Result<T, LrError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarErrorKind {
    #[error("terminal {0} cannot appear on the lefthand side of a production")]
    TerminalOnLeft(String),
    #[error("`{0}` is reserved for the augmented start symbol")]
    ReservedName(String),
    #[error("more than one epsilon production in the group for `{0}`")]
    DuplicateEpsilon(String),
    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
    },
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("grammar contains no productions")]
    EmptyGrammar,
    #[error("non-terminal `{0}` is used but never defined")]
    UndefinedNonTerminal(String),
}

// every variant is fatal for the pipeline; grammar conflicts are not errors and
// live in the parse tables instead
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LrError {
    #[error("{location}: {kind}")]
    Grammar {
        location: Location,
        kind: GrammarErrorKind,
    },
    #[error("capacity exceeded: more than {limit} {what}")]
    CapacityExceeded { what: Capacity, limit: usize },
    #[error("internal error: {0}")]
    Internal(String),
}

impl LrError {
    pub(crate) fn grammar(location: Location, kind: GrammarErrorKind) -> Self {
        LrError::Grammar { location, kind }
    }
}
