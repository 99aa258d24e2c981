mod lexer;
mod token;

pub use lexer::GrammarLexer;
pub use token::{LexError, Location, ReservedWord, Token, TokenKind, TokenStream};
