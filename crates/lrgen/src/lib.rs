pub mod automaton;
pub mod error;
pub mod grammar;
pub mod sets;
pub mod table;

mod compiler;
mod limits;

pub use compiler::{compile, CompileOptions, Compilation};
pub use error::{GrammarErrorKind, LrError, Result};
pub use limits::{Capacity, Limits};
