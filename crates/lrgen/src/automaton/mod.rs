mod dfa;
mod graph;
mod item;
mod nfa;

use serde::Serialize;

use crate::grammar::Symbol;

pub use dfa::{Dfa, DfaState, DfaStateKind, StateId};
pub use item::{Item, ItemId, ItemTable};
pub use nfa::{Nfa, NfaState, NfaStateId, NfaStateKind};

/// An edge of either automaton. Epsilon edges only occur in the NFA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Transition<S> {
    pub from: S,
    pub symbol: Symbol,
    pub to: S,
}
