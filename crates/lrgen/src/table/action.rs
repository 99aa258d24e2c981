use std::fmt::Display;

use serde::Serialize;

use crate::{automaton::StateId, grammar::{RuleId, Symbol}};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Shift(StateId),
    Reduce(RuleId),
    Goto(StateId),
    Accept,
}

impl Action {
    pub fn is_shift(self) -> bool {
        matches!(self, Action::Shift(_))
    }

    /// Reduce or accept; accept is a reduction by the augmented rule.
    pub fn is_reduction(self) -> bool {
        matches!(self, Action::Reduce(_) | Action::Accept)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{}", state),
            Action::Reduce(rule) => write!(f, "r{}", rule),
            Action::Goto(state) => write!(f, "g{}", state),
            Action::Accept => write!(f, "acc"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::ShiftReduce => write!(f, "shift/reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce/reduce"),
        }
    }
}

/// A cell holding more than one action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub state: StateId,
    pub symbol: Symbol,
    pub kind: ConflictKind,
    pub actions: Vec<Action>,
}

impl Conflict {
    pub(crate) fn from_cell(state: StateId, symbol: Symbol, actions: &[Action]) -> Option<Conflict> {
        if actions.len() < 2 {
            return None;
        }
        let kind = if actions.iter().any(|a| a.is_shift()) {
            ConflictKind::ShiftReduce
        } else {
            ConflictKind::ReduceReduce
        };
        Some(Conflict {
            state,
            symbol,
            kind,
            actions: actions.to_vec(),
        })
    }
}
