use std::fmt::{self, Display};

use crate::error::{LrError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capacity {
    Symbols,
    Rules,
    Items,
    States,
    Transitions,
    NameLength,
}

impl Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Capacity::Symbols => "symbols",
            Capacity::Rules => "rules",
            Capacity::Items => "items",
            Capacity::States => "states",
            Capacity::Transitions => "transitions",
            Capacity::NameLength => "characters in a symbol name",
        };
        f.write_str(s)
    }
}

/// Optional upper bounds on every growable store. `None` means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    pub symbols: Option<usize>,
    pub rules: Option<usize>,
    pub items: Option<usize>,
    pub states: Option<usize>,
    pub transitions: Option<usize>,
    pub name_len: Option<usize>,
}

impl Limits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Fixed-capacity mode: any store growing past these sizes is a fatal error.
    pub fn fixed() -> Self {
        Self {
            symbols: Some(512),
            rules: Some(512),
            items: Some(4096),
            states: Some(2048),
            transitions: Some(16384),
            name_len: Some(128),
        }
    }

    fn bound(&self, what: Capacity) -> Option<usize> {
        match what {
            Capacity::Symbols => self.symbols,
            Capacity::Rules => self.rules,
            Capacity::Items => self.items,
            Capacity::States => self.states,
            Capacity::Transitions => self.transitions,
            Capacity::NameLength => self.name_len,
        }
    }

    /// Fails if holding `needed` entries of `what` would go over the limit.
    pub(crate) fn ensure(&self, what: Capacity, needed: usize) -> Result<()> {
        match self.bound(what) {
            Some(limit) if needed > limit => Err(LrError::CapacityExceeded { what, limit }),
            _ => Ok(()),
        }
    }
}
