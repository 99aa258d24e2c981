use lrgen_util::make_type_idx;
use serde::Serialize;

use crate::sets::SetKinds;

use super::RuleId;

make_type_idx!(#[derive(Serialize)] pub TerminalId, SymbolInfo);
make_type_idx!(#[derive(Serialize)] pub NonTerminalId, SymbolInfo);

// ids are dense per tag, so a (tag, id) pair is the symbol's code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Symbol {
    Terminal(TerminalId),
    NonTerminal(NonTerminalId),
    Epsilon,
    EndOfInput,
}

impl Symbol {
    pub fn is_terminal(self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_non_terminal(self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    /// Terminals and end-of-input: symbols consumed from the input by a shift.
    pub fn is_input(self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::EndOfInput)
    }

    pub fn as_non_terminal(self) -> Option<NonTerminalId> {
        match self {
            Symbol::NonTerminal(nt) => Some(nt),
            _ => None,
        }
    }

    /// Which kinds of FIRST/FOLLOW sets a symbol of this tag may own.
    pub fn allowed_sets(self) -> SetKinds {
        match self {
            Symbol::Terminal(_) => SetKinds::FIRST,
            Symbol::NonTerminal(_) => SetKinds::all(),
            Symbol::Epsilon | Symbol::EndOfInput => SetKinds::empty(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub(crate) name: String,
    pub(crate) lhs_rules: Vec<RuleId>,
    pub(crate) rhs_rules: Vec<RuleId>,
}

impl SymbolInfo {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            lhs_rules: Vec::new(),
            rhs_rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rules with this symbol as their lefthand side, in rule order.
    pub fn lhs_rules(&self) -> &[RuleId] {
        &self.lhs_rules
    }

    /// Rules mentioning this symbol on the righthand side, once per rule.
    pub fn rhs_rules(&self) -> &[RuleId] {
        &self.rhs_rules
    }
}

#[cfg(test)]
mod tests {
    use super::{NonTerminalId, Symbol, TerminalId};
    use crate::sets::SetKinds;

    #[test]
    fn allowed_sets_by_tag() {
        let t = Symbol::Terminal(TerminalId::new(0));
        let nt = Symbol::NonTerminal(NonTerminalId::new(0));
        assert_eq!(t.allowed_sets(), SetKinds::FIRST);
        assert!(nt.allowed_sets().contains(SetKinds::FOLLOW | SetKinds::SUFFIX_FIRST));
        assert!(Symbol::Epsilon.allowed_sets().is_empty());
        assert!(Symbol::EndOfInput.allowed_sets().is_empty());
    }

    #[test]
    fn input_symbols() {
        assert!(Symbol::Terminal(TerminalId::new(3)).is_input());
        assert!(Symbol::EndOfInput.is_input());
        assert!(!Symbol::NonTerminal(NonTerminalId::new(1)).is_input());
        assert!(!Symbol::Epsilon.is_input());
    }
}
