use std::collections::HashMap;

use lrgen_util::make_type_idx;
use serde::Serialize;

mod loader;
mod symbol;

pub use loader::LoaderOptions;
pub use symbol::{NonTerminalId, Symbol, SymbolInfo, TerminalId};

make_type_idx!(#[derive(Serialize)] pub RuleId, Rule);

/// The synthetic `S' -> S $` rule every loaded grammar starts with.
pub const AUGMENTED_RULE: RuleId = RuleId(0);

pub const EPSILON_NAME: &str = "ε";
pub const END_OF_INPUT_NAME: &str = "$";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub(crate) lhs: NonTerminalId,
    pub(crate) rhs: Vec<Symbol>,
}

impl Rule {
    pub fn lhs(&self) -> NonTerminalId {
        self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GrammarStats {
    pub terminals: usize,
    pub non_terminals: usize,
    pub rules: usize,
    pub epsilon_rules: usize,
    pub longest_name: usize,
    pub total_name_len: usize,
}

// symbol table + rule store. written once by the loader, read-only afterwards
#[derive(Debug)]
pub struct Grammar {
    pub(crate) terminals: Vec<SymbolInfo>,
    pub(crate) non_terminals: Vec<SymbolInfo>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) start: NonTerminalId,
    pub(crate) original_start: NonTerminalId,
    pub(crate) terminal_names: HashMap<String, TerminalId>,
    pub(crate) non_terminal_names: HashMap<String, NonTerminalId>,
    pub(crate) stats: GrammarStats,
}

impl Grammar {
    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn non_terminal_count(&self) -> usize {
        self.non_terminals.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> + '_ {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (RuleId::new(i), rule))
    }

    /// Rules headed by `nt`, ascending by rule number.
    pub fn rules_for(&self, nt: NonTerminalId) -> &[RuleId] {
        &self.non_terminals[nt].lhs_rules
    }

    pub fn terminal(&self, id: TerminalId) -> &SymbolInfo {
        &self.terminals[id]
    }

    pub fn non_terminal(&self, id: NonTerminalId) -> &SymbolInfo {
        &self.non_terminals[id]
    }

    pub fn terminals(&self) -> impl Iterator<Item = Symbol> {
        (0..self.terminals.len()).map(|i| Symbol::Terminal(TerminalId::new(i)))
    }

    pub fn non_terminals(&self) -> impl Iterator<Item = Symbol> {
        (0..self.non_terminals.len()).map(|i| Symbol::NonTerminal(NonTerminalId::new(i)))
    }

    /// Every symbol a parse table has a column for: terminals, end-of-input, non-terminals.
    pub fn table_symbols(&self) -> Vec<Symbol> {
        self.terminals()
            .chain(std::iter::once(Symbol::EndOfInput))
            .chain(self.non_terminals())
            .collect()
    }

    /// The augmented start symbol `S'`.
    pub fn start_symbol(&self) -> NonTerminalId {
        self.start
    }

    /// The first non-terminal of the grammar source.
    pub fn original_start(&self) -> NonTerminalId {
        self.original_start
    }

    pub fn stats(&self) -> GrammarStats {
        self.stats
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(t) => &self.terminals[t].name,
            Symbol::NonTerminal(nt) => &self.non_terminals[nt].name,
            Symbol::Epsilon => EPSILON_NAME,
            Symbol::EndOfInput => END_OF_INPUT_NAME,
        }
    }

    pub fn lookup_terminal(&self, name: &str) -> Option<Symbol> {
        self.terminal_names.get(name).map(|t| Symbol::Terminal(*t))
    }

    pub fn lookup_non_terminal(&self, name: &str) -> Option<Symbol> {
        self.non_terminal_names
            .get(name)
            .map(|nt| Symbol::NonTerminal(*nt))
    }

    /// Resolves a display string, preferring non-terminals. `$` is end-of-input.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        if name == END_OF_INPUT_NAME {
            return Some(Symbol::EndOfInput);
        }
        self.lookup_non_terminal(name)
            .or_else(|| self.lookup_terminal(name))
    }

    pub fn rule_display(&self, id: RuleId) -> String {
        let rule = &self.rules[id];
        let mut s = format!("{} ->", self.symbol_name(Symbol::NonTerminal(rule.lhs)));
        if rule.rhs.is_empty() {
            s.push(' ');
            s.push_str(EPSILON_NAME);
        }
        for symbol in &rule.rhs {
            s.push(' ');
            s.push_str(self.symbol_name(*symbol));
        }
        s
    }
}
