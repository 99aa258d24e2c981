use log::{debug, info};

use crate::{
    automaton::{Dfa, ItemTable, Nfa},
    error::Result,
    grammar::{Grammar, LoaderOptions},
    limits::Limits,
    sets::FirstFollow,
    table::ParseTable,
};

#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    pub loader: LoaderOptions,
    pub limits: Limits,
}

/// Every product of a run, in pipeline order.
#[derive(Debug)]
pub struct Compilation {
    pub grammar: Grammar,
    pub items: ItemTable,
    pub nfa: Nfa,
    pub dfa: Dfa,
    pub sets: FirstFollow,
    pub lr0: ParseTable,
    pub slr1: ParseTable,
    pub diff: ParseTable,
}

impl Compilation {
    /// Conflicts left after lookahead; zero means the grammar is SLR(1).
    pub fn is_slr1(&self) -> bool {
        self.slr1.conflict_count() == 0
    }

    pub fn is_lr0(&self) -> bool {
        self.lr0.conflict_count() == 0
    }
}

pub fn compile(source: &str, options: &CompileOptions) -> Result<Compilation> {
    let grammar = Grammar::load(source, &options.loader, &options.limits)?;
    let stats = grammar.stats();
    info!(
        "loaded grammar: {} terminals, {} non-terminals, {} rules",
        stats.terminals, stats.non_terminals, stats.rules
    );

    let mut items = ItemTable::new(&options.limits);
    let nfa = Nfa::build(&grammar, &mut items, &options.limits)?;
    let dfa = Dfa::build(&grammar, &mut items, &options.limits)?;
    debug!("{} items after automaton construction", items.len());

    let sets = FirstFollow::compute(&grammar)?;

    let lr0 = ParseTable::lr0(&grammar, &items, &dfa)?;
    let slr1 = ParseTable::slr1(&grammar, &items, &dfa, &sets)?;
    let diff = ParseTable::diff(&lr0, &slr1)?;
    info!(
        "{} DFA states, {} LR(0) conflicts, {} SLR(1) conflicts",
        dfa.state_count(),
        lr0.conflict_count(),
        slr1.conflict_count()
    );

    Ok(Compilation {
        grammar,
        items,
        nfa,
        dfa,
        sets,
        lr0,
        slr1,
        diff,
    })
}
