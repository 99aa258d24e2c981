use std::collections::HashMap;

use log::{debug, warn};
use lrgen_util::push_unique;
use serde::Serialize;

use crate::{
    automaton::{Dfa, ItemTable, StateId},
    error::{LrError, Result},
    grammar::{Grammar, Symbol, AUGMENTED_RULE},
    sets::FirstFollow,
};

mod action;

pub use action::{Action, Conflict, ConflictKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TableKind {
    Lr0,
    Slr1,
    /// LR(0) actions that SLR(1) lookahead removes
    Diff,
}

// one row per DFA state. columns are terminals, then end-of-input, then non-terminals,
// so shift/reduce/accept live left of the goto part
#[derive(Clone, Debug, Serialize)]
pub struct ParseTable {
    kind: TableKind,
    columns: Vec<Symbol>,
    #[serde(skip)]
    column_index: HashMap<Symbol, usize>,
    cells: Vec<Vec<Vec<Action>>>,
}

impl ParseTable {
    fn empty(kind: TableKind, columns: Vec<Symbol>, rows: usize) -> ParseTable {
        let column_index = columns.iter().enumerate().map(|(i, s)| (*s, i)).collect();
        let cells = vec![vec![Vec::new(); columns.len()]; rows];
        ParseTable {
            kind,
            columns,
            column_index,
            cells,
        }
    }

    fn add(&mut self, state: StateId, symbol: Symbol, action: Action) -> Result<()> {
        let column = *self.column_index.get(&symbol).ok_or_else(|| {
            LrError::Internal(format!("{:?} has no column in the parse table", symbol))
        })?;
        let row = self.cells.get_mut(state.index()).ok_or_else(|| {
            LrError::Internal(format!("state {} has no row in the parse table", state))
        })?;
        push_unique(&mut row[column], action);
        Ok(())
    }

    // terminal or end-of-input => shift, non-terminal => goto
    fn add_transitions(&mut self, dfa: &Dfa) -> Result<()> {
        for t in dfa.transitions() {
            let action = match t.symbol {
                s if s.is_input() => Action::Shift(t.to),
                Symbol::NonTerminal(_) => Action::Goto(t.to),
                other => {
                    return Err(LrError::Internal(format!(
                        "DFA transition on {:?}",
                        other
                    )))
                }
            };
            self.add(t.from, t.symbol, action)?;
        }
        Ok(())
    }

    /// Reductions on every input symbol, ignoring lookahead.
    pub fn lr0(grammar: &Grammar, items: &ItemTable, dfa: &Dfa) -> Result<ParseTable> {
        let mut table = Self::empty(TableKind::Lr0, grammar.table_symbols(), dfa.state_count());
        table.add_transitions(dfa)?;

        let inputs: Vec<Symbol> = table
            .columns
            .iter()
            .copied()
            .filter(|s| s.is_input())
            .collect();
        for (state_id, state) in dfa.states() {
            for item in state.items() {
                let item = items.get(*item);
                if !item.is_reduction(grammar) {
                    continue;
                }
                let action = if item.rule == AUGMENTED_RULE {
                    Action::Accept
                } else {
                    Action::Reduce(item.rule)
                };
                for symbol in &inputs {
                    table.add(state_id, *symbol, action)?;
                }
            }
        }

        table.report(grammar);
        Ok(table)
    }

    /// Reductions only under FOLLOW of the rule's lefthand side; accept only under `$`.
    pub fn slr1(
        grammar: &Grammar,
        items: &ItemTable,
        dfa: &Dfa,
        sets: &FirstFollow,
    ) -> Result<ParseTable> {
        let mut table = Self::empty(TableKind::Slr1, grammar.table_symbols(), dfa.state_count());
        table.add_transitions(dfa)?;

        for (state_id, state) in dfa.states() {
            for item in state.items() {
                let item = items.get(*item);
                if !item.is_reduction(grammar) {
                    continue;
                }
                if item.rule == AUGMENTED_RULE {
                    table.add(state_id, Symbol::EndOfInput, Action::Accept)?;
                    continue;
                }

                let lhs = Symbol::NonTerminal(grammar.rule(item.rule).lhs());
                for symbol in sets.follow(lhs)? {
                    if symbol.is_input() {
                        table.add(state_id, symbol, Action::Reduce(item.rule))?;
                    }
                }
            }
        }

        table.report(grammar);
        Ok(table)
    }

    /// For every state whose LR(0) row has a conflict, the LR(0) actions missing from
    /// the SLR(1) cell. Rows without an LR(0) conflict stay empty.
    pub fn diff(lr0: &ParseTable, slr1: &ParseTable) -> Result<ParseTable> {
        if lr0.kind != TableKind::Lr0 || slr1.kind != TableKind::Slr1 {
            return Err(LrError::Internal(format!(
                "diff needs an LR(0) and an SLR(1) table, got {:?} and {:?}",
                lr0.kind, slr1.kind
            )));
        }
        if lr0.columns != slr1.columns || lr0.cells.len() != slr1.cells.len() {
            return Err(LrError::Internal(
                "LR(0) and SLR(1) tables have different shapes".into(),
            ));
        }

        let mut table = Self::empty(TableKind::Diff, lr0.columns.clone(), lr0.cells.len());
        for (row, (lr0_row, slr1_row)) in lr0.cells.iter().zip(&slr1.cells).enumerate() {
            if lr0_row.iter().all(|cell| cell.len() < 2) {
                continue;
            }
            for (column, (lr0_cell, slr1_cell)) in lr0_row.iter().zip(slr1_row).enumerate() {
                for action in lr0_cell {
                    if !slr1_cell.contains(action) {
                        push_unique(&mut table.cells[row][column], *action);
                    }
                }
            }
        }

        debug!(
            "diff table: {} non-empty cells",
            table.cells.iter().flatten().filter(|c| !c.is_empty()).count()
        );
        Ok(table)
    }

    fn report(&self, grammar: &Grammar) {
        let conflicts = self.conflicts();
        for conflict in &conflicts {
            warn!(
                "{:?} table: {} conflict in state {} on {}",
                self.kind,
                conflict.kind,
                conflict.state,
                grammar.symbol_name(conflict.symbol)
            );
        }
        debug!(
            "{:?} table: {} rows x {} columns, {} conflicts",
            self.kind,
            self.rows(),
            self.columns.len(),
            conflicts.len()
        );
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Actions for `(state, symbol)`; empty for unknown states or symbols without a column.
    pub fn cell(&self, state: StateId, symbol: Symbol) -> &[Action] {
        self.column_index
            .get(&symbol)
            .and_then(|column| self.cells.get(state.index()).map(|row| &row[*column]))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cells of one row, paired with their column symbol.
    pub fn row(&self, state: StateId) -> impl Iterator<Item = (Symbol, &[Action])> + '_ {
        self.columns.iter().copied().zip(
            self.cells
                .get(state.index())
                .into_iter()
                .flatten()
                .map(Vec::as_slice),
        )
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> &[Symbol] {
        &self.columns
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for (row, cells) in self.cells.iter().enumerate() {
            for (column, actions) in cells.iter().enumerate() {
                if let Some(c) = Conflict::from_cell(StateId::new(row), self.columns[column], actions) {
                    conflicts.push(c);
                }
            }
        }
        conflicts
    }

    pub fn conflict_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.len() > 1).count()
    }

    /// Whether every cell is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|c| c.is_empty())
    }

    /// Releases every action list, keeping the table's shape.
    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            *cell = Vec::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, ConflictKind, ParseTable, TableKind};
    use crate::{
        automaton::{Dfa, ItemTable, StateId},
        grammar::{Grammar, LoaderOptions, RuleId, Symbol},
        limits::Limits,
        sets::FirstFollow,
        LrError,
    };

    struct Built {
        grammar: Grammar,
        dfa: Dfa,
        lr0: ParseTable,
        slr1: ParseTable,
    }

    fn build(source: &str) -> Built {
        let grammar = Grammar::load(source, &LoaderOptions::default(), &Limits::unbounded()).unwrap();
        let mut items = ItemTable::new(&Limits::unbounded());
        let dfa = Dfa::build(&grammar, &mut items, &Limits::unbounded()).unwrap();
        let sets = FirstFollow::compute(&grammar).unwrap();
        let lr0 = ParseTable::lr0(&grammar, &items, &dfa).unwrap();
        let slr1 = ParseTable::slr1(&grammar, &items, &dfa, &sets).unwrap();
        Built {
            grammar,
            dfa,
            lr0,
            slr1,
        }
    }

    #[test]
    fn shape() {
        let b = build("E -> E '+' T | T ; T -> 'id' ;");
        // + id $ S' E T
        assert_eq!(b.lr0.columns().len(), 6);
        assert_eq!(b.lr0.columns()[2], Symbol::EndOfInput);
        assert_eq!(b.lr0.rows(), b.dfa.state_count());
        assert_eq!(b.lr0.kind(), TableKind::Lr0);
        assert_eq!(b.lr0.row(StateId::new(0)).count(), 6);
    }

    #[test]
    fn lr0_reduces_everywhere_slr1_under_follow() {
        let b = build("E -> E '+' T | T ; T -> 'id' ;");
        let id = b.grammar.lookup("id").unwrap();
        let plus = b.grammar.lookup("+").unwrap();
        let after_id = b.dfa.transition(b.dfa.start(), id).unwrap();
        let reduce = Action::Reduce(RuleId::new(3));

        assert_eq!(b.lr0.cell(after_id, id), &[reduce]);
        assert_eq!(b.lr0.cell(after_id, plus), &[reduce]);
        assert_eq!(b.slr1.cell(after_id, id), &[] as &[Action]);
        assert_eq!(b.slr1.cell(after_id, plus), &[reduce]);
        assert_eq!(b.slr1.cell(after_id, Symbol::EndOfInput), &[reduce]);
    }

    #[test]
    fn accept_placement() {
        let b = build("E -> E '+' T | T ; T -> 'id' ;");
        let e = b.grammar.lookup("E").unwrap();
        let id = b.grammar.lookup("id").unwrap();
        let after_e = b.dfa.transition(b.dfa.start(), e).unwrap();
        let accept_state = b.dfa.transition(after_e, Symbol::EndOfInput).unwrap();

        assert_eq!(b.lr0.cell(after_e, Symbol::EndOfInput), &[Action::Shift(accept_state)]);
        assert_eq!(b.slr1.cell(accept_state, Symbol::EndOfInput), &[Action::Accept]);
        assert_eq!(b.slr1.cell(accept_state, id), &[] as &[Action]);
        assert_eq!(b.lr0.cell(accept_state, id), &[Action::Accept]);
        assert_eq!(b.slr1.cell(b.dfa.start(), e), &[Action::Goto(after_e)]);
    }

    #[test]
    fn unambiguous_grammar_has_empty_diff() {
        let b = build("E -> E '+' T | T ; T -> 'id' ;");
        assert_eq!(b.lr0.conflict_count(), 0);
        assert_eq!(b.slr1.conflict_count(), 0);
        let diff = ParseTable::diff(&b.lr0, &b.slr1).unwrap();
        assert!(diff.is_empty());
        assert_eq!(diff.kind(), TableKind::Diff);
    }

    #[test]
    fn slr1_resolves_what_lr0_cannot() {
        // E -> T . and E -> T . * E need lookahead
        let b = build("E -> T '*' E | T ; T -> 'x' ;");
        assert!(b.lr0.conflict_count() > 0);
        assert_eq!(b.slr1.conflict_count(), 0);
        let diff = ParseTable::diff(&b.lr0, &b.slr1).unwrap();
        assert!(!diff.is_empty());
        let star = b.grammar.lookup("*").unwrap();
        let t = b.grammar.lookup("T").unwrap();
        let after_t = b.dfa.transition(b.dfa.start(), t).unwrap();
        assert_eq!(diff.cell(after_t, star), &[Action::Reduce(RuleId::new(2))]);
    }

    #[test]
    fn dangling_else_keeps_conflict() {
        let b = build(
            "S -> 'if' E 'then' S | 'if' E 'then' S 'else' S | 'x' ; E -> 'b' ;",
        );
        let conflicts = b.slr1.conflicts();
        assert_eq!(conflicts.len(), 1);
        let conflict = &conflicts[0];
        assert_eq!(conflict.kind, ConflictKind::ShiftReduce);
        assert_eq!(conflict.symbol, b.grammar.lookup("else").unwrap());
        assert_eq!(conflict.actions.len(), 2);
        assert!(!ParseTable::diff(&b.lr0, &b.slr1).unwrap().is_empty());
    }

    #[test]
    fn diff_checks_table_kinds() {
        let b = build("E -> 'x' ;");
        assert!(matches!(
            ParseTable::diff(&b.slr1, &b.lr0),
            Err(LrError::Internal(_))
        ));
    }

    #[test]
    fn clear_releases_cells() {
        let mut b = build("E -> E '+' T | T ; T -> 'id' ;");
        assert!(!b.slr1.is_empty());
        b.slr1.clear();
        assert!(b.slr1.is_empty());
        assert_eq!(b.slr1.rows(), b.dfa.state_count());
    }
}
