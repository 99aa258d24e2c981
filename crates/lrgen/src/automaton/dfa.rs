use std::collections::HashMap;

use bit_set::BitSet;
use log::{debug, trace};
use lrgen_util::make_type_idx;
use serde::Serialize;

use crate::{
    error::Result,
    grammar::{Grammar, Symbol},
    limits::{Capacity, Limits},
};

use super::{
    item::{ItemId, ItemTable},
    Transition,
};

make_type_idx!(#[derive(Serialize)] pub StateId, DfaState);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DfaStateKind {
    ShiftOnly,
    SingleReduction,
    MultiReduction,
    ShiftSingleReduction,
    ShiftMultiReduction,
}

impl DfaStateKind {
    pub fn is_pure_reduction(self) -> bool {
        matches!(self, DfaStateKind::SingleReduction | DfaStateKind::MultiReduction)
    }

    /// States a lookahead-free parser cannot decide in.
    pub fn is_inadequate(self) -> bool {
        matches!(
            self,
            DfaStateKind::MultiReduction
                | DfaStateKind::ShiftSingleReduction
                | DfaStateKind::ShiftMultiReduction
        )
    }
}

// a closed set of items. `item_set` and `items` hold the same ids; the bitset is what
// duplicate detection hashes, the sorted list is what callers iterate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfaState {
    item_set: BitSet,
    items: Vec<ItemId>,
    next_symbols: Vec<Symbol>,
    reduction_items: usize,
}

impl DfaState {
    fn from_closure(grammar: &Grammar, items: &ItemTable, item_set: BitSet) -> DfaState {
        let ids: Vec<ItemId> = item_set.iter().map(ItemId::new).collect();
        let mut next_symbols = Vec::new();
        let mut reduction_items = 0;
        for id in &ids {
            match items.get(*id).next_symbol(grammar) {
                Some(symbol) => next_symbols.push(symbol),
                None => reduction_items += 1,
            }
        }
        next_symbols.sort();
        next_symbols.dedup();

        DfaState {
            item_set,
            items: ids,
            next_symbols,
            reduction_items,
        }
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Distinct symbols right after the dot in the non-reduction items, sorted.
    pub fn next_symbols(&self) -> &[Symbol] {
        &self.next_symbols
    }

    pub fn items_in_state(&self) -> usize {
        self.items.len()
    }

    pub fn reduction_items(&self) -> usize {
        self.reduction_items
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.item_set.contains(item.index())
    }

    pub fn kind(&self) -> DfaStateKind {
        let shifts = self.items.len() - self.reduction_items;
        match (shifts, self.reduction_items) {
            (_, 0) => DfaStateKind::ShiftOnly,
            (0, 1) => DfaStateKind::SingleReduction,
            (0, _) => DfaStateKind::MultiReduction,
            (_, 1) => DfaStateKind::ShiftSingleReduction,
            (_, _) => DfaStateKind::ShiftMultiReduction,
        }
    }
}

// canonical LR(0) collection by subset construction over item sets
#[derive(Debug)]
pub struct Dfa {
    states: Vec<DfaState>,
    // closed item set -> state, for duplicate detection
    subsets: HashMap<BitSet, StateId>,
    transitions: Vec<Transition<StateId>>,
    targets: HashMap<(StateId, Symbol), StateId>,
    limits: Limits,
}

impl Dfa {
    /// Adds, until a full pass adds nothing, the dot-0 items of every rule headed by
    /// a non-terminal that follows a dot in the set.
    pub fn closure(grammar: &Grammar, items: &mut ItemTable, set: &mut BitSet) -> Result<()> {
        loop {
            let mut added = false;
            let snapshot: Vec<usize> = set.iter().collect();
            for i in snapshot {
                let item = items.get(ItemId::new(i));
                if let Some(Symbol::NonTerminal(nt)) = item.next_symbol(grammar) {
                    for rule in grammar.rules_for(nt) {
                        let expanded = items.item(grammar, *rule, 0)?;
                        added |= set.insert(expanded.index());
                    }
                }
            }

            if !added {
                return Ok(());
            }
        }
    }

    /// Closed set reached from `set` on `symbol`; empty when no item moves on it.
    pub fn goto(
        grammar: &Grammar,
        items: &mut ItemTable,
        set: &BitSet,
        symbol: Symbol,
    ) -> Result<BitSet> {
        let mut kernel = BitSet::new();
        for i in set.iter() {
            let item = items.get(ItemId::new(i));
            if item.next_symbol(grammar) == Some(symbol) {
                let advanced = items.item(grammar, item.rule, item.dot + 1)?;
                kernel.insert(advanced.index());
            }
        }

        if !kernel.is_empty() {
            Self::closure(grammar, items, &mut kernel)?;
        }
        Ok(kernel)
    }

    pub fn build(grammar: &Grammar, items: &mut ItemTable, limits: &Limits) -> Result<Dfa> {
        let mut dfa = Dfa {
            states: Vec::new(),
            subsets: HashMap::new(),
            transitions: Vec::new(),
            targets: HashMap::new(),
            limits: *limits,
        };

        let mut initial_configuration = BitSet::new();
        for rule in grammar.rules_for(grammar.start_symbol()) {
            let item = items.item(grammar, *rule, 0)?;
            initial_configuration.insert(item.index());
        }
        Self::closure(grammar, items, &mut initial_configuration)?;
        dfa.intern(grammar, items, initial_configuration)?;

        // states are only ever appended, so expanding each one once in order reaches
        // the fixpoint: a pass over the finished list would create nothing new
        let mut next = 0;
        while next < dfa.states.len() {
            let from = StateId::new(next);
            let symbols = dfa.states[from].next_symbols.clone();
            for symbol in symbols {
                let target = Self::goto(grammar, items, &dfa.states[from].item_set, symbol)?;
                if target.is_empty() {
                    continue;
                }
                let to = dfa.intern(grammar, items, target)?;
                dfa.add_transition(from, symbol, to)?;
            }
            next += 1;
        }

        debug!(
            "DFA: {} states, {} transitions over {} items",
            dfa.states.len(),
            dfa.transitions.len(),
            items.len()
        );
        Ok(dfa)
    }

    // returns the existing state when one matches both the item set and the symbol set
    fn intern(&mut self, grammar: &Grammar, items: &ItemTable, item_set: BitSet) -> Result<StateId> {
        let candidate = DfaState::from_closure(grammar, items, item_set);
        if let Some(existing) = self.subsets.get(&candidate.item_set) {
            if self.states[*existing].next_symbols == candidate.next_symbols {
                return Ok(*existing);
            }
        }

        self.limits
            .ensure(Capacity::States, self.states.len() + 1)?;
        let key = candidate.item_set.clone();
        let id = StateId::from_push(&mut self.states, candidate);
        self.subsets.insert(key, id);
        trace!("new DFA state {} with {} items", id, self.states[id].items.len());
        Ok(id)
    }

    fn add_transition(&mut self, from: StateId, symbol: Symbol, to: StateId) -> Result<()> {
        if self.targets.contains_key(&(from, symbol)) {
            return Ok(());
        }
        self.limits
            .ensure(Capacity::Transitions, self.transitions.len() + 1)?;
        self.transitions.push(Transition { from, symbol, to });
        self.targets.insert((from, symbol), to);
        Ok(())
    }

    pub fn start(&self) -> StateId {
        StateId::new(0)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: StateId) -> &DfaState {
        &self.states[id]
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &DfaState)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| (StateId::new(i), state))
    }

    pub fn transitions(&self) -> &[Transition<StateId>] {
        &self.transitions
    }

    pub fn transitions_from(&self, state: StateId) -> impl Iterator<Item = &Transition<StateId>> + '_ {
        self.transitions.iter().filter(move |t| t.from == state)
    }

    pub fn transition(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.targets.get(&(state, symbol)).copied()
    }

    pub fn kind(&self, state: StateId) -> DfaStateKind {
        self.states[state].kind()
    }

    /// First state (in state order) whose item set contains `item`.
    pub fn find_state_with(&self, item: ItemId) -> Option<StateId> {
        self.states()
            .find(|(_, state)| state.contains(item))
            .map(|(id, _)| id)
    }
}
