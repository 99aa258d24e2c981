use std::collections::{HashMap, HashSet};

use log::debug;
use lrgen_util::make_type_idx;

use crate::{
    error::{LrError, Result},
    grammar::{Grammar, RuleId, Symbol, AUGMENTED_RULE},
    limits::{Capacity, Limits},
};

use super::{
    item::{Item, ItemId, ItemTable},
    Transition,
};

make_type_idx!(pub NfaStateId, NfaState);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NfaStateKind {
    /// next symbol is a terminal or end-of-input
    Shift,
    /// next symbol is a non-terminal, so the state has epsilon transitions
    NonDeterministic,
    /// dot at the end
    Reduce,
}

#[derive(Clone, Debug)]
pub struct NfaState {
    item_id: ItemId,
    item: Item,
    inward: usize,
    outward: usize,
}

impl NfaState {
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn item(&self) -> Item {
        self.item
    }

    pub fn inward(&self) -> usize {
        self.inward
    }

    pub fn outward(&self) -> usize {
        self.outward
    }
}

// one state per LR(0) item. a state moves on its next symbol to the item with the
// dot advanced, and on epsilon to every dot-0 item of the next non-terminal
#[derive(Debug)]
pub struct Nfa {
    states: Vec<NfaState>,
    by_item: HashMap<ItemId, NfaStateId>,
    transitions: Vec<Transition<NfaStateId>>,
    seen: HashSet<Transition<NfaStateId>>,
    start: NfaStateId,
    limits: Limits,
}

impl Nfa {
    pub fn build(grammar: &Grammar, items: &mut ItemTable, limits: &Limits) -> Result<Nfa> {
        let mut nfa = Nfa {
            states: Vec::new(),
            by_item: HashMap::new(),
            transitions: Vec::new(),
            seen: HashSet::new(),
            start: NfaStateId::new(0),
            limits: *limits,
        };

        // every item of every rule gets a state, in rule / dot order
        for (rule_id, rule) in grammar.rules() {
            for dot in 0..=rule.len() {
                let item_id = items.item(grammar, rule_id, dot)?;
                nfa.state_for(item_id, items.get(item_id))?;
            }
        }
        nfa.start = nfa.state_of(items.find(AUGMENTED_RULE, 0).ok_or_else(|| {
            LrError::Internal("augmented rule has no start item".into())
        })?)?;

        for i in 0..nfa.states.len() {
            let from = NfaStateId::new(i);
            let item = nfa.states[from].item;
            let Some(symbol) = item.next_symbol(grammar) else {
                continue;
            };

            let advanced = items.item(grammar, item.rule, item.dot + 1)?;
            let to = nfa.state_of(advanced)?;
            nfa.add_transition(from, symbol, to)?;

            if let Symbol::NonTerminal(nt) = symbol {
                for rule in grammar.rules_for(nt) {
                    let expanded = items.item(grammar, *rule, 0)?;
                    let to = nfa.state_of(expanded)?;
                    nfa.add_transition(from, Symbol::Epsilon, to)?;
                }
            }
        }

        debug!(
            "NFA: {} states, {} transitions",
            nfa.states.len(),
            nfa.transitions.len()
        );
        Ok(nfa)
    }

    fn state_for(&mut self, item_id: ItemId, item: Item) -> Result<NfaStateId> {
        if let Some(id) = self.by_item.get(&item_id) {
            return Ok(*id);
        }
        self.limits.ensure(Capacity::States, self.states.len() + 1)?;
        let state = NfaState {
            item_id,
            item,
            inward: 0,
            outward: 0,
        };
        let id = NfaStateId::from_push(&mut self.states, state);
        self.by_item.insert(item_id, id);
        Ok(id)
    }

    fn add_transition(&mut self, from: NfaStateId, symbol: Symbol, to: NfaStateId) -> Result<()> {
        let transition = Transition { from, symbol, to };
        if self.seen.contains(&transition) {
            return Ok(());
        }
        self.limits
            .ensure(Capacity::Transitions, self.transitions.len() + 1)?;
        self.seen.insert(transition);
        self.transitions.push(transition);
        self.states[from].outward += 1;
        self.states[to].inward += 1;
        Ok(())
    }

    /// The state holding `item`; every item has exactly one.
    pub fn state_of(&self, item: ItemId) -> Result<NfaStateId> {
        self.by_item
            .get(&item)
            .copied()
            .ok_or_else(|| LrError::Internal(format!("item {} has no NFA state", item)))
    }

    pub fn start(&self) -> NfaStateId {
        self.start
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: NfaStateId) -> &NfaState {
        &self.states[id]
    }

    pub fn states(&self) -> impl Iterator<Item = (NfaStateId, &NfaState)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| (NfaStateId::new(i), state))
    }

    pub fn transitions(&self) -> &[Transition<NfaStateId>] {
        &self.transitions
    }

    pub fn transitions_from(&self, state: NfaStateId) -> impl Iterator<Item = &Transition<NfaStateId>> + '_ {
        self.transitions.iter().filter(move |t| t.from == state)
    }

    /// The non-epsilon transition of `state`, if it has one.
    pub fn symbol_transition(&self, state: NfaStateId) -> Option<&Transition<NfaStateId>> {
        self.transitions_from(state)
            .find(|t| t.symbol != Symbol::Epsilon)
    }

    /// Epsilon transitions out of `state`, ascending by the destination item's rule.
    pub fn epsilon_transitions(&self, state: NfaStateId) -> Vec<&Transition<NfaStateId>> {
        let mut result: Vec<_> = self
            .transitions_from(state)
            .filter(|t| t.symbol == Symbol::Epsilon)
            .collect();
        result.sort_by_key(|t| self.destination_rule(t.to));
        result
    }

    fn destination_rule(&self, state: NfaStateId) -> RuleId {
        self.states[state].item.rule
    }

    pub fn kind(&self, grammar: &Grammar, state: NfaStateId) -> NfaStateKind {
        match self.states[state].item.next_symbol(grammar) {
            None => NfaStateKind::Reduce,
            Some(Symbol::NonTerminal(_)) => NfaStateKind::NonDeterministic,
            Some(_) => NfaStateKind::Shift,
        }
    }
}
