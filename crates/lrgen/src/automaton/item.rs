use std::collections::HashMap;

use lrgen_util::make_type_idx;

use crate::{
    error::{LrError, Result},
    grammar::{Grammar, RuleId, Symbol},
    limits::{Capacity, Limits},
};

make_type_idx!(pub ItemId, Item);

/// An LR(0) item: a rule with a dot somewhere in `0..=rule.len()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub rule: RuleId,
    pub dot: usize,
}

impl Item {
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar.rule(self.rule).rhs().get(self.dot).copied()
    }

    pub fn is_reduction(&self, grammar: &Grammar) -> bool {
        self.dot == grammar.rule(self.rule).len()
    }

    /// `E -> E . + T`
    pub fn display(&self, grammar: &Grammar) -> String {
        let rule = grammar.rule(self.rule);
        let mut s = format!("{} ->", grammar.symbol_name(Symbol::NonTerminal(rule.lhs())));
        for (i, symbol) in rule.rhs().iter().enumerate() {
            if i == self.dot {
                s.push_str(" .");
            }
            s.push(' ');
            s.push_str(grammar.symbol_name(*symbol));
        }
        if self.dot == rule.len() {
            s.push_str(" .");
        }
        s
    }
}

// global, deduplicated item store shared by the NFA and DFA builders.
// items are never mutated or removed once created
#[derive(Debug, Default)]
pub struct ItemTable {
    items: Vec<Item>,
    index: HashMap<Item, ItemId>,
    limit: Limits,
}

impl ItemTable {
    pub fn new(limits: &Limits) -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            limit: *limits,
        }
    }

    /// Id of the item `(rule, dot)`, creating it on first request.
    pub fn item(&mut self, grammar: &Grammar, rule: RuleId, dot: usize) -> Result<ItemId> {
        let item = Item { rule, dot };
        if let Some(id) = self.index.get(&item) {
            return Ok(*id);
        }

        if rule.index() >= grammar.rule_count() || dot > grammar.rule(rule).len() {
            return Err(LrError::Internal(format!(
                "no item for rule {} with dot at {}",
                rule, dot
            )));
        }

        self.limit.ensure(Capacity::Items, self.items.len() + 1)?;
        let id = ItemId::from_push(&mut self.items, item);
        self.index.insert(item, id);
        Ok(id)
    }

    /// The item with the dot moved past the next symbol, or `None` for a reduction item.
    pub fn advance(&mut self, grammar: &Grammar, id: ItemId) -> Result<Option<ItemId>> {
        let item = self.get(id);
        if item.is_reduction(grammar) {
            return Ok(None);
        }
        self.item(grammar, item.rule, item.dot + 1).map(Some)
    }

    pub fn find(&self, rule: RuleId, dot: usize) -> Option<ItemId> {
        self.index.get(&Item { rule, dot }).copied()
    }

    pub fn get(&self, id: ItemId) -> Item {
        self.items[id]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, Item)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (ItemId::new(i), *item))
    }
}

#[cfg(test)]
mod tests {
    use super::ItemTable;
    use crate::{
        error::LrError,
        grammar::{Grammar, LoaderOptions, RuleId},
        limits::{Capacity, Limits},
    };

    fn grammar() -> Grammar {
        Grammar::load(
            "E -> E '+' T | T ; T -> 'id' ;",
            &LoaderOptions::default(),
            &Limits::unbounded(),
        )
        .unwrap()
    }

    #[test]
    fn round_trip_and_dedup() {
        let g = grammar();
        let mut items = ItemTable::new(&Limits::unbounded());
        let rule = RuleId::new(1);
        let id = items.item(&g, rule, 2).unwrap();
        let item = items.get(id);
        assert_eq!((item.rule, item.dot), (rule, 2));
        assert_eq!(items.item(&g, rule, 2).unwrap(), id);
        assert_eq!(items.len(), 1);
        assert_eq!(items.find(rule, 2), Some(id));
        assert_eq!(items.find(rule, 1), None);
    }

    #[test]
    fn display_and_reduction() {
        let g = grammar();
        let mut items = ItemTable::new(&Limits::unbounded());
        let mid = items.item(&g, RuleId::new(1), 1).unwrap();
        assert_eq!(items.get(mid).display(&g), "E -> E . + T");
        assert!(!items.get(mid).is_reduction(&g));

        let end = items.advance(&g, mid).unwrap().unwrap();
        let end = items.advance(&g, end).unwrap().unwrap();
        assert_eq!(items.get(end).display(&g), "E -> E + T .");
        assert!(items.get(end).is_reduction(&g));
        assert_eq!(items.advance(&g, end).unwrap(), None);
    }

    #[test]
    fn out_of_range_dot() {
        let g = grammar();
        let mut items = ItemTable::new(&Limits::unbounded());
        assert!(matches!(
            items.item(&g, RuleId::new(3), 2),
            Err(LrError::Internal(_))
        ));
    }

    #[test]
    fn item_capacity() {
        let g = grammar();
        let limits = Limits {
            items: Some(1),
            ..Limits::unbounded()
        };
        let mut items = ItemTable::new(&limits);
        items.item(&g, RuleId::new(0), 0).unwrap();
        assert_eq!(
            items.item(&g, RuleId::new(0), 1),
            Err(LrError::CapacityExceeded {
                what: Capacity::Items,
                limit: 1
            })
        );
    }
}
