use bitflags::bitflags;
use log::debug;

use crate::{
    error::{LrError, Result},
    grammar::{Grammar, NonTerminalId, Symbol},
};

mod collection;

pub use collection::{SetCollection, SetHandle};

bitflags! {
    /// The kinds of set a symbol can own.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SetKinds: u8 {
        const FIRST = 1 << 0;
        const FOLLOW = 1 << 1;
        /// scratch FIRST set of the symbols after a non-terminal in some rule
        const SUFFIX_FIRST = 1 << 2;
    }
}

// FIRST / FOLLOW sets for every symbol, computed by fixpoint iteration over the rules.
// terminals own a FIRST set, non-terminals own all three kinds
#[derive(Debug)]
pub struct FirstFollow {
    sets: SetCollection<Symbol>,
    terminal_first: Vec<SetHandle>,
    first: Vec<SetHandle>,
    follow: Vec<SetHandle>,
    suffix: Vec<SetHandle>,
    first_passes: usize,
    follow_passes: usize,
}

impl FirstFollow {
    pub fn compute(grammar: &Grammar) -> Result<FirstFollow> {
        let mut sets = SetCollection::new();
        let terminal_first: Vec<SetHandle> = (0..grammar.terminal_count())
            .map(|_| sets.new_set())
            .collect();
        let mut new_sets = |n: usize| (0..n).map(|_| sets.new_set()).collect::<Vec<_>>();
        let first = new_sets(grammar.non_terminal_count());
        let follow = new_sets(grammar.non_terminal_count());
        let suffix = new_sets(grammar.non_terminal_count());

        let mut ff = FirstFollow {
            sets,
            terminal_first,
            first,
            follow,
            suffix,
            first_passes: 0,
            follow_passes: 0,
        };

        ff.compute_first(grammar)?;
        ff.compute_follow(grammar)?;
        debug!(
            "FIRST converged after {} passes, FOLLOW after {}",
            ff.first_passes, ff.follow_passes
        );
        Ok(ff)
    }

    fn handle(&self, symbol: Symbol, kind: SetKinds) -> Result<SetHandle> {
        if !symbol.allowed_sets().contains(kind) {
            return Err(LrError::Internal(format!(
                "{:?} cannot own a {:?} set",
                symbol, kind
            )));
        }

        let handle = match symbol {
            Symbol::Terminal(t) => self.terminal_first[t.index()],
            Symbol::NonTerminal(nt) if kind == SetKinds::FIRST => self.first[nt.index()],
            Symbol::NonTerminal(nt) if kind == SetKinds::FOLLOW => self.follow[nt.index()],
            Symbol::NonTerminal(nt) if kind == SetKinds::SUFFIX_FIRST => self.suffix[nt.index()],
            _ => {
                return Err(LrError::Internal(format!(
                    "{:?} is not a single set kind",
                    kind
                )))
            }
        };
        Ok(handle)
    }

    fn insert(&mut self, symbol: Symbol, kind: SetKinds, element: Symbol) -> Result<bool> {
        let handle = self.handle(symbol, kind)?;
        Ok(self.sets.insert(handle, element, true))
    }

    fn elements(&self, symbol: Symbol, kind: SetKinds) -> Result<Vec<Symbol>> {
        let handle = self.handle(symbol, kind)?;
        Ok(self.sets.iter(handle).collect())
    }

    // FIRST of a single symbol, including end-of-input which owns no set
    fn first_of_symbol(&self, symbol: Symbol) -> Result<Vec<Symbol>> {
        match symbol {
            Symbol::EndOfInput => Ok(vec![Symbol::EndOfInput]),
            other => self.elements(other, SetKinds::FIRST),
        }
    }

    fn compute_first(&mut self, grammar: &Grammar) -> Result<()> {
        for t in grammar.terminals() {
            self.insert(t, SetKinds::FIRST, t)?;
        }

        loop {
            self.first_passes += 1;
            let mut changed = false;
            for (_, rule) in grammar.rules() {
                let lhs = Symbol::NonTerminal(rule.lhs());
                let mut all_nullable = true;
                for symbol in rule.rhs() {
                    let first = self.first_of_symbol(*symbol)?;
                    let mut nullable = false;
                    for s in first {
                        if s == Symbol::Epsilon {
                            nullable = true;
                        } else {
                            changed |= self.insert(lhs, SetKinds::FIRST, s)?;
                        }
                    }
                    if !nullable {
                        all_nullable = false;
                        break;
                    }
                }

                if all_nullable {
                    changed |= self.insert(lhs, SetKinds::FIRST, Symbol::Epsilon)?;
                }
            }

            if !changed {
                break;
            }
        }

        Ok(())
    }

    fn compute_follow(&mut self, grammar: &Grammar) -> Result<()> {
        let start = Symbol::NonTerminal(grammar.start_symbol());
        let original = Symbol::NonTerminal(grammar.original_start());
        self.insert(start, SetKinds::FOLLOW, Symbol::EndOfInput)?;
        self.insert(original, SetKinds::FOLLOW, Symbol::EndOfInput)?;

        loop {
            self.follow_passes += 1;
            let mut changed = false;
            for (_, rule) in grammar.rules() {
                let lhs = Symbol::NonTerminal(rule.lhs());
                for (i, symbol) in rule.rhs().iter().enumerate() {
                    if !symbol.is_non_terminal() {
                        continue;
                    }

                    let suffix = self.handle(*symbol, SetKinds::SUFFIX_FIRST)?;
                    self.sets.clear(suffix);
                    for s in self.first_of_sequence(&rule.rhs()[i + 1..])? {
                        self.sets.insert(suffix, s, true);
                    }

                    let mut suffix_nullable = false;
                    for s in self.elements(*symbol, SetKinds::SUFFIX_FIRST)? {
                        if s == Symbol::Epsilon {
                            suffix_nullable = true;
                        } else {
                            changed |= self.insert(*symbol, SetKinds::FOLLOW, s)?;
                        }
                    }

                    if suffix_nullable {
                        for s in self.elements(lhs, SetKinds::FOLLOW)? {
                            changed |= self.insert(*symbol, SetKinds::FOLLOW, s)?;
                        }
                    }
                }
            }

            if !changed {
                break;
            }
        }

        Ok(())
    }

    /// FIRST of a symbol string; contains epsilon iff every symbol can derive
    /// epsilon (so always for the empty string).
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> Result<Vec<Symbol>> {
        let mut result = Vec::new();
        for symbol in symbols {
            let mut nullable = false;
            for s in self.first_of_symbol(*symbol)? {
                if s == Symbol::Epsilon {
                    nullable = true;
                } else if !result.contains(&s) {
                    result.push(s);
                }
            }
            if !nullable {
                return Ok(result);
            }
        }
        result.push(Symbol::Epsilon);
        Ok(result)
    }

    pub fn first(&self, symbol: Symbol) -> Result<Vec<Symbol>> {
        self.elements(symbol, SetKinds::FIRST)
    }

    pub fn follow(&self, symbol: Symbol) -> Result<Vec<Symbol>> {
        self.elements(symbol, SetKinds::FOLLOW)
    }

    pub fn first_contains(&self, symbol: Symbol, element: Symbol) -> Result<bool> {
        let handle = self.handle(symbol, SetKinds::FIRST)?;
        Ok(self.sets.contains(handle, element))
    }

    pub fn follow_contains(&self, symbol: Symbol, element: Symbol) -> Result<bool> {
        let handle = self.handle(symbol, SetKinds::FOLLOW)?;
        Ok(self.sets.contains(handle, element))
    }

    pub fn nullable(&self, nt: NonTerminalId) -> bool {
        self.sets.contains(self.first[nt.index()], Symbol::Epsilon)
    }

    /// Passes taken by the FIRST and FOLLOW fixpoints.
    pub fn iterations(&self) -> (usize, usize) {
        (self.first_passes, self.follow_passes)
    }
}

#[cfg(test)]
mod tests {
    use super::{FirstFollow, SetKinds};
    use crate::{
        error::LrError,
        grammar::{Grammar, LoaderOptions, Symbol},
        limits::Limits,
    };

    fn load(source: &str) -> Grammar {
        Grammar::load(source, &LoaderOptions::default(), &Limits::unbounded())
            .expect("grammar should load")
    }

    fn sorted(mut v: Vec<Symbol>) -> Vec<Symbol> {
        v.sort();
        v
    }

    #[test]
    fn expression_first_follow() {
        let g = load("E -> E '+' T | T ; T -> 'id' ;");
        let ff = FirstFollow::compute(&g).unwrap();
        let e = g.lookup("E").unwrap();
        let t = g.lookup("T").unwrap();
        let id = g.lookup("id").unwrap();
        let plus = g.lookup("+").unwrap();

        assert_eq!(ff.first(e).unwrap(), vec![id]);
        assert_eq!(ff.first(t).unwrap(), vec![id]);
        assert_eq!(sorted(ff.follow(e).unwrap()), sorted(vec![plus, Symbol::EndOfInput]));
        assert_eq!(sorted(ff.follow(t).unwrap()), sorted(vec![plus, Symbol::EndOfInput]));
        assert_eq!(ff.first(id).unwrap(), vec![id]);
    }

    #[test]
    fn nullable_chain() {
        // A -> B C ; B -> 'b' | ; C -> 'c' | ;
        let g = load("A -> B C 'a' ; B -> 'b' | ; C -> 'c' | ;");
        let ff = FirstFollow::compute(&g).unwrap();
        let a = g.lookup("A").unwrap();
        let b = g.lookup("B").unwrap();
        let c = g.lookup("C").unwrap();
        let (ta, tb, tc) = (
            g.lookup("a").unwrap(),
            g.lookup("b").unwrap(),
            g.lookup("c").unwrap(),
        );

        assert_eq!(sorted(ff.first(a).unwrap()), sorted(vec![ta, tb, tc]));
        assert!(ff.first_contains(b, Symbol::Epsilon).unwrap());
        assert!(!ff.first_contains(a, Symbol::Epsilon).unwrap());
        assert!(ff.nullable(b.as_non_terminal().unwrap()));
        assert!(!ff.nullable(a.as_non_terminal().unwrap()));

        assert_eq!(sorted(ff.follow(b).unwrap()), sorted(vec![ta, tc]));
        assert_eq!(ff.follow(c).unwrap(), vec![ta]);
        assert!(ff.follow_contains(a, Symbol::EndOfInput).unwrap());
    }

    #[test]
    fn follow_inherits_from_lhs_at_rule_end() {
        let g = load("S -> A 'x' ; A -> 'a' B ; B -> 'b' ;");
        let ff = FirstFollow::compute(&g).unwrap();
        let b = g.lookup("B").unwrap();
        let x = g.lookup("x").unwrap();
        assert_eq!(ff.follow(b).unwrap(), vec![x]);
    }

    #[test]
    fn sequence_first() {
        let g = load("A -> B 'a' ; B -> 'b' | ;");
        let ff = FirstFollow::compute(&g).unwrap();
        let b = g.lookup("B").unwrap();
        let ta = g.lookup("a").unwrap();
        let tb = g.lookup("b").unwrap();

        assert_eq!(ff.first_of_sequence(&[]).unwrap(), vec![Symbol::Epsilon]);
        assert_eq!(
            sorted(ff.first_of_sequence(&[b, ta]).unwrap()),
            sorted(vec![ta, tb])
        );
        assert_eq!(
            sorted(ff.first_of_sequence(&[b]).unwrap()),
            sorted(vec![tb, Symbol::Epsilon])
        );
        assert_eq!(
            ff.first_of_sequence(&[Symbol::EndOfInput]).unwrap(),
            vec![Symbol::EndOfInput]
        );
    }

    #[test]
    fn set_kind_validation() {
        let g = load("A -> 'a' ;");
        let ff = FirstFollow::compute(&g).unwrap();
        let ta = g.lookup("a").unwrap();
        assert!(matches!(ff.follow(ta), Err(LrError::Internal(_))));
        assert!(matches!(ff.first(Symbol::Epsilon), Err(LrError::Internal(_))));
        assert!(matches!(
            ff.follow_contains(Symbol::EndOfInput, ta),
            Err(LrError::Internal(_))
        ));
        assert!(ff.handle(ta, SetKinds::FIRST).is_ok());
        assert!(ff.handle(ta, SetKinds::SUFFIX_FIRST).is_err());
    }

    #[test]
    fn fixpoint_passes_are_counted() {
        let g = load("E -> E '+' T | T ; T -> 'id' ;");
        let ff = FirstFollow::compute(&g).unwrap();
        let (first, follow) = ff.iterations();
        assert!(first >= 2);
        assert!(follow >= 2);
    }
}
