use lrgen::{
    automaton::{Dfa, DfaStateKind, ItemTable, Nfa},
    grammar::{Grammar, LoaderOptions, Symbol},
    sets::FirstFollow,
    Limits,
};

const EXPR: &str = include_str!("../../../data/grammars/expr.grammar");
const ARITH: &str = include_str!("../../../data/grammars/arith.grammar");
const DANGLING_ELSE: &str = include_str!("../../../data/grammars/dangling_else.grammar");
const EPSILON: &str = include_str!("../../../data/grammars/epsilon.grammar");

fn load(source: &str) -> Grammar {
    Grammar::load(source, &LoaderOptions::default(), &Limits::unbounded())
        .expect("failed to load grammar")
}

fn automata(grammar: &Grammar) -> (ItemTable, Nfa, Dfa) {
    let limits = Limits::unbounded();
    let mut items = ItemTable::new(&limits);
    let nfa = Nfa::build(grammar, &mut items, &limits).expect("failed to build NFA");
    let dfa = Dfa::build(grammar, &mut items, &limits).expect("failed to build DFA");
    (items, nfa, dfa)
}

#[test]
fn construction_is_deterministic() {
    for source in [EXPR, ARITH, DANGLING_ELSE, EPSILON] {
        let grammar = load(source);
        let (items_a, nfa_a, dfa_a) = automata(&grammar);
        let (items_b, nfa_b, dfa_b) = automata(&grammar);
        assert_eq!(items_a.len(), items_b.len());
        assert_eq!(nfa_a.state_count(), nfa_b.state_count());
        assert_eq!(nfa_a.transitions(), nfa_b.transitions());
        assert_eq!(dfa_a.state_count(), dfa_b.state_count());
        assert_eq!(dfa_a.transitions(), dfa_b.transitions());
    }
}

#[test]
fn reduction_counts_match_classification() {
    for source in [EXPR, ARITH, DANGLING_ELSE, EPSILON] {
        let grammar = load(source);
        let (items, _, dfa) = automata(&grammar);
        for (id, state) in dfa.states() {
            let kind = dfa.kind(id);
            assert_eq!(
                state.items_in_state() == state.reduction_items(),
                kind.is_pure_reduction(),
                "state {} classified as {:?}",
                id,
                kind
            );
            if kind == DfaStateKind::ShiftOnly {
                for item in state.items() {
                    assert!(!items.get(*item).is_reduction(&grammar));
                }
            }
        }
    }
}

#[test]
fn epsilon_transitions_target_dot_zero() {
    for source in [EXPR, ARITH, DANGLING_ELSE, EPSILON] {
        let grammar = load(source);
        let (_, nfa, _) = automata(&grammar);
        for t in nfa.transitions() {
            if t.symbol == Symbol::Epsilon {
                assert_eq!(nfa.state(t.to).item().dot, 0);
            }
        }
    }
}

#[test]
fn item_round_trip() {
    let grammar = load(ARITH);
    let mut items = ItemTable::new(&Limits::unbounded());
    for (rule_id, rule) in grammar.rules() {
        for dot in 0..=rule.len() {
            let id = items.item(&grammar, rule_id, dot).expect("failed to create item");
            let item = items.get(id);
            assert_eq!((item.rule, item.dot), (rule_id, dot));
        }
    }
}

#[test]
fn expression_first_follow() {
    let grammar = load(EXPR);
    let sets = FirstFollow::compute(&grammar).expect("failed to compute sets");
    let e = grammar.lookup("E").unwrap();
    let t = grammar.lookup("T").unwrap();
    let id = grammar.lookup("id").unwrap();
    let plus = grammar.lookup("+").unwrap();

    assert_eq!(sets.first(e).unwrap(), vec![id]);
    assert_eq!(sets.first(t).unwrap(), vec![id]);
    for nt in [e, t] {
        let mut follow = sets.follow(nt).unwrap();
        follow.sort();
        assert_eq!(follow, vec![plus, Symbol::EndOfInput]);
    }
}

#[test]
fn nullable_sets() {
    let grammar = load(EPSILON);
    let sets = FirstFollow::compute(&grammar).expect("failed to compute sets");
    let a = grammar.lookup("A").unwrap();
    let b = grammar.lookup("B").unwrap();
    assert_eq!(grammar.stats().epsilon_rules, 2);
    assert!(sets.first_contains(b, Symbol::Epsilon).unwrap());
    assert_eq!(sets.first(a).unwrap().len(), 3);
    assert!(!sets.first_contains(a, Symbol::Epsilon).unwrap());
}

#[test]
fn dfa_graph_export() {
    let grammar = load(EXPR);
    let (items, nfa, dfa) = automata(&grammar);
    let graph = dfa.to_graph(&grammar, &items);
    assert_eq!(graph.node_count(), dfa.state_count());
    assert_eq!(nfa.to_graph(&grammar).edge_count(), nfa.transitions().len());
}
