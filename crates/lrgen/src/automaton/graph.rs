use petgraph::graph::{DiGraph, NodeIndex};

use crate::grammar::Grammar;

use super::{
    dfa::Dfa,
    item::ItemTable,
    nfa::Nfa,
};

// graphs are labelled with display strings so they can go straight to petgraph's dot writer

impl Nfa {
    pub fn to_graph(&self, grammar: &Grammar) -> DiGraph<String, String> {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = self
            .states()
            .map(|(_, state)| graph.add_node(state.item().display(grammar)))
            .collect();

        for t in self.transitions() {
            graph.add_edge(
                nodes[t.from.index()],
                nodes[t.to.index()],
                grammar.symbol_name(t.symbol).to_string(),
            );
        }
        graph
    }
}

impl Dfa {
    pub fn to_graph(&self, grammar: &Grammar, items: &ItemTable) -> DiGraph<String, String> {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = self
            .states()
            .map(|(id, state)| {
                let mut label = format!("I{}", id);
                for item in state.items() {
                    label.push('\n');
                    label.push_str(&items.get(*item).display(grammar));
                }
                graph.add_node(label)
            })
            .collect();

        for t in self.transitions() {
            graph.add_edge(
                nodes[t.from.index()],
                nodes[t.to.index()],
                grammar.symbol_name(t.symbol).to_string(),
            );
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        automaton::{Dfa, ItemTable, Nfa},
        grammar::{Grammar, LoaderOptions},
        limits::Limits,
    };

    #[test]
    fn graphs_mirror_automata() {
        let g = Grammar::load(
            "E -> E '+' T | T ; T -> 'id' ;",
            &LoaderOptions::default(),
            &Limits::unbounded(),
        )
        .unwrap();
        let mut items = ItemTable::new(&Limits::unbounded());
        let nfa = Nfa::build(&g, &mut items, &Limits::unbounded()).unwrap();
        let dfa = Dfa::build(&g, &mut items, &Limits::unbounded()).unwrap();

        let nfa_graph = nfa.to_graph(&g);
        assert_eq!(nfa_graph.node_count(), nfa.state_count());
        assert_eq!(nfa_graph.edge_count(), nfa.transitions().len());
        assert!(nfa_graph.edge_weights().any(|w| w == "ε"));

        let dfa_graph = dfa.to_graph(&g, &items);
        assert_eq!(dfa_graph.node_count(), dfa.state_count());
        assert_eq!(dfa_graph.edge_count(), dfa.transitions().len());
        assert!(dfa_graph.node_weights().next().unwrap().starts_with("I0\nS' -> . E $"));
    }
}
