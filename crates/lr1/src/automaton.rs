use petgraph::graph::Graph;

use crate::closure::{ClosureEngine, State, StateIdx};
use crate::grammar::{Grammar, Item, RuleIdx};
use crate::sets::{FirstFollow, SymbolSet};

/// The canonical LR(1) collection: every reachable state in discovery order
/// (which defines the `I0, I1, ...` names), the transition graph recorded on
/// the states, the originating grammar and start rule, and the symbol
/// alphabet split into terminals and non-terminals.
#[derive(Debug, Clone)]
pub struct Automaton {
    grammar: Grammar,
    start_rule: RuleIdx,
    states: Vec<State>,
    terminals: SymbolSet,
    nonterminals: SymbolSet,
}

impl Automaton {
    /// Breadth-first canonical-collection construction. States live in an
    /// append-only arena and discovery runs an index cursor over it; a goto
    /// target equal (as an item set) to a known state is reused, anything
    /// else is appended and picks up the next name.
    pub fn build(grammar: Grammar, start_rule: RuleIdx, tables: &FirstFollow) -> Automaton {
        let states = discover_states(&grammar, start_rule, tables);
        let terminals = grammar.terminals();
        let nonterminals = grammar.nonterminals();
        Automaton {
            grammar,
            start_rule,
            states,
            terminals,
            nonterminals,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn start_rule(&self) -> RuleIdx {
        self.start_rule
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, index: StateIdx) -> &State {
        &self.states[index]
    }

    pub fn terminals(&self) -> &SymbolSet {
        &self.terminals
    }

    pub fn nonterminals(&self) -> &SymbolSet {
        &self.nonterminals
    }

    /// The transition graph with `I{n}` node labels and transition symbols
    /// as edge weights, ready for graphviz rendering.
    pub fn transition_graph(&self) -> Graph<String, char> {
        let mut graph = Graph::new();
        let nodes: Vec<_> = (0..self.states.len())
            .map(|index| graph.add_node(StateIdx(index as u32).to_string()))
            .collect();
        for (index, state) in self.states.iter().enumerate() {
            for &(symbol, target) in state.transitions() {
                graph.add_edge(nodes[index], nodes[target.idx()], symbol.value());
            }
        }
        graph
    }
}

fn discover_states(grammar: &Grammar, start_rule: RuleIdx, tables: &FirstFollow) -> Vec<State> {
    let engine = ClosureEngine::new(grammar, tables);
    let start_item = Item::start(grammar.rule(start_rule).clone());

    let mut states = vec![engine.closure([start_item])];
    let mut cursor = 0;
    while cursor < states.len() {
        for symbol in states[cursor].next_symbols() {
            let target = engine.closure(states[cursor].advance(symbol));
            let target_index = match states.iter().position(|known| *known == target) {
                Some(known) => StateIdx(known as u32),
                None => StateIdx::from_push(&mut states, target),
            };
            states[cursor].add_transition(symbol, target_index);
        }
        cursor += 1;
    }
    states
}
