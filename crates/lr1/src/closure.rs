use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use lr1_util::make_type_idx;

use crate::grammar::{Grammar, Item, Symbol};
use crate::sets::FirstFollow;

/// One node of the LR(1) automaton: a deduplicated item set plus the
/// outgoing transitions recorded during automaton construction.
///
/// Items are stored sorted so that equality and hashing behave as set
/// equality no matter what order (or how many duplicates) a state was built
/// from. The transition list is bookkeeping filled in by the automaton
/// builder and takes no part in identity.
#[derive(Debug, Clone)]
pub struct State {
    items: Vec<Item>,
    transitions: Vec<(Symbol, StateIdx)>,
}

make_type_idx!(StateIdx, State);

// canonical state names: discovery order, I0 onward
impl fmt::Display for StateIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I{}", self.0)
    }
}

impl State {
    pub fn new(items: impl IntoIterator<Item = Item>) -> State {
        let mut items: Vec<Item> = items.into_iter().collect();
        items.sort();
        items.dedup();
        State {
            items,
            transitions: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn transitions(&self) -> &[(Symbol, StateIdx)] {
        &self.transitions
    }

    /// The distinct symbols some incomplete item expects next, in canonical
    /// item order.
    pub fn next_symbols(&self) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        for item in &self.items {
            if let Some(symbol) = item.next_symbol() {
                if !symbols.contains(&symbol) {
                    symbols.push(symbol);
                }
            }
        }
        symbols
    }

    /// The goto seed for `symbol`: every item expecting it, advanced past it.
    pub fn advance(&self, symbol: Symbol) -> Vec<Item> {
        self.items
            .iter()
            .filter(|item| item.can_apply(symbol))
            .map(|item| item.apply(symbol))
            .collect()
    }

    pub fn complete_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_complete())
    }

    pub(crate) fn add_transition(&mut self, symbol: Symbol, target: StateIdx) {
        if !self.transitions.contains(&(symbol, target)) {
            self.transitions.push((symbol, target));
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &State) -> bool {
        self.items == other.items
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

/// Expands item sets to their LR(1) closure. Borrows the grammar and the
/// FIRST tables for the lifetime of a construction run.
pub struct ClosureEngine<'a> {
    grammar: &'a Grammar,
    tables: &'a FirstFollow,
}

impl<'a> ClosureEngine<'a> {
    pub fn new(grammar: &'a Grammar, tables: &'a FirstFollow) -> ClosureEngine<'a> {
        ClosureEngine { grammar, tables }
    }

    /// The smallest item set containing `seed` that is closed under
    /// non-terminal expansion with lookahead propagation.
    ///
    /// The item universe is bounded by rules x dot positions x terminals and
    /// every pass either grows the set or ends the loop, so this terminates.
    pub fn closure(&self, seed: impl IntoIterator<Item = Item>) -> State {
        let mut items: HashSet<Item> = seed.into_iter().collect();
        loop {
            let mut pending: Vec<Item> = Vec::new();
            for item in &items {
                let Some(next) = item.next_symbol() else {
                    continue;
                };
                if !next.is_nonterminal() {
                    continue;
                }
                for &expansion in self.grammar.rules_with_left(next) {
                    let rule = self.grammar.rule(expansion);
                    if item.remaining() == 1 {
                        pending.push(Item::new(rule.clone(), 0, item.lookahead()));
                    } else {
                        let successor = item.peek(1);
                        if successor.is_terminal() {
                            pending.push(Item::new(rule.clone(), 0, successor));
                        } else if let Some(first) = self.tables.first(successor) {
                            for lookahead in first.iter() {
                                pending.push(Item::new(rule.clone(), 0, lookahead));
                            }
                        }
                    }
                }
            }

            let mut changed = false;
            for item in pending {
                changed |= items.insert(item);
            }
            if !changed {
                return State::new(items);
            }
        }
    }
}
