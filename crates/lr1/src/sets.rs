use std::collections::HashMap;

use bit_set::BitSet;

use crate::grammar::{Grammar, Symbol};

/// A set of symbols backed by a bit set over code points. Iteration order is
/// ascending by character value, which keeps every consumer deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    data: BitSet,
}

impl SymbolSet {
    pub fn new() -> SymbolSet {
        SymbolSet {
            data: BitSet::new(),
        }
    }

    /// Returns true when the symbol was not already present.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        self.data.insert(symbol.value() as usize)
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.data.contains(symbol.value() as usize)
    }

    /// Unions `other` into `self`, reporting whether anything was added.
    pub fn union_with(&mut self, other: &SymbolSet) -> bool {
        let before = self.data.len();
        self.data.union_with(&other.data);
        self.data.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.data
            .iter()
            .filter_map(|bit| char::from_u32(bit as u32))
            .map(Symbol::from)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> SymbolSet {
        let mut set = SymbolSet::new();
        for symbol in iter {
            set.insert(symbol);
        }
        set
    }
}

/// FIRST and FOLLOW sets for every non-terminal of a grammar, built once by
/// fixed-point iteration and read-only afterward.
///
/// FIRST only looks at the leading right-hand symbol of each rule (no
/// nullable-prefix walking; empty productions cannot be constructed in the
/// first place). FOLLOW is informational: table generation reads the
/// lookahead carried by each item, never these sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstFollow {
    first: HashMap<Symbol, SymbolSet>,
    follow: HashMap<Symbol, SymbolSet>,
}

impl FirstFollow {
    pub fn compute(grammar: &Grammar) -> FirstFollow {
        let nonterminals: Vec<Symbol> = grammar.nonterminals().iter().collect();

        let mut first: HashMap<Symbol, SymbolSet> = nonterminals
            .iter()
            .map(|&nonterminal| (nonterminal, SymbolSet::new()))
            .collect();
        for rule in grammar.rules() {
            let head = rule.right()[0];
            if head.is_terminal() {
                if let Some(set) = first.get_mut(&rule.left()) {
                    set.insert(head);
                }
            }
        }
        loop {
            let mut changed = false;
            for rule in grammar.rules() {
                let head = rule.right()[0];
                if head.is_terminal() || head == rule.left() {
                    continue;
                }
                // the sets are tiny, cloning the source beats fighting the
                // borrow checker over two entries of the same map
                let from = first.get(&head).cloned().unwrap_or_default();
                if let Some(into) = first.get_mut(&rule.left()) {
                    changed |= into.union_with(&from);
                }
            }
            if !changed {
                break;
            }
        }

        let mut follow: HashMap<Symbol, SymbolSet> = nonterminals
            .iter()
            .map(|&nonterminal| (nonterminal, SymbolSet::new()))
            .collect();
        loop {
            let mut changed = false;
            for rule in grammar.rules() {
                let right = rule.right();
                for (position, &symbol) in right.iter().enumerate() {
                    if !symbol.is_nonterminal() {
                        continue;
                    }
                    match right.get(position + 1) {
                        None => {
                            let from = follow.get(&rule.left()).cloned().unwrap_or_default();
                            if let Some(into) = follow.get_mut(&symbol) {
                                changed |= into.union_with(&from);
                            }
                        }
                        Some(&next) if next.is_terminal() => {
                            if let Some(into) = follow.get_mut(&symbol) {
                                changed |= into.insert(next);
                            }
                        }
                        Some(&next) => {
                            let from = first.get(&next).cloned().unwrap_or_default();
                            if let Some(into) = follow.get_mut(&symbol) {
                                changed |= into.union_with(&from);
                            }
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }

        FirstFollow { first, follow }
    }

    pub fn first(&self, nonterminal: Symbol) -> Option<&SymbolSet> {
        self.first.get(&nonterminal)
    }

    pub fn follow(&self, nonterminal: Symbol) -> Option<&SymbolSet> {
        self.follow.get(&nonterminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Rule;

    fn grammar(rules: &[&str]) -> Grammar {
        Grammar::new(
            rules
                .iter()
                .map(|rule| Rule::parse(rule).expect("test rule must parse"))
                .collect(),
        )
    }

    fn set(symbols: &str) -> SymbolSet {
        symbols.chars().map(Symbol::from).collect()
    }

    const EXPRESSION_RULES: &[&str] = &[
        "G -> S", "S -> E", "E -> E-T", "E -> T", "T -> T*F", "T -> F", "F -> i", "F -> (E)",
    ];

    #[test]
    fn expression_first_sets() {
        let grammar = grammar(EXPRESSION_RULES);
        let tables = FirstFollow::compute(&grammar);
        for nonterminal in "GSETF".chars().map(Symbol::from) {
            assert_eq!(tables.first(nonterminal), Some(&set("i(")), "{nonterminal}");
        }
    }

    #[test]
    fn expression_follow_sets() {
        let grammar = grammar(EXPRESSION_RULES);
        let tables = FirstFollow::compute(&grammar);
        assert_eq!(tables.follow(Symbol::from('G')), Some(&set("")));
        assert_eq!(tables.follow(Symbol::from('S')), Some(&set("")));
        assert_eq!(tables.follow(Symbol::from('E')), Some(&set("-)")));
        assert_eq!(tables.follow(Symbol::from('T')), Some(&set("-)*")));
        assert_eq!(tables.follow(Symbol::from('F')), Some(&set("-)*")));
    }

    #[test]
    fn branching_grammar_sets() {
        let grammar = grammar(&[
            "G -> S", "S -> aAd", "S -> bAc", "S -> aec", "S -> bed", "A -> e",
        ]);
        let tables = FirstFollow::compute(&grammar);
        assert_eq!(tables.first(Symbol::from('G')), Some(&set("ab")));
        assert_eq!(tables.first(Symbol::from('S')), Some(&set("ab")));
        assert_eq!(tables.first(Symbol::from('A')), Some(&set("e")));
        assert_eq!(tables.follow(Symbol::from('A')), Some(&set("cd")));
    }

    #[test]
    fn symbol_set_reports_growth() {
        let mut symbols = SymbolSet::new();
        assert!(symbols.insert(Symbol::from('a')));
        assert!(!symbols.insert(Symbol::from('a')));
        assert!(symbols.contains(Symbol::from('a')));

        let mut other = SymbolSet::new();
        other.insert(Symbol::from('b'));
        assert!(symbols.union_with(&other));
        assert!(!symbols.union_with(&other));
        assert_eq!(symbols.len(), 2);
        assert_eq!(
            symbols.iter().collect::<Vec<_>>(),
            vec![Symbol::from('a'), Symbol::from('b')]
        );
    }
}
