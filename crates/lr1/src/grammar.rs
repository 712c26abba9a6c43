use std::collections::HashMap;
use std::fmt;
use std::iter;

use thiserror::Error;

use lr1_util::make_type_idx;

use crate::sets::SymbolSet;

/// A single-character grammar symbol. Uppercase letters are non-terminals;
/// every other character (lowercase letters, punctuation, the end marker)
/// is a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(char);

impl Symbol {
    /// End-of-input marker, the lookahead of every start item.
    pub const END: Symbol = Symbol('#');

    pub fn value(self) -> char {
        self.0
    }

    pub fn is_nonterminal(self) -> bool {
        self.0.is_uppercase()
    }

    pub fn is_terminal(self) -> bool {
        !self.is_nonterminal()
    }
}

impl From<char> for Symbol {
    fn from(value: char) -> Symbol {
        Symbol(value)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GrammarError {
    #[error("malformed rule: {0}")]
    MalformedRule(&'static str),
    #[error("malformed item: {0}")]
    MalformedItem(&'static str),
}

// splits on `sep`, rejecting inputs where it appears more than once
fn split_once_exact<'a>(text: &'a str, sep: &str) -> Option<(&'a str, &'a str)> {
    let (head, tail) = text.split_once(sep)?;
    if tail.contains(sep) {
        return None;
    }
    Some((head, tail))
}

/// A production rule: one symbol on the left, at least one on the right.
/// Rules are immutable values; a grammar is an ordered sequence of them and
/// a rule's index in that sequence identifies it in table output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rule {
    left: Symbol,
    right: Vec<Symbol>,
}

impl Rule {
    pub fn new(left: Symbol, right: Vec<Symbol>) -> Rule {
        assert!(
            !right.is_empty(),
            "a rule must have at least one symbol on the right"
        );
        Rule { left, right }
    }

    /// Parses the `A -> BC` textual form: a single symbol, the arrow
    /// surrounded by single spaces, one or more symbols.
    pub fn parse(text: &str) -> Result<Rule, GrammarError> {
        let (left, right) = split_once_exact(text, " -> ").ok_or(GrammarError::MalformedRule(
            "expected exactly one ` -> ` between the two sides",
        ))?;
        if left.chars().count() != 1 {
            return Err(GrammarError::MalformedRule(
                "the left side must be exactly one symbol",
            ));
        }
        if right.is_empty() {
            return Err(GrammarError::MalformedRule(
                "the right side must have at least one symbol",
            ));
        }
        if left.chars().chain(right.chars()).any(char::is_whitespace) {
            return Err(GrammarError::MalformedRule(
                "whitespace is not allowed inside a rule",
            ));
        }
        let left = Symbol::from(left.chars().next().ok_or(GrammarError::MalformedRule(
            "the left side must be exactly one symbol",
        ))?);
        Ok(Rule {
            left,
            right: right.chars().map(Symbol::from).collect(),
        })
    }

    pub fn left(&self) -> Symbol {
        self.left
    }

    pub fn right(&self) -> &[Symbol] {
        &self.right
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> ", self.left)?;
        for symbol in &self.right {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

/// A rule with a dot marking parse progress plus a lookahead symbol.
/// `dot` counts symbols already matched, so it ranges over
/// `0..=rule.right().len()`; the item is complete when the dot sits past
/// the last right-hand symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    rule: Rule,
    dot: usize,
    lookahead: Symbol,
}

impl Item {
    pub fn new(rule: Rule, dot: usize, lookahead: Symbol) -> Item {
        assert!(dot <= rule.right().len(), "dot position outside the rule");
        Item {
            rule,
            dot,
            lookahead,
        }
    }

    /// The fresh item of a start rule: dot at the front, end marker as
    /// lookahead.
    pub fn start(rule: Rule) -> Item {
        Item::new(rule, 0, Symbol::END)
    }

    /// Parses the `A -> B.C | x` textual form: a rule body with a single
    /// dot somewhere in the right-hand run, then the lookahead symbol.
    pub fn parse(text: &str) -> Result<Item, GrammarError> {
        let (body, lookahead) = split_once_exact(text, " | ").ok_or(
            GrammarError::MalformedItem("expected exactly one ` | ` before the lookahead"),
        )?;
        if lookahead.chars().count() != 1 {
            return Err(GrammarError::MalformedItem(
                "the lookahead must be exactly one symbol",
            ));
        }
        let (left, right) = split_once_exact(body, " -> ").ok_or(GrammarError::MalformedItem(
            "expected exactly one ` -> ` between the two sides",
        ))?;
        if left.chars().count() != 1 {
            return Err(GrammarError::MalformedItem(
                "the left side must be exactly one symbol",
            ));
        }
        if right.matches('.').count() != 1 {
            return Err(GrammarError::MalformedItem(
                "the right side must contain exactly one dot",
            ));
        }
        let dot = right
            .chars()
            .position(|c| c == '.')
            .ok_or(GrammarError::MalformedItem(
                "the right side must contain exactly one dot",
            ))?;
        let symbols: Vec<Symbol> = right
            .chars()
            .filter(|&c| c != '.')
            .map(Symbol::from)
            .collect();
        if symbols.is_empty() {
            return Err(GrammarError::MalformedItem(
                "the right side must have at least one symbol besides the dot",
            ));
        }
        if left
            .chars()
            .chain(right.chars())
            .chain(lookahead.chars())
            .any(char::is_whitespace)
        {
            return Err(GrammarError::MalformedItem(
                "whitespace is not allowed inside an item",
            ));
        }
        let left = Symbol::from(left.chars().next().ok_or(GrammarError::MalformedItem(
            "the left side must be exactly one symbol",
        ))?);
        let lookahead = Symbol::from(lookahead.chars().next().ok_or(
            GrammarError::MalformedItem("the lookahead must be exactly one symbol"),
        )?);
        Ok(Item::new(Rule::new(left, symbols), dot, lookahead))
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn dot(&self) -> usize {
        self.dot
    }

    pub fn lookahead(&self) -> Symbol {
        self.lookahead
    }

    pub fn is_complete(&self) -> bool {
        self.dot == self.rule.right().len()
    }

    /// The symbol right after the dot, `None` once the item is complete.
    pub fn next_symbol(&self) -> Option<Symbol> {
        self.rule.right().get(self.dot).copied()
    }

    pub fn remaining(&self) -> usize {
        self.rule.right().len() - self.dot
    }

    /// Looks `skip` symbols past the dot. Panics when that runs off the end
    /// of the rule; callers must check `remaining` first.
    pub fn peek(&self, skip: usize) -> Symbol {
        assert!(
            self.dot + skip < self.rule.right().len(),
            "peek past the end of the rule"
        );
        self.rule.right()[self.dot + skip]
    }

    pub fn can_apply(&self, symbol: Symbol) -> bool {
        self.next_symbol() == Some(symbol)
    }

    /// Advances the dot over `symbol`. Panics unless `can_apply(symbol)`.
    pub fn apply(&self, symbol: Symbol) -> Item {
        assert!(self.can_apply(symbol), "item does not accept this symbol");
        Item {
            rule: self.rule.clone(),
            dot: self.dot + 1,
            lookahead: self.lookahead,
        }
    }

    /// The dotted-rule part without the lookahead, e.g. `E -> E.-T`.
    pub fn body_string(&self) -> String {
        let mut out = String::new();
        out.push(self.rule.left().value());
        out.push_str(" -> ");
        for (position, symbol) in self.rule.right().iter().enumerate() {
            if position == self.dot {
                out.push('.');
            }
            out.push(symbol.value());
        }
        if self.is_complete() {
            out.push('.');
        }
        out
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.body_string(), self.lookahead)
    }
}

make_type_idx!(RuleIdx, Rule);

/// An ordered rule sequence plus the derived lookup structures the closure
/// engine and the table generator need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
    by_left: HashMap<Symbol, Vec<RuleIdx>>,
}

impl Grammar {
    pub fn new(rules: Vec<Rule>) -> Grammar {
        let mut by_left: HashMap<Symbol, Vec<RuleIdx>> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            by_left
                .entry(rule.left())
                .or_default()
                .push(RuleIdx(index as u32));
        }
        Grammar { rules, by_left }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, index: RuleIdx) -> &Rule {
        &self.rules[index]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn index_of(&self, rule: &Rule) -> Option<RuleIdx> {
        self.rules
            .iter()
            .position(|known| known == rule)
            .map(|index| RuleIdx(index as u32))
    }

    pub fn rules_with_left(&self, left: Symbol) -> &[RuleIdx] {
        self.by_left.get(&left).map(Vec::as_slice).unwrap_or(&[])
    }

    fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.rules
            .iter()
            .flat_map(|rule| iter::once(rule.left()).chain(rule.right().iter().copied()))
    }

    /// Every terminal appearing in the grammar, always including the end
    /// marker.
    pub fn terminals(&self) -> SymbolSet {
        let mut terminals: SymbolSet = self
            .symbols()
            .filter(|symbol| symbol.is_terminal())
            .collect();
        terminals.insert(Symbol::END);
        terminals
    }

    pub fn nonterminals(&self) -> SymbolSet {
        self.symbols()
            .filter(|symbol| symbol.is_nonterminal())
            .collect()
    }
}
