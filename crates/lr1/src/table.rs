use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use thiserror::Error;

use crate::automaton::Automaton;
use crate::closure::StateIdx;
use crate::grammar::{RuleIdx, Symbol};

/// One cell of the parse table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateIdx),
    Goto(StateIdx),
    Reduce(RuleIdx),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(target) => write!(f, "shift to {target}"),
            Action::Goto(target) => write!(f, "goto {target}"),
            Action::Reduce(rule) => write!(f, "reduce by rule {}", rule.idx()),
            Action::Accept => write!(f, "accept"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The grammar needs two different actions in the same table cell, so it
    /// is not LR(1) for the chosen start rule. A normal outcome for some
    /// grammars, not a bug.
    #[error(
        "the grammar is not LR(1): at state {state} on `{symbol}`, \"{existing}\" conflicts with \"{proposed}\""
    )]
    NotLr1 {
        state: StateIdx,
        symbol: Symbol,
        existing: Action,
        proposed: Action,
    },
    /// An item references a rule missing from the grammar's rule sequence.
    /// Construction never produces such an item, so this is an internal
    /// invariant violation.
    #[error("an item references a rule that is not part of the grammar")]
    RuleNotFound,
}

/// The conflict-checked action table: exactly one action per
/// `(state, symbol)` key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    actions: HashMap<(StateIdx, Symbol), Action>,
}

impl Table {
    /// Walks the automaton and fills the table: transitions become shifts
    /// (terminal symbol) or gotos (non-terminal), complete items become
    /// reduces, or accept when the item's rule is the start rule. The first
    /// cell that would need two different actions aborts generation; no
    /// partial table is returned.
    pub fn generate(automaton: &Automaton) -> Result<Table, AnalysisError> {
        let mut table = Table::default();
        for (index, state) in automaton.states().iter().enumerate() {
            let index = StateIdx(index as u32);
            for &(symbol, target) in state.transitions() {
                let action = if symbol.is_nonterminal() {
                    Action::Goto(target)
                } else {
                    Action::Shift(target)
                };
                table.propose(index, symbol, action)?;
            }
            for item in state.complete_items() {
                let rule = automaton
                    .grammar()
                    .index_of(item.rule())
                    .ok_or(AnalysisError::RuleNotFound)?;
                let action = if rule == automaton.start_rule() {
                    Action::Accept
                } else {
                    Action::Reduce(rule)
                };
                table.propose(index, item.lookahead(), action)?;
            }
        }
        Ok(table)
    }

    // re-proposing the identical action is a no-op; a different one is a
    // conflict, never an overwrite
    fn propose(
        &mut self,
        state: StateIdx,
        symbol: Symbol,
        action: Action,
    ) -> Result<(), AnalysisError> {
        match self.actions.entry((state, symbol)) {
            Entry::Vacant(slot) => {
                slot.insert(action);
                Ok(())
            }
            Entry::Occupied(slot) if *slot.get() == action => Ok(()),
            Entry::Occupied(slot) => Err(AnalysisError::NotLr1 {
                state,
                symbol,
                existing: *slot.get(),
                proposed: action,
            }),
        }
    }

    pub fn action(&self, state: StateIdx, symbol: Symbol) -> Option<Action> {
        self.actions.get(&(state, symbol)).copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
