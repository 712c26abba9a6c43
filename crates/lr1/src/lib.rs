pub mod analysis;
pub mod automaton;
pub mod closure;
pub mod grammar;
pub mod sets;
pub mod table;

#[cfg(test)]
mod grammar_tests;

pub use analysis::{Analysis, analyze};
pub use automaton::Automaton;
pub use closure::{ClosureEngine, State, StateIdx};
pub use grammar::{Grammar, GrammarError, Item, Rule, RuleIdx, Symbol};
pub use sets::{FirstFollow, SymbolSet};
pub use table::{Action, AnalysisError, Table};
