use crate::automaton::Automaton;
use crate::grammar::{Grammar, Rule, RuleIdx};
use crate::sets::FirstFollow;
use crate::table::{AnalysisError, Table};

/// Everything one grammar-analysis run produces: the canonical collection,
/// the FIRST/FOLLOW tables, and the conflict-checked action table.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub automaton: Automaton,
    pub first_follow: FirstFollow,
    pub table: Table,
}

/// Runs the whole pipeline for an ordered rule sequence and a start rule
/// index. Returns the bundled result, or the first conflict when the grammar
/// is not LR(1). A start index naming no rule is rejected up front.
pub fn analyze(rules: Vec<Rule>, start_rule: usize) -> Result<Analysis, AnalysisError> {
    let grammar = Grammar::new(rules);
    if start_rule >= grammar.len() {
        return Err(AnalysisError::RuleNotFound);
    }
    let first_follow = FirstFollow::compute(&grammar);
    let automaton = Automaton::build(grammar, RuleIdx(start_rule as u32), &first_follow);
    let table = Table::generate(&automaton)?;
    Ok(Analysis {
        automaton,
        first_follow,
        table,
    })
}
