use std::io::{self, BufRead};
use std::process;

use clap::Parser;
use lr1::{Action, Analysis, Rule, StateIdx, Symbol, analyze};
use petgraph::dot::Dot;

/// Interactive canonical-LR(1) solver: reads a grammar, prints the closure
/// collection, the FIRST/FOLLOW sets and the parse table.
#[derive(clap::Parser)]
struct AppArgs {
    /// also print the automaton as a graphviz digraph
    #[clap(short, long)]
    dot: bool,
}

const MAX_RULES: usize = 20;

fn main() {
    let args = AppArgs::parse();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Welcome to the LR(1) console solver!");
    println!("It builds the canonical collection and the parse table for a grammar.");
    let size = read_bounded_number(&mut lines, "Input the rule set size (1 to 20):", 1, MAX_RULES);

    println!("Input the rules, one per line. Example:");
    println!("A -> BC");
    println!("One symbol on the left, at least one on the right, single spaces around the arrow.");
    println!("Wrong: `A->BC`, `A ->BC`, `A-> B  C`, `Ab -> BC`");

    let mut rules: Vec<Rule> = Vec::with_capacity(size);
    while rules.len() < size {
        match Rule::parse(&read_line(&mut lines)) {
            Ok(rule) => {
                println!("OK!");
                rules.push(rule);
            }
            Err(error) => println!("That's not a valid rule ({error}), try again:"),
        }
    }

    println!("Your rules:");
    for (index, rule) in rules.iter().enumerate() {
        println!("{index}: {rule}");
    }

    let start = read_bounded_number(
        &mut lines,
        "Which rule is the start? (counted from 0):",
        0,
        size - 1,
    );

    match analyze(rules, start) {
        Ok(analysis) => render(&analysis, args.dot),
        Err(error) => println!("{error}"),
    }
}

fn read_line(lines: &mut impl Iterator<Item = io::Result<String>>) -> String {
    match lines.next() {
        // strip the \r a windows console leaves behind
        Some(Ok(line)) => line.trim_end_matches('\r').to_string(),
        // stdin closed or unreadable, nothing left to solve
        _ => process::exit(0),
    }
}

fn read_bounded_number(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    prompt: &str,
    low: usize,
    high: usize,
) -> usize {
    println!("{prompt}");
    loop {
        match read_line(lines).trim().parse::<usize>() {
            Ok(value) if (low..=high).contains(&value) => return value,
            _ => println!(
                "That's not a valid number, it must be an integer between {low} and {high}:"
            ),
        }
    }
}

fn render(analysis: &Analysis, dot: bool) {
    let automaton = &analysis.automaton;
    let states = automaton.states();

    println!("LR(1) solution:");
    println!("State count: {} (I0 to I{})", states.len(), states.len() - 1);
    for (index, state) in states.iter().enumerate() {
        println!("State {}:", StateIdx(index as u32));
        let width = state
            .items()
            .iter()
            .map(|item| item.body_string().len())
            .max()
            .unwrap_or(0);
        for item in state.items() {
            println!("  {:width$}  {}", item.body_string(), item.lookahead());
        }
        for &(symbol, target) in state.transitions() {
            println!("  when receiving `{symbol}` go to {target}");
        }
        println!("==========================");
    }

    println!("FIRST / FOLLOW:");
    for nonterminal in automaton.nonterminals().iter() {
        println!(
            "  {nonterminal}: FIRST {{{}}} FOLLOW {{{}}}",
            join_set(analysis.first_follow.first(nonterminal)),
            join_set(analysis.first_follow.follow(nonterminal)),
        );
    }

    render_table(analysis);

    if dot {
        println!("{:?}", Dot::new(&automaton.transition_graph()));
    }
}

fn join_set(set: Option<&lr1::SymbolSet>) -> String {
    set.map(|set| {
        set.iter()
            .map(|symbol| symbol.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    })
    .unwrap_or_default()
}

// terminal columns first, then non-terminal (goto) columns, both in symbol
// order; rows in state order
fn render_table(analysis: &Analysis) {
    let automaton = &analysis.automaton;
    let columns: Vec<Symbol> = automaton
        .terminals()
        .iter()
        .chain(automaton.nonterminals().iter())
        .collect();

    println!("Action table:");
    print!("{:>6}", "state");
    for symbol in &columns {
        print!("{:>6}", symbol.to_string());
    }
    println!();

    for index in 0..automaton.states().len() {
        let index = StateIdx(index as u32);
        print!("{:>6}", index.to_string());
        for &symbol in &columns {
            let cell = match analysis.table.action(index, symbol) {
                Some(Action::Shift(target)) => format!("s{}", target.idx()),
                Some(Action::Goto(target)) => format!("g{}", target.idx()),
                Some(Action::Reduce(rule)) => format!("r{}", rule.idx()),
                Some(Action::Accept) => "acc".to_string(),
                None => String::new(),
            };
            print!("{cell:>6}");
        }
        println!();
    }
}
