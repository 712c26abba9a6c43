use crate::grammar::{GrammarError, Item, Rule, Symbol};

fn sym(value: char) -> Symbol {
    Symbol::from(value)
}

#[test]
fn rule_parse_and_display_round_trip() {
    let rule = Rule::parse("E -> E-T").expect("must parse");
    assert_eq!(rule.left(), sym('E'));
    assert_eq!(rule.right(), [sym('E'), sym('-'), sym('T')]);
    assert_eq!(rule.to_string(), "E -> E-T");
    assert_eq!(Rule::parse(&rule.to_string()).expect("must parse"), rule);
}

#[test]
fn rule_equality_is_structural() {
    let a = Rule::parse("A -> BC").expect("must parse");
    let b = Rule::parse("A -> BC").expect("must parse");
    let c = Rule::parse("A -> CB").expect("must parse");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn malformed_rules_are_rejected() {
    let cases = [
        "A->BC",
        "A ->BC",
        "A-> B  C",
        "Ab -> BC",
        "A -> ",
        "A -> B -> C",
        "A  ->  B",
        "-> BC",
        "A - B",
        "A -> B C",
        "",
    ];
    for case in cases {
        assert!(
            matches!(Rule::parse(case), Err(GrammarError::MalformedRule(_))),
            "`{case}` should be rejected"
        );
    }
}

#[test]
fn item_parse_and_display_round_trip() {
    let item = Item::parse("E -> E.-T | #").expect("must parse");
    assert_eq!(item.rule(), &Rule::parse("E -> E-T").expect("must parse"));
    assert_eq!(item.dot(), 1);
    assert_eq!(item.lookahead(), Symbol::END);
    assert_eq!(item.to_string(), "E -> E.-T | #");
    assert_eq!(Item::parse(&item.to_string()).expect("must parse"), item);
}

#[test]
fn item_dot_at_either_end() {
    let fresh = Item::parse("S -> .aAd | #").expect("must parse");
    assert_eq!(fresh.dot(), 0);
    assert!(!fresh.is_complete());
    assert_eq!(fresh.next_symbol(), Some(sym('a')));

    let done = Item::parse("S -> aAd. | #").expect("must parse");
    assert_eq!(done.dot(), 3);
    assert!(done.is_complete());
    assert_eq!(done.next_symbol(), None);
    assert_eq!(done.to_string(), "S -> aAd. | #");
}

#[test]
fn malformed_items_are_rejected() {
    let cases = [
        "E -> E-T",
        "E -> E.-T | ab",
        "E -> E-T | #",
        "E -> .E-.T | #",
        "E -> . | #",
        "E -> E.-T |#",
        "Ab -> .c | #",
        "E -> E.-T | # | #",
    ];
    for case in cases {
        assert!(
            matches!(Item::parse(case), Err(GrammarError::MalformedItem(_))),
            "`{case}` should be rejected"
        );
    }
}

#[test]
fn item_progression() {
    let item = Item::start(Rule::parse("S -> aAd").expect("must parse"));
    assert_eq!(item.lookahead(), Symbol::END);
    assert_eq!(item.remaining(), 3);
    assert_eq!(item.peek(1), sym('A'));
    assert!(item.can_apply(sym('a')));
    assert!(!item.can_apply(sym('A')));

    let item = item.apply(sym('a'));
    assert_eq!(item.dot(), 1);
    assert_eq!(item.lookahead(), Symbol::END);
    assert_eq!(item.remaining(), 2);

    let item = item.apply(sym('A')).apply(sym('d'));
    assert!(item.is_complete());
    assert_eq!(item.next_symbol(), None);
    assert_eq!(item.remaining(), 0);
}

#[test]
#[should_panic(expected = "peek past the end of the rule")]
fn peek_past_the_end_panics() {
    let item = Item::parse("S -> a.b | #").expect("must parse");
    item.peek(1);
}

#[test]
fn symbol_classification() {
    assert!(sym('A').is_nonterminal());
    assert!(!sym('A').is_terminal());
    assert!(sym('a').is_terminal());
    for punctuation in "#()-*".chars() {
        assert!(sym(punctuation).is_terminal(), "`{punctuation}`");
    }
    assert_eq!(Symbol::END, sym('#'));
    assert!(Symbol::END.is_terminal());
}
