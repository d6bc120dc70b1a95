use log::debug;

use lrgen::{
    analyze::GrammarAnalyzer,
    bnf::Reader,
    grammar::{NonTerminal, Terminal, Token},
    tables::Action,
    Error,
};

use super::common::*;

#[test]
fn list_grammar_end_to_end() {
    let artifacts = run(LIST).unwrap();

    // 4 declared rules plus the augmentation
    assert_eq!(artifacts.grammar().rules().len(), 5);
    assert_eq!(artifacts.grammar().start().name(), "S'");
    debug!("list grammar built {} states", artifacts.action().len());

    let end = Terminal::end();
    let plus = Terminal::quote("+");
    let follow = |name: &str| &artifacts.follow()[&NonTerminal::new(name)];
    assert_eq!(*follow("S"), [end.clone()].into());
    assert_eq!(*follow("E"), [end.clone()].into());
    assert_eq!(*follow("T"), [plus, end].into());

    // table generation succeeded without conflicts, so every reduce cell
    // names a real, non-augmentation rule
    for row in artifacts.action() {
        for action in row.values() {
            if let Action::Reduce(rule) = action {
                assert!(*rule != 0 && *rule < artifacts.grammar().rules().len());
            }
        }
    }
}

#[test]
fn list_grammar_first_sets() {
    init_logging();
    let grammar = Reader::new(LIST.as_bytes()).unwrap().read().unwrap();
    let analyzer = GrammarAnalyzer::new(&grammar);

    let int = Terminal::regex("int", "[0-9]+");
    let plus = Terminal::quote("+");
    let first = |name: &str| &analyzer.first()[&Token::NonTerminal(NonTerminal::new(name))];

    assert_eq!(*first("S"), [int.clone()].into());
    assert_eq!(*first("T"), [int].into());
    assert_eq!(*first("E"), [plus, Terminal::epsilon()].into());
}

#[test]
fn arithmetic_grammar_end_to_end() {
    let artifacts = run(ARITHMETIC).unwrap();

    assert_eq!(artifacts.grammar().rules().len(), 8);
    debug!("arithmetic grammar built {} states", artifacts.action().len());

    // some state accepts, and only ever under the end marker
    let accepts: Vec<_> = artifacts
        .action()
        .iter()
        .enumerate()
        .flat_map(|(state, row)| row.iter().map(move |(key, action)| (state, key, action)))
        .filter(|(_, _, action)| matches!(action, Action::Accept))
        .collect();
    assert_eq!(accepts.len(), 1);
    assert_eq!(accepts[0].1, "T_$");
}

#[test]
fn ambiguous_grammar_is_rejected_as_reduce_reduce() {
    let err = run(AMBIGUOUS).unwrap_err();

    let Error::Conflict(conflict) = err else {
        panic!("expected a table conflict, got: {:?}", err);
    };
    assert_eq!(conflict.kind.to_string(), "reduce/reduce");
    assert_eq!(conflict.key, "T_$");
}

#[test]
fn generation_is_deterministic() {
    let a = run(ARITHMETIC).unwrap();
    let b = run(ARITHMETIC).unwrap();

    assert_eq!(a, b);
    // byte-for-byte, the way a code emitter would observe the views
    assert_eq!(format!("{:?}", a.action()), format!("{:?}", b.action()));
    assert_eq!(format!("{:?}", a.goto()), format!("{:?}", b.goto()));
    assert_eq!(format!("{:?}", a.follow()), format!("{:?}", b.follow()));
}

#[test]
fn ignored_patterns_reach_the_artifact_surface() {
    let input = "IGNORE = [ \\t]+\n\
                 int = [0-9]+\n\
                 <S> = int\n\
                 IGNORE = #.*\n";
    let artifacts = run(input).unwrap();

    assert_eq!(artifacts.grammar().ignored(), ["[ \\t]+", "#.*"]);
}
