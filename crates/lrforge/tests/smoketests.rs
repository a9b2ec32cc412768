use lrforge::{grammar::Grammar, lr1::Config, lr1::DFA};
use std::{env, path::PathBuf};

fn grammar_path(name: &str) -> PathBuf {
    PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap())
        .join("tests/grammars")
        .join(format!("{}.lrf", name))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

macro_rules! define_tests {
    ($($name:ident),*$(,)?) => {$(
        #[test]
        fn $name() {
            init_tracing();
            let grammar = Grammar::from_file(grammar_path(stringify!($name))).unwrap();
            for config in [
                Config::new().use_canonical().clone(),
                Config::new().use_pgm().clone(),
                Config::new().use_lalr().clone(),
            ] {
                let dfa = DFA::generate_with_config(&grammar, &config).unwrap();
                let table = lrforge::freeze::freeze(&grammar, &dfa).unwrap();
                assert_eq!(table.num_states(), dfa.num_nodes());
            }
        }
    )*};
}

define_tests! {
    expr,
    dangling_else,
    list,
    json,
    lr1,
}

#[test]
fn merge_modes_on_lr1_grammar() {
    init_tracing();
    let grammar = Grammar::from_file(grammar_path("lr1")).unwrap();

    let canonical = DFA::generate_with_config(&grammar, Config::new().use_canonical()).unwrap();
    let pgm = DFA::generate_with_config(&grammar, Config::new().use_pgm()).unwrap();
    let lalr = DFA::generate_with_config(&grammar, Config::new().use_lalr()).unwrap();

    assert!(canonical.conflicts().is_empty());
    assert!(pgm.conflicts().is_empty());
    assert!(!lalr.conflicts().is_empty());
    assert!(lalr.num_nodes() < canonical.num_nodes());
    assert!(pgm.num_nodes() <= canonical.num_nodes());
}

#[test]
fn display_dumps() {
    let grammar = Grammar::from_file(grammar_path("dangling_else")).unwrap();
    let dfa = DFA::generate(&grammar).unwrap();

    let grammar_dump = grammar.to_string();
    assert!(grammar_dump.contains("stmt (entrypoint)"));
    assert!(grammar_dump.contains("stmt : IF expr THEN stmt ELSE stmt"));

    let dfa_dump = dfa.display(&grammar).to_string();
    assert!(dfa_dump.contains("#### State 00"));
    assert!(dfa_dump.contains("=> accept"));
    assert!(dfa_dump.contains("shift/reduce conflict on ELSE"));
}
