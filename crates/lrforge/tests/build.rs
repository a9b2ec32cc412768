use lrforge::{
    grammar::GrammarDefError,
    lr1::{Config, ConflictKind, DFAError},
    runtime::{Action, ParseTable, TableError},
    BuildError,
};
use std::{env, fs, path::PathBuf};

fn read_grammar(name: &str) -> String {
    let path = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap())
        .join("tests/grammars")
        .join(format!("{}.lrf", name));
    fs::read_to_string(path).unwrap()
}

#[test]
fn dangling_else_reports_one_conflict() {
    for config in [
        Config::new().use_canonical().clone(),
        Config::new().use_pgm().clone(),
        Config::new().use_lalr().clone(),
    ] {
        let output = lrforge::build_with_config(&read_grammar("dangling_else"), &config).unwrap();
        assert_eq!(output.diagnostics.len(), 1, "{:?}", config);

        let conflict = &output.diagnostics[0];
        let g = &output.grammar;
        assert_eq!(g.terminals[&conflict.terminal].name(), "ELSE");
        let (shift, reduces) = match &conflict.kind {
            ConflictKind::ShiftReduce { shift, reduces } => (*shift, reduces),
            kind => panic!("unexpected conflict: {:?}", kind),
        };
        assert_eq!(reduces.len(), 1);
        assert_eq!(
            g.production(reduces[0]).display(g).to_string(),
            "stmt : IF expr THEN stmt"
        );

        // The frozen table keeps the shift.
        let else_ = output.table.terminal("ELSE").unwrap().id;
        assert_eq!(
            output.table.action(conflict.state.raw(), else_),
            Some(Action::Shift(shift.raw()))
        );
        assert!(conflict
            .display(g)
            .to_string()
            .contains("resolved as shift"));
    }
}

#[test]
fn conflict_free_grammars() {
    for name in ["expr", "list", "json", "lr1"] {
        let output = lrforge::build(&read_grammar(name)).unwrap();
        assert!(output.diagnostics.is_empty(), "{}", name);
    }
}

#[test]
fn json_round_trip() {
    let output = lrforge::build(&read_grammar("json")).unwrap();
    let json = output.table.to_json().unwrap();

    let reloaded = ParseTable::from_json(&json).unwrap();
    assert_eq!(reloaded, output.table);
    assert_eq!(reloaded.to_json().unwrap(), json);

    let mut buf = vec![];
    output.table.to_writer(&mut buf).unwrap();
    assert_eq!(ParseTable::from_reader(&buf[..]).unwrap(), output.table);
}

#[test]
fn builds_are_deterministic() {
    let source = read_grammar("json");
    let first = lrforge::build(&source).unwrap();
    let second = lrforge::build(&source).unwrap();
    assert_eq!(first.table, second.table);
    assert_eq!(
        first.table.to_json().unwrap(),
        second.table.to_json().unwrap()
    );
    assert_eq!(
        first.dfa.display(&first.grammar).to_string(),
        second.dfa.display(&second.grammar).to_string()
    );
}

#[test]
fn rejects_inconsistent_tables() {
    let output = lrforge::build(&read_grammar("expr")).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&output.table.to_json().unwrap()).unwrap();
    value["terminals"][0] = "first".into();
    let err = ParseTable::from_json(&value.to_string()).unwrap_err();
    assert!(matches!(err, TableError::Inconsistent { .. }), "{:?}", err);

    let err = ParseTable::from_json("{").unwrap_err();
    assert!(matches!(err, TableError::Json(..)));
}

#[test]
fn build_errors() {
    assert!(matches!(
        lrforge::build("@s: t").unwrap_err(),
        BuildError::Grammar(GrammarDefError::UndefinedSymbol { ref name }) if name == "t"
    ));
    assert!(matches!(
        lrforge::build("s: A").unwrap_err(),
        BuildError::Grammar(GrammarDefError::MissingEntrypoint)
    ));
    assert!(matches!(
        lrforge::build("@s: A\n@t: B").unwrap_err(),
        BuildError::Grammar(GrammarDefError::DuplicateEntrypoint { .. })
    ));
    assert!(matches!(
        lrforge::build("@s: A+*").unwrap_err(),
        BuildError::Grammar(GrammarDefError::StackedQuantifier { .. })
    ));
    assert!(matches!(
        lrforge::build("@s: s A").unwrap_err(),
        BuildError::Grammar(GrammarDefError::Unproductive { .. })
    ));
    assert!(matches!(
        lrforge::build("@s: A ::").unwrap_err(),
        BuildError::Grammar(GrammarDefError::Syntax(..))
    ));

    let err = lrforge::build_with_config(&read_grammar("json"), Config::new().max_states(4))
        .unwrap_err();
    match err {
        BuildError::Automaton(DFAError::StateLimitExceeded { limit, .. }) => assert_eq!(limit, 4),
        err => panic!("unexpected error: {}", err),
    }
}
