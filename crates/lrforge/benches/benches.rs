use std::{env, path::PathBuf};

use criterion::{criterion_group, criterion_main, Criterion};
use lrforge::{
    grammar::Grammar,
    lr1::{Config, DFA},
};

criterion_main!(benches);
criterion_group!(benches, bench_small, bench_json);

fn bench_small(c: &mut Criterion) {
    bench_dfa_gen(c, "expr");
    bench_dfa_gen(c, "dangling_else");
    bench_dfa_gen(c, "list");
    bench_dfa_gen(c, "lr1");
}

fn bench_json(c: &mut Criterion) {
    bench_dfa_gen(c, "json");
}

fn bench_dfa_gen(c: &mut Criterion, grammar_name: &str) {
    let project_root = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .expect("missing environment variable: `CARGO_MANIFEST_DIR'");
    let grammar = Grammar::from_file(
        project_root.join(format!("tests/grammars/{}.lrf", grammar_name)),
    )
    .unwrap();

    let mut group = c.benchmark_group(grammar_name);
    group.bench_function("Canonical", |b| {
        b.iter(|| DFA::generate_with_config(&grammar, Config::new().use_canonical()));
    });
    group.bench_function("PGM", |b| {
        b.iter(|| DFA::generate_with_config(&grammar, Config::new().use_pgm()));
    });
    group.bench_function("LALR", |b| {
        b.iter(|| DFA::generate_with_config(&grammar, Config::new().use_lalr()));
    });
    group.finish();
}
