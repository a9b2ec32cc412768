//! An LR(1) parser generator.
//!
//! A grammar file is parsed into a [`Grammar`](grammar::Grammar), expanded
//! into an LR(1) automaton ([`DFA`](lr1::DFA)) and frozen into the
//! [`ParseTable`] consumed by `lrforge-runtime`.
//!
//! ```text
//! @expr:
//!     | expr '+' term
//!     | term
//! term: NUM | '(' !expr ')'
//! ```

mod desugar;
pub mod first_sets;
pub mod freeze;
pub mod grammar;
pub mod lr1;
pub mod syntax;
pub mod types;
pub mod util;

pub use lrforge_runtime as runtime;

use crate::{
    grammar::{Grammar, GrammarDefError},
    lr1::{Config, Conflict, DFAError, DFA},
};
use lrforge_runtime::{ParseTable, TableError};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Grammar(#[from] GrammarDefError),

    #[error(transparent)]
    Automaton(#[from] DFAError),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Everything produced by a build.
#[derive(Debug)]
pub struct Output {
    pub grammar: Grammar,
    pub dfa: DFA,
    pub table: ParseTable,
    /// Conflicts resolved by the default policy, in state order.
    pub diagnostics: Vec<Conflict>,
}

/// Build a parse table from grammar source text with the default configuration.
pub fn build(source: &str) -> Result<Output, BuildError> {
    build_with_config(source, &Config::new())
}

pub fn build_with_config(source: &str, config: &Config) -> Result<Output, BuildError> {
    let span = tracing::trace_span!("build");
    let _entered = span.enter();

    let grammar = Grammar::from_str(source)?;
    let dfa = DFA::generate_with_config(&grammar, config)?;
    let table = freeze::freeze(&grammar, &dfa)?;
    let diagnostics = dfa.conflicts().to_vec();
    tracing::debug!(
        "built {} states from {} productions ({} conflict(s))",
        table.num_states(),
        grammar.productions.len(),
        diagnostics.len()
    );

    Ok(Output {
        grammar,
        dfa,
        table,
        diagnostics,
    })
}
