//! Conversion of the generated automaton into the runtime parse table.

use crate::{
    grammar::Grammar,
    lr1::{Action, DFA},
};
use lrforge_runtime::{
    table::{self, NonterminalIndex, StateIndex, TerminalIndex},
    FrozenProduction, ParseTable, StateRow, TableError,
};

/// Freeze `dfa` into an immutable [`ParseTable`].
///
/// Symbol and production ids carry over unchanged, and node ids become state
/// indices, so state 0 is the initial state.
pub fn freeze(grammar: &Grammar, dfa: &DFA) -> Result<ParseTable, TableError> {
    let terminals = grammar
        .terminals
        .values()
        .map(|t| t.name().to_owned())
        .collect();
    let nonterminals = grammar
        .nonterminals
        .values()
        .map(|n| n.name().to_owned())
        .collect();

    let productions = grammar
        .productions
        .values()
        .map(|p| FrozenProduction {
            id: p.id().raw(),
            lhs: p.left().raw(),
            rhs_len: p.right().len() as u16,
            captured: p.captured_positions().collect(),
            action: p.action().cloned(),
        })
        .collect();

    let states = dfa
        .nodes()
        .map(|(_, node)| StateRow {
            actions: node
                .actions()
                .map(|(t, action)| {
                    let action = match action {
                        Action::Shift(next) => table::Action::Shift(next.raw() as StateIndex),
                        Action::Reduce(p) => table::Action::Reduce(p.raw()),
                        Action::Accept => table::Action::Accept,
                    };
                    (t.raw() as TerminalIndex, action)
                })
                .collect(),
            gotos: node
                .gotos()
                .map(|(n, next)| (n.raw() as NonterminalIndex, next.raw() as StateIndex))
                .collect(),
        })
        .collect();

    let table = ParseTable::new(terminals, nonterminals, productions, states)?;
    tracing::debug!(
        "froze {} states over {} terminals",
        table.num_states(),
        table.terminals().count()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrforge_runtime::{table::EOI, Builtin, SemanticAction};

    #[test]
    fn freeze_sequence() {
        let grammar = Grammar::from_str("@s: A*").unwrap();
        let dfa = DFA::generate(&grammar).unwrap();
        let table = freeze(&grammar, &dfa).unwrap();

        assert_eq!(table.num_states(), dfa.num_nodes());
        assert_eq!(table.terminals().collect::<Vec<_>>(), ["$eoi", "A"]);
        assert_eq!(
            table.nonterminals().collect::<Vec<_>>(),
            ["$start", "s", "A*"]
        );

        let star = table.nonterminal("A*").unwrap();
        let recursive = table
            .productions()
            .iter()
            .find(|p| p.lhs == star.id && p.rhs_len == 2)
            .unwrap();
        assert_eq!(recursive.captured, vec![0, 1]);
        assert_eq!(
            recursive.action,
            Some(SemanticAction::Builtin(Builtin::Sequence))
        );

        // `A*` is nullable, so the initial state reduces on the end of input.
        assert!(matches!(
            table.action(table.initial_state(), EOI),
            Some(table::Action::Reduce(..))
        ));
    }
}
