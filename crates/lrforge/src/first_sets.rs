//! Calculation of nullable symbols and first sets.

use crate::{
    grammar::{Grammar, NonterminalID, SymbolID},
    types::{Set, TerminalSet},
};

#[derive(Debug)]
pub struct FirstSets {
    nulls: Set<NonterminalID>,
    // indexed by `NonterminalID::index`
    firsts: Vec<TerminalSet>,
}

impl FirstSets {
    pub fn new(grammar: &Grammar) -> Self {
        let nulls = nulls_set(grammar);
        let firsts = first_sets(grammar, &nulls);
        Self { nulls, firsts }
    }

    /// Whether `symbol` derives the empty string.
    pub fn is_nullable(&self, symbol: NonterminalID) -> bool {
        self.nulls.contains(&symbol)
    }

    /// The terminals that can begin a derivation of `symbol`.
    ///
    /// An empty set for a nullable nonterminal means it derives only `ε`.
    pub fn first(&self, symbol: NonterminalID) -> &TerminalSet {
        &self.firsts[symbol.index()]
    }

    /// `First(prefix lookaheads)`
    pub fn get(&self, prefix: &[SymbolID], lookaheads: &TerminalSet) -> TerminalSet {
        let mut res = TerminalSet::default();
        for symbol in prefix {
            match symbol {
                SymbolID::T(t) => {
                    res.insert(*t);
                    return res;
                }
                SymbolID::N(n) => {
                    res.union_with(self.first(*n));
                    if !self.is_nullable(*n) {
                        return res;
                    }
                }
            }
        }
        res.union_with(lookaheads);
        res
    }
}

/// Calculate the set of nullable symbols in this grammar.
fn nulls_set(grammar: &Grammar) -> Set<NonterminalID> {
    let mut nulls: Set<NonterminalID> = grammar
        .productions
        .values()
        .filter_map(|production| production.right().is_empty().then(|| production.left()))
        .collect();

    // Repeat until no new nullable symbol is found.
    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions.values() {
            if nulls.contains(&production.left()) {
                continue;
            }
            let is_rhs_nullable = production
                .right()
                .iter()
                .all(|symbol| matches!(symbol, SymbolID::N(n) if nulls.contains(n)));
            if is_rhs_nullable {
                changed = true;
                nulls.insert(production.left());
            }
        }
    }

    nulls
}

fn first_sets(grammar: &Grammar, nulls: &Set<NonterminalID>) -> Vec<TerminalSet> {
    let mut firsts = vec![TerminalSet::default(); grammar.nonterminals.len()];

    // For `X : Y1 Y2 ... Yn`, with `Yk` the first non-nullable symbol, add
    // the constraint `First(X) ⊇ First(Yi)` for each `i <= k`. Terminals are
    // folded in directly.
    let mut constraints: Vec<(NonterminalID, NonterminalID)> = vec![];
    for production in grammar.productions.values() {
        let left = production.left();
        for symbol in production.right() {
            match symbol {
                SymbolID::T(t) => {
                    firsts[left.index()].insert(*t);
                    break;
                }
                SymbolID::N(n) => {
                    if *n != left {
                        constraints.push((left, *n));
                    }
                    if !nulls.contains(n) {
                        break;
                    }
                }
            }
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for (sup, sub) in &constraints {
            let subset = firsts[sub.index()].clone();
            changed |= firsts[sup.index()].merge(&subset);
        }
    }

    firsts
}
