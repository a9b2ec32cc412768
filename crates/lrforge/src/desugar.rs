//! Lowering of parsed grammar files into productions.
//!
//! Quantified items and parenthesized groups are replaced with synthetic
//! nonterminals:
//!
//! * `e?` becomes `e? : ε | e`, both bound to the `option` built-in.
//! * `e*` becomes `e* : ε | e* e`, both bound to `sequence`.
//! * `e+` becomes `e+ : e e*`, bound to `prepend`.
//! * `(a | b)` becomes `(a | b) : a | b`, while a group with a single
//!   alternative and no quantifier is spliced into the enclosing one.
//!
//! The synthetic names are the textual form of the sub-expression, so equal
//! sub-expressions share one nonterminal.

use crate::{
    grammar::{is_terminal_name, GrammarDef, GrammarDefError, NonterminalID, SymbolID},
    syntax::ast,
};
use lrforge_runtime::{Builtin, SemanticAction};

pub(crate) fn lower(def: &mut GrammarDef, grammar: &ast::Grammar) -> Result<(), GrammarDefError> {
    // Declare every rule up front so that nonterminal ids follow the file order.
    for rule in &grammar.rules {
        if is_terminal_name(&rule.name) {
            return Err(GrammarDefError::InvalidName {
                name: rule.name.clone(),
            });
        }
        let id = def.nonterminal(&rule.name)?;
        if rule.entrypoint {
            def.entrypoint(id)?;
        }
    }

    for rule in &grammar.rules {
        let left = def.nonterminal(&rule.name)?;
        for alternative in &rule.alternatives {
            let action = alternative
                .action
                .as_deref()
                .map(SemanticAction::from_name);
            let right = lower_alternative(def, alternative)?;
            def.production(left, right, action)?;
        }
    }

    Ok(())
}

fn lower_alternative(
    def: &mut GrammarDef,
    alternative: &ast::Alternative,
) -> Result<Vec<(SymbolID, bool)>, GrammarDefError> {
    let explicit = alternative.items.iter().any(has_capture_mark);
    let mut right = vec![];
    for item in &alternative.items {
        lower_item(def, item, explicit, false, &mut right)?;
    }
    Ok(right)
}

/// The single alternative of a group that is spliced into its parent.
fn spliced(item: &ast::Item) -> Option<&ast::Alternative> {
    match &item.expr {
        ast::Expr::Group(alternatives) if item.quantifiers.is_empty() => match &alternatives[..] {
            [alternative] if !alternative.items.is_empty() => Some(alternative),
            _ => None,
        },
        _ => None,
    }
}

fn has_capture_mark(item: &ast::Item) -> bool {
    item.captured
        || spliced(item).map_or(false, |alternative| {
            alternative.items.iter().any(has_capture_mark)
        })
}

fn lower_item(
    def: &mut GrammarDef,
    item: &ast::Item,
    explicit: bool,
    forced: bool,
    right: &mut Vec<(SymbolID, bool)>,
) -> Result<(), GrammarDefError> {
    if let Some(alternative) = spliced(item) {
        for inner in &alternative.items {
            lower_item(def, inner, explicit, forced || item.captured, right)?;
        }
        return Ok(());
    }

    let captured = !explicit || forced || item.captured;
    let symbol = match &item.quantifiers[..] {
        [] => symbol_of(def, &item.expr)?,
        [quantifier] => {
            let base = symbol_of(def, &item.expr)?;
            SymbolID::N(quantify(def, base, &item.expr.to_string(), *quantifier)?)
        }
        [..] => {
            let mut name = item.expr.to_string();
            for quantifier in &item.quantifiers {
                name += &quantifier.to_string();
            }
            return Err(GrammarDefError::StackedQuantifier { item: name });
        }
    };
    right.push((symbol, captured));
    Ok(())
}

fn symbol_of(def: &mut GrammarDef, expr: &ast::Expr) -> Result<SymbolID, GrammarDefError> {
    match expr {
        ast::Expr::Name(name) if is_terminal_name(name) => def.terminal(name).map(SymbolID::T),
        ast::Expr::Name(name) => def.nonterminal(name).map(SymbolID::N),
        ast::Expr::Literal(text) => def.literal(text).map(SymbolID::T),
        ast::Expr::Group(alternatives) => {
            let (id, fresh) = def.synthetic(&expr.to_string())?;
            if fresh {
                for alternative in alternatives {
                    let right = lower_alternative(def, alternative)?;
                    def.production(id, right, None)?;
                }
            }
            Ok(SymbolID::N(id))
        }
    }
}

fn quantify(
    def: &mut GrammarDef,
    base: SymbolID,
    base_name: &str,
    quantifier: ast::Quantifier,
) -> Result<NonterminalID, GrammarDefError> {
    let builtin = |b| Some(SemanticAction::Builtin(b));
    let name = format!("{}{}", base_name, quantifier);

    match quantifier {
        ast::Quantifier::Optional => {
            let (id, fresh) = def.synthetic(&name)?;
            if fresh {
                def.production(id, Vec::new(), builtin(Builtin::Option))?;
                def.production(id, [(base, true)], builtin(Builtin::Option))?;
            }
            Ok(id)
        }
        ast::Quantifier::ZeroOrMore => {
            let (id, fresh) = def.synthetic(&name)?;
            if fresh {
                def.production(id, Vec::new(), builtin(Builtin::Sequence))?;
                def.production(
                    id,
                    [(SymbolID::N(id), true), (base, true)],
                    builtin(Builtin::Sequence),
                )?;
            }
            Ok(id)
        }
        ast::Quantifier::OneOrMore => {
            let star = quantify(def, base, base_name, ast::Quantifier::ZeroOrMore)?;
            let (id, fresh) = def.synthetic(&name)?;
            if fresh {
                def.production(
                    id,
                    [(base, true), (SymbolID::N(star), true)],
                    builtin(Builtin::Prepend),
                )?;
            }
            Ok(id)
        }
    }
}
