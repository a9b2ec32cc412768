//! The grammar of grammar files, described with the builder API and driven
//! by the `lrforge-runtime` parser.
//!
//! ```text
//! grammar      : ε | grammar rule
//! rule         : '@'? IDENT ':' NEWLINE? alternatives NEWLINE
//! alternatives : first | alternatives later
//! first        : action? '|'? body
//! later        : NEWLINE? '|' body | NEWLINE action '|' body
//! action       : '#[' IDENT ']' NEWLINE?
//! body         : 'ε' | item+
//! item         : '!'? (IDENT | LITERAL | '(' body ('|' body)* ')') ('?' | '*' | '+')*
//! ```
//!
//! Newlines inside parentheses and repeated blank lines never reach the
//! parser.

use crate::{
    freeze,
    grammar::{Grammar, GrammarDef, GrammarDefError, SymbolID},
    lr1::DFA,
};
use lrforge_runtime::{Builtin, Node, ParseTable, SemanticAction, Span, Token, Transformers, Tree};
use std::sync::OnceLock;

pub(crate) const RULE: &str = "rule";
pub(crate) const ALTERNATIVE: &str = "alternative";
pub(crate) const ITEM: &str = "item";
pub(crate) const GROUP: &str = "group";

pub(crate) const NEWLINE: &str = "NEWLINE";
pub(crate) const IDENT: &str = "IDENT";
pub(crate) const LITERAL: &str = "LITERAL";

/// A token of a grammar file as seen by the runtime parser.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Lexeme {
    pub kind: &'static str,
    pub text: String,
    pub span: Span,
}

impl Token for Lexeme {
    fn kind(&self) -> &str {
        self.kind
    }

    fn span(&self) -> Span {
        self.span
    }
}

static TABLE: OnceLock<ParseTable> = OnceLock::new();

/// Return the parse table of grammar files, generating it on first use.
pub(crate) fn parse_table() -> anyhow::Result<&'static ParseTable> {
    if let Some(table) = TABLE.get() {
        return Ok(table);
    }
    let grammar = Grammar::define(define)?;
    let dfa = DFA::generate(&grammar)?;
    if let Some(conflict) = dfa.conflicts().first() {
        anyhow::bail!("grammar file syntax is ambiguous: {}", conflict.display(&grammar));
    }
    let table = freeze::freeze(&grammar, &dfa)?;
    tracing::trace!("generated {} states for grammar files", table.num_states());
    Ok(TABLE.get_or_init(|| table))
}

pub(crate) fn transformers() -> Transformers<Lexeme> {
    let mut transformers = Transformers::new();
    for label in [RULE, ALTERNATIVE, ITEM, GROUP] {
        transformers.register(label, move |span, items| {
            Ok(Tree::Node(Node::labeled(label, span, items)))
        });
    }
    transformers
}

fn define(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    use SymbolID::*;

    let named = |label: &str| Some(SemanticAction::Named(label.to_owned()));
    let sequence = || Some(SemanticAction::Builtin(Builtin::Sequence));

    // terminals
    let at = g.literal("@")?;
    let colon = g.literal(":")?;
    let vert_bar = g.literal("|")?;
    let bang = g.literal("!")?;
    let question = g.literal("?")?;
    let star = g.literal("*")?;
    let plus = g.literal("+")?;
    let lparen = g.literal("(")?;
    let rparen = g.literal(")")?;
    let hash_lbracket = g.literal("#[")?;
    let rbracket = g.literal("]")?;
    let epsilon = g.literal("ε")?;
    let newline = g.terminal(NEWLINE)?;
    let ident = g.terminal(IDENT)?;
    let literal = g.terminal(LITERAL)?;

    // nonterminals
    let grammar = g.nonterminal("grammar")?;
    let rule = g.nonterminal("rule")?;
    let entry = g.nonterminal("entry")?;
    let newline_opt = g.nonterminal("newline_opt")?;
    let alternatives = g.nonterminal("alternatives")?;
    let first = g.nonterminal("first")?;
    let later = g.nonterminal("later")?;
    let action = g.nonterminal("action")?;
    let body = g.nonterminal("body")?;
    let items = g.nonterminal("items")?;
    let item = g.nonterminal("item")?;
    let bang_opt = g.nonterminal("bang_opt")?;
    let atom = g.nonterminal("atom")?;
    let group_bodies = g.nonterminal("group_bodies")?;
    let quantifiers = g.nonterminal("quantifiers")?;
    let quantifier = g.nonterminal("quantifier")?;

    g.entrypoint(grammar)?;

    g.production(grammar, [], sequence())?;
    g.production(grammar, [(N(grammar), true), (N(rule), true)], sequence())?;

    g.production(
        rule,
        [
            (N(entry), true),
            (T(ident), true),
            (T(colon), false),
            (N(newline_opt), false),
            (N(alternatives), true),
            (T(newline), false),
        ],
        named(RULE),
    )?;
    g.rule(entry, [])?;
    g.rule(entry, [T(at)])?;
    g.production(newline_opt, [], None)?;
    g.production(newline_opt, [(T(newline), false)], None)?;

    g.production(alternatives, [(N(first), true)], sequence())?;
    g.production(
        alternatives,
        [(N(alternatives), true), (N(later), true)],
        sequence(),
    )?;

    g.production(first, [(N(body), true)], named(ALTERNATIVE))?;
    g.production(
        first,
        [(T(vert_bar), false), (N(body), true)],
        named(ALTERNATIVE),
    )?;
    g.production(
        first,
        [(N(action), true), (N(body), true)],
        named(ALTERNATIVE),
    )?;
    g.production(
        first,
        [(N(action), true), (T(vert_bar), false), (N(body), true)],
        named(ALTERNATIVE),
    )?;
    g.production(
        later,
        [(T(vert_bar), false), (N(body), true)],
        named(ALTERNATIVE),
    )?;
    g.production(
        later,
        [(T(newline), false), (T(vert_bar), false), (N(body), true)],
        named(ALTERNATIVE),
    )?;
    g.production(
        later,
        [
            (T(newline), false),
            (N(action), true),
            (T(vert_bar), false),
            (N(body), true),
        ],
        named(ALTERNATIVE),
    )?;
    g.production(
        action,
        [
            (T(hash_lbracket), false),
            (T(ident), true),
            (T(rbracket), false),
            (N(newline_opt), false),
        ],
        None,
    )?;

    g.production(body, [(T(epsilon), false)], sequence())?;
    g.rule(body, [N(items)])?;
    g.production(items, [(N(item), true)], sequence())?;
    g.production(items, [(N(items), true), (N(item), true)], sequence())?;

    g.production(
        item,
        [(N(bang_opt), true), (N(atom), true), (N(quantifiers), true)],
        named(ITEM),
    )?;
    g.rule(bang_opt, [])?;
    g.rule(bang_opt, [T(bang)])?;
    g.rule(atom, [T(ident)])?;
    g.rule(atom, [T(literal)])?;
    g.production(
        atom,
        [(T(lparen), false), (N(group_bodies), true), (T(rparen), false)],
        named(GROUP),
    )?;
    g.production(group_bodies, [(N(body), true)], sequence())?;
    g.production(
        group_bodies,
        [(N(group_bodies), true), (T(vert_bar), false), (N(body), true)],
        sequence(),
    )?;

    g.production(quantifiers, [], sequence())?;
    g.production(
        quantifiers,
        [(N(quantifiers), true), (N(quantifier), true)],
        sequence(),
    )?;
    g.rule(quantifier, [T(question)])?;
    g.rule(quantifier, [T(star)])?;
    g.rule(quantifier, [T(plus)])?;

    Ok(())
}
