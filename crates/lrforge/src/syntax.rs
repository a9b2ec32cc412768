//! Parser for grammar description files.
//!
//! ```text
//! @expr:
//!     #[binop]
//!     | expr '+' term
//!     | term
//! term: INT
//! ```

pub mod ast;
mod grammar;
pub mod lexer;

use self::{
    grammar::{Lexeme, ALTERNATIVE, GROUP, IDENT, ITEM, LITERAL, NEWLINE, RULE},
    lexer::{Lexer, Token},
};
use lrforge_runtime::{Node, ParseError, Parser, Span, Tree};
use std::{borrow::Cow, convert::Infallible};

pub fn parse(source: &str) -> anyhow::Result<ast::Grammar> {
    let span = tracing::trace_span!("parse");
    let _entered = span.enter();

    // A trailing newline terminates the last alternative and any line comment.
    let source: Cow<'_, str> = if source.ends_with('\n') {
        Cow::Borrowed(source)
    } else {
        Cow::Owned(format!("{}\n", source))
    };

    let lexemes = lexemes(&source)?;
    let table = grammar::parse_table()?;
    let transformers = grammar::transformers();
    let tree = Parser::new(table, &transformers)
        .parse(lexemes.into_iter().map(Ok::<_, Infallible>))
        .map_err(|err| describe(&source, err))?;

    let grammar = ast::Grammar {
        rules: sequence(tree)?
            .into_iter()
            .map(lower_rule)
            .collect::<anyhow::Result<_>>()?,
    };
    tracing::trace!("parsed {} rule(s)", grammar.rules.len());
    Ok(grammar)
}

/// Tokenize `source`, dropping the newlines that carry no meaning: leading
/// and repeated ones and those inside parentheses.
fn lexemes(source: &str) -> anyhow::Result<Vec<Lexeme>> {
    let mut lexemes: Vec<Lexeme> = vec![];
    let mut depth = 0usize;
    for res in Lexer::new(source) {
        let (start, token, end) = res.map_err(|err| {
            anyhow::anyhow!(
                "{}:{}: unrecognized character",
                err.location.line + 1,
                err.location.col + 1
            )
        })?;
        let (kind, text) = match token {
            Token::At => ("@", ""),
            Token::Colon => (":", ""),
            Token::VertBar => ("|", ""),
            Token::Bang => ("!", ""),
            Token::Question => ("?", ""),
            Token::Star => ("*", ""),
            Token::Plus => ("+", ""),
            Token::LParen => {
                depth += 1;
                ("(", "")
            }
            Token::RParen => {
                depth = depth.saturating_sub(1);
                (")", "")
            }
            Token::HashLBracket => ("#[", ""),
            Token::RBracket => ("]", ""),
            Token::Epsilon => ("ε", ""),
            Token::Newline => {
                let redundant = lexemes.last().map_or(true, |last| last.kind == NEWLINE);
                if depth > 0 || redundant {
                    continue;
                }
                (NEWLINE, "")
            }
            Token::Ident(ident) => (IDENT, ident),
            Token::Literal(text) => (LITERAL, text),
        };
        lexemes.push(Lexeme {
            kind,
            text: text.to_owned(),
            span: Span::new(start.byte_idx, end.byte_idx),
        });
    }
    Ok(lexemes)
}

fn describe(source: &str, err: ParseError<Infallible>) -> anyhow::Error {
    let found = |span: Span| match source.get(span.start..span.end) {
        Some(text) if !text.trim().is_empty() => format!("`{}'", text),
        _ => "newline".to_owned(),
    };
    match err {
        ParseError::UnexpectedToken {
            span, expected, ..
        } => {
            let (line, col) = line_col(source, span.start);
            anyhow::anyhow!(
                "{}:{}: unexpected {} (expected one of {})",
                line,
                col,
                found(span),
                expected.join(", ")
            )
        }
        ParseError::UnexpectedEoi {
            position, expected, ..
        } => {
            let (line, col) = line_col(source, position);
            anyhow::anyhow!(
                "{}:{}: unexpected end of input (expected one of {})",
                line,
                col,
                expected.join(", ")
            )
        }
        err => anyhow::anyhow!(err),
    }
}

fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let col = match before.rfind('\n') {
        Some(i) => before[i + 1..].chars().count(),
        None => before.chars().count(),
    };
    (line, col + 1)
}

fn sequence(tree: Tree<Lexeme>) -> anyhow::Result<Vec<Tree<Lexeme>>> {
    match tree {
        Tree::Sequence(seq) => Ok(seq.items),
        tree => anyhow::bail!("unexpected syntax tree, expecting a sequence: {:?}", tree),
    }
}

fn node<const N: usize>(tree: Tree<Lexeme>, label: &str) -> anyhow::Result<[Tree<Lexeme>; N]> {
    match tree {
        Tree::Node(Node {
            label: Some(found),
            items,
            ..
        }) if found == label && items.len() == N => items
            .try_into()
            .map_err(|_| anyhow::anyhow!("unexpected arity of `{}'", label)),
        tree => anyhow::bail!("unexpected syntax tree, expecting `{}': {:?}", label, tree),
    }
}

fn token(tree: Tree<Lexeme>) -> anyhow::Result<Lexeme> {
    match tree {
        Tree::Token(lexeme) => Ok(lexeme),
        tree => anyhow::bail!("unexpected syntax tree, expecting a token: {:?}", tree),
    }
}

fn lower_rule(tree: Tree<Lexeme>) -> anyhow::Result<ast::Rule> {
    let [entry, name, alternatives] = node(tree, RULE)?;
    Ok(ast::Rule {
        name: token(name)?.text,
        entrypoint: matches!(entry, Tree::Token(..)),
        alternatives: sequence(alternatives)?
            .into_iter()
            .map(lower_alternative)
            .collect::<anyhow::Result<_>>()?,
    })
}

fn lower_alternative(tree: Tree<Lexeme>) -> anyhow::Result<ast::Alternative> {
    let annotated = matches!(&tree, Tree::Node(node) if node.items.len() == 2);
    let (action, body) = if annotated {
        let [action, body] = node(tree, ALTERNATIVE)?;
        (Some(token(action)?.text), body)
    } else {
        let [body] = node(tree, ALTERNATIVE)?;
        (None, body)
    };
    let mut alternative = lower_body(body)?;
    alternative.action = action;
    Ok(alternative)
}

fn lower_body(tree: Tree<Lexeme>) -> anyhow::Result<ast::Alternative> {
    Ok(ast::Alternative {
        action: None,
        items: sequence(tree)?
            .into_iter()
            .map(lower_item)
            .collect::<anyhow::Result<_>>()?,
    })
}

fn lower_item(tree: Tree<Lexeme>) -> anyhow::Result<ast::Item> {
    let [bang, atom, quantifiers] = node(tree, ITEM)?;
    let expr = match atom {
        Tree::Token(lexeme) if lexeme.kind == IDENT => ast::Expr::Name(lexeme.text),
        Tree::Token(lexeme) if lexeme.kind == LITERAL => ast::Expr::Literal(unescape(&lexeme.text)),
        group => {
            let [bodies] = node(group, GROUP)?;
            ast::Expr::Group(
                sequence(bodies)?
                    .into_iter()
                    .map(lower_body)
                    .collect::<anyhow::Result<_>>()?,
            )
        }
    };
    let quantifiers = sequence(quantifiers)?
        .into_iter()
        .map(|tree| -> anyhow::Result<ast::Quantifier> {
            Ok(match token(tree)?.kind {
                "?" => ast::Quantifier::Optional,
                "*" => ast::Quantifier::ZeroOrMore,
                "+" => ast::Quantifier::OneOrMore,
                kind => anyhow::bail!("unexpected quantifier `{}'", kind),
            })
        })
        .collect::<anyhow::Result<_>>()?;
    Ok(ast::Item {
        captured: matches!(bang, Tree::Token(..)),
        expr,
        quantifiers,
    })
}

/// Resolve the backslash escapes of a quoted literal.
fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescaped.extend(chars.next()),
            c => unescaped.push(c),
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, SymbolID};

    #[test]
    fn smoketest() {
        let input = "\
// arithmetic
@expr:
    #[binop]
    | expr '+' !term
    | term

term: INT | '(' !expr ')'
list: ε
    | (item ','?)* item+
";
        let grammar = parse(input).unwrap();
        assert_eq!(grammar.rules.len(), 3);

        let expr = &grammar.rules[0];
        assert!(expr.entrypoint);
        assert_eq!(expr.name, "expr");
        assert_eq!(expr.alternatives.len(), 2);
        assert_eq!(expr.alternatives[0].action.as_deref(), Some("binop"));
        assert_eq!(expr.alternatives[0].to_string(), "expr '+' !term");
        assert_eq!(expr.alternatives[1].action, None);

        let term = &grammar.rules[1];
        assert!(!term.entrypoint);
        assert_eq!(term.alternatives.len(), 2);
        assert_eq!(term.alternatives[1].to_string(), "'(' !expr ')'");

        let list = &grammar.rules[2];
        assert!(list.alternatives[0].items.is_empty());
        assert_eq!(list.alternatives[1].to_string(), "(item ','?)* item+");
    }

    #[test]
    fn group_alternatives_span_lines() {
        let input = "@s: (A\n  | B\n  | ε)+ C";
        let grammar = parse(input).unwrap();
        assert_eq!(grammar.rules[0].alternatives[0].to_string(), "(A | B | ε)+ C");
    }

    #[test]
    fn stacked_quantifiers_are_parsed() {
        let grammar = parse("@s: a*?\na: A").unwrap();
        let item = &grammar.rules[0].alternatives[0].items[0];
        assert_eq!(
            item.quantifiers,
            vec![ast::Quantifier::ZeroOrMore, ast::Quantifier::Optional]
        );
    }

    #[test]
    fn quote_styles() {
        let grammar = parse("@s: 'x' \"x\" \"'\" '\\'' \"\\\"\"").unwrap();
        let items = &grammar.rules[0].alternatives[0].items;
        let texts: Vec<_> = items
            .iter()
            .map(|item| match &item.expr {
                ast::Expr::Literal(text) => text.as_str(),
                expr => panic!("unexpected item: {:?}", expr),
            })
            .collect();
        assert_eq!(texts, ["x", "x", "'", "'", "\""]);

        let grammar = Grammar::from_str("@s: 'x' \"x\"").unwrap();
        let s = grammar.nonterminal_by_name("s").unwrap().id();
        let x = grammar.terminal_by_name("x").unwrap().id();
        let production = grammar.productions_of(s).next().unwrap();
        assert_eq!(production.right(), [SymbolID::T(x), SymbolID::T(x)]);
    }

    #[test]
    fn actions_precede_separated_alternatives() {
        let grammar = parse("@s: #[first] A\n  #[second]\n  | B").unwrap();
        let alternatives = &grammar.rules[0].alternatives;
        assert_eq!(alternatives.len(), 2);
        assert_eq!(alternatives[0].action.as_deref(), Some("first"));
        assert_eq!(alternatives[1].action.as_deref(), Some("second"));

        assert!(parse("@s: A\n  #[x] B").is_err());
        assert!(parse("@s: A\n  #[x]\n  B").is_err());
    }

    #[test]
    fn syntax_errors() {
        for input in [
            "expr",
            "expr:",
            "expr: A ε",
            "expr: (A",
            "expr: A\n  B",
            "#[x]",
            "expr: #[x B",
            "expr: A $",
        ] {
            assert!(parse(input).is_err(), "{:?} should be rejected", input);
        }
    }
}
