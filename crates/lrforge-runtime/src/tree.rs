//! Syntax tree values produced by the parser, and the transformers that build them.

use crate::table::Builtin;
use rustc_hash::FxHashMap;
use std::fmt;

/// A half-open range of source offsets.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty span located at `at`.
    pub const fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Return the smallest span that covers both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A trait for abstracting the tokens produced by an external scanner.
pub trait Token {
    /// The terminal name of this token, as written in the grammar.
    ///
    /// Quoted terminals such as `'+'` are named by their literal text (`+`).
    fn kind(&self) -> &str;

    /// The source range this token was scanned from.
    fn span(&self) -> Span;
}

impl<T: Token + ?Sized> Token for &T {
    fn kind(&self) -> &str {
        (**self).kind()
    }

    fn span(&self) -> Span {
        (**self).span()
    }
}

/// A value on the parse stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree<T> {
    /// A shifted token.
    Token(T),

    /// A composite node built from the captured values of a production.
    Node(Node<T>),

    /// An ordered collection built by repetition.
    Sequence(Sequence<T>),

    /// The value of an optional item.
    Option(OptionNode<T>),

    /// A production that captured nothing.
    Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub label: Option<String>,
    pub span: Span,
    pub items: Vec<Tree<T>>,
}

impl<T> Node<T> {
    pub fn new(span: Span, items: Vec<Tree<T>>) -> Self {
        Self {
            label: None,
            span,
            items,
        }
    }

    /// Create a node tagged with a label, usually from a user transformer.
    pub fn labeled(label: impl Into<String>, span: Span, items: Vec<Tree<T>>) -> Self {
        Self {
            label: Some(label.into()),
            span,
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence<T> {
    pub span: Span,
    pub items: Vec<Tree<T>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionNode<T> {
    pub span: Span,
    pub item: Option<Box<Tree<T>>>,
}

impl<T: Token> Tree<T> {
    /// Return the source range covered by this value, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Token(token) => Some(token.span()),
            Self::Node(node) => Some(node.span),
            Self::Sequence(seq) => Some(seq.span),
            Self::Option(opt) => Some(opt.span),
            Self::Absent => None,
        }
    }
}

impl<T> Tree<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_token(&self) -> Option<&T> {
        match self {
            Self::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node<T>> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence<T>> {
        match self {
            Self::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_option(&self) -> Option<&OptionNode<T>> {
        match self {
            Self::Option(opt) => Some(opt),
            _ => None,
        }
    }
}

/// Compute the span covered by `items`.
///
/// Values without a span are skipped. When nothing has a span the result is
/// an empty span at `cursor`.
pub fn span_of<T: Token>(items: &[Tree<T>], cursor: usize) -> Span {
    let first = items.iter().find_map(Tree::span);
    let last = items.iter().rev().find_map(Tree::span);
    match (first, last) {
        (Some(first), Some(last)) => first.join(last),
        _ => Span::empty(cursor),
    }
}

/// The value of a reduction that has no transformer bound to it.
///
/// One captured value is passed through unchanged, several become a [`Node`],
/// none yields [`Tree::Absent`].
pub fn default_node<T>(span: Span, mut items: Vec<Tree<T>>) -> Tree<T> {
    match items.len() {
        0 => Tree::Absent,
        1 => items.pop().unwrap_or(Tree::Absent),
        _ => Tree::Node(Node::new(span, items)),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransformError {
    message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Builtin {
    /// Apply this built-in transformer to the captured values of a reduction.
    pub fn apply<T>(self, span: Span, items: Vec<Tree<T>>) -> Result<Tree<T>, TransformError> {
        match self {
            Self::Option => Ok(option(span, items)),
            Self::Sequence => Ok(sequence(span, items)),
            Self::Prepend => prepend(span, items),
            Self::Flatten => Ok(flatten(span, items)),
        }
    }
}

fn option<T>(span: Span, items: Vec<Tree<T>>) -> Tree<T> {
    if items.is_empty() {
        return Tree::Option(OptionNode { span, item: None });
    }
    Tree::Option(OptionNode {
        span,
        item: Some(Box::new(default_node(span, items))),
    })
}

// `xs: ε` yields an empty sequence, `xs: xs x` appends to the folded head.
fn sequence<T>(span: Span, items: Vec<Tree<T>>) -> Tree<T> {
    let mut items = items.into_iter();
    let mut seq = match items.next() {
        None => return Tree::Sequence(Sequence { span, items: vec![] }),
        Some(Tree::Sequence(seq)) if items.len() > 0 => seq,
        Some(first) => Sequence {
            span,
            items: vec![first],
        },
    };
    seq.items.extend(items);
    seq.span = span;
    Tree::Sequence(seq)
}

// `xs+: x xs*` puts the leading element in front of the folded tail.
fn prepend<T>(span: Span, mut items: Vec<Tree<T>>) -> Result<Tree<T>, TransformError> {
    match items.pop() {
        Some(Tree::Sequence(mut seq)) => {
            seq.items.splice(0..0, items);
            seq.span = span;
            Ok(Tree::Sequence(seq))
        }
        Some(_) => Err(TransformError::new(
            "prepend: the last captured value must be a sequence",
        )),
        None => Err(TransformError::new("prepend: no captured values")),
    }
}

fn flatten<T>(span: Span, items: Vec<Tree<T>>) -> Tree<T> {
    fn flatten_into<T>(dst: &mut Vec<Tree<T>>, item: Tree<T>) {
        match item {
            Tree::Sequence(seq) => {
                for inner in seq.items {
                    flatten_into(dst, inner);
                }
            }
            item => dst.push(item),
        }
    }

    let mut flattened = vec![];
    for item in items {
        flatten_into(&mut flattened, item);
    }
    Tree::Sequence(Sequence {
        span,
        items: flattened,
    })
}

/// The signature of a user-defined semantic action.
pub type TransformFn<T> =
    dyn Fn(Span, Vec<Tree<T>>) -> Result<Tree<T>, TransformError> + Send + Sync;

/// The registry of named semantic actions referenced by `#[name]` in a grammar.
pub struct Transformers<T> {
    map: FxHashMap<String, Box<TransformFn<T>>>,
}

impl<T> Default for Transformers<T> {
    fn default() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }
}

impl<T> fmt::Debug for Transformers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Transformers")
            .field("names", &names)
            .finish()
    }
}

impl<T> Transformers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transformer under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Span, Vec<Tree<T>>) -> Result<Tree<T>, TransformError> + Send + Sync + 'static,
    {
        self.map.insert(name.into(), Box::new(f));
        self
    }

    pub fn get(&self, name: &str) -> Option<&TransformFn<T>> {
        self.map.get(name).map(|f| &**f)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tok(&'static str, usize);

    impl Token for Tok {
        fn kind(&self) -> &str {
            self.0
        }
        fn span(&self) -> Span {
            Span::new(self.1, self.1 + 1)
        }
    }

    fn tok(kind: &'static str, at: usize) -> Tree<Tok> {
        Tree::Token(Tok(kind, at))
    }

    #[test]
    fn default_node_by_arity() {
        assert!(default_node::<Tok>(Span::empty(0), vec![]).is_absent());
        assert!(!tok("A", 0).is_absent());
        assert_eq!(
            default_node(Span::new(0, 1), vec![tok("A", 0)]),
            tok("A", 0)
        );
        assert!(matches!(
            default_node(Span::new(0, 2), vec![tok("A", 0), tok("B", 1)]),
            Tree::Node(Node { label: None, ref items, .. }) if items.len() == 2
        ));
    }

    #[test]
    fn span_of_skips_absent() {
        let items = vec![Tree::Absent, tok("A", 3), Tree::Absent, tok("B", 7)];
        assert_eq!(span_of(&items, 0), Span::new(3, 8));
        assert_eq!(span_of::<Tok>(&[Tree::Absent], 5), Span::empty(5));
    }

    #[test]
    fn sequence_folds_left() {
        let empty = Builtin::Sequence.apply::<Tok>(Span::empty(0), vec![]).unwrap();
        let one = Builtin::Sequence
            .apply(Span::new(0, 1), vec![empty, tok("A", 0)])
            .unwrap();
        let two = Builtin::Sequence
            .apply(Span::new(0, 2), vec![one, tok("A", 1)])
            .unwrap();
        let seq = two.as_sequence().unwrap();
        assert_eq!(seq.items, vec![tok("A", 0), tok("A", 1)]);
        assert_eq!(seq.span, Span::new(0, 2));
    }

    #[test]
    fn prepend_puts_head_first() {
        let tail = Tree::Sequence(Sequence {
            span: Span::new(1, 3),
            items: vec![tok("A", 1), tok("A", 2)],
        });
        let seq = Builtin::Prepend
            .apply(Span::new(0, 3), vec![tok("A", 0), tail])
            .unwrap();
        let seq = seq.as_sequence().unwrap();
        assert_eq!(seq.items, vec![tok("A", 0), tok("A", 1), tok("A", 2)]);

        assert!(Builtin::Prepend
            .apply(Span::new(0, 1), vec![tok("A", 0)])
            .is_err());
    }

    #[test]
    fn option_wraps_captured() {
        let none = Builtin::Option.apply::<Tok>(Span::empty(4), vec![]).unwrap();
        assert_eq!(none.as_option().unwrap().item, None);

        let some = Builtin::Option
            .apply(Span::new(0, 1), vec![tok("A", 0)])
            .unwrap();
        assert_eq!(
            some.as_option().unwrap().item.as_deref(),
            Some(&tok("A", 0))
        );
    }

    #[test]
    fn flatten_splices_nested_sequences() {
        let inner = Tree::Sequence(Sequence {
            span: Span::new(1, 3),
            items: vec![
                tok("B", 1),
                Tree::Sequence(Sequence {
                    span: Span::new(2, 3),
                    items: vec![tok("C", 2)],
                }),
            ],
        });
        let flat = Builtin::Flatten
            .apply(Span::new(0, 3), vec![tok("A", 0), inner])
            .unwrap();
        assert_eq!(
            flat.as_sequence().unwrap().items,
            vec![tok("A", 0), tok("B", 1), tok("C", 2)]
        );
    }

    #[test]
    fn transformers_registry() {
        let mut transformers = Transformers::<Tok>::new();
        transformers.register("binop", |span, items| {
            Ok(Tree::Node(Node::labeled("binop", span, items)))
        });
        assert!(transformers.contains("binop"));
        assert!(transformers.get("unop").is_none());

        let f = transformers.get("binop").unwrap();
        let tree = f(Span::new(0, 1), vec![tok("A", 0)]).unwrap();
        assert_eq!(tree.as_node().unwrap().label.as_deref(), Some("binop"));
    }
}
