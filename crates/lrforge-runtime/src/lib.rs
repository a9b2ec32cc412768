//! Runtime implementation for `lrforge` parse tables.
//!
//! A [`ParseTable`] is the frozen output of the generator. It is loaded once,
//! shared freely, and drives any number of [`Parser`]s over token streams
//! produced by an external scanner.

pub mod parser;
pub mod table;
pub mod tree;

pub use crate::{
    parser::{ParseError, Parser, ParserConfig, Step},
    table::{
        Action, Builtin, FrozenProduction, FrozenSymbol, ParseTable, SemanticAction, StateRow,
        SymbolKind, TableError,
    },
    tree::{Node, OptionNode, Sequence, Span, Token, TransformError, Transformers, Tree},
};
