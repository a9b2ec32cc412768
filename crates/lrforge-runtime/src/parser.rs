//! The pushdown automaton driven by a frozen parse table.

use crate::{
    table::{
        Action, FrozenProduction, ParseTable, ProductionIndex, SemanticAction,
        StateIndex, TerminalIndex, EOI,
    },
    tree::{self, Span, Token, TransformError, Transformers, Tree},
};
use std::fmt;

/// Runtime knobs of the parser.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    stagnation_limit: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserConfig {
    pub const fn new() -> Self {
        Self {
            stagnation_limit: 500,
        }
    }

    /// Set the number of consecutive reductions that neither consume a token
    /// nor shrink the stack before the parse is aborted.
    pub fn stagnation_limit(&mut self, limit: usize) -> &mut Self {
        self.stagnation_limit = limit;
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ParserState {
    Running,
    Accepted,
    Error,
}

#[derive(Debug)]
enum Lookahead<T> {
    Token(T, TerminalIndex),
    Eoi,
}

/// The outcome of a single automaton transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    Shifted {
        state: StateIndex,
    },
    Reduced {
        production: ProductionIndex,
        state: StateIndex,
    },
    Accepted,
}

/// The LR(1) parser driven by a [`ParseTable`].
///
/// A parser owns its stacks and is used for exactly one parse. The table and
/// the transformers are borrowed and may be shared by concurrent parsers.
pub struct Parser<'p, T> {
    table: &'p ParseTable,
    transformers: &'p Transformers<T>,
    config: ParserConfig,
    state_stack: Vec<StateIndex>,
    value_stack: Vec<Tree<T>>,
    parser_state: ParserState,
    lookahead: Option<Lookahead<T>>,
    cursor: usize,
    stagnant_steps: usize,
}

impl<T: fmt::Debug> fmt::Debug for Parser<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("state_stack", &self.state_stack)
            .field("value_stack", &self.value_stack)
            .field("parser_state", &self.parser_state)
            .field("lookahead", &self.lookahead)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<'p, T> Parser<'p, T>
where
    T: Token,
{
    /// Create a parser using the specified parse table and transformers.
    pub fn new(table: &'p ParseTable, transformers: &'p Transformers<T>) -> Self {
        Self::with_config(table, transformers, ParserConfig::new())
    }

    pub fn with_config(
        table: &'p ParseTable,
        transformers: &'p Transformers<T>,
        config: ParserConfig,
    ) -> Self {
        Self {
            table,
            transformers,
            config,
            state_stack: vec![table.initial_state()],
            value_stack: vec![],
            parser_state: ParserState::Running,
            lookahead: None,
            cursor: 0,
            stagnant_steps: 0,
        }
    }

    /// Run the automaton over `tokens` until it accepts or fails.
    pub fn parse<I, E>(mut self, tokens: I) -> Result<Tree<T>, ParseError<E>>
    where
        I: IntoIterator<Item = Result<T, E>>,
        E: fmt::Display,
    {
        let span = tracing::trace_span!("parse");
        let _entered = span.enter();

        let mut tokens = tokens.into_iter();
        loop {
            if let Step::Accepted = self.step(&mut tokens)? {
                return self.into_tree().ok_or_else(|| {
                    ParseError::InconsistentTable {
                        reason: "accepted with an empty stack".into(),
                    }
                });
            }
        }
    }

    /// Perform exactly one shift, reduce, or accept transition.
    ///
    /// The lookahead token is peeked from `tokens` when needed and consumed
    /// only by a shift. After an error or acceptance, every further call
    /// returns [`ParseError::AlreadyFinished`].
    pub fn step<I, E>(&mut self, tokens: &mut I) -> Result<Step, ParseError<E>>
    where
        I: Iterator<Item = Result<T, E>>,
        E: fmt::Display,
    {
        if self.parser_state != ParserState::Running {
            return Err(ParseError::AlreadyFinished);
        }
        let res = self.step_inner(tokens);
        match res {
            Ok(Step::Accepted) => self.parser_state = ParserState::Accepted,
            Ok(..) => (),
            Err(..) => self.parser_state = ParserState::Error,
        }
        res
    }

    /// Return the accepted tree, if the parse has completed successfully.
    pub fn into_tree(mut self) -> Option<Tree<T>> {
        match self.parser_state {
            ParserState::Accepted => self.value_stack.pop(),
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.parser_state == ParserState::Accepted
    }

    pub fn is_failed(&self) -> bool {
        self.parser_state == ParserState::Error
    }

    fn step_inner<I, E>(&mut self, tokens: &mut I) -> Result<Step, ParseError<E>>
    where
        I: Iterator<Item = Result<T, E>>,
        E: fmt::Display,
    {
        let current = *self
            .state_stack
            .last()
            .ok_or_else(|| ParseError::InconsistentTable {
                reason: "empty state stack".into(),
            })?;

        if self.lookahead.is_none() {
            let lookahead = self.read_token(tokens)?;
            self.lookahead = Some(lookahead);
        }
        let terminal = match &self.lookahead {
            Some(Lookahead::Token(_, t)) => *t,
            _ => EOI,
        };

        match self.table.action(current, terminal) {
            Some(Action::Shift(next)) => {
                let token = match self.lookahead.take() {
                    Some(Lookahead::Token(token, _)) => token,
                    _ => {
                        return Err(ParseError::InconsistentTable {
                            reason: format!("state #{} shifts the end of input", current),
                        })
                    }
                };
                tracing::trace!("shift {} -> state #{}", token.kind(), next);
                self.cursor = token.span().end;
                self.state_stack.push(next);
                self.value_stack.push(Tree::Token(token));
                self.stagnant_steps = 0;
                Ok(Step::Shifted { state: next })
            }

            Some(Action::Reduce(production)) => self.reduce(production),

            Some(Action::Accept) => {
                tracing::trace!("accept in state #{}", current);
                Ok(Step::Accepted)
            }

            None => {
                let expected = self
                    .table
                    .expected_terminals(current)
                    .into_iter()
                    .map(str::to_owned)
                    .collect();
                match &self.lookahead {
                    Some(Lookahead::Token(token, _)) => Err(ParseError::UnexpectedToken {
                        state: current,
                        terminal: token.kind().to_owned(),
                        span: token.span(),
                        expected,
                    }),
                    _ => Err(ParseError::UnexpectedEoi {
                        state: current,
                        position: self.cursor,
                        expected,
                    }),
                }
            }
        }
    }

    fn read_token<I, E>(&mut self, tokens: &mut I) -> Result<Lookahead<T>, ParseError<E>>
    where
        I: Iterator<Item = Result<T, E>>,
        E: fmt::Display,
    {
        let token = match tokens.next().transpose().map_err(ParseError::Lexer)? {
            Some(token) => token,
            None => return Ok(Lookahead::Eoi),
        };
        match self.table.terminal(token.kind()) {
            Some(symbol) if symbol.id != EOI => Ok(Lookahead::Token(token, symbol.id)),
            _ => Err(ParseError::UnknownTerminal {
                kind: token.kind().to_owned(),
                span: token.span(),
            }),
        }
    }

    fn reduce<E>(&mut self, id: ProductionIndex) -> Result<Step, ParseError<E>>
    where
        E: fmt::Display,
    {
        let table = self.table;
        let production = table
            .production(id)
            .ok_or_else(|| ParseError::InconsistentTable {
                reason: format!("unknown production #{}", id),
            })?;

        let n = production.rhs_len as usize;
        if n > self.value_stack.len() || n >= self.state_stack.len() {
            return Err(ParseError::InconsistentTable {
                reason: format!("stack underflow while reducing production #{}", id),
            });
        }
        self.state_stack.truncate(self.state_stack.len() - n);
        let popped = self.value_stack.split_off(self.value_stack.len() - n);

        let mut captured = production.captured.iter().peekable();
        let mut items = Vec::with_capacity(production.captured.len());
        for (i, value) in popped.into_iter().enumerate() {
            if captured.next_if(|&&p| p as usize == i).is_some() {
                items.push(value);
            }
        }

        let span = tree::span_of(&items, self.cursor);
        let value = self.transform(production, span, items)?;

        let exposed = *self
            .state_stack
            .last()
            .ok_or_else(|| ParseError::InconsistentTable {
                reason: "empty state stack".into(),
            })?;
        let next = table
            .goto(exposed, production.lhs)
            .ok_or_else(|| ParseError::MissingGoto {
                state: exposed,
                nonterminal: self.lhs_name(production),
            })?;
        tracing::trace!(
            "reduce #{} ({}), goto state #{}",
            id,
            self.lhs_name(production),
            next
        );
        self.state_stack.push(next);
        self.value_stack.push(value);

        if n <= 1 {
            self.stagnant_steps += 1;
            if self.stagnant_steps > self.config.stagnation_limit {
                return Err(ParseError::Stagnated {
                    steps: self.stagnant_steps,
                });
            }
        } else {
            self.stagnant_steps = 0;
        }

        Ok(Step::Reduced {
            production: id,
            state: next,
        })
    }

    fn transform<E>(
        &self,
        production: &FrozenProduction,
        span: Span,
        items: Vec<Tree<T>>,
    ) -> Result<Tree<T>, ParseError<E>>
    where
        E: fmt::Display,
    {
        match &production.action {
            None => Ok(tree::default_node(span, items)),
            Some(SemanticAction::Builtin(builtin)) => {
                builtin
                    .apply(span, items)
                    .map_err(|source| ParseError::Transform {
                        name: builtin.name().to_owned(),
                        source,
                    })
            }
            Some(SemanticAction::Named(name)) => {
                let f = self
                    .transformers
                    .get(name)
                    .ok_or_else(|| ParseError::MissingTransformer { name: name.clone() })?;
                f(span, items).map_err(|source| ParseError::Transform {
                    name: name.clone(),
                    source,
                })
            }
        }
    }

    fn lhs_name(&self, production: &FrozenProduction) -> String {
        self.table
            .symbol_name(production.lhs_symbol())
            .unwrap_or("<unknown>")
            .to_owned()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError<E: fmt::Display> {
    #[error("from lexer: {}", _0)]
    Lexer(E),

    #[error("unexpected token `{}' at {} in state #{} (expected one of {:?})", terminal, span, state, expected)]
    UnexpectedToken {
        state: StateIndex,
        terminal: String,
        span: Span,
        expected: Vec<String>,
    },

    #[error("unexpected end of input at {} in state #{} (expected one of {:?})", position, state, expected)]
    UnexpectedEoi {
        state: StateIndex,
        position: usize,
        expected: Vec<String>,
    },

    #[error("token kind `{}' at {} is not a terminal of this grammar", kind, span)]
    UnknownTerminal { kind: String, span: Span },

    #[error("no transformer registered under `{}'", name)]
    MissingTransformer { name: String },

    #[error("transformer `{}' failed", name)]
    Transform {
        name: String,
        #[source]
        source: TransformError,
    },

    #[error("no goto for `{}' in state #{}", nonterminal, state)]
    MissingGoto {
        state: StateIndex,
        nonterminal: String,
    },

    #[error("inconsistent parse table: {}", reason)]
    InconsistentTable { reason: String },

    #[error("the automaton made {} steps without consuming input", steps)]
    Stagnated { steps: usize },

    #[error("the parse has already finished")]
    AlreadyFinished,
}

impl<E: fmt::Display> ParseError<E> {
    /// The automaton state the error was detected in, for syntax errors.
    pub fn state(&self) -> Option<StateIndex> {
        match self {
            Self::UnexpectedToken { state, .. } | Self::UnexpectedEoi { state, .. } => {
                Some(*state)
            }
            _ => None,
        }
    }
}
