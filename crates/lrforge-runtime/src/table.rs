//! The frozen parse table.
//!
//! A `ParseTable` owns every piece of data the automaton needs at parse time
//! and nothing else, so it can be persisted once and loaded by any number of
//! parsers without recomputing the LR(1) automaton.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{fmt, io};

pub type TerminalIndex = u16;
pub type NonterminalIndex = u16;
pub type ProductionIndex = u16;
pub type StateIndex = u32;

/// The terminal reserved for the end of input.
pub const EOI: TerminalIndex = 0;

/// The name of the end-of-input terminal.
pub const EOI_NAME: &str = "$eoi";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
}

/// A symbol reference that owns nothing but its kind and id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrozenSymbol {
    pub kind: SymbolKind,
    pub id: u16,
}

/// The semantic action bound to a production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticAction {
    Builtin(Builtin),
    Named(String),
}

impl SemanticAction {
    /// Resolve an action name written in a grammar.
    pub fn from_name(name: &str) -> Self {
        match Builtin::from_name(name) {
            Some(builtin) => Self::Builtin(builtin),
            None => Self::Named(name.to_owned()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(builtin) => builtin.name(),
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for SemanticAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transformers provided by the runtime itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    /// Wraps zero or one captured values into an option value.
    Option,
    /// Folds left-recursive repetition into one ordered sequence.
    Sequence,
    /// Puts the leading element in front of a folded sequence.
    Prepend,
    /// Splices nested sequences into one flat sequence.
    Flatten,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "option" => Some(Self::Option),
            "sequence" => Some(Self::Sequence),
            "prepend" => Some(Self::Prepend),
            "flatten" => Some(Self::Flatten),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Option => "option",
            Self::Sequence => "sequence",
            Self::Prepend => "prepend",
            Self::Flatten => "flatten",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenProduction {
    pub id: ProductionIndex,
    pub lhs: NonterminalIndex,
    pub rhs_len: u16,
    /// The right-hand positions whose values are passed to the action, ascending.
    pub captured: Vec<u16>,
    pub action: Option<SemanticAction>,
}

impl FrozenProduction {
    pub fn lhs_symbol(&self) -> FrozenSymbol {
        FrozenSymbol {
            kind: SymbolKind::Nonterminal,
            id: self.lhs,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Shift(StateIndex),
    Reduce(ProductionIndex),
    Accept,
}

/// The actions and gotos of one LR state, each sorted by symbol id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRow {
    pub actions: Vec<(TerminalIndex, Action)>,
    pub gotos: Vec<(NonterminalIndex, StateIndex)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TableData {
    terminals: Vec<String>,
    nonterminals: Vec<String>,
    productions: Vec<FrozenProduction>,
    states: Vec<StateRow>,
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("JSON error: {}", _0)]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),

    #[error("inconsistent parse table: {}", reason)]
    Inconsistent { reason: String },
}

impl TableError {
    fn inconsistent(reason: impl Into<String>) -> Self {
        Self::Inconsistent {
            reason: reason.into(),
        }
    }
}

/// The immutable parse table consumed by [`Parser`](crate::parser::Parser).
///
/// State 0 is the initial state and terminal 0 is the end of input.
#[derive(Debug, Clone)]
pub struct ParseTable {
    data: TableData,
    terminal_index: FxHashMap<String, TerminalIndex>,
    nonterminal_index: FxHashMap<String, NonterminalIndex>,
}

impl PartialEq for ParseTable {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}
impl Eq for ParseTable {}

impl Serialize for ParseTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.data.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParseTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = TableData::deserialize(deserializer)?;
        Self::from_data(data).map_err(serde::de::Error::custom)
    }
}

impl ParseTable {
    /// Assemble a table from its parts, checking that every id refers to
    /// something that exists.
    pub fn new(
        terminals: Vec<String>,
        nonterminals: Vec<String>,
        productions: Vec<FrozenProduction>,
        states: Vec<StateRow>,
    ) -> Result<Self, TableError> {
        Self::from_data(TableData {
            terminals,
            nonterminals,
            productions,
            states,
        })
    }

    fn from_data(data: TableData) -> Result<Self, TableError> {
        validate(&data)?;

        let mut terminal_index = FxHashMap::default();
        for (id, name) in data.terminals.iter().enumerate() {
            if terminal_index.insert(name.clone(), id as TerminalIndex).is_some() {
                return Err(TableError::inconsistent(format!(
                    "duplicate terminal `{}'",
                    name
                )));
            }
        }
        let mut nonterminal_index = FxHashMap::default();
        for (id, name) in data.nonterminals.iter().enumerate() {
            if nonterminal_index
                .insert(name.clone(), id as NonterminalIndex)
                .is_some()
            {
                return Err(TableError::inconsistent(format!(
                    "duplicate nonterminal `{}'",
                    name
                )));
            }
        }

        Ok(Self {
            data,
            terminal_index,
            nonterminal_index,
        })
    }

    pub fn from_json(s: &str) -> Result<Self, TableError> {
        Self::from_data(serde_json::from_str(s)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, TableError> {
        Self::from_data(serde_json::from_slice(bytes)?)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, TableError> {
        Self::from_data(serde_json::from_reader(reader)?)
    }

    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<(), TableError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub const fn initial_state(&self) -> StateIndex {
        0
    }

    pub fn num_states(&self) -> usize {
        self.data.states.len()
    }

    pub fn states(&self) -> &[StateRow] {
        &self.data.states
    }

    pub fn productions(&self) -> &[FrozenProduction] {
        &self.data.productions
    }

    pub fn production(&self, id: ProductionIndex) -> Option<&FrozenProduction> {
        self.data.productions.get(id as usize)
    }

    pub fn terminals(&self) -> impl Iterator<Item = &str> + '_ {
        self.data.terminals.iter().map(String::as_str)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &str> + '_ {
        self.data.nonterminals.iter().map(String::as_str)
    }

    /// Look up an interned terminal by name.
    pub fn terminal(&self, name: &str) -> Option<FrozenSymbol> {
        self.terminal_index.get(name).map(|&id| FrozenSymbol {
            kind: SymbolKind::Terminal,
            id,
        })
    }

    /// Look up an interned nonterminal by name.
    pub fn nonterminal(&self, name: &str) -> Option<FrozenSymbol> {
        self.nonterminal_index.get(name).map(|&id| FrozenSymbol {
            kind: SymbolKind::Nonterminal,
            id,
        })
    }

    pub fn symbol_name(&self, symbol: FrozenSymbol) -> Option<&str> {
        let names = match symbol.kind {
            SymbolKind::Terminal => &self.data.terminals,
            SymbolKind::Nonterminal => &self.data.nonterminals,
        };
        names.get(symbol.id as usize).map(String::as_str)
    }

    pub fn terminal_name(&self, id: TerminalIndex) -> Option<&str> {
        self.data.terminals.get(id as usize).map(String::as_str)
    }

    pub fn nonterminal_name(&self, id: NonterminalIndex) -> Option<&str> {
        self.data.nonterminals.get(id as usize).map(String::as_str)
    }

    /// Return the action for the given state and lookahead terminal.
    ///
    /// `None` means the lookahead is a syntax error in that state.
    pub fn action(&self, state: StateIndex, terminal: TerminalIndex) -> Option<Action> {
        let row = self.data.states.get(state as usize)?;
        row.actions
            .binary_search_by_key(&terminal, |(t, _)| *t)
            .ok()
            .map(|i| row.actions[i].1)
    }

    /// Return the state reached from `state` after reducing to `nonterminal`.
    pub fn goto(&self, state: StateIndex, nonterminal: NonterminalIndex) -> Option<StateIndex> {
        let row = self.data.states.get(state as usize)?;
        row.gotos
            .binary_search_by_key(&nonterminal, |(n, _)| *n)
            .ok()
            .map(|i| row.gotos[i].1)
    }

    /// The names of all terminals that have an action in `state`.
    pub fn expected_terminals(&self, state: StateIndex) -> Vec<&str> {
        let Some(row) = self.data.states.get(state as usize) else {
            return vec![];
        };
        row.actions
            .iter()
            .filter_map(|(t, _)| self.terminal_name(*t))
            .collect()
    }
}

fn validate(data: &TableData) -> Result<(), TableError> {
    if data.terminals.first().map(String::as_str) != Some(EOI_NAME) {
        return Err(TableError::inconsistent("terminal 0 must be the end of input"));
    }
    if data.states.is_empty() {
        return Err(TableError::inconsistent("no states"));
    }
    if data.terminals.len() > TerminalIndex::MAX as usize
        || data.nonterminals.len() > NonterminalIndex::MAX as usize
        || data.productions.len() > ProductionIndex::MAX as usize
        || data.states.len() > StateIndex::MAX as usize
    {
        return Err(TableError::inconsistent("too many entries"));
    }

    for (i, production) in data.productions.iter().enumerate() {
        if production.id as usize != i {
            return Err(TableError::inconsistent(format!(
                "production #{} is stored at position {}",
                production.id, i
            )));
        }
        if production.lhs as usize >= data.nonterminals.len() {
            return Err(TableError::inconsistent(format!(
                "production #{} refers to an unknown nonterminal",
                i
            )));
        }
        let ascending = production.captured.windows(2).all(|w| w[0] < w[1]);
        let in_range = production.captured.iter().all(|&p| p < production.rhs_len);
        if !ascending || !in_range {
            return Err(TableError::inconsistent(format!(
                "production #{} has a malformed capture list",
                i
            )));
        }
    }

    for (i, row) in data.states.iter().enumerate() {
        if !row.actions.windows(2).all(|w| w[0].0 < w[1].0)
            || !row.gotos.windows(2).all(|w| w[0].0 < w[1].0)
        {
            return Err(TableError::inconsistent(format!(
                "state #{} is not sorted",
                i
            )));
        }
        for &(terminal, action) in &row.actions {
            let valid = (terminal as usize) < data.terminals.len()
                && match action {
                    Action::Shift(next) => (next as usize) < data.states.len(),
                    Action::Reduce(p) => (p as usize) < data.productions.len(),
                    Action::Accept => true,
                };
            if !valid {
                return Err(TableError::inconsistent(format!(
                    "state #{} has a dangling action",
                    i
                )));
            }
        }
        for &(nonterminal, next) in &row.gotos {
            if nonterminal as usize >= data.nonterminals.len() || next as usize >= data.states.len()
            {
                return Err(TableError::inconsistent(format!(
                    "state #{} has a dangling goto",
                    i
                )));
            }
        }
    }

    Ok(())
}
