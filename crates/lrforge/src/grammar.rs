//! Grammar types.

use crate::{
    types::{Map, Set},
    util::display_fn,
};
use lrforge_runtime::{table::EOI_NAME, SemanticAction};
use std::{collections::VecDeque, fmt, fs, io, path::Path};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}
impl TerminalID {
    /// Reserved symbol used as a terminal symbol that means the end of input.
    pub const EOI: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.raw
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.raw as usize
    }

    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u16::try_from(index).ok().map(Self::new)
    }
}

#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    name: String,
    literal: bool,
}
impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }

    /// The name a scanner reports for this terminal.
    ///
    /// For quoted terminals this is the literal text without the quotes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_literal(&self) -> bool {
        self.literal
    }
}
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literal {
            write!(f, "'{}'", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}
impl NonterminalID {
    /// Reserved symbol used as the augmented start symbol.
    pub const START: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.raw
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.raw as usize
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    name: String,
    synthetic: bool,
}
impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this symbol was introduced while desugaring quantifiers or groups.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}
impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID {
    raw: u16,
}

impl ProductionID {
    /// The augmented production `$start : <entrypoint>`.
    pub const ACCEPT: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    pub(crate) const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.raw
    }
}

impl fmt::Display for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// The type that represents a production rule in grammar.
#[derive(Debug)]
pub struct Production {
    id: ProductionID,
    left: NonterminalID,
    right: Vec<SymbolID>,
    captures: Vec<bool>,
    action: Option<SemanticAction>,
}
impl Production {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    /// The capture mask, one flag per right-hand position.
    pub fn captures(&self) -> &[bool] {
        &self.captures[..]
    }

    /// Positions of the right-hand side whose values reach the semantic action.
    pub fn captured_positions(&self) -> impl Iterator<Item = u16> + '_ {
        self.captures
            .iter()
            .zip(0u16..)
            .filter_map(|(captured, i)| captured.then_some(i))
    }

    pub fn action(&self) -> Option<&SemanticAction> {
        self.action.as_ref()
    }

    // `"LHS : R1 !R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{} :", g.nonterminals[&self.left])?;
            if self.right.is_empty() {
                f.write_str(" ε")?;
            }
            let all_captured = self.captures.iter().all(|c| *c);
            for (symbol, captured) in self.right.iter().zip(&self.captures) {
                f.write_str(" ")?;
                if *captured && !all_captured {
                    f.write_str("!")?;
                }
                write!(f, "{}", g.symbol(*symbol))?;
            }
            if let Some(action) = &self.action {
                write!(f, "  #[{}]", action)?;
            }
            Ok(())
        })
    }
}

/// The grammar definition used to derive the parser tables.
#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar {
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub productions: Map<ProductionID, Production>,
    pub entrypoint: NonterminalID,
    by_left: Map<NonterminalID, Vec<ProductionID>>,
    unreachable: Vec<NonterminalID>,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            writeln!(f, "{}", terminal)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{}", nonterminal)?;
            if nonterminal.id() == self.entrypoint {
                write!(f, " (entrypoint)")?;
            }
            if nonterminal.is_synthetic() {
                write!(f, " (synthetic)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## productions:")?;
        for production in self.productions.values() {
            writeln!(f, "[{}] {}", production.id(), production.display(self))?;
        }

        Ok(())
    }
}

impl Grammar {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Grammar, GrammarDefError> {
        let source = fs::read_to_string(path).map_err(GrammarDefError::IO)?;
        Self::from_str(&source)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(source: &str) -> Result<Grammar, GrammarDefError> {
        let grammar = crate::syntax::parse(source).map_err(GrammarDefError::Syntax)?;
        Grammar::define(|def| crate::desugar::lower(def, &grammar))
    }

    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            terminals: Map::default(),
            nonterminals: Map::default(),
            productions: Map::default(),
            terminal_names: Map::default(),
            nonterminal_names: Map::default(),
            rhs_seen: Set::default(),
            entrypoint: None,
            next_terminal_id: TerminalID::OFFSET,
            next_nonterminal_id: NonterminalID::OFFSET,
            next_production_id: ProductionID::OFFSET,
        };

        def.terminals.insert(
            TerminalID::EOI,
            Terminal {
                id: TerminalID::EOI,
                name: EOI_NAME.into(),
                literal: false,
            },
        );
        def.terminal_names.insert(EOI_NAME.into(), TerminalID::EOI);

        def.nonterminals.insert(
            NonterminalID::START,
            Nonterminal {
                id: NonterminalID::START,
                name: "$start".into(),
                synthetic: true,
            },
        );
        def.nonterminal_names
            .insert("$start".into(), NonterminalID::START);

        f(&mut def)?;

        def.end()
    }

    pub fn symbol(&self, symbol: SymbolID) -> &dyn fmt::Display {
        match symbol {
            SymbolID::T(t) => &self.terminals[&t],
            SymbolID::N(n) => &self.nonterminals[&n],
        }
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[&id]
    }

    /// Iterate over the productions whose left-hand side is `left`, in definition order.
    pub fn productions_of(&self, left: NonterminalID) -> impl Iterator<Item = &Production> + '_ {
        self.by_left
            .get(&left)
            .into_iter()
            .flatten()
            .map(|id| &self.productions[id])
    }

    pub fn terminal_by_name(&self, name: &str) -> Option<&Terminal> {
        self.terminals.values().find(|t| t.name == name)
    }

    pub fn nonterminal_by_name(&self, name: &str) -> Option<&Nonterminal> {
        self.nonterminals.values().find(|n| n.name == name)
    }

    /// Nonterminals that cannot be reached from the entrypoint.
    pub fn unreachable_nonterminals(&self) -> &[NonterminalID] {
        &self.unreachable[..]
    }
}

/// The contextural values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    productions: Map<ProductionID, Production>,
    terminal_names: Map<String, TerminalID>,
    nonterminal_names: Map<String, NonterminalID>,
    rhs_seen: Set<(NonterminalID, Vec<SymbolID>)>,
    entrypoint: Option<NonterminalID>,
    next_terminal_id: u16,
    next_nonterminal_id: u16,
    next_production_id: u16,
}

impl GrammarDef {
    /// Declare a terminal symbol named by an identifier, or return the
    /// existing one with the same name.
    pub fn terminal(&mut self, name: &str) -> Result<TerminalID, GrammarDefError> {
        if !verify_ident(name) {
            return Err(GrammarDefError::InvalidName { name: name.into() });
        }
        self.intern_terminal(name, false)
    }

    /// Declare a terminal symbol written as a quoted literal, e.g. `'+'`.
    pub fn literal(&mut self, text: &str) -> Result<TerminalID, GrammarDefError> {
        if text.is_empty() || text.chars().any(char::is_whitespace) || text == EOI_NAME {
            return Err(GrammarDefError::InvalidName { name: text.into() });
        }
        self.intern_terminal(text, true)
    }

    fn intern_terminal(&mut self, name: &str, literal: bool) -> Result<TerminalID, GrammarDefError> {
        if let Some(id) = self.terminal_names.get(name) {
            return Ok(*id);
        }
        let id = TerminalID::new(bump(&mut self.next_terminal_id)?);
        self.terminals.insert(
            id,
            Terminal {
                id,
                name: name.into(),
                literal,
            },
        );
        self.terminal_names.insert(name.into(), id);
        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar, or return the
    /// existing one with the same name.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarDefError> {
        if !verify_ident(name) {
            return Err(GrammarDefError::InvalidName { name: name.into() });
        }
        self.intern_nonterminal(name, false).map(|(id, _)| id)
    }

    /// Declare a nonterminal introduced by desugaring.
    ///
    /// The second element is `true` when the symbol did not exist before.
    pub(crate) fn synthetic(
        &mut self,
        name: &str,
    ) -> Result<(NonterminalID, bool), GrammarDefError> {
        self.intern_nonterminal(name, true)
    }

    fn intern_nonterminal(
        &mut self,
        name: &str,
        synthetic: bool,
    ) -> Result<(NonterminalID, bool), GrammarDefError> {
        if let Some(id) = self.nonterminal_names.get(name) {
            return Ok((*id, false));
        }
        let id = NonterminalID::new(bump(&mut self.next_nonterminal_id)?);
        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                name: name.into(),
                synthetic,
            },
        );
        self.nonterminal_names.insert(name.into(), id);
        Ok((id, true))
    }

    /// Add a production whose right-hand positions are all captured and
    /// which has no semantic action bound.
    pub fn rule<I>(&mut self, left: NonterminalID, right: I) -> Result<ProductionID, GrammarDefError>
    where
        I: IntoIterator<Item = SymbolID>,
    {
        self.production(left, right.into_iter().map(|s| (s, true)), None)
    }

    /// Add a production given as `(symbol, captured)` pairs.
    pub fn production<I>(
        &mut self,
        left: NonterminalID,
        right: I,
        action: Option<SemanticAction>,
    ) -> Result<ProductionID, GrammarDefError>
    where
        I: IntoIterator<Item = (SymbolID, bool)>,
    {
        if left == NonterminalID::START {
            return Err(GrammarDefError::InvalidName {
                name: "$start".into(),
            });
        }
        let (right, captures): (Vec<_>, Vec<_>) = right.into_iter().unzip();

        if !self.rhs_seen.insert((left, right.clone())) {
            let production = display_fn(|f| {
                write!(f, "{} :", self.nonterminals[&left])?;
                for symbol in &right {
                    match symbol {
                        SymbolID::T(t) => write!(f, " {}", self.terminals[t])?,
                        SymbolID::N(n) => write!(f, " {}", self.nonterminals[n])?,
                    }
                }
                Ok(())
            })
            .to_string();
            return Err(GrammarDefError::DuplicateProduction { production });
        }

        let id = ProductionID::new(bump(&mut self.next_production_id)?);
        self.productions.insert(
            id,
            Production {
                id,
                left,
                right,
                captures,
                action,
            },
        );
        Ok(id)
    }

    /// Specify the entrypoint of this grammar.
    pub fn entrypoint(&mut self, symbol: NonterminalID) -> Result<(), GrammarDefError> {
        if let Some(first) = self.entrypoint {
            return Err(GrammarDefError::DuplicateEntrypoint {
                first: self.nonterminals[&first].name.clone(),
                second: self.nonterminals[&symbol].name.clone(),
            });
        }
        self.entrypoint = Some(symbol);
        Ok(())
    }

    fn end(mut self) -> Result<Grammar, GrammarDefError> {
        let entrypoint = self.entrypoint.ok_or(GrammarDefError::MissingEntrypoint)?;

        let mut by_left: Map<NonterminalID, Vec<ProductionID>> = Map::default();
        for production in self.productions.values() {
            by_left
                .entry(production.left)
                .or_default()
                .push(production.id);
        }
        if let Some(undefined) = self
            .nonterminals
            .values()
            .find(|n| n.id != NonterminalID::START && !by_left.contains_key(&n.id))
        {
            return Err(GrammarDefError::UndefinedSymbol {
                name: undefined.name.clone(),
            });
        }

        self.productions.insert(
            ProductionID::ACCEPT,
            Production {
                id: ProductionID::ACCEPT,
                left: NonterminalID::START,
                right: vec![SymbolID::N(entrypoint)],
                captures: vec![true],
                action: None,
            },
        );
        self.productions.sort_keys();
        by_left.insert(NonterminalID::START, vec![ProductionID::ACCEPT]);

        // Only the symbols the automaton can reach must derive a terminal string.
        let reachable = reachable_set(&by_left, &self.productions);
        let productive = productive_set(&self.productions);
        let unproductive: Vec<String> = self
            .nonterminals
            .values()
            .filter(|n| reachable.contains(&n.id) && !productive.contains(&n.id))
            .map(|n| n.name.clone())
            .collect();
        if !unproductive.is_empty() {
            return Err(GrammarDefError::Unproductive {
                nonterminals: unproductive,
            });
        }

        let unreachable: Vec<NonterminalID> = self
            .nonterminals
            .keys()
            .filter(|id| !reachable.contains(*id))
            .copied()
            .collect();
        for id in &unreachable {
            tracing::warn!(
                "nonterminal `{}' is unreachable from the entrypoint",
                self.nonterminals[id]
            );
        }

        tracing::debug!(
            "grammar: {} terminals, {} nonterminals, {} productions",
            self.terminals.len(),
            self.nonterminals.len(),
            self.productions.len()
        );

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            productions: self.productions,
            entrypoint,
            by_left,
            unreachable,
        })
    }
}

fn bump(next: &mut u16) -> Result<u16, GrammarDefError> {
    let id = *next;
    *next = next.checked_add(1).ok_or(GrammarDefError::TooManySymbols)?;
    Ok(id)
}

/// Nonterminals that derive at least one string of terminals.
fn productive_set(productions: &Map<ProductionID, Production>) -> Set<NonterminalID> {
    let mut productive: Set<NonterminalID> = Set::default();
    let mut changed = true;
    while changed {
        changed = false;
        for production in productions.values() {
            if productive.contains(&production.left) {
                continue;
            }
            let derives = production.right.iter().all(|symbol| match symbol {
                SymbolID::T(..) => true,
                SymbolID::N(n) => productive.contains(n),
            });
            if derives {
                productive.insert(production.left);
                changed = true;
            }
        }
    }
    productive
}

fn reachable_set(
    by_left: &Map<NonterminalID, Vec<ProductionID>>,
    productions: &Map<ProductionID, Production>,
) -> Set<NonterminalID> {
    let mut reachable: Set<NonterminalID> = Set::default();
    reachable.insert(NonterminalID::START);
    let mut queue = VecDeque::from([NonterminalID::START]);
    while let Some(n) = queue.pop_front() {
        for id in by_left.get(&n).into_iter().flatten() {
            for symbol in &productions[id].right {
                if let SymbolID::N(m) = symbol {
                    if reachable.insert(*m) {
                        queue.push_back(*m);
                    }
                }
            }
        }
    }
    reachable
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("IO error: {}", _0)]
    IO(io::Error),

    #[error("syntax error: {:#}", _0)]
    Syntax(anyhow::Error),

    #[error("undefined symbol `{}'", name)]
    UndefinedSymbol { name: String },

    #[error("no entrypoint is declared (mark one rule with `@')")]
    MissingEntrypoint,

    #[error("duplicate entrypoint: `{}' was declared after `{}'", second, first)]
    DuplicateEntrypoint { first: String, second: String },

    #[error("stacked quantifiers on `{}'; use a parenthesized group instead", item)]
    StackedQuantifier { item: String },

    #[error("invalid symbol name `{}'", name)]
    InvalidName { name: String },

    #[error("duplicate production: {}", production)]
    DuplicateProduction { production: String },

    #[error("too many symbols or productions")]
    TooManySymbols,

    #[error("nonterminals that derive no terminal string: {}", nonterminals.join(", "))]
    Unproductive { nonterminals: Vec<String> },
}

pub(crate) fn verify_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first == '_' || unicode_ident::is_xid_start(first) => (),
        _ => return false,
    }
    chars.all(unicode_ident::is_xid_continue)
}

/// Whether a bare name in a grammar file denotes a terminal, i.e. it is
/// written in capital letters (`INT`, `NAME_2`).
pub(crate) fn is_terminal_name(s: &str) -> bool {
    s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::*;
    use lrforge_runtime::Builtin;

    #[test]
    fn interning() {
        let grammar = Grammar::define(|def| {
            let plus = def.literal("+")?;
            assert_eq!(def.literal("+")?, plus);
            let int = def.terminal("INT")?;
            assert_eq!(def.terminal("INT")?, int);
            assert_ne!(plus, int);

            let expr = def.nonterminal("expr")?;
            assert_eq!(def.nonterminal("expr")?, expr);

            def.entrypoint(expr)?;
            def.rule(expr, [N(expr), T(plus), T(int)])?;
            def.rule(expr, [T(int)])?;
            Ok(())
        })
        .unwrap();
        eprintln!("{}", grammar);

        assert_eq!(grammar.terminals.len(), 3);
        assert_eq!(grammar.nonterminals.len(), 2);
        assert_eq!(grammar.productions.len(), 3);
        assert_eq!(
            grammar.production(ProductionID::ACCEPT).right(),
            &[N(grammar.entrypoint)]
        );
        assert_eq!(grammar.terminals[&TerminalID::EOI].name(), "$eoi");
        assert_eq!(grammar.terminal_by_name("+").map(|t| t.is_literal()), Some(true));
        assert_eq!(grammar.productions_of(grammar.entrypoint).count(), 2);
    }

    #[test]
    fn display_marks_captures() {
        let grammar = Grammar::define(|def| {
            let lparen = def.literal("(")?;
            let rparen = def.literal(")")?;
            let int = def.terminal("INT")?;
            let atom = def.nonterminal("atom")?;
            def.entrypoint(atom)?;
            def.production(
                atom,
                [(T(lparen), false), (N(atom), true), (T(rparen), false)],
                Some(SemanticAction::Named("paren".into())),
            )?;
            def.rule(atom, [T(int)])?;
            Ok(())
        })
        .unwrap();

        let production = grammar.productions_of(grammar.entrypoint).next().unwrap();
        assert_eq!(
            production.display(&grammar).to_string(),
            "atom : '(' !atom ')'  #[paren]"
        );
        assert_eq!(production.captured_positions().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn rejects_duplicates() {
        let err = Grammar::define(|def| {
            let a = def.terminal("A")?;
            let s = def.nonterminal("s")?;
            def.entrypoint(s)?;
            def.rule(s, [T(a)])?;
            def.production(
                s,
                [(T(a), false)],
                Some(SemanticAction::Builtin(Builtin::Option)),
            )?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateProduction { .. }));

        let err = Grammar::define(|def| {
            let s = def.nonterminal("s")?;
            let t = def.nonterminal("t")?;
            def.entrypoint(s)?;
            def.entrypoint(t)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            GrammarDefError::DuplicateEntrypoint { ref first, ref second } if first == "s" && second == "t"
        ));
    }

    #[test]
    fn rejects_missing_entrypoint() {
        let err = Grammar::define(|def| {
            let a = def.terminal("A")?;
            let s = def.nonterminal("s")?;
            def.rule(s, [T(a)])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::MissingEntrypoint));
    }

    #[test]
    fn rejects_undefined_and_unproductive() {
        let err = Grammar::define(|def| {
            let s = def.nonterminal("s")?;
            let t = def.nonterminal("t")?;
            def.entrypoint(s)?;
            def.rule(s, [N(t)])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::UndefinedSymbol { ref name } if name == "t"));

        let err = Grammar::define(|def| {
            let a = def.terminal("A")?;
            let s = def.nonterminal("s")?;
            def.entrypoint(s)?;
            def.rule(s, [N(s), T(a)])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            GrammarDefError::Unproductive { ref nonterminals } if nonterminals.contains(&"s".to_owned())
        ));
    }

    #[test]
    fn reports_unreachable() {
        let grammar = Grammar::define(|def| {
            let a = def.terminal("A")?;
            let s = def.nonterminal("s")?;
            let unused = def.nonterminal("unused")?;
            def.entrypoint(s)?;
            def.rule(s, [T(a)])?;
            def.rule(unused, [T(a), T(a)])?;
            Ok(())
        })
        .unwrap();
        let unreachable: Vec<_> = grammar
            .unreachable_nonterminals()
            .iter()
            .map(|id| grammar.nonterminals[id].name())
            .collect();
        assert_eq!(unreachable, vec!["unused"]);
    }

    #[test]
    fn unreachable_unproductive_is_not_fatal() {
        let grammar = Grammar::define(|def| {
            let a = def.terminal("A")?;
            let s = def.nonterminal("s")?;
            let dead = def.nonterminal("dead")?;
            def.entrypoint(s)?;
            def.rule(s, [T(a)])?;
            def.rule(dead, [N(dead), T(a)])?;
            Ok(())
        })
        .unwrap();
        let dead = grammar.nonterminal_by_name("dead").unwrap().id();
        assert_eq!(grammar.unreachable_nonterminals(), [dead]);

        let err = Grammar::define(|def| {
            let a = def.terminal("A")?;
            let s = def.nonterminal("s")?;
            let dead = def.nonterminal("dead")?;
            def.entrypoint(s)?;
            def.rule(s, [T(a)])?;
            def.rule(s, [N(dead)])?;
            def.rule(dead, [N(dead), T(a)])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            GrammarDefError::Unproductive { ref nonterminals } if nonterminals == &["dead".to_owned()]
        ));
    }

    #[test]
    fn names() {
        assert!(verify_ident("expr"));
        assert!(verify_ident("_tail2"));
        assert!(verify_ident("ｔｒｕｅ"));
        assert!(!verify_ident(""));
        assert!(!verify_ident("2x"));
        assert!(!verify_ident("a-b"));

        assert!(is_terminal_name("INT"));
        assert!(is_terminal_name("NAME_2"));
        assert!(!is_terminal_name("Expr"));
        assert!(!is_terminal_name("_"));

        let err = Grammar::define(|def| def.literal("a b").map(drop)).unwrap_err();
        assert!(matches!(err, GrammarDefError::InvalidName { .. }));
    }
}
