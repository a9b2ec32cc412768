//! The implementation of LR(1) automaton.

use crate::{
    first_sets::FirstSets,
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID},
    types::{Map, Queue, Set, TerminalSet},
    util::{display_fn, join},
};
use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
};

#[derive(Debug, thiserror::Error)]
pub enum DFAError {
    #[error(
        "the automaton exceeded {} states while expanding {}",
        limit,
        nonterminals.join(", ")
    )]
    StateLimitExceeded {
        limit: usize,
        nonterminals: Vec<String>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum MergeMode {
    /// Items are equivalent in the sense of Knuth's canonical LR(1) method,
    /// that is, each item sets have the same LR(0) cores and their lookahead symbols
    /// are also equal.
    Canonical,

    /// Items are weakly compatible in the sense of Pager's Practical General Method (PGM).
    PGM,

    /// Items are compatible in the sense of DeRemer's LALR(1) method, that is,
    /// each item sets have the same LR(0) cores but different lookahead symbols.
    LALR,
}

#[derive(Debug, Clone)]
pub struct Config {
    merge_mode: MergeMode,
    max_states: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            merge_mode: MergeMode::PGM,
            max_states: 65_536,
        }
    }

    /// Set the merge strategy of DFA nodes to match Knuth's Canonical LR(1) method.
    pub fn use_canonical(&mut self) -> &mut Self {
        self.merge_mode = MergeMode::Canonical;
        self
    }

    /// Set the merge strategy of DFA nodes to match Pager's Practical General Method (PGM).
    ///
    /// This is the default.
    pub fn use_pgm(&mut self) -> &mut Self {
        self.merge_mode = MergeMode::PGM;
        self
    }

    /// Set the merge strategy of DFA nodes to match DeRemer's LALR(1) method.
    pub fn use_lalr(&mut self) -> &mut Self {
        self.merge_mode = MergeMode::LALR;
        self
    }

    /// Set the maximum number of states the generator may create before giving up.
    pub fn max_states(&mut self, max_states: usize) -> &mut Self {
        self.max_states = max_states;
        self
    }
}

#[derive(Debug)]
pub struct DFA {
    nodes: Map<NodeID, DFANode>,
    conflicts: Vec<Conflict>,
}

impl DFA {
    pub fn generate(grammar: &Grammar) -> Result<Self, DFAError> {
        Self::generate_with_config(grammar, &Config::new())
    }

    pub fn generate_with_config(grammar: &Grammar, config: &Config) -> Result<Self, DFAError> {
        let span = tracing::trace_span!("generate");
        let _entered = span.enter();

        let mut gen = DFAGenerator::new(grammar, config);
        gen.populate_nodes()?;
        let dfa = gen.finalize();
        tracing::debug!(
            "generated {} states with {} conflict(s)",
            dfa.nodes.len(),
            dfa.conflicts.len()
        );
        Ok(dfa)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeID, &DFANode)> + '_ {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn node(&self, id: NodeID) -> &DFANode {
        &self.nodes[&id]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The conflicts that were resolved by the default policy.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts[..]
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, (id, node)) in self.nodes().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }

                writeln!(f, "#### State {:02}", id)?;
                writeln!(f, "## item_sets")?;
                for (core, lookaheads) in &node.item_set {
                    writeln!(
                        f,
                        "- {}  [{}]",
                        core.display(g),
                        join(lookaheads.iter().map(|t| &g.terminals[&t]), " ")
                    )?;
                }

                writeln!(f, "## actions")?;
                for (token, action) in &node.actions {
                    let token = &g.terminals[token];
                    match action {
                        Action::Shift(n) => writeln!(f, "- {} => shift({:02})", token, n)?,
                        Action::Reduce(p) => {
                            writeln!(f, "- {} => reduce({})", token, g.production(*p).display(g))?
                        }
                        Action::Accept => writeln!(f, "- {} => accept", token)?,
                    }
                }

                writeln!(f, "## gotos")?;
                for (symbol, goto) in &node.gotos {
                    writeln!(f, "- {} => goto({:02})", g.nonterminals[symbol], goto)?;
                }
            }

            if !self.conflicts.is_empty() {
                writeln!(f, "\n#### Conflicts")?;
                for conflict in &self.conflicts {
                    writeln!(f, "- {}", conflict.display(g))?;
                }
            }
            Ok(())
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeID {
    raw: u32,
}

impl NodeID {
    pub const START: Self = Self::new(0);

    const fn new(raw: u32) -> Self {
        Self { raw }
    }

    pub const fn raw(self) -> u32 {
        self.raw
    }
}

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

#[derive(Debug)]
pub struct DFANode {
    item_set: LRItemSet,
    actions: Map<TerminalID, Action>,
    gotos: Map<NonterminalID, NodeID>,
}

impl DFANode {
    /// The resolved actions, ordered by terminal id.
    pub fn actions(&self) -> impl Iterator<Item = (TerminalID, Action)> + '_ {
        self.actions.iter().map(|(token, action)| (*token, *action))
    }

    /// The goto transitions, ordered by nonterminal id.
    pub fn gotos(&self) -> impl Iterator<Item = (NonterminalID, NodeID)> + '_ {
        self.gotos.iter().map(|(symbol, goto)| (*symbol, *goto))
    }

    pub fn action(&self, terminal: TerminalID) -> Option<Action> {
        self.actions.get(&terminal).copied()
    }

    pub fn goto(&self, symbol: NonterminalID) -> Option<NodeID> {
        self.gotos.get(&symbol).copied()
    }
}

/// An LR(0) item: a production with a marker position in its right-hand side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct LRItemCore {
    production: ProductionID,
    marker: u16,
}
impl LRItemCore {
    fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let production = g.production(self.production);
            write!(f, "({} :", g.nonterminals[&production.left()])?;
            for (i, symbol) in production.right().iter().enumerate() {
                if i == self.marker as usize {
                    f.write_str(" .")?;
                }
                write!(f, " {}", g.symbol(*symbol))?;
            }
            if self.marker as usize == production.right().len() {
                f.write_str(" .")?;
            }
            f.write_str(")")
        })
    }
}

// LR(1) items keyed by core. Iteration order is the core order, so two sets
// with the same cores line up when zipped.
type LRItemSet = BTreeMap<LRItemCore, TerminalSet>;

/// The action that the LR automaton in a state performs on a particular
/// lookahead symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// Read a lookahead symbol and transition to the specified state.
    Shift(NodeID),

    /// Reduce to the specified production.
    Reduce(ProductionID),

    Accept,
}

/// A state/terminal pair that had several candidate actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub state: NodeID,
    pub terminal: TerminalID,
    pub kind: ConflictKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictKind {
    /// A shift competed with one or more reductions. The shift was chosen.
    ShiftReduce {
        shift: NodeID,
        reduces: Vec<ProductionID>,
    },

    /// Several reductions competed. The earliest production was chosen.
    ReduceReduce {
        chosen: ProductionID,
        reduces: Vec<ProductionID>,
    },
}

impl Conflict {
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let token = &g.terminals[&self.terminal];
            match &self.kind {
                ConflictKind::ShiftReduce { shift, reduces } => write!(
                    f,
                    "state {:02}: shift/reduce conflict on {} between shift({:02}) and {}; resolved as shift",
                    self.state,
                    token,
                    shift,
                    display_reduces(g, reduces)
                ),
                ConflictKind::ReduceReduce { chosen, reduces } => write!(
                    f,
                    "state {:02}: reduce/reduce conflict on {} between {}; resolved as reduce({})",
                    self.state,
                    token,
                    display_reduces(g, reduces),
                    g.production(*chosen).display(g)
                ),
            }
        })
    }
}

fn display_reduces<'g>(g: &'g Grammar, reduces: &'g [ProductionID]) -> impl fmt::Display + 'g {
    join(
        reduces.iter().map(move |p| {
            display_fn(move |f| write!(f, "reduce({})", g.production(*p).display(g)))
        }),
        ", ",
    )
}

// === DFAGenerator ===

#[derive(Debug)]
struct PendingNode {
    id: NodeID,
    kernel: LRItemSet,
    // The node and label of the edge that refers to this pending node.
    from: Option<(NodeID, SymbolID)>,
}

#[derive(Debug, Default)]
struct PendingNodes {
    next_node_id: u32,
    queue: VecDeque<PendingNode>,
}
impl PendingNodes {
    /// Push a kernel item set into the queue, and obtain the registered NodeID.
    fn enqueue(
        &mut self,
        kernel: LRItemSet,
        from: Option<(NodeID, SymbolID)>,
    ) -> Option<NodeID> {
        let id = NodeID::new(self.next_node_id);
        self.next_node_id = self.next_node_id.checked_add(1)?;
        self.queue.push_back(PendingNode { id, kernel, from });
        Some(id)
    }

    fn dequeue(&mut self) -> Option<PendingNode> {
        self.queue.pop_front()
    }
}

#[derive(Debug)]
struct BuildNode {
    item_set: LRItemSet,
    edges: Map<SymbolID, NodeID>,
}

#[derive(Debug)]
struct DFAGenerator<'g> {
    grammar: &'g Grammar,
    first_sets: FirstSets,
    config: &'g Config,
    pending_nodes: PendingNodes,
    nodes: Map<NodeID, BuildNode>,
    // candidates for merging, keyed by the sorted item cores
    same_cores: Map<Vec<LRItemCore>, Vec<NodeID>>,
}

impl<'g> DFAGenerator<'g> {
    fn new(grammar: &'g Grammar, config: &'g Config) -> Self {
        let mut pending_nodes = PendingNodes::default();
        let mut kernel = LRItemSet::new();
        kernel.insert(
            LRItemCore {
                production: ProductionID::ACCEPT,
                marker: 0,
            },
            [TerminalID::EOI].into_iter().collect(),
        );
        pending_nodes.queue.push_back(PendingNode {
            id: NodeID::START,
            kernel,
            from: None,
        });
        pending_nodes.next_node_id = 1;

        Self {
            grammar,
            first_sets: FirstSets::new(grammar),
            config,
            pending_nodes,
            nodes: Map::default(),
            same_cores: Map::default(),
        }
    }

    fn populate_nodes(&mut self) -> Result<(), DFAError> {
        while let Some(PendingNode {
            id: new_id,
            kernel: mut item_set,
            from,
        }) = self.pending_nodes.dequeue()
        {
            // Skip entries whose referring edge has been redirected since they were queued.
            if let Some((prev, symbol)) = from {
                let edge = self.nodes.get(&prev).and_then(|n| n.edges.get(&symbol));
                if edge != Some(&new_id) {
                    continue;
                }
            }

            self.expand_closure(&mut item_set);
            let cores: Vec<LRItemCore> = item_set.keys().copied().collect();

            let mut merged_into = None;
            if let Some(candidates) = self.same_cores.get(&cores) {
                for &orig_id in candidates {
                    let orig = &mut self.nodes[&orig_id];
                    match compare_item_sets(self.config.merge_mode, &orig.item_set, &item_set) {
                        ItemSetDiff::Same => (),

                        ItemSetDiff::Compatible => {
                            let mut modified = false;
                            for (orig_la, new_la) in
                                orig.item_set.values_mut().zip(item_set.values())
                            {
                                modified |= orig_la.merge(new_la);
                            }

                            // Regenerate the successors from the merged item set so
                            // that the grown lookaheads propagate.
                            if modified {
                                for (symbol, kernel) in
                                    extract_transitions(self.grammar, &orig.item_set)
                                {
                                    let id = self
                                        .pending_nodes
                                        .enqueue(kernel, Some((orig_id, symbol)))
                                        .ok_or_else(|| {
                                            state_limit(self.grammar, self.config, &item_set)
                                        })?;
                                    orig.edges.insert(symbol, id);
                                }
                            }
                        }

                        ItemSetDiff::Different => continue,
                    }
                    merged_into = Some(orig_id);
                    break;
                }
            }

            if let Some(orig_id) = merged_into {
                if let Some((prev, symbol)) = from {
                    if let Some(edge) = self
                        .nodes
                        .get_mut(&prev)
                        .and_then(|n| n.edges.get_mut(&symbol))
                    {
                        if *edge == new_id {
                            *edge = orig_id;
                        }
                    }
                }
                continue;
            }

            if self.nodes.len() >= self.config.max_states {
                return Err(state_limit(self.grammar, self.config, &item_set));
            }

            let mut edges = Map::default();
            for (symbol, kernel) in extract_transitions(self.grammar, &item_set) {
                let id = self
                    .pending_nodes
                    .enqueue(kernel, Some((new_id, symbol)))
                    .ok_or_else(|| state_limit(self.grammar, self.config, &item_set))?;
                edges.insert(symbol, id);
            }

            self.nodes.insert(new_id, BuildNode { item_set, edges });
            self.same_cores.entry(cores).or_default().push(new_id);
        }

        Ok(())
    }

    /// Expand `items` into its closure.
    ///
    /// An item is revisited only when its lookahead set grows.
    fn expand_closure(&self, items: &mut LRItemSet) {
        let mut queue: Queue<LRItemCore> = items.keys().copied().collect();
        while let Some(core) = queue.pop() {
            let production = self.grammar.production(core.production);

            // [X -> ... @ Y beta]
            let (y_symbol, beta) = match &production.right()[core.marker as usize..] {
                [SymbolID::N(y_symbol), beta @ ..] => (*y_symbol, beta),
                _ => continue,
            };

            let lookaheads = match items.get(&core) {
                Some(lookaheads) => self.first_sets.get(beta, lookaheads),
                None => continue,
            };
            for production in self.grammar.productions_of(y_symbol) {
                let added = LRItemCore {
                    production: production.id(),
                    marker: 0,
                };
                if items.entry(added).or_default().merge(&lookaheads) {
                    queue.push(added);
                }
            }
        }
    }

    fn finalize(self) -> DFA {
        // Nodes left behind by merging are unreachable; drop them and
        // renumber the rest in creation order.
        let mut reachable: Set<NodeID> = Set::default();
        let mut stack = vec![NodeID::START];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.edges.values().copied());
            }
        }

        let mut new_node_ids = Map::default();
        for &orig_id in self.nodes.keys().filter(|id| reachable.contains(*id)) {
            let new_id = NodeID::new(new_node_ids.len() as u32);
            new_node_ids.insert(orig_id, new_id);
        }

        let g = self.grammar;
        let mut nodes = Map::default();
        let mut conflicts = vec![];
        for (orig_id, BuildNode { item_set, edges }) in self.nodes {
            let id = match new_node_ids.get(&orig_id) {
                Some(id) => *id,
                None => continue,
            };

            #[derive(Default)]
            struct PendingAction {
                shift: Option<NodeID>,
                reduces: Vec<ProductionID>,
            }
            let mut pending_actions: BTreeMap<TerminalID, PendingAction> = BTreeMap::new();
            let mut gotos: BTreeMap<NonterminalID, NodeID> = BTreeMap::new();
            for (symbol, target) in edges {
                let target = match new_node_ids.get(&target) {
                    Some(target) => *target,
                    None => continue,
                };
                match symbol {
                    SymbolID::T(t) => {
                        pending_actions.entry(t).or_default().shift = Some(target);
                    }
                    SymbolID::N(n) => {
                        gotos.insert(n, target);
                    }
                }
            }
            for (core, lookaheads) in &item_set {
                if (core.marker as usize) < g.production(core.production).right().len() {
                    continue;
                }
                for lookahead in lookaheads.iter() {
                    pending_actions
                        .entry(lookahead)
                        .or_default()
                        .reduces
                        .push(core.production);
                }
            }

            let mut actions = Map::default();
            for (terminal, PendingAction { shift, mut reduces }) in pending_actions {
                reduces.sort();
                let (action, conflict) = resolve_conflict(shift, reduces);
                if let Some(kind) = conflict {
                    let conflict = Conflict {
                        state: id,
                        terminal,
                        kind,
                    };
                    tracing::warn!("{}", conflict.display(g));
                    conflicts.push(conflict);
                }
                if let Some(action) = action {
                    actions.insert(terminal, action);
                }
            }

            nodes.insert(
                id,
                DFANode {
                    item_set,
                    actions,
                    gotos: gotos.into_iter().collect(),
                },
            );
        }

        DFA { nodes, conflicts }
    }
}

/// Extract the kernels of the successor item sets, keyed by transition label.
fn extract_transitions(grammar: &Grammar, items: &LRItemSet) -> Map<SymbolID, LRItemSet> {
    let mut item_sets: Map<SymbolID, LRItemSet> = Map::default();
    for (core, lookaheads) in items {
        let production = grammar.production(core.production);
        let label = match production.right().get(core.marker as usize) {
            Some(label) => *label,
            None => continue,
        };
        item_sets.entry(label).or_default().insert(
            LRItemCore {
                marker: core.marker + 1,
                ..*core
            },
            lookaheads.clone(),
        );
    }
    item_sets
}

fn state_limit(grammar: &Grammar, config: &Config, items: &LRItemSet) -> DFAError {
    let nonterminals: Set<&str> = items
        .keys()
        .filter(|core| core.marker > 0)
        .map(|core| {
            let left = grammar.production(core.production).left();
            grammar.nonterminals[&left].name()
        })
        .collect();
    DFAError::StateLimitExceeded {
        limit: config.max_states,
        nonterminals: nonterminals.into_iter().map(str::to_owned).collect(),
    }
}

enum ItemSetDiff {
    Same,
    Compatible,
    Different,
}

fn compare_item_sets(mode: MergeMode, left: &LRItemSet, right: &LRItemSet) -> ItemSetDiff {
    // Assume that `left` and `right` have the same LR(0) cores.

    let is_covered = left.values().zip(right.values()).all(|(left, right)| {
        left.is_superset(right) && (mode != MergeMode::Canonical || right.is_superset(left))
    });
    if is_covered {
        return ItemSetDiff::Same;
    }

    match mode {
        MergeMode::LALR => ItemSetDiff::Compatible,
        MergeMode::PGM if is_pgm_weakly_compatible(left, right) => ItemSetDiff::Compatible,
        _ => ItemSetDiff::Different,
    }
}

// For every pair of items `i != j`, either the merged lookaheads stay apart
// across the two sets, or the pair already shares a lookahead within one set.
fn is_pgm_weakly_compatible(left: &LRItemSet, right: &LRItemSet) -> bool {
    let pairs: Vec<(&TerminalSet, &TerminalSet)> = left.values().zip(right.values()).collect();
    for (i, (l1, r1)) in pairs.iter().enumerate() {
        for (l2, r2) in &pairs[i + 1..] {
            let disjoint_across = l1.is_disjoint(r2) && l2.is_disjoint(r1);
            if !disjoint_across && l1.is_disjoint(l2) && r1.is_disjoint(r2) {
                return false;
            }
        }
    }
    true
}

/// Pick one action among the candidates of a state/terminal pair.
///
/// A shift wins over any reduction; among reductions the production defined
/// first wins. `reduces` must be sorted.
fn resolve_conflict(
    shift: Option<NodeID>,
    reduces: Vec<ProductionID>,
) -> (Option<Action>, Option<ConflictKind>) {
    let reduce_action = |p: ProductionID| {
        if p == ProductionID::ACCEPT {
            Action::Accept
        } else {
            Action::Reduce(p)
        }
    };

    let first = match reduces.first() {
        Some(first) => *first,
        None => return (shift.map(Action::Shift), None),
    };
    match shift {
        Some(next) => (
            Some(Action::Shift(next)),
            Some(ConflictKind::ShiftReduce {
                shift: next,
                reduces,
            }),
        ),
        None if reduces.len() == 1 => (Some(reduce_action(first)), None),
        None => (
            Some(reduce_action(first)),
            Some(ConflictKind::ReduceReduce {
                chosen: first,
                reduces,
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::*;

    fn expr_grammar() -> Grammar {
        Grammar::define(|g| {
            let lparen = g.literal("(")?;
            let rparen = g.literal(")")?;
            let plus = g.literal("+")?;
            let minus = g.literal("-")?;
            let star = g.literal("*")?;
            let slash = g.literal("/")?;
            let num = g.terminal("NUM")?;

            let expr = g.nonterminal("expr")?;
            let term = g.nonterminal("term")?;
            let factor = g.nonterminal("factor")?;

            g.rule(expr, [N(expr), T(plus), N(term)])?;
            g.rule(expr, [N(expr), T(minus), N(term)])?;
            g.rule(expr, [N(term)])?;

            g.rule(term, [N(term), T(star), N(factor)])?;
            g.rule(term, [N(term), T(slash), N(factor)])?;
            g.rule(term, [N(factor)])?;

            g.rule(factor, [T(num)])?;
            g.rule(factor, [T(lparen), N(expr), T(rparen)])?;

            g.entrypoint(expr)?;

            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn smoketest() {
        let grammar = expr_grammar();
        eprintln!("{}", grammar);

        let dfa = DFA::generate(&grammar).unwrap();
        eprintln!("DFA Nodes:\n---\n{}", dfa.display(&grammar));
        assert!(dfa.conflicts().is_empty());

        let start = dfa.node(NodeID::START);
        let num = grammar.terminal_by_name("NUM").unwrap().id();
        assert!(matches!(start.action(num), Some(Action::Shift(..))));
        let expr = grammar.nonterminal_by_name("expr").unwrap().id();
        let accepting = dfa.node(start.goto(expr).unwrap());
        assert_eq!(accepting.action(TerminalID::EOI), Some(Action::Accept));
    }

    #[test]
    fn merge_modes() {
        let grammar = expr_grammar();
        let canonical = DFA::generate_with_config(&grammar, Config::new().use_canonical()).unwrap();
        let pgm = DFA::generate_with_config(&grammar, Config::new().use_pgm()).unwrap();
        let lalr = DFA::generate_with_config(&grammar, Config::new().use_lalr()).unwrap();
        eprintln!(
            "canonical={}, pgm={}, lalr={}",
            canonical.num_nodes(),
            pgm.num_nodes(),
            lalr.num_nodes()
        );
        assert!(canonical.num_nodes() > lalr.num_nodes());
        assert!(pgm.num_nodes() <= canonical.num_nodes());
        assert!(pgm.num_nodes() >= lalr.num_nodes());
        assert!(pgm.conflicts().is_empty());
        assert!(canonical.conflicts().is_empty());
        assert!(lalr.conflicts().is_empty());
    }

    // S : a A d | b B d | a B e | b A e
    // A : c
    // B : c
    //
    // LR(1) but not LALR(1): merging the two states reached by `c` yields
    // reduce/reduce conflicts, which PGM avoids.
    fn lr1_not_lalr() -> Grammar {
        Grammar::define(|g| {
            let a = g.terminal("A")?;
            let b = g.terminal("B")?;
            let c = g.terminal("C")?;
            let d = g.terminal("D")?;
            let e = g.terminal("E")?;
            let s = g.nonterminal("s")?;
            let x = g.nonterminal("x")?;
            let y = g.nonterminal("y")?;
            g.rule(s, [T(a), N(x), T(d)])?;
            g.rule(s, [T(b), N(y), T(d)])?;
            g.rule(s, [T(a), N(y), T(e)])?;
            g.rule(s, [T(b), N(x), T(e)])?;
            g.rule(x, [T(c)])?;
            g.rule(y, [T(c)])?;
            g.entrypoint(s)?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn pgm_keeps_lr1_precision() {
        let grammar = lr1_not_lalr();

        let pgm = DFA::generate(&grammar).unwrap();
        assert!(pgm.conflicts().is_empty());

        let lalr = DFA::generate_with_config(&grammar, Config::new().use_lalr()).unwrap();
        eprintln!("{}", lalr.display(&grammar));
        assert!(!lalr.conflicts().is_empty());
        for conflict in lalr.conflicts() {
            let x = grammar.nonterminal_by_name("x").unwrap().id();
            match &conflict.kind {
                ConflictKind::ReduceReduce { chosen, reduces } => {
                    assert_eq!(reduces.len(), 2);
                    // `x : C` was defined before `y : C`.
                    assert_eq!(grammar.production(*chosen).left(), x);
                }
                kind => panic!("unexpected conflict: {:?}", kind),
            }
        }
    }

    #[test]
    fn state_limit() {
        let grammar = expr_grammar();
        let err = DFA::generate_with_config(&grammar, Config::new().max_states(3)).unwrap_err();
        match err {
            DFAError::StateLimitExceeded {
                limit,
                nonterminals,
            } => {
                assert_eq!(limit, 3);
                assert!(!nonterminals.is_empty());
            }
        }
    }

    #[test]
    fn resolve() {
        let p = |raw| ProductionID::new(raw);
        let n = NodeID::new(4);
        assert_eq!(
            resolve_conflict(Some(n), vec![]),
            (Some(Action::Shift(n)), None)
        );
        assert_eq!(
            resolve_conflict(None, vec![ProductionID::ACCEPT]),
            (Some(Action::Accept), None)
        );
        assert_eq!(
            resolve_conflict(Some(n), vec![p(3)]),
            (
                Some(Action::Shift(n)),
                Some(ConflictKind::ShiftReduce {
                    shift: n,
                    reduces: vec![p(3)]
                })
            )
        );
        assert_eq!(
            resolve_conflict(None, vec![p(2), p(5)]),
            (
                Some(Action::Reduce(p(2))),
                Some(ConflictKind::ReduceReduce {
                    chosen: p(2),
                    reduces: vec![p(2), p(5)]
                })
            )
        );
    }
}
