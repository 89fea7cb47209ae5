//! Canonical LR(0) item-set automaton.
//!
//! States are canonical item sets, sorted and deduplicated by content, so a
//! goto that recomputes an existing set reuses the existing state. The
//! construction is purely combinational: given the same grammar it produces
//! the same states, numbered in the same order.

use crate::automaton::production::{flatten, FlatProduction, Symbol};
use crate::grammar::{DerivationInfo, Grammar, ProductionId, ProductionInfoManager, SemanticValue};
use hashbrown::{HashMap, HashSet};
use std::fmt;

/// Index of a state in the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub(crate) u32);

impl StateId {
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for StateId {
    type Error = std::num::TryFromIntError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u32::try_from(index).map(Self)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// `(production, marker position)`; the marker sits before
/// `symbols[dot]`, or at the end when `dot == symbols.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Item {
    pub(crate) production: usize,
    pub(crate) dot: usize,
}

#[derive(Debug)]
pub(crate) struct State {
    /// Canonical (sorted) item set; state identity.
    pub(crate) items: Vec<Item>,
    /// Outgoing edges, sorted by symbol.
    pub(crate) edges: Vec<(Symbol, StateId)>,
}

/// The compiled LR(0) automaton for one grammar snapshot.
pub struct Lr0Model<V> {
    flat: Vec<FlatProduction<V>>,
    states: Vec<State>,
    start_state: StateId,
    infos: Vec<DerivationInfo>,
    names: Vec<String>,
    start_production: ProductionId,
}

impl<V: SemanticValue> Lr0Model<V> {
    /// Build the automaton for `grammar` using its derivation analysis.
    #[must_use]
    pub fn build(grammar: &Grammar<V>, info: &ProductionInfoManager) -> Self {
        let flat = flatten(grammar);

        // Flat productions of each nonterminal, for closure.
        let mut by_lhs: HashMap<ProductionId, Vec<usize>, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        for (index, production) in flat.iter().enumerate() {
            by_lhs.entry(production.production).or_default().push(index);
        }

        let mut states: Vec<State> = Vec::new();
        let mut ids: HashMap<Vec<Item>, StateId, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());

        let start_items = closure(
            &flat,
            &by_lhs,
            by_lhs
                .get(&grammar.start())
                .map(|indices| {
                    indices
                        .iter()
                        .map(|&production| Item { production, dot: 0 })
                        .collect()
                })
                .unwrap_or_default(),
        );
        let start_state = intern(&mut states, &mut ids, start_items);

        let mut worklist = vec![start_state];
        while let Some(state_id) = worklist.pop() {
            // Group items by the symbol after their marker, advancing it.
            let mut transitions: HashMap<Symbol, Vec<Item>, ahash::RandomState> =
                HashMap::with_hasher(ahash::RandomState::new());
            for item in &states[state_id.index()].items {
                if let Some(&symbol) = flat[item.production].symbols.get(item.dot) {
                    transitions.entry(symbol).or_default().push(Item {
                        production: item.production,
                        dot: item.dot + 1,
                    });
                }
            }

            // Sorted symbol order keeps state numbering deterministic.
            let mut transitions: Vec<(Symbol, Vec<Item>)> = transitions.into_iter().collect();
            transitions.sort_by_key(|(symbol, _)| *symbol);

            let mut edges = Vec::with_capacity(transitions.len());
            for (symbol, kernel) in transitions {
                let items = closure(&flat, &by_lhs, kernel);
                let existing = ids.get(&items).copied();
                let target = existing.unwrap_or_else(|| intern(&mut states, &mut ids, items));
                if existing.is_none() {
                    worklist.push(target);
                }
                edges.push((symbol, target));
            }
            states[state_id.index()].edges = edges;
        }

        Self {
            flat,
            states,
            start_state,
            infos: grammar
                .productions()
                .map(|production| info.info(production).clone())
                .collect(),
            names: grammar
                .productions()
                .map(|production| grammar.name(production).to_string())
                .collect(),
            start_production: grammar.start(),
        }
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    /// Total number of edges, over all states.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.states.iter().map(|state| state.edges.len()).sum()
    }

    pub(crate) fn states(&self) -> &[State] {
        &self.states
    }

    pub(crate) fn flat(&self) -> &[FlatProduction<V>] {
        &self.flat
    }

    pub(crate) fn follow(&self, production: ProductionId) -> &crate::grammar::KindSet {
        &self.infos[production.index()].follow
    }

    pub(crate) fn start_production(&self) -> ProductionId {
        self.start_production
    }

    fn symbol_label(&self, symbol: Symbol) -> String {
        match symbol {
            Symbol::Terminal(kind) => kind.to_string(),
            Symbol::Production(production) => self.names[production.index()].clone(),
        }
    }

    fn item_label(&self, item: Item) -> String {
        let production = &self.flat[item.production];
        let mut label = format!("{} ::=", self.names[production.production.index()]);
        for (position, &symbol) in production.symbols.iter().enumerate() {
            if position == item.dot {
                label.push_str(" \u{2022}");
            }
            label.push(' ');
            label.push_str(&self.symbol_label(symbol));
        }
        if item.dot == production.symbols.len() {
            label.push_str(" \u{2022}");
        }
        label
    }
}

/// Graphviz dump of states and edges, for tooling only.
impl<V: SemanticValue> fmt::Display for Lr0Model<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph lr0 {{")?;
        writeln!(f, "    node [shape=box];")?;
        for (index, state) in self.states.iter().enumerate() {
            let label: Vec<String> = state
                .items
                .iter()
                .map(|&item| self.item_label(item))
                .collect();
            writeln!(f, "    s{} [label=\"{}\"];", index, label.join("\\n"))?;
        }
        for (index, state) in self.states.iter().enumerate() {
            for &(symbol, target) in &state.edges {
                writeln!(
                    f,
                    "    s{index} -> {target} [label=\"{}\"];",
                    self.symbol_label(symbol)
                )?;
            }
        }
        writeln!(f, "}}")
    }
}

fn intern(states: &mut Vec<State>, ids: &mut HashMap<Vec<Item>, StateId, ahash::RandomState>, items: Vec<Item>) -> StateId {
    let id = StateId(u32::try_from(states.len()).unwrap_or(u32::MAX));
    ids.insert(items.clone(), id);
    states.push(State {
        items,
        edges: Vec::new(),
    });
    id
}

/// Close an item set: a marker before a nonterminal pulls in the initial
/// item of every alternative of that nonterminal, transitively. Returns the
/// canonical (sorted, deduplicated) set.
fn closure<V>(
    flat: &[FlatProduction<V>],
    by_lhs: &HashMap<ProductionId, Vec<usize>, ahash::RandomState>,
    kernel: Vec<Item>,
) -> Vec<Item> {
    let mut seen: HashSet<Item, ahash::RandomState> =
        HashSet::with_hasher(ahash::RandomState::new());
    let mut pending = kernel;
    seen.extend(pending.iter().copied());

    while let Some(item) = pending.pop() {
        if let Some(Symbol::Production(production)) = flat[item.production].symbols.get(item.dot) {
            for &index in by_lhs.get(production).map_or(&[][..], Vec::as_slice) {
                let initial = Item {
                    production: index,
                    dot: 0,
                };
                if seen.insert(initial) {
                    pending.push(initial);
                }
            }
        }
    }

    let mut items: Vec<Item> = seen.into_iter().collect();
    items.sort_unstable();
    items
}
