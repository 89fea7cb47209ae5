//! The compiled `(state, lookahead) → {actions}` table.
//!
//! Conflict cells are the point: a cell accumulates every action asserted
//! for it, and the GLR driver forks to explore them all. Reduce lookahead is
//! FOLLOW-approximated rather than LR(1)-precise, a deliberate
//! simplification that can admit spurious conflicts, which forking resolves
//! dynamically.

use crate::automaton::lr0::{Lr0Model, StateId};
use crate::automaton::production::{FlatProduction, Symbol};
use crate::error::GrammarError;
use crate::grammar::{ProductionId, SemanticValue};
use crate::lexer::{ScannerInfo, TokenKind};
use hashbrown::HashMap;
use smallvec::SmallVec;

/// One shift-reduce action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    /// Reduce by the flat production with this index.
    Reduce(usize),
    Accept,
}

type ActionCells = HashMap<(StateId, TokenKind), SmallVec<[Action; 1]>, ahash::RandomState>;
type GotoCells = HashMap<(StateId, ProductionId), StateId, ahash::RandomState>;

/// Immutable compiled table; build once, drive many parses.
pub struct TransitionTable<V> {
    actions: ActionCells,
    gotos: GotoCells,
    flat: Vec<FlatProduction<V>>,
    state_count: usize,
    start_state: StateId,
    /// Cells holding more than one action, sorted.
    conflicts: Vec<(StateId, TokenKind)>,
}

impl<V: SemanticValue> TransitionTable<V> {
    /// Compile `model` against the token kinds `scanner` defines.
    ///
    /// # Errors
    ///
    /// [`GrammarError::UnknownTerminal`] if the grammar uses a terminal kind
    /// the scanner does not define.
    pub fn create(model: &Lr0Model<V>, scanner: &ScannerInfo) -> Result<Self, GrammarError> {
        let flat = model.flat();
        for production in flat {
            for &symbol in &production.symbols {
                if let Symbol::Terminal(kind) = symbol {
                    if !scanner.defines(kind) {
                        return Err(GrammarError::UnknownTerminal { kind });
                    }
                }
            }
        }

        let mut actions: ActionCells = HashMap::with_hasher(ahash::RandomState::new());
        let mut gotos: GotoCells = HashMap::with_hasher(ahash::RandomState::new());
        let start_production = model.start_production();

        for (index, state) in model.states().iter().enumerate() {
            let state_id = StateId(index as u32);

            // The start production's end-of-input marker accepts instead of
            // shifting; every other terminal edge is a plain shift.
            let accepts = state.items.iter().any(|item| {
                let production = &flat[item.production];
                production.production == start_production
                    && production.symbols.get(item.dot)
                        == Some(&Symbol::Terminal(TokenKind::END_OF_INPUT))
            });
            if accepts {
                push_action(
                    &mut actions,
                    state_id,
                    TokenKind::END_OF_INPUT,
                    Action::Accept,
                );
            }

            for &(symbol, target) in &state.edges {
                match symbol {
                    Symbol::Terminal(kind) => {
                        if !(accepts && kind.is_end_of_input()) {
                            push_action(&mut actions, state_id, kind, Action::Shift(target));
                        }
                    }
                    Symbol::Production(production) => {
                        gotos.insert((state_id, production), target);
                    }
                }
            }

            // Completed items reduce on every kind in their production's
            // FOLLOW set. The start production never reduces; it accepts.
            for item in &state.items {
                let production = &flat[item.production];
                if item.dot < production.symbols.len()
                    || production.production == start_production
                {
                    continue;
                }
                for &kind in model.follow(production.production) {
                    push_action(&mut actions, state_id, kind, Action::Reduce(item.production));
                }
            }
        }

        let mut conflicts: Vec<(StateId, TokenKind)> = actions
            .iter()
            .filter(|(_, cell)| cell.len() > 1)
            .map(|(&key, _)| key)
            .collect();
        conflicts.sort_unstable();

        Ok(Self {
            actions,
            gotos,
            flat: flat.to_vec(),
            state_count: model.state_count(),
            start_state: model.start_state(),
            conflicts,
        })
    }

    /// Actions for `(state, lookahead)`; empty means the lookahead is a
    /// dead end in that state.
    #[must_use]
    pub fn actions(&self, state: StateId, kind: TokenKind) -> &[Action] {
        self.actions
            .get(&(state, kind))
            .map_or(&[][..], SmallVec::as_slice)
    }

    /// State reached after reducing to `production` on top of `state`.
    #[must_use]
    pub fn goto(&self, state: StateId, production: ProductionId) -> Option<StateId> {
        self.gotos.get(&(state, production)).copied()
    }

    #[must_use]
    pub fn production(&self, index: usize) -> &FlatProduction<V> {
        &self.flat[index]
    }

    /// Number of flattened productions behind the table.
    #[must_use]
    pub fn production_count(&self) -> usize {
        self.flat.len()
    }

    #[must_use]
    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// Cells with more than one action: the grammar's conflicts, retained
    /// for the driver to explore.
    #[must_use]
    pub fn conflicts(&self) -> &[(StateId, TokenKind)] {
        &self.conflicts
    }

    /// Kinds with at least one action in `state`, sorted. Used for
    /// insertion recovery and "expected here" reporting.
    #[must_use]
    pub fn expected_kinds(&self, state: StateId) -> Vec<TokenKind> {
        let mut kinds: Vec<TokenKind> = self
            .actions
            .keys()
            .filter(|(cell_state, _)| *cell_state == state)
            .map(|&(_, kind)| kind)
            .collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }
}

fn push_action(actions: &mut ActionCells, state: StateId, kind: TokenKind, action: Action) {
    let cell = actions.entry((state, kind)).or_default();
    if !cell.contains(&action) {
        cell.push(action);
    }
}
