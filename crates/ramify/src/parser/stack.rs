//! Parse stacks: the unit of forking in the GLR driver.

use crate::automaton::StateId;
use crate::diagnostics::TextSize;
use crate::lexer::TokenKind;
use std::sync::Arc;

/// One recorded driver action; the trace of an accepted parse replays to
/// the same semantic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedAction {
    /// Shifted the current lookahead token.
    Shift,
    /// Shifted a phantom token during insertion recovery.
    ShiftMissing { kind: TokenKind, at: TextSize },
    /// Reduced by the flat production with this index.
    Reduce(usize),
}

/// How many consecutive phantom insertions one stack may attempt before it
/// is abandoned.
pub(crate) const RECOVERY_BUDGET: u8 = 4;

/// Reductions one stack may cascade through for a single lookahead before
/// it is abandoned. Only grammars that cycle through empty derivations can
/// reach this.
pub(crate) const CASCADE_LIMIT: u16 = 4096;

/// A single parse stack: parallel state and value sequences plus the action
/// trace that produced them.
///
/// Forking clones the sequences; values are `Arc`-shared so a fork costs
/// one pointer copy per frame and sibling stacks never observe each other's
/// mutations.
#[derive(Debug)]
pub(crate) struct ParseStack<V> {
    pub(crate) states: Vec<StateId>,
    pub(crate) values: Vec<Arc<V>>,
    pub(crate) trace: Vec<RecordedAction>,
    /// Remaining consecutive phantom insertions; reset on a real shift.
    pub(crate) recovery_budget: u8,
    /// Reductions taken against the current lookahead; reset on shift.
    pub(crate) cascade: u16,
}

// Values are `Arc`-shared, so cloning a stack never requires `V: Clone`;
// the derive would wrongly demand it, so the impl is written by hand.
impl<V> Clone for ParseStack<V> {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
            values: self.values.clone(),
            trace: self.trace.clone(),
            recovery_budget: self.recovery_budget,
            cascade: self.cascade,
        }
    }
}

impl<V> ParseStack<V> {
    pub(crate) fn new(start: StateId) -> Self {
        Self {
            states: vec![start],
            values: Vec::new(),
            trace: Vec::new(),
            recovery_budget: RECOVERY_BUDGET,
            cascade: 0,
        }
    }

    pub(crate) fn top_state(&self) -> StateId {
        *self.states.last().expect("stack retains its start state")
    }

    pub(crate) fn push(&mut self, state: StateId, value: Arc<V>) {
        self.states.push(state);
        self.values.push(value);
    }

    /// Pop `count` frames, returning their values in body order
    /// (bottom-most first).
    pub(crate) fn pop_frames(&mut self, count: usize) -> Vec<Arc<V>> {
        self.states.truncate(self.states.len() - count);
        self.values.split_off(self.values.len() - count)
    }

    pub(crate) fn fork(&self) -> Self {
        self.clone()
    }

    /// Key for duplicate-stack merging: the full state sequence plus the
    /// identity of every value frame. Stacks agreeing on both are
    /// indistinguishable and one can be dropped.
    pub(crate) fn merge_key(&self) -> (Vec<StateId>, Vec<usize>) {
        (
            self.states.clone(),
            self.values
                .iter()
                .map(|value| Arc::as_ptr(value) as usize)
                .collect(),
        )
    }
}
