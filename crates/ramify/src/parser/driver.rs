//! The GLR parser driver.
//!
//! The driver executes a compiled [`TransitionTable`] against a token
//! stream fed in by the caller, one token per [`ParserDriver::input`] call.
//! It keeps a set of active stacks and advances every one of them to a
//! stable point (shifted, accepted, or dead) before returning; reduces
//! cascade against the same lookahead and never span `input` calls. When a
//! cell offers more than one action the stack forks, one clone per action,
//! and all clones keep parsing. Every accepted derivation is retained, in
//! discovery order.

use crate::automaton::{Action, GuardReject, StateId, TransitionTable};
use crate::diagnostics::{Diagnostic, DiagnosticCode, SyntaxErrors};
use crate::error::{ParseFailure, ReplayError};
use crate::grammar::SemanticValue;
use crate::lexer::Token;
use crate::parser::stack::{ParseStack, RecordedAction, CASCADE_LIMIT, RECOVERY_BUDGET};
use hashbrown::HashSet;
use smallvec::SmallVec;
use std::sync::Arc;

/// One accepted derivation: its semantic value and the action trace that
/// produced it. Replaying the trace against the same table and tokens
/// reconstructs the same value.
#[derive(Debug, Clone)]
pub struct AcceptedParse<V> {
    value: Arc<V>,
    actions: Vec<RecordedAction>,
}

impl<V> AcceptedParse<V> {
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[must_use]
    pub fn actions(&self) -> &[RecordedAction] {
        &self.actions
    }
}

/// Multi-stack shift-reduce driver over an immutable transition table.
///
/// The table is shared: build it once, construct one driver per parse.
pub struct ParserDriver<V> {
    table: Arc<TransitionTable<V>>,
    policy: SyntaxErrors,
    stacks: Vec<ParseStack<V>>,
    accepted: Vec<AcceptedParse<V>>,
    diagnostics: Vec<Diagnostic>,
}

impl<V: SemanticValue> ParserDriver<V> {
    /// A driver with a single stack at the table's start state.
    #[must_use]
    pub fn new(table: Arc<TransitionTable<V>>, policy: SyntaxErrors) -> Self {
        let start = table.start_state();
        Self {
            table,
            policy,
            stacks: vec![ParseStack::new(start)],
            accepted: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Feed one lookahead token to every active stack.
    ///
    /// # Errors
    ///
    /// [`ParseFailure`] when the last stack dies in this call before any
    /// derivation was accepted. Individual stack deaths with survivors (or
    /// prior accepts) are diagnostics, not errors.
    pub fn input(&mut self, token: &Token) -> Result<(), ParseFailure> {
        if self.stacks.is_empty() {
            // Parse already settled; extra tokens are ignored.
            return Ok(());
        }

        let table = Arc::clone(&self.table);
        let mut pending = std::mem::take(&mut self.stacks);
        let mut settled: Vec<ParseStack<V>> = Vec::new();

        while let Some(stack) = pending.pop() {
            let cell: SmallVec<[Action; 2]> = table
                .actions(stack.top_state(), token.kind)
                .iter()
                .copied()
                .collect();
            match cell.as_slice() {
                [] => self.dead_end(&table, stack, token, &mut pending),
                [action] => self.apply(&table, stack, *action, token, &mut pending, &mut settled),
                actions => {
                    // Conflict: fork once per action, then keep driving
                    // every clone against this same lookahead.
                    for &action in &actions[1..] {
                        self.apply(&table, stack.fork(), action, token, &mut pending, &mut settled);
                    }
                    self.apply(&table, stack, actions[0], token, &mut pending, &mut settled);
                }
            }
        }

        self.stacks = merge_duplicates(settled);

        if self.stacks.is_empty() && self.accepted.is_empty() {
            return Err(ParseFailure { span: token.span });
        }
        Ok(())
    }

    /// Number of live stacks. Zero after the parse has settled.
    #[must_use]
    pub fn stack_count(&self) -> usize {
        self.stacks.len()
    }

    /// Number of accepted derivations so far.
    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    /// Semantic value of the `index`-th accepted derivation, in discovery
    /// order.
    #[must_use]
    pub fn result(&self, index: usize) -> Option<&V> {
        self.accepted.get(index).map(|parse| parse.value.as_ref())
    }

    /// The `index`-th accepted derivation with its recorded action trace.
    #[must_use]
    pub fn accepted(&self, index: usize) -> Option<&AcceptedParse<V>> {
        self.accepted.get(index)
    }

    /// Values of all accepted derivations, in discovery order.
    pub fn results(&self) -> impl Iterator<Item = &V> {
        self.accepted.iter().map(|parse| parse.value.as_ref())
    }

    /// Diagnostics emitted by dead or guarded-out stacks.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn apply(
        &mut self,
        table: &TransitionTable<V>,
        mut stack: ParseStack<V>,
        action: Action,
        token: &Token,
        pending: &mut Vec<ParseStack<V>>,
        settled: &mut Vec<ParseStack<V>>,
    ) {
        match action {
            Action::Shift(target) => {
                stack.push(target, Arc::new(V::from_token(token)));
                stack.trace.push(RecordedAction::Shift);
                stack.recovery_budget = RECOVERY_BUDGET;
                stack.cascade = 0;
                settled.push(stack);
            }
            Action::Reduce(index) => {
                stack.cascade += 1;
                if stack.cascade > CASCADE_LIMIT {
                    self.diagnostics.push(Diagnostic::error(
                        DiagnosticCode::UNCONFIGURED,
                        token.span,
                        "reduction limit exceeded; grammar cycles through empty derivations",
                    ));
                    return;
                }
                let production = table.production(index);
                let frames = stack.pop_frames(production.symbols.len());
                match production.plan.apply(&mut frames.iter()) {
                    Ok(value) => {
                        if let Some(target) = table.goto(stack.top_state(), production.production) {
                            stack.push(target, Arc::new(value));
                            stack.trace.push(RecordedAction::Reduce(index));
                            // Reduces cascade: same lookahead, new top state.
                            pending.push(stack);
                        } else {
                            debug_assert!(false, "automaton emitted a reduce with no goto");
                        }
                    }
                    Err(GuardReject { code, span }) => {
                        self.diagnostics.push(Diagnostic::error(
                            code,
                            span,
                            "guard predicate rejected this derivation",
                        ));
                    }
                }
            }
            Action::Accept => {
                if let Some(value) = stack.values.last() {
                    self.accepted.push(AcceptedParse {
                        value: Arc::clone(value),
                        actions: stack.trace,
                    });
                }
            }
        }
    }

    /// No action for this lookahead: the stack dies. With the
    /// `token_unexpected` symptom configured, also fork one recovery stack
    /// per terminal the state could act on, shifting a phantom token.
    fn dead_end(
        &mut self,
        table: &TransitionTable<V>,
        stack: ParseStack<V>,
        token: &Token,
        pending: &mut Vec<ParseStack<V>>,
    ) {
        let description = if token.is_end_of_input() {
            "unexpected end of input".to_string()
        } else {
            format!("unexpected token `{}`", token.text)
        };

        let Some(code) = self.policy.token_unexpected else {
            self.diagnostics.push(Diagnostic::error(
                DiagnosticCode::UNCONFIGURED,
                token.span,
                format!("{description}; no recovery configured"),
            ));
            return;
        };

        self.diagnostics
            .push(Diagnostic::error(code, token.span, description));

        if stack.recovery_budget == 0 {
            return;
        }

        let at = token.span.start();
        for kind in table.expected_kinds(stack.top_state()) {
            // Fabricating an end-of-input would accept a truncated parse.
            if kind.is_end_of_input() {
                continue;
            }
            let Some(target) = find_shift(table.actions(stack.top_state(), kind)) else {
                continue;
            };
            let mut fork = stack.fork();
            let phantom = Token::phantom(kind, at);
            fork.push(target, Arc::new(V::from_token(&phantom)));
            fork.trace.push(RecordedAction::ShiftMissing { kind, at });
            fork.recovery_budget -= 1;
            // The real lookahead is re-evaluated from the recovered state.
            pending.push(fork);
        }
    }
}

/// Drop stacks that are exact duplicates of an earlier one (same state
/// sequence, identical value frames). Pure optimization: such stacks would
/// accept the exact same derivations.
fn merge_duplicates<V>(settled: Vec<ParseStack<V>>) -> Vec<ParseStack<V>> {
    let mut seen: HashSet<(Vec<StateId>, Vec<usize>), ahash::RandomState> =
        HashSet::with_hasher(ahash::RandomState::new());
    let mut stacks = Vec::with_capacity(settled.len());
    for stack in settled {
        if seen.insert(stack.merge_key()) {
            stacks.push(stack);
        }
    }
    stacks
}

fn find_shift(actions: &[Action]) -> Option<StateId> {
    actions.iter().find_map(|action| match action {
        Action::Shift(target) => Some(*target),
        _ => None,
    })
}

/// Re-execute a recorded action trace against the same table and token
/// sequence, reconstructing the accepted semantic value deterministically.
///
/// # Errors
///
/// [`ReplayError::TraceMismatch`] if the trace diverges from the table or
/// runs out of tokens; [`ReplayError::GuardRejected`] if a guard vetoes a
/// replayed reduction.
pub fn replay<V: SemanticValue>(
    table: &TransitionTable<V>,
    actions: &[RecordedAction],
    tokens: &[Token],
) -> Result<V, ReplayError> {
    let mut states = vec![table.start_state()];
    let mut values: Vec<Arc<V>> = Vec::new();
    let mut tokens = tokens.iter();

    for action in actions {
        let state = *states.last().ok_or(ReplayError::TraceMismatch)?;
        match *action {
            RecordedAction::Shift => {
                let token = tokens.next().ok_or(ReplayError::TraceMismatch)?;
                let target =
                    find_shift(table.actions(state, token.kind)).ok_or(ReplayError::TraceMismatch)?;
                states.push(target);
                values.push(Arc::new(V::from_token(token)));
            }
            RecordedAction::ShiftMissing { kind, at } => {
                let target =
                    find_shift(table.actions(state, kind)).ok_or(ReplayError::TraceMismatch)?;
                let phantom = Token::phantom(kind, at);
                states.push(target);
                values.push(Arc::new(V::from_token(&phantom)));
            }
            RecordedAction::Reduce(index) => {
                if index >= table.production_count() {
                    return Err(ReplayError::TraceMismatch);
                }
                let production = table.production(index);
                let count = production.symbols.len();
                if values.len() < count || states.len() <= count {
                    return Err(ReplayError::TraceMismatch);
                }
                let frames = values.split_off(values.len() - count);
                states.truncate(states.len() - count);
                let value = production
                    .plan
                    .apply(&mut frames.iter())
                    .map_err(|GuardReject { code, span }| ReplayError::GuardRejected {
                        code,
                        span,
                    })?;
                let top = *states.last().ok_or(ReplayError::TraceMismatch)?;
                let target = table
                    .goto(top, production.production)
                    .ok_or(ReplayError::TraceMismatch)?;
                states.push(target);
                values.push(Arc::new(value));
            }
        }
    }

    values
        .last()
        .map(|value| value.as_ref().clone())
        .ok_or(ReplayError::TraceMismatch)
}
