//! Flattening of grammar ASTs into the positional productions the LR(0)
//! automaton is built from.
//!
//! Every alternative of a rule becomes one [`FlatProduction`]: the symbol
//! sequence the automaton tracks a marker through, plus a [`Plan`], the
//! semantic recipe that rebuilds the alternative's nested combine/guard
//! structure from the values popped at reduce time. Alternatives nested
//! inside sequences expand by cartesian product, each expansion with its own
//! plan.

use crate::diagnostics::{DiagnosticCode, SourceSpan};
use crate::grammar::{CombineFn, Grammar, GrammarNode, GuardCheck, GuardFn, NodeId, ProductionId, SemanticValue};
use crate::lexer::TokenKind;
use smallvec::SmallVec;
use std::sync::Arc;

/// One position in a flattened production body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(TokenKind),
    Production(ProductionId),
}

/// A single alternative of a production, flattened for the automaton.
#[derive(Clone)]
pub struct FlatProduction<V> {
    /// The production this alternative belongs to.
    pub production: ProductionId,
    /// Body symbols in order; the reduce pops one frame per symbol.
    pub symbols: SmallVec<[Symbol; 4]>,
    pub(crate) plan: Plan<V>,
}

/// Semantic recipe mirroring one alternative's node structure.
#[derive(Clone)]
pub(crate) enum Plan<V> {
    /// Consume the next popped frame (a shifted token's value or a reduced
    /// production's value).
    Pop,
    /// Yield an empty node's stored value.
    Value(V),
    Combine {
        left: Box<Plan<V>>,
        right: Box<Plan<V>>,
        combine: CombineFn<V>,
    },
    Guard {
        inner: Box<Plan<V>>,
        check: GuardFn<V>,
    },
}

/// A guard predicate vetoed a reduction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GuardReject {
    pub(crate) code: DiagnosticCode,
    pub(crate) span: SourceSpan,
}

impl<V: SemanticValue> Plan<V> {
    /// Evaluate against the frames popped for this production, in body
    /// order.
    pub(crate) fn apply(
        &self,
        frames: &mut std::slice::Iter<'_, Arc<V>>,
    ) -> Result<V, GuardReject> {
        match self {
            Self::Pop => {
                let frame = frames.next().expect("plan arity matches popped frames");
                Ok(frame.as_ref().clone())
            }
            Self::Value(value) => Ok(value.clone()),
            Self::Combine {
                left,
                right,
                combine,
            } => {
                let left = left.apply(frames)?;
                let right = right.apply(frames)?;
                Ok(combine(left, right))
            }
            Self::Guard { inner, check } => {
                let value = inner.apply(frames)?;
                match check(&value) {
                    GuardCheck::Pass => Ok(value),
                    GuardCheck::Fail { code, span } => Err(GuardReject { code, span }),
                }
            }
        }
    }
}

/// Flatten every production of `grammar`, in declaration order.
pub(crate) fn flatten<V: SemanticValue>(grammar: &Grammar<V>) -> Vec<FlatProduction<V>> {
    let mut flat = Vec::new();
    for production in grammar.productions() {
        for (symbols, plan) in expand(grammar, grammar.rule(production)) {
            flat.push(FlatProduction {
                production,
                symbols,
                plan,
            });
        }
    }
    flat
}

type Expansion<V> = (SmallVec<[Symbol; 4]>, Plan<V>);

fn expand<V: SemanticValue>(grammar: &Grammar<V>, node: NodeId) -> Vec<Expansion<V>> {
    match grammar.node(node) {
        GrammarNode::Terminal { kind } => {
            vec![(SmallVec::from_slice(&[Symbol::Terminal(*kind)]), Plan::Pop)]
        }
        GrammarNode::Reference { production } => vec![(
            SmallVec::from_slice(&[Symbol::Production(*production)]),
            Plan::Pop,
        )],
        GrammarNode::Empty { value } => vec![(SmallVec::new(), Plan::Value(value.clone()))],
        GrammarNode::Guard { inner, check } => expand(grammar, *inner)
            .into_iter()
            .map(|(symbols, plan)| {
                (
                    symbols,
                    Plan::Guard {
                        inner: Box::new(plan),
                        check: check.clone(),
                    },
                )
            })
            .collect(),
        GrammarNode::Sequence {
            left,
            right,
            combine,
        } => {
            let lefts = expand(grammar, *left);
            let rights = expand(grammar, *right);
            let mut expansions = Vec::with_capacity(lefts.len() * rights.len());
            for (left_symbols, left_plan) in &lefts {
                for (right_symbols, right_plan) in &rights {
                    let mut symbols = left_symbols.clone();
                    symbols.extend_from_slice(right_symbols);
                    expansions.push((
                        symbols,
                        Plan::Combine {
                            left: Box::new(left_plan.clone()),
                            right: Box::new(right_plan.clone()),
                            combine: combine.clone(),
                        },
                    ));
                }
            }
            expansions
        }
        GrammarNode::Alternative { branches } => branches
            .iter()
            .flat_map(|&branch| expand(grammar, branch))
            .collect(),
    }
}
