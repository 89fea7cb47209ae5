//! # Grammar Module
//!
//! Combinator-based grammar definition and derivation analysis.
//!
//! A grammar is built from six node shapes (terminal, sequence,
//! alternative, empty, guard, production reference) composed through
//! [`GrammarBuilder`]. Productions live in an arena and reference each other
//! by index, so left- and right-recursive grammars are ordinary data.
//!
//! Semantic actions are first-class closures: every sequence carries a
//! combine function, every empty node a value, every guard a predicate.
//! [`ProductionInfoManager`] computes the nullability/FIRST/FOLLOW facts the
//! automaton layer consumes.

mod analysis;
mod builder;
mod node;

pub use analysis::{DerivationInfo, KindSet, ProductionInfoManager};
pub use builder::{Grammar, GrammarBuilder};
pub use node::{CombineFn, GrammarNode, GuardCheck, GuardFn, NodeId, ProductionId};

use crate::lexer::Token;

/// Semantic values carried on parse stacks and returned from accepted
/// derivations.
///
/// `from_token` produces the value pushed when a terminal is shifted;
/// combine functions and empty-node values supply everything else.
pub trait SemanticValue: Clone + std::fmt::Debug + Send + Sync + 'static {
    fn from_token(token: &Token) -> Self;
}
