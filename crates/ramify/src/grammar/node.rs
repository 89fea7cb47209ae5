//! The combinator AST.
//!
//! Nodes live in the arena owned by [`crate::grammar::GrammarBuilder`] and
//! reference each other (and productions) by index, so recursive grammars
//! form plain index cycles with no ownership cycles.

use crate::diagnostics::{DiagnosticCode, SourceSpan};
use crate::lexer::TokenKind;
use std::fmt;
use std::sync::Arc;

/// Index of a node in the grammar arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

/// Index of a production in the grammar arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductionId(pub(crate) u32);

impl ProductionId {
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Combines the semantic values of a sequence's two halves.
pub type CombineFn<V> = Arc<dyn Fn(V, V) -> V + Send + Sync>;

/// Inspects a parsed value and passes or fails with a code and span.
pub type GuardFn<V> = Arc<dyn Fn(&V) -> GuardCheck + Send + Sync>;

/// Outcome of a guard predicate.
///
/// A failing check carries the diagnostic code and the exact span of the
/// tokens that triggered it, both computed from the parsed value at reduce
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardCheck {
    Pass,
    Fail {
        code: DiagnosticCode,
        span: SourceSpan,
    },
}

impl GuardCheck {
    /// Pass when `condition` holds, otherwise fail with `code` at `span`.
    #[must_use]
    pub const fn require(condition: bool, code: DiagnosticCode, span: SourceSpan) -> Self {
        if condition {
            Self::Pass
        } else {
            Self::Fail { code, span }
        }
    }
}

/// One immutable grammar AST node.
pub enum GrammarNode<V> {
    /// Matches a single token of the given kind; its semantic value is the
    /// shifted token's value.
    Terminal { kind: TokenKind },
    /// `left` then `right`, combined into one value.
    Sequence {
        left: NodeId,
        right: NodeId,
        combine: CombineFn<V>,
    },
    /// Any one of the branches.
    Alternative { branches: Vec<NodeId> },
    /// Matches nothing and yields a fixed value.
    Empty { value: V },
    /// Matches `inner`, then lets `check` veto the parsed value.
    Guard { inner: NodeId, check: GuardFn<V> },
    /// Reference to another production by index.
    Reference { production: ProductionId },
}

impl<V: fmt::Debug> fmt::Debug for GrammarNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal { kind } => f.debug_struct("Terminal").field("kind", kind).finish(),
            Self::Sequence { left, right, .. } => f
                .debug_struct("Sequence")
                .field("left", left)
                .field("right", right)
                .finish_non_exhaustive(),
            Self::Alternative { branches } => f
                .debug_struct("Alternative")
                .field("branches", branches)
                .finish(),
            Self::Empty { value } => f.debug_struct("Empty").field("value", value).finish(),
            Self::Guard { inner, .. } => f
                .debug_struct("Guard")
                .field("inner", inner)
                .finish_non_exhaustive(),
            Self::Reference { production } => f
                .debug_struct("Reference")
                .field("production", production)
                .finish(),
        }
    }
}
