//! # Derivation Analysis
//!
//! Nullability, FIRST, and FOLLOW sets per production, computed by monotone
//! fixed-point iteration over the grammar AST.
//!
//! Termination needs no recursion guard even for self-referential
//! productions: the terminal alphabet is finite, sets only grow, and
//! nullability only flips from `false` to `true`, so a full pass with no
//! change is reached after finitely many passes.

use crate::grammar::node::{GrammarNode, NodeId, ProductionId};
use crate::grammar::{Grammar, SemanticValue};
use crate::lexer::TokenKind;
use hashbrown::HashSet;

/// Set of terminal kinds, as used by FIRST and FOLLOW.
pub type KindSet = HashSet<TokenKind, ahash::RandomState>;

/// Per-production derivation facts.
///
/// `first` never contains an empty marker; emptiness is tracked by
/// `nullable`. `follow` may contain [`TokenKind::END_OF_INPUT`] when the
/// production is followed by an explicit end-of-input marker.
#[derive(Debug, Clone, Default)]
pub struct DerivationInfo {
    pub nullable: bool,
    pub first: KindSet,
    pub follow: KindSet,
}

/// Computes and holds one [`DerivationInfo`] per production.
#[derive(Debug)]
pub struct ProductionInfoManager {
    infos: Vec<DerivationInfo>,
}

/// What can follow the node currently being walked: a set of terminals
/// (FIRST of whatever comes next), plus the FOLLOW of the enclosing
/// production when everything after the node is nullable.
struct FollowContext {
    terminals: KindSet,
    inherits_enclosing: bool,
}

impl ProductionInfoManager {
    /// Run the fixed point for every production of `grammar`.
    #[must_use]
    pub fn new<V: SemanticValue>(grammar: &Grammar<V>) -> Self {
        let mut infos = vec![DerivationInfo::default(); grammar.production_count()];

        loop {
            let mut changed = false;

            for production in grammar.productions() {
                let rule = grammar.rule(production);
                let nullable = node_nullable(grammar, &infos, rule);
                let mut first = KindSet::default();
                node_first(grammar, &infos, rule, &mut first);

                let info = &mut infos[production.index()];
                if nullable && !info.nullable {
                    info.nullable = true;
                    changed = true;
                }
                let before = info.first.len();
                info.first.extend(first);
                changed |= info.first.len() != before;
            }

            let mut additions: Vec<(ProductionId, TokenKind)> = Vec::new();
            for production in grammar.productions() {
                let context = FollowContext {
                    terminals: KindSet::default(),
                    inherits_enclosing: true,
                };
                collect_follow(
                    grammar,
                    &infos,
                    production,
                    grammar.rule(production),
                    &context,
                    &mut additions,
                );
            }
            for (production, kind) in additions {
                changed |= infos[production.index()].follow.insert(kind);
            }

            if !changed {
                break;
            }
        }

        Self { infos }
    }

    /// Derivation facts for `production`.
    #[must_use]
    pub fn info(&self, production: ProductionId) -> &DerivationInfo {
        &self.infos[production.index()]
    }
}

fn node_nullable<V: SemanticValue>(
    grammar: &Grammar<V>,
    infos: &[DerivationInfo],
    node: NodeId,
) -> bool {
    match grammar.node(node) {
        GrammarNode::Terminal { .. } => false,
        GrammarNode::Empty { .. } => true,
        GrammarNode::Sequence { left, right, .. } => {
            node_nullable(grammar, infos, *left) && node_nullable(grammar, infos, *right)
        }
        GrammarNode::Alternative { branches } => branches
            .iter()
            .any(|&branch| node_nullable(grammar, infos, branch)),
        GrammarNode::Guard { inner, .. } => node_nullable(grammar, infos, *inner),
        GrammarNode::Reference { production } => infos[production.index()].nullable,
    }
}

fn node_first<V: SemanticValue>(
    grammar: &Grammar<V>,
    infos: &[DerivationInfo],
    node: NodeId,
    out: &mut KindSet,
) {
    match grammar.node(node) {
        GrammarNode::Terminal { kind } => {
            out.insert(*kind);
        }
        GrammarNode::Empty { .. } => {}
        GrammarNode::Sequence { left, right, .. } => {
            node_first(grammar, infos, *left, out);
            if node_nullable(grammar, infos, *left) {
                node_first(grammar, infos, *right, out);
            }
        }
        GrammarNode::Alternative { branches } => {
            for &branch in branches {
                node_first(grammar, infos, branch, out);
            }
        }
        GrammarNode::Guard { inner, .. } => node_first(grammar, infos, *inner, out),
        GrammarNode::Reference { production } => {
            out.extend(infos[production.index()].first.iter().copied());
        }
    }
}

/// Record the FOLLOW contributions of one node, given what can come after
/// it within the enclosing production.
fn collect_follow<V: SemanticValue>(
    grammar: &Grammar<V>,
    infos: &[DerivationInfo],
    enclosing: ProductionId,
    node: NodeId,
    context: &FollowContext,
    additions: &mut Vec<(ProductionId, TokenKind)>,
) {
    match grammar.node(node) {
        GrammarNode::Terminal { .. } | GrammarNode::Empty { .. } => {}
        GrammarNode::Sequence { left, right, .. } => {
            collect_follow(grammar, infos, enclosing, *right, context, additions);

            // The left half is followed by FIRST(right); if right can
            // vanish, also by whatever follows the sequence itself.
            let mut terminals = KindSet::default();
            node_first(grammar, infos, *right, &mut terminals);
            let right_nullable = node_nullable(grammar, infos, *right);
            if right_nullable {
                terminals.extend(context.terminals.iter().copied());
            }
            let left_context = FollowContext {
                terminals,
                inherits_enclosing: right_nullable && context.inherits_enclosing,
            };
            collect_follow(grammar, infos, enclosing, *left, &left_context, additions);
        }
        GrammarNode::Alternative { branches } => {
            for &branch in branches {
                collect_follow(grammar, infos, enclosing, branch, context, additions);
            }
        }
        GrammarNode::Guard { inner, .. } => {
            collect_follow(grammar, infos, enclosing, *inner, context, additions);
        }
        GrammarNode::Reference { production } => {
            for &kind in &context.terminals {
                additions.push((*production, kind));
            }
            if context.inherits_enclosing {
                for &kind in &infos[enclosing.index()].follow {
                    additions.push((*production, kind));
                }
            }
        }
    }
}
