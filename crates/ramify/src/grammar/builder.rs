//! Grammar construction: the arena builder and the frozen [`Grammar`]
//! snapshot a build consumes.

use crate::error::GrammarError;
use crate::grammar::node::{CombineFn, GrammarNode, GuardFn, NodeId, ProductionId};
use crate::grammar::{GuardCheck, SemanticValue};
use crate::lexer::TokenKind;
use std::sync::Arc;

struct ProductionSlot {
    name: String,
    rule: Option<NodeId>,
}

/// Arena builder for productions and combinator nodes.
///
/// Productions are declared first and wired up afterwards, which is what
/// lets recursive grammars reference a production before its rule exists.
/// Each rule is assigned exactly once.
///
/// # Example
///
/// ```
/// use ramify::grammar::{GrammarBuilder, SemanticValue};
/// use ramify::lexer::{Lexicon, Pattern, Token};
///
/// #[derive(Debug, Clone)]
/// struct Unit;
///
/// impl SemanticValue for Unit {
///     fn from_token(_: &Token) -> Self {
///         Unit
///     }
/// }
///
/// let mut lexicon = Lexicon::new();
/// let x = lexicon.define_token(Pattern::symbol('x'));
///
/// let mut builder = GrammarBuilder::<Unit>::new();
/// let word = builder.production("Word");
/// let rule = builder.terminal(x);
/// builder.define(word, rule).unwrap();
/// let grammar = builder.build(word).unwrap();
/// assert_eq!(grammar.production_count(), 1);
/// ```
pub struct GrammarBuilder<V> {
    nodes: Vec<GrammarNode<V>>,
    productions: Vec<ProductionSlot>,
}

impl<V: SemanticValue> Default for GrammarBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: SemanticValue> GrammarBuilder<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            productions: Vec::new(),
        }
    }

    /// Declare a production. Its rule is assigned later with [`define`].
    ///
    /// [`define`]: Self::define
    pub fn production(&mut self, name: impl Into<String>) -> ProductionId {
        let id = ProductionId(u32::try_from(self.productions.len()).unwrap_or(u32::MAX));
        self.productions.push(ProductionSlot {
            name: name.into(),
            rule: None,
        });
        id
    }

    fn push(&mut self, node: GrammarNode<V>) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }

    /// A single token of the given kind.
    pub fn terminal(&mut self, kind: TokenKind) -> NodeId {
        self.push(GrammarNode::Terminal { kind })
    }

    /// The end-of-input marker, used with [`suffixed_by`] to augment a
    /// start production.
    ///
    /// [`suffixed_by`]: Self::suffixed_by
    pub fn end_of_input(&mut self) -> NodeId {
        self.terminal(TokenKind::END_OF_INPUT)
    }

    /// `left` then `right`; `combine` merges their values during reduction.
    pub fn seq(
        &mut self,
        left: NodeId,
        right: NodeId,
        combine: impl Fn(V, V) -> V + Send + Sync + 'static,
    ) -> NodeId {
        let combine: CombineFn<V> = Arc::new(combine);
        self.push(GrammarNode::Sequence {
            left,
            right,
            combine,
        })
    }

    /// Any one of `branches`.
    pub fn alt(&mut self, branches: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.push(GrammarNode::Alternative {
            branches: branches.into_iter().collect(),
        })
    }

    /// Matches nothing, yielding `value`.
    pub fn empty(&mut self, value: V) -> NodeId {
        self.push(GrammarNode::Empty { value })
    }

    /// Wraps `inner` with a predicate evaluated against the parsed value at
    /// reduce time; a failing [`GuardCheck`] kills the parse stack that
    /// reduced it.
    pub fn guard(
        &mut self,
        inner: NodeId,
        check: impl Fn(&V) -> GuardCheck + Send + Sync + 'static,
    ) -> NodeId {
        let check: GuardFn<V> = Arc::new(check);
        self.push(GrammarNode::Guard { inner, check })
    }

    /// Reference to `production`.
    pub fn reference(&mut self, production: ProductionId) -> NodeId {
        self.push(GrammarNode::Reference { production })
    }

    /// Assign `rule` to `production`. Each rule is assigned exactly once.
    ///
    /// # Errors
    ///
    /// [`GrammarError::RuleRedefined`] if the production already has a rule.
    pub fn define(&mut self, production: ProductionId, rule: NodeId) -> Result<(), GrammarError> {
        let slot = &mut self.productions[production.index()];
        if slot.rule.is_some() {
            return Err(GrammarError::RuleRedefined {
                name: slot.name.clone(),
            });
        }
        slot.rule = Some(rule);
        Ok(())
    }

    /// Augmented production `P' ::= P marker`, keeping `P`'s value.
    ///
    /// Suffixing the intended start production with [`end_of_input`] is how
    /// a grammar becomes drivable: the transition table emits its `Accept`
    /// action from the marker position of this production.
    ///
    /// [`end_of_input`]: Self::end_of_input
    pub fn suffixed_by(&mut self, production: ProductionId, marker: NodeId) -> ProductionId {
        let name = format!("{}'", self.productions[production.index()].name);
        let augmented = self.production(name);
        let body = self.reference(production);
        let rule = self.seq(body, marker, |value, _marker| value);
        self.productions[augmented.index()].rule = Some(rule);
        augmented
    }

    /// Freeze the arena into an immutable [`Grammar`] snapshot rooted at
    /// `start`.
    ///
    /// # Errors
    ///
    /// [`GrammarError::UndefinedRule`] if any production has no rule,
    /// [`GrammarError::EmptyAlternative`] for an alternative with no
    /// branches.
    pub fn build(self, start: ProductionId) -> Result<Grammar<V>, GrammarError> {
        let mut rules = Vec::with_capacity(self.productions.len());
        let mut names = Vec::with_capacity(self.productions.len());
        for slot in &self.productions {
            let rule = slot.rule.ok_or_else(|| GrammarError::UndefinedRule {
                name: slot.name.clone(),
            })?;
            rules.push(rule);
            names.push(slot.name.clone());
        }

        for (production, &rule) in rules.iter().enumerate() {
            validate_node(&self.nodes, rule, &names[production])?;
        }

        Ok(Grammar {
            nodes: self.nodes,
            rules,
            names,
            start,
        })
    }
}

fn validate_node<V>(
    nodes: &[GrammarNode<V>],
    node: NodeId,
    production_name: &str,
) -> Result<(), GrammarError> {
    match &nodes[node.0 as usize] {
        GrammarNode::Terminal { .. } | GrammarNode::Empty { .. } | GrammarNode::Reference { .. } => {
            Ok(())
        }
        GrammarNode::Sequence { left, right, .. } => {
            validate_node(nodes, *left, production_name)?;
            validate_node(nodes, *right, production_name)
        }
        GrammarNode::Alternative { branches } => {
            if branches.is_empty() {
                return Err(GrammarError::EmptyAlternative {
                    name: production_name.to_string(),
                });
            }
            for &branch in branches {
                validate_node(nodes, branch, production_name)?;
            }
            Ok(())
        }
        GrammarNode::Guard { inner, .. } => validate_node(nodes, *inner, production_name),
    }
}

/// Immutable grammar snapshot: the node arena, one rule per production, and
/// the start production.
///
/// A snapshot collectively owns everything a build needs; productions
/// reference each other by [`ProductionId`] only.
#[derive(Debug)]
pub struct Grammar<V> {
    nodes: Vec<GrammarNode<V>>,
    rules: Vec<NodeId>,
    names: Vec<String>,
    start: ProductionId,
}

impl<V> Grammar<V> {
    #[must_use]
    pub fn start(&self) -> ProductionId {
        self.start
    }

    #[must_use]
    pub fn production_count(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn name(&self, production: ProductionId) -> &str {
        &self.names[production.index()]
    }

    #[must_use]
    pub fn rule(&self, production: ProductionId) -> NodeId {
        self.rules[production.index()]
    }

    #[must_use]
    pub fn node(&self, node: NodeId) -> &GrammarNode<V> {
        &self.nodes[node.0 as usize]
    }

    /// All production ids, in declaration order.
    pub fn productions(&self) -> impl Iterator<Item = ProductionId> + '_ {
        (0..self.rules.len()).map(|index| ProductionId(index as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Lexicon, Pattern, Token, TokenKind};

    #[derive(Debug, Clone)]
    struct Unit;

    impl SemanticValue for Unit {
        fn from_token(_: &Token) -> Self {
            Unit
        }
    }

    fn letter() -> TokenKind {
        let mut lexicon = Lexicon::new();
        lexicon.define_token(Pattern::symbol('a'))
    }

    #[test]
    fn rules_are_assigned_exactly_once() {
        let kind = letter();
        let mut builder = GrammarBuilder::<Unit>::new();
        let word = builder.production("Word");
        let first = builder.terminal(kind);
        let second = builder.terminal(kind);

        builder.define(word, first).expect("first assignment");
        let error = builder.define(word, second).expect_err("second assignment");
        assert_eq!(
            error,
            GrammarError::RuleRedefined {
                name: "Word".to_string()
            }
        );
    }

    #[test]
    fn building_requires_every_rule() {
        let kind = letter();
        let mut builder = GrammarBuilder::<Unit>::new();
        let word = builder.production("Word");
        let rule = builder.terminal(kind);
        builder.define(word, rule).expect("Word undefined so far");
        let _orphan = builder.production("Orphan");

        let error = builder.build(word).expect_err("Orphan has no rule");
        assert_eq!(
            error,
            GrammarError::UndefinedRule {
                name: "Orphan".to_string()
            }
        );
    }

    #[test]
    fn alternatives_must_have_branches() {
        let mut builder = GrammarBuilder::<Unit>::new();
        let word = builder.production("Word");
        let rule = builder.alt(Vec::<NodeId>::new());
        builder.define(word, rule).expect("Word undefined so far");

        let error = builder.build(word).expect_err("empty alternative");
        assert_eq!(
            error,
            GrammarError::EmptyAlternative {
                name: "Word".to_string()
            }
        );
    }

    #[test]
    fn suffixed_by_creates_the_augmented_production() {
        let kind = letter();
        let mut builder = GrammarBuilder::<Unit>::new();
        let word = builder.production("Word");
        let rule = builder.terminal(kind);
        builder.define(word, rule).expect("Word undefined so far");

        let marker = builder.end_of_input();
        let start = builder.suffixed_by(word, marker);
        let grammar = builder.build(start).expect("valid grammar");

        assert_eq!(grammar.production_count(), 2);
        assert_eq!(grammar.name(start), "Word'");
        assert_eq!(grammar.start(), start);
    }
}
