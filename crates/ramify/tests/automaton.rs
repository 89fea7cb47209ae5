//! Tests for LR(0) automaton construction and transition-table compilation.

use ramify::automaton::{Lr0Model, TransitionTable};
use ramify::error::GrammarError;
use ramify::grammar::{Grammar, GrammarBuilder, ProductionInfoManager, SemanticValue};
use ramify::lexer::{Lexicon, Pattern, ScannerInfo, Token, TokenKind};

#[derive(Debug, Clone)]
struct Obj;

impl SemanticValue for Obj {
    fn from_token(_: &Token) -> Self {
        Obj
    }
}

struct ExprFixture {
    grammar: Grammar<Obj>,
    scanner: ScannerInfo,
    kinds: Vec<TokenKind>,
}

/// Ambiguous `E ::= E + E | E * E | T`, `T ::= x`, augmented with
/// end-of-input.
fn ambiguous_expr() -> ExprFixture {
    let mut lexicon = Lexicon::new();
    let x = lexicon.define_token(Pattern::symbol('x'));
    let plus = lexicon.define_token(Pattern::symbol('+'));
    let star = lexicon.define_token(Pattern::symbol('*'));
    let scanner = lexicon.scanner_info();

    let mut builder = GrammarBuilder::<Obj>::new();
    let e = builder.production("E");
    let t = builder.production("T");

    let add = binary(&mut builder, e, plus);
    let mul = binary(&mut builder, e, star);
    let t_ref = builder.reference(t);
    let e_rule = builder.alt([add, mul, t_ref]);
    builder.define(e, e_rule).expect("E undefined so far");

    let t_rule = builder.terminal(x);
    builder.define(t, t_rule).expect("T undefined so far");

    let marker = builder.end_of_input();
    let start = builder.suffixed_by(e, marker);
    let grammar = builder.build(start).expect("valid grammar");

    ExprFixture {
        grammar,
        scanner,
        kinds: vec![x, plus, star, TokenKind::END_OF_INPUT],
    }
}

fn binary(
    builder: &mut GrammarBuilder<Obj>,
    operand: ramify::grammar::ProductionId,
    operator: TokenKind,
) -> ramify::grammar::NodeId {
    let left = builder.reference(operand);
    let op = builder.terminal(operator);
    let right = builder.reference(operand);
    let partial = builder.seq(left, op, |_, _| Obj);
    builder.seq(partial, right, |_, _| Obj)
}

/// Unambiguous right-recursive `E ::= T + E | T`, `T ::= x`.
fn right_recursive_expr() -> ExprFixture {
    let mut lexicon = Lexicon::new();
    let x = lexicon.define_token(Pattern::symbol('x'));
    let plus = lexicon.define_token(Pattern::symbol('+'));
    let scanner = lexicon.scanner_info();

    let mut builder = GrammarBuilder::<Obj>::new();
    let e = builder.production("E");
    let t = builder.production("T");

    let t_ref = builder.reference(t);
    let op = builder.terminal(plus);
    let e_ref = builder.reference(e);
    let partial = builder.seq(t_ref, op, |_, _| Obj);
    let chain = builder.seq(partial, e_ref, |_, _| Obj);
    let t_alone = builder.reference(t);
    let e_rule = builder.alt([chain, t_alone]);
    builder.define(e, e_rule).expect("E undefined so far");

    let t_rule = builder.terminal(x);
    builder.define(t, t_rule).expect("T undefined so far");

    let marker = builder.end_of_input();
    let start = builder.suffixed_by(e, marker);
    let grammar = builder.build(start).expect("valid grammar");

    ExprFixture {
        grammar,
        scanner,
        kinds: vec![x, plus, TokenKind::END_OF_INPUT],
    }
}

#[test]
fn canonical_states_are_deduplicated() {
    let fixture = ambiguous_expr();
    let analysis = ProductionInfoManager::new(&fixture.grammar);
    let model = Lr0Model::build(&fixture.grammar, &analysis);

    // Both binary alternatives route through the same operand states; a
    // construction without canonical reuse would double these.
    assert!(model.state_count() < 16, "state explosion: {}", model.state_count());
    assert!(model.edge_count() > model.state_count() - 1);
}

#[test]
fn rebuilding_the_model_is_deterministic() {
    let fixture = ambiguous_expr();
    let analysis = ProductionInfoManager::new(&fixture.grammar);

    let first = Lr0Model::build(&fixture.grammar, &analysis);
    let second = Lr0Model::build(&fixture.grammar, &analysis);

    assert_eq!(first.state_count(), second.state_count());
    assert_eq!(first.edge_count(), second.edge_count());
    // The Graphviz dump serializes states, items, and edges in build
    // order, so equal dumps mean equal automata.
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn graphviz_dump_lists_every_state() {
    let fixture = right_recursive_expr();
    let analysis = ProductionInfoManager::new(&fixture.grammar);
    let model = Lr0Model::build(&fixture.grammar, &analysis);

    let dot = model.to_string();
    assert!(dot.starts_with("digraph lr0 {"));
    for state in 0..model.state_count() {
        assert!(dot.contains(&format!("s{state} [label=")), "missing state s{state}");
    }
    assert!(dot.contains("E ::="));
}

#[test]
fn table_creation_is_idempotent() {
    let fixture = ambiguous_expr();
    let analysis = ProductionInfoManager::new(&fixture.grammar);
    let model = Lr0Model::build(&fixture.grammar, &analysis);

    let first = TransitionTable::create(&model, &fixture.scanner).expect("table");
    let second = TransitionTable::create(&model, &fixture.scanner).expect("table");

    assert_eq!(first.state_count(), second.state_count());
    assert_eq!(first.conflicts(), second.conflicts());
    for state in 0..first.state_count() {
        let state = ramify::automaton::StateId::try_from(state).expect("state id fits");
        for &kind in &fixture.kinds {
            assert_eq!(first.actions(state, kind), second.actions(state, kind));
        }
    }
}

#[test]
fn ambiguous_grammar_keeps_its_conflict_cells() {
    let fixture = ambiguous_expr();
    let analysis = ProductionInfoManager::new(&fixture.grammar);
    let model = Lr0Model::build(&fixture.grammar, &analysis);
    let table = TransitionTable::create(&model, &fixture.scanner).expect("table");

    assert!(
        !table.conflicts().is_empty(),
        "E ::= E+E | E*E must produce shift/reduce conflicts"
    );
    for &(state, kind) in table.conflicts() {
        assert!(
            table.actions(state, kind).len() > 1,
            "conflict cell must retain every action"
        );
    }
}

#[test]
fn unambiguous_grammar_has_no_conflicts() {
    let fixture = right_recursive_expr();
    let analysis = ProductionInfoManager::new(&fixture.grammar);
    let model = Lr0Model::build(&fixture.grammar, &analysis);
    let table = TransitionTable::create(&model, &fixture.scanner).expect("table");

    assert!(table.conflicts().is_empty());
}

#[test]
fn foreign_terminals_are_rejected() {
    // A scanner snapshot from a different lexicon that defines fewer kinds
    // than the grammar references.
    let mut other = Lexicon::new();
    let _only = other.define_token(Pattern::symbol('q'));
    let foreign_scanner = other.scanner_info();

    let fixture = ambiguous_expr();
    let analysis = ProductionInfoManager::new(&fixture.grammar);
    let model = Lr0Model::build(&fixture.grammar, &analysis);

    let result = TransitionTable::create(&model, &foreign_scanner);
    assert!(matches!(result, Err(GrammarError::UnknownTerminal { .. })));
}
