//! Tests for nullability/FIRST/FOLLOW derivation analysis.

use ramify::grammar::{Grammar, GrammarBuilder, ProductionInfoManager, SemanticValue};
use ramify::lexer::{Lexicon, Pattern, Token, TokenKind};

#[derive(Debug, Clone)]
struct Obj;

impl SemanticValue for Obj {
    fn from_token(_: &Token) -> Self {
        Obj
    }
}

struct Letters {
    a: TokenKind,
    d: TokenKind,
    c: TokenKind,
}

fn letters() -> Letters {
    let mut lexicon = Lexicon::new();
    Letters {
        a: lexicon.define_token(Pattern::symbol('a')),
        d: lexicon.define_token(Pattern::symbol('d')),
        c: lexicon.define_token(Pattern::symbol('c')),
    }
}

/// `Z ::= d | X Y Z`, `Y ::= ε | c`, `X ::= Y | a`, rooted at `Z`.
fn mutually_recursive_grammar(letters: &Letters) -> Grammar<Obj> {
    let mut builder = GrammarBuilder::<Obj>::new();
    let z = builder.production("Z");
    let y = builder.production("Y");
    let x = builder.production("X");

    let d = builder.terminal(letters.d);
    let x_ref = builder.reference(x);
    let y_ref = builder.reference(y);
    let z_ref = builder.reference(z);
    let xy = builder.seq(x_ref, y_ref, |_, _| Obj);
    let xyz = builder.seq(xy, z_ref, |_, _| Obj);
    let z_rule = builder.alt([d, xyz]);
    builder.define(z, z_rule).expect("Z undefined so far");

    let epsilon = builder.empty(Obj);
    let c = builder.terminal(letters.c);
    let y_rule = builder.alt([epsilon, c]);
    builder.define(y, y_rule).expect("Y undefined so far");

    let y_branch = builder.reference(y);
    let a = builder.terminal(letters.a);
    let x_rule = builder.alt([y_branch, a]);
    builder.define(x, x_rule).expect("X undefined so far");

    builder.build(z).expect("valid grammar")
}

fn production(grammar: &Grammar<Obj>, name: &str) -> ramify::grammar::ProductionId {
    grammar
        .productions()
        .find(|&id| grammar.name(id) == name)
        .expect("production exists")
}

#[test]
fn nullability_first_and_follow_sets() {
    let letters = letters();
    let grammar = mutually_recursive_grammar(&letters);
    let analysis = ProductionInfoManager::new(&grammar);

    let x = analysis.info(production(&grammar, "X"));
    let y = analysis.info(production(&grammar, "Y"));
    let z = analysis.info(production(&grammar, "Z"));

    assert!(x.nullable, "X should be nullable");
    assert!(y.nullable, "Y should be nullable");
    assert!(!z.nullable, "Z should not be nullable");

    assert_eq!(x.first.len(), 2);
    assert!(x.first.contains(&letters.a));
    assert!(x.first.contains(&letters.c));
    assert_eq!(x.follow.len(), 3);
    assert!(x.follow.contains(&letters.a));
    assert!(x.follow.contains(&letters.c));
    assert!(x.follow.contains(&letters.d));

    assert_eq!(y.first.len(), 1);
    assert!(y.first.contains(&letters.c));
    assert_eq!(y.follow.len(), 3);
    assert!(y.follow.contains(&letters.a));
    assert!(y.follow.contains(&letters.c));
    assert!(y.follow.contains(&letters.d));

    assert_eq!(z.first.len(), 3);
    assert!(z.first.contains(&letters.a));
    assert!(z.first.contains(&letters.c));
    assert!(z.first.contains(&letters.d));
    assert!(z.follow.is_empty(), "the root production has no follow");
}

#[test]
fn first_never_contains_the_end_of_input_kind_without_a_marker() {
    let letters = letters();
    let grammar = mutually_recursive_grammar(&letters);
    let analysis = ProductionInfoManager::new(&grammar);

    for id in grammar.productions() {
        let info = analysis.info(id);
        assert!(!info.first.contains(&TokenKind::END_OF_INPUT));
        assert!(!info.follow.contains(&TokenKind::END_OF_INPUT));
    }
}

#[test]
fn follow_gains_end_of_input_from_an_explicit_marker() {
    let letters = letters();
    let mut builder = GrammarBuilder::<Obj>::new();
    let z = builder.production("Z");
    let rule = builder.terminal(letters.d);
    builder.define(z, rule).expect("Z undefined so far");
    let marker = builder.end_of_input();
    let start = builder.suffixed_by(z, marker);
    let grammar = builder.build(start).expect("valid grammar");

    let analysis = ProductionInfoManager::new(&grammar);
    assert!(analysis.info(z).follow.contains(&TokenKind::END_OF_INPUT));
}

#[test]
fn analysis_is_deterministic_across_runs() {
    let letters = letters();
    let grammar = mutually_recursive_grammar(&letters);

    let first = ProductionInfoManager::new(&grammar);
    let second = ProductionInfoManager::new(&grammar);

    for id in grammar.productions() {
        assert_eq!(first.info(id).nullable, second.info(id).nullable);
        assert_eq!(first.info(id).first, second.info(id).first);
        assert_eq!(first.info(id).follow, second.info(id).follow);
    }
}

#[test]
fn analysis_is_independent_of_branch_order() {
    let letters = letters();

    // Same grammar with every alternative's branches swapped.
    let mut builder = GrammarBuilder::<Obj>::new();
    let z = builder.production("Z");
    let y = builder.production("Y");
    let x = builder.production("X");

    let d = builder.terminal(letters.d);
    let x_ref = builder.reference(x);
    let y_ref = builder.reference(y);
    let z_ref = builder.reference(z);
    let xy = builder.seq(x_ref, y_ref, |_, _| Obj);
    let xyz = builder.seq(xy, z_ref, |_, _| Obj);
    let z_rule = builder.alt([xyz, d]);
    builder.define(z, z_rule).expect("Z undefined so far");

    let c = builder.terminal(letters.c);
    let epsilon = builder.empty(Obj);
    let y_rule = builder.alt([c, epsilon]);
    builder.define(y, y_rule).expect("Y undefined so far");

    let a = builder.terminal(letters.a);
    let y_branch = builder.reference(y);
    let x_rule = builder.alt([a, y_branch]);
    builder.define(x, x_rule).expect("X undefined so far");

    let swapped = builder.build(z).expect("valid grammar");
    let original = mutually_recursive_grammar(&letters);

    let swapped_analysis = ProductionInfoManager::new(&swapped);
    let original_analysis = ProductionInfoManager::new(&original);

    for name in ["Z", "Y", "X"] {
        let lhs = original_analysis.info(production(&original, name));
        let rhs = swapped_analysis.info(production(&swapped, name));
        assert_eq!(lhs.nullable, rhs.nullable, "nullable({name})");
        assert_eq!(lhs.first, rhs.first, "first({name})");
        assert_eq!(lhs.follow, rhs.follow, "follow({name})");
    }
}
