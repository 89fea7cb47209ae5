//! # Ramify
//!
//! A Generalized-LR parsing engine for possibly-ambiguous context-free
//! grammars defined with composable combinators.
//!
//! ## Overview
//!
//! A grammar is expressed as productions over six combinator shapes
//! (terminal, sequence, alternative, empty, guard, production reference)
//! with semantic actions as first-class closures. Building a parser runs
//! three combinational stages:
//!
//! 1. [`grammar::ProductionInfoManager`] computes nullability/FIRST/FOLLOW by
//!    monotone fixed point.
//! 2. [`automaton::Lr0Model`] constructs the canonical LR(0) item-set
//!    automaton.
//! 3. [`automaton::TransitionTable`] compiles set-valued action cells; conflicts
//!    are retained, never resolved.
//!
//! [`parser::ParserDriver`] then executes the table: on a conflicted cell it
//! forks its parse stack once per action and keeps driving every fork, so an
//! ambiguous input yields every syntactically valid derivation as a distinct
//! accepted result.
//!
//! ## Quick start
//!
//! ```
//! use ramify::automaton::{Lr0Model, TransitionTable};
//! use ramify::grammar::{GrammarBuilder, ProductionInfoManager, SemanticValue};
//! use ramify::lexer::{ForkableScannerBuilder, Lexicon, Pattern, Token};
//! use ramify::parser::ParserDriver;
//! use ramify::diagnostics::SyntaxErrors;
//! use std::sync::Arc;
//!
//! // Semantic values carried on the parse stacks.
//! #[derive(Debug, Clone)]
//! enum Value {
//!     Token(ramify::lexer::TokenKind),
//!     Count(u32),
//! }
//!
//! impl SemanticValue for Value {
//!     fn from_token(token: &Token) -> Self {
//!         Value::Token(token.kind)
//!     }
//! }
//!
//! // Lexicon: `Word ::= a` over input "a".
//! let mut lexicon = Lexicon::new();
//! let a = lexicon.define_token(Pattern::symbol('a'));
//! let info = lexicon.scanner_info();
//!
//! let mut builder = GrammarBuilder::<Value>::new();
//! let word = builder.production("Word");
//! let letter = builder.terminal(a);
//! let unit = builder.empty(Value::Count(0));
//! let rule = builder.seq(letter, unit, |_, _| Value::Count(1));
//! builder.define(word, rule)?;
//! let eos = builder.end_of_input();
//! let start = builder.suffixed_by(word, eos);
//! let grammar = builder.build(start)?;
//!
//! let analysis = ProductionInfoManager::new(&grammar);
//! let model = Lr0Model::build(&grammar, &analysis);
//! let table = Arc::new(TransitionTable::create(&model, &info)?);
//!
//! let mut driver = ParserDriver::new(table, SyntaxErrors::default());
//! let mut scanner = ForkableScannerBuilder::new(info).build("a");
//! driver.input(&scanner.read())?;
//! driver.input(&scanner.read())?;
//!
//! assert_eq!(driver.accepted_count(), 1);
//! assert!(matches!(driver.result(0), Some(Value::Count(1))));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] - combinator AST, grammar builder, derivation analysis
//! - [`automaton`] - flattened productions, LR(0) model, transition table
//! - [`parser`] - the multi-stack GLR driver and trace replay
//! - [`lexer`] - token definitions and the forkable scanner
//! - [`diagnostics`] - spans, codes, and the symptom-to-code policy
//! - [`error`] - build-time and parse-level failures

pub mod automaton;
pub mod diagnostics;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;

pub use automaton::{Action, Lr0Model, StateId, Symbol, TransitionTable};
pub use diagnostics::{
    Diagnostic, DiagnosticCode, Severity, SourceSpan, SyntaxErrors, TextSize,
};
pub use error::{GrammarError, ParseFailure, ReplayError};
pub use grammar::{
    DerivationInfo, Grammar, GrammarBuilder, GrammarNode, GuardCheck, NodeId, ProductionId,
    ProductionInfoManager, SemanticValue,
};
pub use lexer::{
    CharSet, ForkableScanner, ForkableScannerBuilder, Lexicon, Pattern, ScannerInfo, Token,
    TokenKind, Trivia,
};
pub use parser::{replay, AcceptedParse, ParserDriver, RecordedAction};
