//! # Error Types
//!
//! Failure levels, from most to least severe:
//!
//! - [`GrammarError`]: build-time problems. Fatal; table construction aborts.
//! - [`ParseFailure`]: every stack of one parse died before anything was
//!   accepted. Reported by [`crate::parser::ParserDriver::input`].
//! - Per-stack syntax errors are not `Err` values at all: they kill a single
//!   stack and surface as [`crate::diagnostics::Diagnostic`]s while the
//!   remaining stacks keep parsing.

use crate::diagnostics::SourceSpan;
use crate::lexer::TokenKind;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Fatal grammar construction or table compilation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("production `{name}` has no rule assigned")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(ramify::grammar::undefined_rule)))]
    UndefinedRule { name: String },

    #[error("rule for production `{name}` is already assigned")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(ramify::grammar::rule_redefined)))]
    RuleRedefined { name: String },

    #[error("alternative in production `{name}` has no branches")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(ramify::grammar::empty_alternative)))]
    EmptyAlternative { name: String },

    #[error("terminal kind {kind} is not defined by the scanner")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(ramify::grammar::unknown_terminal)))]
    UnknownTerminal { kind: TokenKind },
}

/// Every parse stack died before any derivation was accepted.
///
/// Distinct from a single stack's recoverable syntax error: those are
/// reported as diagnostics while surviving stacks continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[error("parse failed: no surviving parse stack at {span}")]
#[cfg_attr(feature = "diagnostics", diagnostic(code(ramify::parser::parse_failure)))]
pub struct ParseFailure {
    /// Span of the lookahead token that killed the last stack.
    #[cfg_attr(feature = "diagnostics", label("no parse action applies here"))]
    pub span: SourceSpan,
}

/// Replaying a recorded action trace diverged from the table or the tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ReplayError {
    #[error("recorded trace does not match the transition table")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(ramify::parser::trace_mismatch)))]
    TraceMismatch,

    #[error("guard rejected the replayed value")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(ramify::parser::guard_rejected)))]
    GuardRejected {
        code: crate::diagnostics::DiagnosticCode,
        #[cfg_attr(feature = "diagnostics", label("guard failed for these tokens"))]
        span: SourceSpan,
    },
}
