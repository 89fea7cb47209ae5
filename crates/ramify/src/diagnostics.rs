//! # Diagnostics
//!
//! Source positions, diagnostic codes, and the symptom-to-code policy the
//! parser driver consults when a stack dies.
//!
//! Diagnostic codes are plain integers assigned by the embedding compiler;
//! this crate never interprets them beyond equality.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte offset into the source text (UTF-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TextSize(u32);

impl TextSize {
    #[must_use]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::ops::Add for TextSize {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for TextSize {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for TextSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open span of source text, attached to tokens and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SourceSpan {
    start: TextSize,
    end: TextSize,
}

impl SourceSpan {
    #[must_use]
    pub const fn new(start: TextSize, end: TextSize) -> Self {
        Self { start, end }
    }

    /// Span starting at `start` with the given byte length.
    #[must_use]
    pub const fn at(start: TextSize, len: u32) -> Self {
        Self::new(start, TextSize(start.0 + len))
    }

    /// Zero-length span, used for end-of-input and phantom tokens.
    #[must_use]
    pub const fn empty(at: TextSize) -> Self {
        Self::new(at, at)
    }

    #[must_use]
    pub const fn start(self) -> TextSize {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> TextSize {
        self.end
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.end.0 - self.start.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Smallest span containing both `self` and `other`.
    ///
    /// Guard checks use this to report the exact extent of the tokens that
    /// triggered a failure.
    #[must_use]
    pub fn cover(self, other: Self) -> Self {
        Self::new(
            TextSize(self.start.0.min(other.start.0)),
            TextSize(self.end.0.max(other.end.0)),
        )
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(feature = "diagnostics")]
impl From<SourceSpan> for miette::SourceSpan {
    fn from(span: SourceSpan) -> Self {
        Self::new(
            miette::SourceOffset::from(span.start().raw() as usize),
            span.len() as usize,
        )
    }
}

/// Numeric diagnostic code assigned by the embedding compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct DiagnosticCode(u32);

impl DiagnosticCode {
    /// Fallback code used when a symptom has no configured code.
    pub const UNCONFIGURED: Self = Self(0);

    #[must_use]
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One reported problem: a code, a severity, a span, and a rendered message.
///
/// The scanner and the parser driver both accumulate these; build-time
/// problems are [`crate::error::GrammarError`]s instead and abort outright.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub span: SourceSpan,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn error(code: DiagnosticCode, span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(code: DiagnosticCode, span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {}", self.code, self.message, self.span)
    }
}

/// Symptom-to-code policy consumed by [`crate::parser::ParserDriver`].
///
/// A configured symptom is recoverable: the driver emits a [`Diagnostic`]
/// with the assigned code and may attempt recovery. An unconfigured symptom
/// is fatal for the affected stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxErrors {
    /// Code for a lookahead token no active state can act on.
    pub token_unexpected: Option<DiagnosticCode>,
}

impl SyntaxErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            token_unexpected: None,
        }
    }
}
