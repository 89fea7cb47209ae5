//! Tokens and trivia produced by the forkable scanner.

use crate::diagnostics::{SourceSpan, TextSize};
use crate::lexer::TokenKind;
use compact_str::CompactString;
use smallvec::SmallVec;

/// A significant token: kind, source text, span, and the trivia that
/// immediately preceded it.
///
/// Tokens are the only data the parsing core consumes from the lexical
/// layer. Semantic values are derived from them through
/// [`crate::grammar::SemanticValue::from_token`].
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: CompactString,
    pub span: SourceSpan,
    /// Trivia (whitespace, comments) collected since the previous
    /// significant token, in source order.
    pub leading_trivia: SmallVec<[Trivia; 2]>,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<CompactString>, span: SourceSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            leading_trivia: SmallVec::new(),
        }
    }

    /// The end-of-input pseudo-token, positioned just past the source.
    #[must_use]
    pub fn end_of_input(at: TextSize) -> Self {
        Self::new(TokenKind::END_OF_INPUT, "", SourceSpan::empty(at))
    }

    /// Zero-width token fabricated during insertion recovery.
    #[must_use]
    pub(crate) fn phantom(kind: TokenKind, at: TextSize) -> Self {
        Self::new(kind, "", SourceSpan::empty(at))
    }

    #[must_use]
    pub fn is_end_of_input(&self) -> bool {
        self.kind.is_end_of_input()
    }
}

/// A trivia lexeme attached to the following significant token.
#[derive(Debug, Clone)]
pub struct Trivia {
    pub kind: TokenKind,
    pub text: CompactString,
    pub span: SourceSpan,
}
