//! # Lexical Layer
//!
//! Token definitions and the forkable scanner.
//!
//! A [`Lexicon`] mints a [`TokenKind`] per defined pattern; a frozen
//! [`ScannerInfo`] snapshot is handed to both the scanner and
//! [`crate::automaton::TransitionTable::create`], which uses it to validate
//! that every grammar terminal is a kind the lexicon actually defines.
//!
//! Scanning is greedy longest-match over the defined patterns; ties go to
//! the earliest definition. Trivia patterns are collected onto the next
//! significant token instead of being emitted on their own.

mod scanner;
mod token;

pub use scanner::{ForkableScanner, ForkableScannerBuilder};
pub use token::{Token, Trivia};

use compact_str::CompactString;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Opaque terminal category minted by [`Lexicon::define_token`].
///
/// The parsing core treats kinds as atoms; the only reserved value is
/// [`TokenKind::END_OF_INPUT`], the pseudo-kind FOLLOW sets and transition
/// tables use for the end of the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TokenKind(u32);

impl TokenKind {
    /// Pseudo-kind for the end of the token stream.
    pub const END_OF_INPUT: Self = Self(u32::MAX);

    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_end_of_input(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end_of_input() {
            write!(f, "$")
        } else {
            write!(f, "t{}", self.0)
        }
    }
}

/// Set of character ranges for [`Pattern::CharClass`].
#[derive(Debug, Clone)]
pub struct CharSet {
    ranges: SmallVec<[(char, char); 4]>,
}

impl CharSet {
    #[must_use]
    pub fn single(ch: char) -> Self {
        Self::range(ch, ch)
    }

    #[must_use]
    pub fn range(from: char, to: char) -> Self {
        Self {
            ranges: smallvec::smallvec![(from, to)],
        }
    }

    #[must_use]
    pub fn digits() -> Self {
        Self::range('0', '9')
    }

    #[must_use]
    pub fn letters() -> Self {
        let mut set = Self::range('a', 'z');
        set.ranges.push(('A', 'Z'));
        set
    }

    #[must_use]
    pub fn whitespace() -> Self {
        let mut set = Self::single(' ');
        set.ranges.push(('\t', '\t'));
        set.ranges.push(('\n', '\n'));
        set.ranges.push(('\r', '\r'));
        set
    }

    /// Extend with another range.
    #[must_use]
    pub fn union(mut self, from: char, to: char) -> Self {
        self.ranges.push((from, to));
        self
    }

    #[must_use]
    pub fn contains(&self, ch: char) -> bool {
        self.ranges.iter().any(|&(from, to)| ch >= from && ch <= to)
    }
}

/// Declarative token pattern, interpreted with greedy longest-match.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Exact text.
    Literal(CompactString),
    /// One character from a set.
    CharClass(CharSet),
    /// Patterns in order.
    Seq(Vec<Pattern>),
    /// Longest-matching branch wins.
    Choice(Vec<Pattern>),
    /// `min..=max` repetitions of a pattern; `None` means unbounded.
    Repeat {
        pattern: Box<Pattern>,
        min: usize,
        max: Option<usize>,
    },
}

impl Pattern {
    #[must_use]
    pub fn literal(text: impl Into<CompactString>) -> Self {
        Self::Literal(text.into())
    }

    /// Single-character literal.
    #[must_use]
    pub fn symbol(ch: char) -> Self {
        let mut text = CompactString::default();
        text.push(ch);
        Self::Literal(text)
    }

    /// One or more repetitions.
    #[must_use]
    pub fn many1(pattern: Self) -> Self {
        Self::Repeat {
            pattern: Box::new(pattern),
            min: 1,
            max: None,
        }
    }

    /// Length in bytes of the longest match at the start of `input`, if any.
    ///
    /// Greedy: `Repeat` consumes as much as it can and does not backtrack,
    /// which is sufficient for token-level patterns.
    fn match_len(&self, input: &str) -> Option<usize> {
        match self {
            Self::Literal(text) => input.starts_with(text.as_str()).then(|| text.len()),
            Self::CharClass(set) => {
                let ch = input.chars().next()?;
                set.contains(ch).then(|| ch.len_utf8())
            }
            Self::Seq(patterns) => {
                let mut consumed = 0;
                for pattern in patterns {
                    consumed += pattern.match_len(&input[consumed..])?;
                }
                Some(consumed)
            }
            Self::Choice(branches) => branches
                .iter()
                .filter_map(|branch| branch.match_len(input))
                .max(),
            Self::Repeat { pattern, min, max } => {
                let mut consumed = 0;
                let mut count = 0;
                loop {
                    if max.is_some_and(|m| count >= m) {
                        break;
                    }
                    match pattern.match_len(&input[consumed..]) {
                        Some(len) if len > 0 => {
                            consumed += len;
                            count += 1;
                        }
                        _ => break,
                    }
                }
                (count >= *min).then_some(consumed)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TokenDef {
    pub(crate) kind: TokenKind,
    pub(crate) pattern: Pattern,
    pub(crate) trivia: bool,
}

/// Mutable registry of token definitions.
#[derive(Debug, Default)]
pub struct Lexicon {
    defs: Vec<TokenDef>,
}

impl Lexicon {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a significant token and mint its kind.
    pub fn define_token(&mut self, pattern: Pattern) -> TokenKind {
        self.define(pattern, false)
    }

    /// Define a trivia token; its lexemes attach to the next significant
    /// token instead of being emitted.
    pub fn define_trivia(&mut self, pattern: Pattern) -> TokenKind {
        self.define(pattern, true)
    }

    fn define(&mut self, pattern: Pattern, trivia: bool) -> TokenKind {
        let kind = TokenKind::new(u32::try_from(self.defs.len()).unwrap_or(u32::MAX - 1));
        self.defs.push(TokenDef {
            kind,
            pattern,
            trivia,
        });
        kind
    }

    /// Freeze the current definitions into an immutable snapshot.
    #[must_use]
    pub fn scanner_info(&self) -> ScannerInfo {
        ScannerInfo {
            defs: self.defs.clone().into(),
        }
    }
}

/// Immutable snapshot of a [`Lexicon`], shared by scanners and table
/// construction.
#[derive(Debug, Clone)]
pub struct ScannerInfo {
    defs: Arc<[TokenDef]>,
}

impl ScannerInfo {
    /// Number of defined kinds (excluding the end-of-input pseudo-kind).
    #[must_use]
    pub fn kind_count(&self) -> usize {
        self.defs.len()
    }

    /// Whether `kind` was minted by the originating lexicon. The
    /// end-of-input pseudo-kind always counts as defined.
    #[must_use]
    pub fn defines(&self, kind: TokenKind) -> bool {
        kind.is_end_of_input() || (kind.index() as usize) < self.defs.len()
    }

    /// Longest match over all definitions at the start of `input`; ties go
    /// to the earliest definition.
    pub(crate) fn best_match(&self, input: &str) -> Option<(&TokenDef, usize)> {
        let mut best: Option<(&TokenDef, usize)> = None;
        for def in self.defs.iter() {
            if let Some(len) = def.pattern.match_len(input) {
                if len > 0 && best.is_none_or(|(_, best_len)| len > best_len) {
                    best = Some((def, len));
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_matches_prefix_only() {
        let pattern = Pattern::literal("let");
        assert_eq!(pattern.match_len("letter"), Some(3));
        assert_eq!(pattern.match_len("le"), None);
    }

    #[test]
    fn repeat_is_greedy_and_respects_min() {
        let digits = Pattern::many1(Pattern::CharClass(CharSet::digits()));
        assert_eq!(digits.match_len("1234x"), Some(4));
        assert_eq!(digits.match_len("x"), None);
    }

    #[test]
    fn choice_prefers_longest_branch() {
        let pattern = Pattern::Choice(vec![Pattern::literal(">"), Pattern::literal(">>")]);
        assert_eq!(pattern.match_len(">>="), Some(2));
    }

    #[test]
    fn lexicon_mints_sequential_kinds() {
        let mut lexicon = Lexicon::new();
        let a = lexicon.define_token(Pattern::symbol('a'));
        let b = lexicon.define_token(Pattern::symbol('b'));
        assert_ne!(a, b);

        let info = lexicon.scanner_info();
        assert!(info.defines(a));
        assert!(info.defines(b));
        assert!(info.defines(TokenKind::END_OF_INPUT));
        assert!(!info.defines(TokenKind::new(2)));
    }

    #[test]
    fn best_match_breaks_ties_toward_earliest_definition() {
        let mut lexicon = Lexicon::new();
        let first = lexicon.define_token(Pattern::symbol('x'));
        let _shadowed = lexicon.define_token(Pattern::symbol('x'));
        let info = lexicon.scanner_info();

        let (def, len) = info.best_match("x").expect("x matches");
        assert_eq!(def.kind, first);
        assert_eq!(len, 1);
    }
}
