//! Forkable scanner: independent, divergence-capable cursors over one source.
//!
//! All cursors of one source share an append-only token cache, so forked
//! parse branches never re-lex text another branch already covered. A fork
//! is a cheap copy: the cache is behind an `Arc`, the cursor is an index.

use crate::diagnostics::{Diagnostic, DiagnosticCode, SourceSpan, TextSize};
use crate::lexer::{ScannerInfo, Token, Trivia};
use smallvec::SmallVec;
use std::sync::{Arc, Mutex};

/// Default code for an unexpected character, overridable on the builder.
const UNEXPECTED_CHAR_CODE: DiagnosticCode = DiagnosticCode::new(101);

/// Configures and creates [`ForkableScanner`]s for one lexicon snapshot.
#[derive(Debug, Clone)]
pub struct ForkableScannerBuilder {
    info: ScannerInfo,
    unexpected_char: DiagnosticCode,
}

impl ForkableScannerBuilder {
    #[must_use]
    pub fn new(info: ScannerInfo) -> Self {
        Self {
            info,
            unexpected_char: UNEXPECTED_CHAR_CODE,
        }
    }

    /// Diagnostic code reported for characters no pattern matches.
    #[must_use]
    pub fn unexpected_char_code(mut self, code: DiagnosticCode) -> Self {
        self.unexpected_char = code;
        self
    }

    /// Create a scanner positioned at the start of `source`.
    #[must_use]
    pub fn build(&self, source: &str) -> ForkableScanner {
        ForkableScanner {
            cache: Arc::new(ScanCache {
                source: source.into(),
                info: self.info.clone(),
                unexpected_char: self.unexpected_char,
                state: Mutex::new(ScanState::default()),
            }),
            pos: 0,
        }
    }
}

/// A cursor over the shared token cache.
#[derive(Debug, Clone)]
pub struct ForkableScanner {
    cache: Arc<ScanCache>,
    pos: usize,
}

impl ForkableScanner {
    /// Read the token at the cursor and advance. Past the end of input this
    /// keeps returning the end-of-input pseudo-token.
    pub fn read(&mut self) -> Token {
        let token = self.cache.token_at(self.pos);
        self.pos += 1;
        token
    }

    /// An independent cursor at the same position. Advancing either cursor
    /// leaves the other untouched; the token cache stays shared.
    #[must_use]
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Index of the next token this cursor will read.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Scan diagnostics accumulated so far, across all cursors of this
    /// source.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.cache
            .state
            .lock()
            .map(|state| state.diagnostics.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug)]
struct ScanCache {
    source: Arc<str>,
    info: ScannerInfo,
    unexpected_char: DiagnosticCode,
    state: Mutex<ScanState>,
}

#[derive(Debug, Default)]
struct ScanState {
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    /// Byte offset scanning resumes from.
    cursor: usize,
    done: bool,
}

impl ScanCache {
    fn token_at(&self, pos: usize) -> Token {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            // A panic while holding the lock can only leave fully-scanned
            // tokens behind; keep serving them.
            Err(poisoned) => poisoned.into_inner(),
        };
        while state.tokens.len() <= pos && !state.done {
            self.scan_next(&mut state);
        }
        state
            .tokens
            .get(pos)
            .or_else(|| state.tokens.last())
            .cloned()
            .unwrap_or_else(|| Token::end_of_input(TextSize::zero()))
    }

    /// Scan the next significant token (plus its leading trivia) into the
    /// cache. Sets `done` after appending the end-of-input token.
    fn scan_next(&self, state: &mut ScanState) {
        let mut trivia: SmallVec<[Trivia; 2]> = SmallVec::new();

        loop {
            let rest = &self.source[state.cursor..];
            if rest.is_empty() {
                let mut eof = Token::end_of_input(TextSize::new(state.cursor as u32));
                eof.leading_trivia = trivia;
                state.tokens.push(eof);
                state.done = true;
                return;
            }

            match self.info.best_match(rest) {
                Some((def, len)) => {
                    let span = SourceSpan::at(TextSize::new(state.cursor as u32), len as u32);
                    let text = &rest[..len];
                    state.cursor += len;
                    if def.trivia {
                        trivia.push(Trivia {
                            kind: def.kind,
                            text: text.into(),
                            span,
                        });
                    } else {
                        let mut token = Token::new(def.kind, text, span);
                        token.leading_trivia = trivia;
                        state.tokens.push(token);
                        return;
                    }
                }
                None => {
                    // Skip one character and keep scanning.
                    let ch_len = rest.chars().next().map_or(1, char::len_utf8);
                    let span = SourceSpan::at(TextSize::new(state.cursor as u32), ch_len as u32);
                    state.diagnostics.push(Diagnostic::error(
                        self.unexpected_char,
                        span,
                        format!("unexpected character `{}`", &rest[..ch_len]),
                    ));
                    state.cursor += ch_len;
                }
            }
        }
    }
}
