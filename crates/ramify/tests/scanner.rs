//! Tests for the forkable scanner: divergent cursors, the shared token
//! cache, trivia collection, and scan diagnostics.

use ramify::diagnostics::{DiagnosticCode, TextSize};
use ramify::lexer::{CharSet, ForkableScannerBuilder, Lexicon, Pattern, TokenKind};

struct Fixture {
    builder: ForkableScannerBuilder,
    word: TokenKind,
    plus: TokenKind,
}

fn fixture() -> Fixture {
    let mut lexicon = Lexicon::new();
    let word = lexicon.define_token(Pattern::many1(Pattern::CharClass(CharSet::letters())));
    let plus = lexicon.define_token(Pattern::symbol('+'));
    lexicon.define_trivia(Pattern::many1(Pattern::CharClass(CharSet::whitespace())));
    Fixture {
        builder: ForkableScannerBuilder::new(lexicon.scanner_info()),
        word,
        plus,
    }
}

#[test]
fn tokens_carry_kind_text_and_span() {
    let fixture = fixture();
    let mut scanner = fixture.builder.build("ab+cd");

    let first = scanner.read();
    assert_eq!(first.kind, fixture.word);
    assert_eq!(first.text, "ab");
    assert_eq!(first.span.start(), TextSize::new(0));
    assert_eq!(first.span.end(), TextSize::new(2));

    let second = scanner.read();
    assert_eq!(second.kind, fixture.plus);
    assert_eq!(second.text, "+");

    let third = scanner.read();
    assert_eq!(third.kind, fixture.word);
    assert_eq!(third.text, "cd");
    assert_eq!(third.span.end(), TextSize::new(5));
}

#[test]
fn end_of_input_repeats_forever() {
    let fixture = fixture();
    let mut scanner = fixture.builder.build("ab");

    assert_eq!(scanner.read().kind, fixture.word);
    for _ in 0..3 {
        let token = scanner.read();
        assert!(token.is_end_of_input());
        assert_eq!(token.span.start(), TextSize::new(2));
        assert!(token.span.is_empty());
    }
}

#[test]
fn whitespace_becomes_leading_trivia() {
    let fixture = fixture();
    let mut scanner = fixture.builder.build("ab  +\tcd");

    let first = scanner.read();
    assert!(first.leading_trivia.is_empty());

    let second = scanner.read();
    assert_eq!(second.kind, fixture.plus);
    assert_eq!(second.leading_trivia.len(), 1);
    assert_eq!(second.leading_trivia[0].text, "  ");
    assert_eq!(second.leading_trivia[0].span.start(), TextSize::new(2));

    let third = scanner.read();
    assert_eq!(third.leading_trivia.len(), 1);
    assert_eq!(third.leading_trivia[0].text, "\t");
}

#[test]
fn trailing_trivia_attaches_to_end_of_input() {
    let fixture = fixture();
    let mut scanner = fixture.builder.build("ab ");

    let _word = scanner.read();
    let eof = scanner.read();
    assert!(eof.is_end_of_input());
    assert_eq!(eof.leading_trivia.len(), 1);
    assert_eq!(eof.leading_trivia[0].text, " ");
}

#[test]
fn forked_cursors_diverge_independently() {
    let fixture = fixture();
    let mut scanner = fixture.builder.build("ab+cd");

    assert_eq!(scanner.read().text, "ab");
    let mut forked = scanner.fork();
    assert_eq!(forked.position(), scanner.position());

    // Advance the original past the fork point.
    assert_eq!(scanner.read().text, "+");
    assert_eq!(scanner.read().text, "cd");

    // The fork still reads from its own position.
    assert_eq!(forked.read().text, "+");
    assert_eq!(forked.position(), 2);
    assert_eq!(scanner.position(), 3);
}

#[test]
fn unexpected_characters_are_skipped_and_diagnosed() {
    let fixture = fixture();
    let scanner_builder = fixture
        .builder
        .clone()
        .unexpected_char_code(DiagnosticCode::new(9));
    let mut scanner = scanner_builder.build("ab?cd");

    assert_eq!(scanner.read().text, "ab");
    let next = scanner.read();
    assert_eq!(next.text, "cd", "the bad character is skipped");

    let diagnostics = scanner.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::new(9));
    assert_eq!(diagnostics[0].span.start(), TextSize::new(2));
    assert_eq!(diagnostics[0].span.len(), 1);
}

#[test]
fn diagnostics_are_shared_across_forks() {
    let fixture = fixture();
    let mut scanner = fixture.builder.build("?ab");
    let forked = scanner.fork();

    // Only the original cursor has scanned, but the fork sees the shared
    // diagnostics.
    let _word = scanner.read();
    assert_eq!(forked.diagnostics().len(), 1);
}
