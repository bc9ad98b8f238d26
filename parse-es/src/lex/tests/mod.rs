use crate::error::SyntaxErrorType;
use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::lex::TokenStream;
use crate::token::TT;
use crate::token::TT::*;

fn check<const N: usize>(code: &str, expecteds: [TT; N]) {
  check_with_mode(code, LexMode::Standard, expecteds);
}

fn check_with_mode<const N: usize>(code: &str, mode: LexMode, expecteds: [TT; N]) {
  let mut lexer = Lexer::new(code);
  for expected in expecteds {
    let t = lex_next(&mut lexer, mode);
    assert_eq!(t.typ, expected, "lexing {code:?}");
  }
  let t = lex_next(&mut lexer, mode);
  assert_eq!(EOF, t.typ, "lexing {code:?}");
}

fn invalid_reason(code: &str, mode: LexMode) -> Option<SyntaxErrorType> {
  let mut lexer = Lexer::new(code);
  loop {
    let t = lex_next(&mut lexer, mode);
    match t.typ {
      Invalid => return t.invalid,
      EOF => return None,
      _ => {}
    };
  }
}

#[test]
fn test_lex_keywords() {
  check("instanceof", [KeywordInstanceof]);
  check("typeof x", [KeywordTypeof, Identifier]);
  check("true false null", [LiteralTrue, LiteralFalse, LiteralNull]);
  check("class", [ReservedWord]);
  check("synchronized", [ReservedWord]);
}

#[test]
fn test_lex_identifiers() {
  check("h929", [Identifier]);
  check("$_a", [Identifier]);
  check("breakfast", [Identifier]);
  check("caf\u{e9}", [Identifier]);
  // An escaped keyword is an identifier.
  check("\\u0069f", [Identifier]);
}

#[test]
fn test_lex_bad_identifier_escapes() {
  assert_eq!(
    invalid_reason("a\\u00g1", LexMode::Standard),
    Some(SyntaxErrorType::InvalidEscape)
  );
  assert_eq!(
    invalid_reason("a\\x", LexMode::Standard),
    Some(SyntaxErrorType::IllegalCharacter)
  );
  assert_eq!(
    invalid_reason("#", LexMode::Standard),
    Some(SyntaxErrorType::IllegalCharacter)
  );
}

#[test]
fn test_lex_literal_numbers() {
  check("1", [LiteralNumber]);
  check("929", [LiteralNumber]);
  check(".929", [LiteralNumber]);
  check(". 929", [Dot, LiteralNumber]);
  check("0x1F + 010 + 1e2", [LiteralNumber, Plus, LiteralNumber, Plus, LiteralNumber]);
  check("1.5e-3", [LiteralNumber]);
  // Legacy octal literals stop before a fraction.
  check("017.5", [LiteralNumber, LiteralNumber]);
  // A digit 8 downgrades the literal to decimal, which may then have a fraction.
  check("018.5", [LiteralNumber]);
  assert_eq!(
    invalid_reason("1e+", LexMode::Standard),
    Some(SyntaxErrorType::MissingExponent)
  );
  assert_eq!(
    invalid_reason("0x", LexMode::Standard),
    Some(SyntaxErrorType::MalformedLiteralNumber)
  );
}

#[test]
fn test_lex_literal_strings() {
  check(r#""hello""#, [LiteralString]);
  check(r#"'it\'s'"#, [LiteralString]);
  check("'a\\\nb'", [LiteralString]);
  assert_eq!(
    invalid_reason("'abc", LexMode::Standard),
    Some(SyntaxErrorType::UnterminatedString)
  );
  assert_eq!(
    invalid_reason("'ab\ncd'", LexMode::Standard),
    Some(SyntaxErrorType::UnterminatedString)
  );
}

#[test]
fn test_lex_comments() {
  check("a // b\nc", [Identifier, Identifier]);
  check("a /* b */ c", [Identifier, Identifier]);
  check("<!-- hidden\nx", [Identifier]);
  check("x\n--> hidden", [Identifier]);
  // Not at the start of a line, so it is a decrement followed by a comparison.
  check("x-->y", [Identifier, HyphenHyphen, ChevronRight, Identifier]);
  assert_eq!(
    invalid_reason("a /* b", LexMode::Standard),
    Some(SyntaxErrorType::UnterminatedComment)
  );
}

#[test]
fn test_lex_operators() {
  check(
    "a >>>= b >> c === d !== e",
    [
      Identifier,
      ChevronRightChevronRightChevronRightEquals,
      Identifier,
      ChevronRightChevronRight,
      Identifier,
      EqualsEqualsEquals,
      Identifier,
      ExclamationEqualsEquals,
      Identifier,
    ],
  );
}

#[test]
fn test_lex_regex_mode() {
  check_with_mode("/ab+c/gi", LexMode::SlashIsRegex, [LiteralRegex]);
  check_with_mode("/[/]/", LexMode::SlashIsRegex, [LiteralRegex]);
  check("/ab/", [Slash, Identifier, Slash]);
  assert_eq!(
    invalid_reason("/ab/x", LexMode::SlashIsRegex),
    Some(SyntaxErrorType::InvalidRegexFlag)
  );
  assert_eq!(
    invalid_reason("/ab\n/", LexMode::SlashIsRegex),
    Some(SyntaxErrorType::UnterminatedRegex)
  );
}

#[test]
fn test_lex_line_terminator_flag() {
  let mut lexer = Lexer::new("a\r\nb /*\n*/ c d");
  assert!(!lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
  assert!(lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
  assert!(lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
  assert!(!lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
}

#[test]
fn test_lex_skips_format_chars() {
  check("a\u{200B} b", [Identifier, Identifier]);
}

#[test]
fn test_stream_pushback_relexes_slash() {
  let mut stream = TokenStream::new("/a/g");
  let t = stream.next_token();
  assert_eq!(t.typ, Slash);
  stream.unget(t);
  assert_eq!(stream.next_token_with_mode(LexMode::SlashIsRegex).typ, LiteralRegex);
  assert_eq!(stream.next_token().typ, EOF);
}

#[test]
fn test_stream_peek_does_not_consume() {
  let mut stream = TokenStream::new("a b");
  assert_eq!(stream.peek().typ, Identifier);
  assert_eq!(stream.consumed(), 0);
  assert_eq!(stream.next_token().typ, Identifier);
  assert_eq!(stream.consumed(), 1);
}

#[test]
#[should_panic(expected = "pushed back twice")]
fn test_stream_double_pushback_is_fatal() {
  let mut stream = TokenStream::new("a b");
  let a = stream.next_token();
  stream.unget(a.clone());
  stream.unget(a);
}
