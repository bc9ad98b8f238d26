use crate::char::is_format_char;
use crate::char::is_id_continue;
use crate::char::is_id_start;
use crate::char::is_line_terminator;
use crate::char::CharFilter;
use crate::char::DIGIT;
use crate::char::DIGIT_HEX;
use crate::char::ID_CONTINUE_ASCII;
use crate::char::ID_START_CHARSTR;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use aho_corasick::AhoCorasick;
use aho_corasick::AhoCorasickBuilder;
use aho_corasick::AhoCorasickKind;
use aho_corasick::Anchored;
use aho_corasick::Input;
use aho_corasick::MatchKind;
use aho_corasick::StartKind;
use core::ops::Index;
use memchr::memchr3;
use memchr::memmem;
use once_cell::sync::Lazy;

pub mod literal;
mod stream;
#[cfg(test)]
mod tests;

pub use stream::TokenStream;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LexMode {
  SlashIsRegex,
  Standard,
}

#[derive(Copy, Clone)]
pub struct LexerCheckpoint {
  next: usize,
}

// Contains the match length.
#[derive(Copy, Clone)]
struct Match(usize);

impl Match {
  pub fn len(&self) -> usize {
    self.0
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

struct PatternMatcher {
  patterns: Vec<TT>,
  matcher: AhoCorasick,
}

impl PatternMatcher {
  pub fn new<D: AsRef<str>>(patterns: Vec<(TT, D)>) -> Self {
    let (tts, syns): (Vec<_>, Vec<_>) = patterns.into_iter().unzip();
    let byte_syns: Vec<Vec<u8>> = syns.iter().map(|s| s.as_ref().as_bytes().to_vec()).collect();
    let matcher = AhoCorasickBuilder::new()
      .start_kind(StartKind::Anchored)
      .kind(Some(AhoCorasickKind::DFA))
      .match_kind(MatchKind::LeftmostLongest)
      .build(byte_syns)
      .expect("static token patterns form a valid automaton");
    PatternMatcher {
      patterns: tts,
      matcher,
    }
  }

  pub fn find(&self, lexer: &Lexer) -> Option<(TT, Match)> {
    self
      .matcher
      .find(Input::new(&lexer.source[lexer.next..]).anchored(Anchored::Yes))
      .map(|m| (self.patterns[m.pattern().as_usize()], Match(m.end())))
  }
}

#[derive(Debug)]
struct LexError(SyntaxErrorType);

type LexResult<T> = Result<T, LexError>;

pub struct Lexer<'a> {
  source: &'a str,
  next: usize,
}

impl<'a> Lexer<'a> {
  pub fn new(code: &'a str) -> Lexer<'a> {
    Lexer {
      source: code,
      next: 0,
    }
  }

  pub fn source(&self) -> &'a str {
    self.source
  }

  pub fn next(&self) -> usize {
    self.next
  }

  fn end(&self) -> usize {
    self.source.len()
  }

  fn remaining(&self) -> usize {
    self.end() - self.next
  }

  fn eof_range(&self) -> Loc {
    Loc(self.end(), self.end())
  }

  fn at_end(&self) -> bool {
    self.next >= self.end()
  }

  fn peek(&self, n: usize) -> Option<char> {
    self.source[self.next..].chars().nth(n)
  }

  /// Moves the scanner to `next`, which must be a char boundary. Used to rescan a buffered token in another mode.
  pub fn set_next(&mut self, next: usize) {
    self.next = next;
  }

  pub fn checkpoint(&self) -> LexerCheckpoint {
    LexerCheckpoint { next: self.next }
  }

  pub fn since_checkpoint(&self, checkpoint: LexerCheckpoint) -> Loc {
    Loc(checkpoint.next, self.next)
  }

  fn while_chars(&self, chars: &CharFilter) -> Match {
    let mut len = 0;
    for ch in self.source[self.next..].chars() {
      if chars.has(ch) {
        len += ch.len_utf8();
      } else {
        break;
      }
    }
    Match(len)
  }

  fn while_not_line_terminator(&self) -> Match {
    Match(
      self.source[self.next..]
        .find(is_line_terminator)
        .unwrap_or(self.remaining()),
    )
  }

  // Stops at the quote, a backslash, or any line terminator.
  fn while_not_string_special(&self, quote: char) -> Match {
    let rest = &self.source[self.next..];
    let ascii_stop = memchr3(quote as u8, b'\\', b'\n', rest.as_bytes()).unwrap_or(rest.len());
    let other_stop = rest[..ascii_stop]
      .find(|c| matches!(c, '\r' | '\u{2028}' | '\u{2029}'))
      .unwrap_or(ascii_stop);
    Match(other_stop)
  }

  fn consume(&mut self, m: Match) -> Match {
    self.next += m.len();
    m
  }

  fn skip_expect(&mut self, n: usize) {
    debug_assert!(self.next + n <= self.end());
    self.next += n;
  }

  fn skip_char(&mut self) {
    if let Some(c) = self.peek(0) {
      self.next += c.len_utf8();
    };
  }

  fn drive_fallible(
    &mut self,
    preceded_by_line_terminator: bool,
    f: impl FnOnce(&mut Self) -> LexResult<TT>,
  ) -> Token {
    let cp = self.checkpoint();
    let (typ, invalid) = match f(self) {
      Ok(typ) => (typ, None),
      Err(LexError(err)) => {
        // Always make progress, otherwise the parser's recovery would spin on the same character.
        if self.next == cp.next {
          self.skip_char();
        };
        (TT::Invalid, Some(err))
      }
    };
    Token {
      loc: self.since_checkpoint(cp),
      typ,
      preceded_by_line_terminator,
      invalid,
    }
  }
}

impl<'a> Index<Loc> for Lexer<'a> {
  type Output = str;

  fn index(&self, index: Loc) -> &Self::Output {
    &self.source[index.0..index.1]
  }
}

#[rustfmt::skip]
pub static OPERATORS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::Ampersand, "&");
  map.insert(TT::AmpersandAmpersand, "&&");
  map.insert(TT::AmpersandEquals, "&=");
  map.insert(TT::Asterisk, "*");
  map.insert(TT::AsteriskEquals, "*=");
  map.insert(TT::Bar, "|");
  map.insert(TT::BarBar, "||");
  map.insert(TT::BarEquals, "|=");
  map.insert(TT::BraceClose, "}");
  map.insert(TT::BraceOpen, "{");
  map.insert(TT::BracketClose, "]");
  map.insert(TT::BracketOpen, "[");
  map.insert(TT::Caret, "^");
  map.insert(TT::CaretEquals, "^=");
  map.insert(TT::ChevronLeft, "<");
  map.insert(TT::ChevronLeftChevronLeft, "<<");
  map.insert(TT::ChevronLeftChevronLeftEquals, "<<=");
  map.insert(TT::ChevronLeftEquals, "<=");
  map.insert(TT::ChevronRight, ">");
  map.insert(TT::ChevronRightChevronRight, ">>");
  map.insert(TT::ChevronRightChevronRightChevronRight, ">>>");
  map.insert(TT::ChevronRightChevronRightChevronRightEquals, ">>>=");
  map.insert(TT::ChevronRightChevronRightEquals, ">>=");
  map.insert(TT::ChevronRightEquals, ">=");
  map.insert(TT::Colon, ":");
  map.insert(TT::Comma, ",");
  map.insert(TT::Dot, ".");
  map.insert(TT::Equals, "=");
  map.insert(TT::EqualsEquals, "==");
  map.insert(TT::EqualsEqualsEquals, "===");
  map.insert(TT::Exclamation, "!");
  map.insert(TT::ExclamationEquals, "!=");
  map.insert(TT::ExclamationEqualsEquals, "!==");
  map.insert(TT::Hyphen, "-");
  map.insert(TT::HyphenEquals, "-=");
  map.insert(TT::HyphenHyphen, "--");
  map.insert(TT::ParenthesisClose, ")");
  map.insert(TT::ParenthesisOpen, "(");
  map.insert(TT::Percent, "%");
  map.insert(TT::PercentEquals, "%=");
  map.insert(TT::Plus, "+");
  map.insert(TT::PlusEquals, "+=");
  map.insert(TT::PlusPlus, "++");
  map.insert(TT::Question, "?");
  map.insert(TT::Semicolon, ";");
  map.insert(TT::Slash, "/");
  map.insert(TT::SlashEquals, "/=");
  map.insert(TT::Tilde, "~");
  map
});

#[rustfmt::skip]
pub static KEYWORDS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::KeywordBreak, "break");
  map.insert(TT::KeywordCase, "case");
  map.insert(TT::KeywordCatch, "catch");
  map.insert(TT::KeywordContinue, "continue");
  map.insert(TT::KeywordDefault, "default");
  map.insert(TT::KeywordDelete, "delete");
  map.insert(TT::KeywordDo, "do");
  map.insert(TT::KeywordElse, "else");
  map.insert(TT::KeywordExport, "export");
  map.insert(TT::KeywordFinally, "finally");
  map.insert(TT::KeywordFor, "for");
  map.insert(TT::KeywordFunction, "function");
  map.insert(TT::KeywordIf, "if");
  map.insert(TT::KeywordImport, "import");
  map.insert(TT::KeywordIn, "in");
  map.insert(TT::KeywordInstanceof, "instanceof");
  map.insert(TT::KeywordNew, "new");
  map.insert(TT::KeywordReturn, "return");
  map.insert(TT::KeywordSwitch, "switch");
  map.insert(TT::KeywordThis, "this");
  map.insert(TT::KeywordThrow, "throw");
  map.insert(TT::KeywordTry, "try");
  map.insert(TT::KeywordTypeof, "typeof");
  map.insert(TT::KeywordVar, "var");
  map.insert(TT::KeywordVoid, "void");
  map.insert(TT::KeywordWhile, "while");
  map.insert(TT::KeywordWith, "with");
  map.insert(TT::LiteralFalse, "false");
  map.insert(TT::LiteralNull, "null");
  map.insert(TT::LiteralTrue, "true");
  map
});

pub static KEYWORD_STRS: Lazy<HashMap<&'static str, TT>> = Lazy::new(|| {
  HashMap::<&'static str, TT>::from_iter(KEYWORDS_MAPPING.iter().map(|(k, v)| (*v, *k)))
});

#[rustfmt::skip]
pub static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  let mut set = HashSet::<&'static str>::new();
  for w in [
    "abstract", "boolean", "byte", "char", "class", "const", "debugger", "double", "enum",
    "extends", "final", "float", "goto", "implements", "int", "interface", "long", "native",
    "package", "private", "protected", "public", "short", "static", "super", "synchronized",
    "throws", "transient", "volatile",
  ] {
    set.insert(w);
  }
  set
});

static SIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = Vec::new();
  for (&k, &v) in OPERATORS_MAPPING.iter() {
    patterns.push((k, v.into()));
  }
  for c in ID_START_CHARSTR.chars() {
    patterns.push((TT::Identifier, c.to_string()));
  }
  // Unicode escapes can start identifiers.
  patterns.push((TT::Identifier, "\\".into()));
  for c in "0123456789".chars() {
    patterns.push((TT::LiteralNumber, c.to_string()));
  }
  patterns.push((TT::LiteralNumberHex, "0x".into()));
  patterns.push((TT::LiteralNumberHex, "0X".into()));
  // `.5` is a number, not a member access.
  for digit in '0'..='9' {
    patterns.push((TT::LiteralNumber, format!(".{}", digit)));
  }
  patterns.push((TT::LiteralString, "\"".into()));
  patterns.push((TT::LiteralString, "'".into()));

  PatternMatcher::new(patterns)
});

static INSIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns = vec![
    (TT::LineTerminator, "\r\n".to_string()),
    (TT::CommentMultiline, "/*".to_string()),
    (TT::CommentSingle, "//".to_string()),
    (TT::CommentSingle, "<!--".to_string()),
    (TT::CommentSingle, "-->".to_string()),
  ];
  for c in crate::char::ECMASCRIPT_LINE_TERMINATORS {
    patterns.push((TT::LineTerminator, c.to_string()));
  }
  for c in crate::char::ECMASCRIPT_WHITESPACE {
    patterns.push((TT::Whitespace, c.to_string()));
  }
  PatternMatcher::new(patterns)
});

/// Returns whether the comment includes a line terminator, or `None` if it never ends.
fn lex_multiline_comment(lexer: &mut Lexer<'_>) -> Option<bool> {
  // Consume `/*`.
  lexer.skip_expect(2);
  let rest = &lexer.source[lexer.next..];
  match memmem::find(rest.as_bytes(), b"*/") {
    Some(pos) => {
      let contains_newline = rest[..pos].contains(is_line_terminator);
      lexer.skip_expect(pos + 2);
      Some(contains_newline)
    }
    None => {
      lexer.skip_expect(rest.len());
      None
    }
  }
}

fn lex_single_comment(lexer: &mut Lexer<'_>, prefix: Match) {
  // Consume the comment prefix (//, <!--, or -->). The line terminator itself is left for the next token's whitespace skip.
  lexer.skip_expect(prefix.len());
  lexer.consume(lexer.while_not_line_terminator());
}

fn lex_unicode_escape(lexer: &mut Lexer<'_>) -> LexResult<char> {
  // We're at '\', consume it.
  lexer.skip_expect(1);
  if lexer.peek(0) != Some('u') {
    return Err(LexError(SyntaxErrorType::IllegalCharacter));
  };
  lexer.skip_expect(1);
  let mut value = 0u32;
  for _ in 0..4 {
    let digit = lexer
      .peek(0)
      .filter(|c| DIGIT_HEX.has(*c))
      .and_then(|c| c.to_digit(16))
      .ok_or(LexError(SyntaxErrorType::InvalidEscape))?;
    lexer.skip_expect(1);
    value = value * 16 + digit;
  }
  char::from_u32(value)
    .filter(|c| is_id_continue(*c))
    .ok_or(LexError(SyntaxErrorType::InvalidEscape))
}

fn lex_identifier(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let start = lexer.next();
  let mut escaped = false;
  loop {
    lexer.consume(lexer.while_chars(&ID_CONTINUE_ASCII));
    match lexer.peek(0) {
      Some('\\') => {
        lex_unicode_escape(lexer)?;
        escaped = true;
      }
      Some(c) if !c.is_ascii() && is_id_continue(c) => {
        lexer.skip_expect(c.len_utf8());
      }
      _ => break,
    };
  }
  // An identifier spelled with escapes is never a keyword.
  if escaped {
    return Ok(TT::Identifier);
  };
  let word = &lexer.source[start..lexer.next];
  if let Some(tt) = KEYWORD_STRS.get(word) {
    return Ok(*tt);
  };
  if RESERVED_WORDS.contains(word) {
    return Ok(TT::ReservedWord);
  };
  Ok(TT::Identifier)
}

fn lex_number(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let start = lexer.next();
  let leading_zero =
    lexer.peek(0) == Some('0') && lexer.peek(1).is_some_and(|c| c.is_ascii_digit());
  lexer.consume(lexer.while_chars(&DIGIT));
  if leading_zero && lexer.source[start..lexer.next].chars().all(|c| matches!(c, '0'..='7')) {
    // Legacy octal literals have no fraction or exponent.
    return Ok(TT::LiteralNumber);
  };
  if lexer.peek(0) == Some('.') {
    lexer.skip_expect(1);
    lexer.consume(lexer.while_chars(&DIGIT));
  };
  if matches!(lexer.peek(0), Some('e' | 'E')) {
    lexer.skip_expect(1);
    if matches!(lexer.peek(0), Some('+' | '-')) {
      lexer.skip_expect(1);
    };
    if lexer.consume(lexer.while_chars(&DIGIT)).is_empty() {
      return Err(LexError(SyntaxErrorType::MissingExponent));
    };
  };
  Ok(TT::LiteralNumber)
}

fn lex_hex_number(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  // Consume `0x`.
  lexer.skip_expect(2);
  if lexer.consume(lexer.while_chars(&DIGIT_HEX)).is_empty() {
    return Err(LexError(SyntaxErrorType::MalformedLiteralNumber));
  };
  Ok(TT::LiteralNumber)
}

fn lex_string(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let quote = lexer.peek(0).ok_or(LexError(SyntaxErrorType::UnterminatedString))?;
  lexer.skip_expect(1);
  loop {
    lexer.consume(lexer.while_not_string_special(quote));
    match lexer.peek(0) {
      Some(c) if c == quote => {
        lexer.skip_expect(1);
        return Ok(TT::LiteralString);
      }
      Some('\\') => {
        lexer.skip_expect(1);
        match lexer.peek(0) {
          None => return Err(LexError(SyntaxErrorType::UnterminatedString)),
          // A backslash followed by a line break continues the string on the next line.
          Some('\r') => {
            lexer.skip_expect(1);
            if lexer.peek(0) == Some('\n') {
              lexer.skip_expect(1);
            };
          }
          Some(c) => lexer.skip_expect(c.len_utf8()),
        };
      }
      _ => return Err(LexError(SyntaxErrorType::UnterminatedString)),
    };
  }
}

fn lex_regex(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  // Consume the opening `/`.
  lexer.skip_expect(1);
  let mut in_class = false;
  loop {
    let c = match lexer.peek(0) {
      Some(c) if !is_line_terminator(c) => c,
      _ => return Err(LexError(SyntaxErrorType::UnterminatedRegex)),
    };
    lexer.skip_expect(c.len_utf8());
    match c {
      '\\' => match lexer.peek(0) {
        Some(n) if !is_line_terminator(n) => lexer.skip_expect(n.len_utf8()),
        _ => return Err(LexError(SyntaxErrorType::UnterminatedRegex)),
      },
      '[' => in_class = true,
      ']' => in_class = false,
      '/' if !in_class => break,
      _ => {}
    };
  }
  while let Some(c) = lexer.peek(0).filter(|c| is_id_continue(*c)) {
    lexer.skip_expect(c.len_utf8());
    if !matches!(c, 'g' | 'i' | 'm') {
      return Err(LexError(SyntaxErrorType::InvalidRegexFlag));
    };
  }
  Ok(TT::LiteralRegex)
}

pub fn lex_next(lexer: &mut Lexer<'_>, mode: LexMode) -> Token {
  // Skip whitespace and comments before the next significant token.
  // `-->` only starts a comment when nothing but whitespace and comments precede it on its line.
  let mut at_line_start = lexer.next() == 0
    || lexer.source[..lexer.next()]
      .chars()
      .next_back()
      .is_some_and(is_line_terminator);
  let mut preceded_by_line_terminator = false;
  loop {
    if let Some((tt, mat)) = INSIG.find(lexer) {
      if tt == TT::CommentSingle && mat.len() == 3 && !at_line_start {
        break;
      };
      match tt {
        TT::LineTerminator => {
          lexer.consume(mat);
          at_line_start = true;
          preceded_by_line_terminator = true;
        }
        TT::CommentMultiline => {
          let start = lexer.checkpoint();
          match lex_multiline_comment(lexer) {
            Some(has_newline) => {
              at_line_start |= has_newline;
              preceded_by_line_terminator |= has_newline;
            }
            None => {
              return Token {
                loc: lexer.since_checkpoint(start),
                typ: TT::Invalid,
                preceded_by_line_terminator,
                invalid: Some(SyntaxErrorType::UnterminatedComment),
              };
            }
          };
        }
        TT::CommentSingle => {
          lex_single_comment(lexer, mat);
        }
        // Whitespace.
        _ => {
          lexer.consume(mat);
        }
      };
      continue;
    };
    match lexer.peek(0) {
      Some(c) if is_format_char(c) => lexer.skip_expect(c.len_utf8()),
      _ => break,
    };
  }

  // End of input gets its own token; drive_fallible would report it as Invalid.
  if lexer.at_end() {
    return Token {
      loc: lexer.eof_range(),
      typ: TT::EOF,
      preceded_by_line_terminator,
      invalid: None,
    };
  };

  lexer.drive_fallible(preceded_by_line_terminator, |lexer| {
    if let Some(c) = lexer.peek(0).filter(|c| !c.is_ascii()) {
      if is_id_start(c) {
        return lex_identifier(lexer);
      };
      return Err(LexError(SyntaxErrorType::IllegalCharacter));
    };

    match SIG.find(lexer) {
      None => Err(LexError(SyntaxErrorType::IllegalCharacter)),
      Some((tt, mat)) => match tt {
        TT::Identifier => lex_identifier(lexer),
        TT::LiteralNumber => lex_number(lexer),
        TT::LiteralNumberHex => lex_hex_number(lexer),
        TT::LiteralString => lex_string(lexer),
        TT::Slash | TT::SlashEquals if mode == LexMode::SlashIsRegex => lex_regex(lexer),
        typ => {
          lexer.consume(mat);
          Ok(typ)
        }
      },
    }
  })
}
