use super::lex_next;
use super::LexMode;
use super::Lexer;
use crate::token::Token;
use crate::token::TT;

/// A pull-based token source with one token of pushback.
///
/// Tokens that begin with `/` mean different things depending on whether the parser expects an operand, so a pushed-back token that was lexed in the other mode is lexed again from its start.
pub struct TokenStream<'a> {
  lexer: Lexer<'a>,
  pushed_back: Option<(Token, LexMode)>,
  last_mode: LexMode,
  consumed: usize,
  // Consumed `{` minus consumed `}`.
  open_braces: isize,
}

impl<'a> TokenStream<'a> {
  pub fn new(source: &'a str) -> TokenStream<'a> {
    TokenStream {
      lexer: Lexer::new(source),
      pushed_back: None,
      last_mode: LexMode::Standard,
      consumed: 0,
      open_braces: 0,
    }
  }

  pub fn source(&self) -> &'a str {
    self.lexer.source()
  }

  /// How many tokens have been handed out and not pushed back.
  pub fn consumed(&self) -> usize {
    self.consumed
  }

  /// How many braces are open among the consumed tokens. Unbalanced input can make this negative.
  pub fn open_braces(&self) -> isize {
    self.open_braces
  }

  pub fn next_token_with_mode(&mut self, mode: LexMode) -> Token {
    self.consumed += 1;
    self.last_mode = mode;
    let token = self.lex(mode);
    self.open_braces += brace_delta(token.typ);
    token
  }

  fn lex(&mut self, mode: LexMode) -> Token {
    if let Some((token, lexed_in)) = self.pushed_back.take() {
      let starts_with_slash = self.lexer.source().as_bytes().get(token.loc.0) == Some(&b'/');
      if lexed_in == mode || !starts_with_slash || token.typ == TT::EOF {
        return token;
      };
      self.lexer.set_next(token.loc.0);
      let mut relexed = lex_next(&mut self.lexer, mode);
      relexed.preceded_by_line_terminator = token.preceded_by_line_terminator;
      return relexed;
    };
    lex_next(&mut self.lexer, mode)
  }

  pub fn next_token(&mut self) -> Token {
    self.next_token_with_mode(LexMode::Standard)
  }

  /// Restores the token most recently returned. Pushing back twice without consuming in between is a bug in the caller.
  pub fn unget(&mut self, token: Token) {
    assert!(
      self.pushed_back.is_none(),
      "token pushed back twice without an intervening consume"
    );
    self.consumed -= 1;
    self.open_braces -= brace_delta(token.typ);
    self.pushed_back = Some((token, self.last_mode));
  }

  pub fn peek_with_mode(&mut self, mode: LexMode) -> Token {
    let t = self.next_token_with_mode(mode);
    self.unget(t.clone());
    t
  }

  pub fn peek(&mut self) -> Token {
    self.peek_with_mode(LexMode::Standard)
  }
}

fn brace_delta(typ: TT) -> isize {
  match typ {
    TT::BraceOpen => 1,
    TT::BraceClose => -1,
    _ => 0,
  }
}
