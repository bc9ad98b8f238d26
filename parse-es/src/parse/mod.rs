use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::ir::factory::IrFactory;
use crate::ir::function::FunctionBuilder;
use crate::ir::function::FunctionKind;
use crate::ir::function::FunctionNode;
use crate::ir::node::Node;
use crate::ir::Stmt;
use crate::lex::LexMode;
use crate::lex::TokenStream;
use crate::loc::LineIndex;
use crate::loc::Loc;
use crate::report::Diagnostic;
use crate::report::ErrorReporter;
use crate::report::Severity;
use crate::report::WarningType;
use crate::stack::stack_used;
use crate::stack::StackBase;
use crate::token::Token;
use crate::token::TT;
use crate::ParseOptions;
use std::sync::Arc;

pub mod expr;
pub mod func;
pub mod operator;
pub mod stmt;
#[cfg(test)]
mod tests;

#[derive(Debug)]
#[must_use]
pub struct MaybeToken {
  typ: TT,
  loc: Loc,
  matched: bool,
}

impl MaybeToken {
  pub fn is_match(&self) -> bool {
    self.matched
  }

  pub fn match_loc(&self) -> Option<Loc> {
    if self.matched {
      Some(self.loc)
    } else {
      None
    }
  }

  pub fn error(&self, err: SyntaxErrorType) -> SyntaxError {
    debug_assert!(!self.matched);
    self.loc.error(err, Some(self.typ))
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JumpKind {
  Loop,
  Switch,
  Labeled,
}

/// A statement that `break` or `continue` may target.
#[derive(Debug)]
pub struct JumpTarget {
  pub kind: JumpKind,
  pub labels: Vec<String>,
}

/// The result of parsing a whole script.
pub struct ParsedScript {
  pub script: Arc<FunctionNode>,
  pub error_count: usize,
  /// Whether the first error was raised while the scanner was at the end of the input.
  pub hit_eof: bool,
}

pub struct Parser<'a> {
  stream: TokenStream<'a>,
  options: ParseOptions,
  reporter: &'a dyn ErrorReporter,
  lines: LineIndex,
  // The function whose body is being parsed. Enclosing functions are saved on the Rust stack while a nested one is parsed.
  func: FunctionBuilder,
  targets: Vec<JumpTarget>,
  depth: u32,
  with_depth: u32,
  error_count: usize,
  hit_eof: bool,
}

// Parsing routines are spread across the submodules as further `impl<'a> Parser<'a>` blocks.
impl<'a> Parser<'a> {
  pub fn new(source: &'a str, options: ParseOptions, reporter: &'a dyn ErrorReporter) -> Parser<'a> {
    let lines = LineIndex::new(source, options.base_line);
    let func = FunctionBuilder::new(FunctionKind::Script, None, 0, lines.line(0));
    Parser {
      stream: TokenStream::new(source),
      options,
      reporter,
      lines,
      func,
      targets: Vec::new(),
      depth: 0,
      with_depth: 0,
      error_count: 0,
      hit_eof: false,
    }
  }

  pub fn source(&self) -> &'a str {
    self.stream.source()
  }

  pub fn str(&self, loc: Loc) -> &'a str {
    self.source().get(loc.0..loc.1).unwrap_or("")
  }

  pub fn options(&self) -> &ParseOptions {
    &self.options
  }

  pub fn line_of(&self, offset: usize) -> u32 {
    self.lines.line(offset)
  }

  pub fn node<S>(&self, loc: Loc, stx: S) -> Node<S> {
    Node::new(loc, self.line_of(loc.0), stx)
  }

  pub fn factory(&mut self) -> IrFactory<'_> {
    IrFactory::new(&mut self.func, self.options.version)
  }

  fn diagnostic(&self, severity: Severity, code: &'static str, message: String, loc: Loc) -> Diagnostic {
    let source = self.source();
    let position = self.lines.position(source, loc.0);
    let line_text = self.lines.line_text(source, loc.0).to_string();
    Diagnostic::new(severity, code, message).with_position(
      self.options.source_name.clone(),
      position.line,
      Some(line_text),
      position.column,
    )
  }

  pub fn report_error(&mut self, err: &SyntaxError) {
    if self.error_count == 0 {
      self.hit_eof = err.at_eof(self.source().len());
    };
    self.error_count += 1;
    let d = self.diagnostic(Severity::Error, err.typ.code(), err.to_string(), err.loc);
    self.reporter.error(&d);
  }

  pub fn report_warning(&mut self, loc: Loc, warning: WarningType) {
    let d = self.diagnostic(Severity::Warning, warning.code(), warning.message(), loc);
    self.reporter.warning(&d);
  }

  /// Runs `f` one nesting level deeper, failing instead of recursing past the configured depth or stack budget.
  pub fn with_depth<T, F: FnOnce(&mut Self) -> SyntaxResult<T>>(&mut self, f: F) -> SyntaxResult<T> {
    if self.depth >= self.options.max_depth || stack_used() > self.options.stack_budget {
      let t = self.stream.peek();
      return Err(t.error(SyntaxErrorType::NestingTooDeep));
    };
    self.depth += 1;
    let res = f(self);
    self.depth -= 1;
    res
  }

  /// Fails when a left-nested chain of `links` operations, which is built in a loop rather than by recursion, would nest deeper than the limit. Evaluating and dropping the tree recurses along the chain.
  pub fn check_chain(&self, links: u32, t: &Token) -> SyntaxResult<()> {
    if self.depth.saturating_add(links) >= self.options.max_depth {
      return Err(t.error(SyntaxErrorType::NestingTooDeep));
    };
    Ok(())
  }

  pub fn consume_with_mode(&mut self, mode: LexMode) -> Token {
    self.stream.next_token_with_mode(mode)
  }

  pub fn consume(&mut self) -> Token {
    self.stream.next_token()
  }

  pub fn peek_with_mode(&mut self, mode: LexMode) -> Token {
    self.stream.peek_with_mode(mode)
  }

  pub fn peek(&mut self) -> Token {
    self.stream.peek()
  }

  pub fn consume_if(&mut self, typ: TT) -> MaybeToken {
    let t = self.peek();
    let matched = t.typ == typ;
    if matched {
      self.consume();
    };
    MaybeToken {
      typ: t.typ,
      loc: t.loc,
      matched,
    }
  }

  /// The error for a token that cannot appear here. Invalid tokens report why they are invalid.
  pub fn unexpected(&self, t: &Token, expected: SyntaxErrorType) -> SyntaxError {
    match t.typ {
      TT::Invalid => t.invalid_error(),
      _ => t.error(expected),
    }
  }

  pub fn require_with_mode(&mut self, typ: TT, mode: LexMode) -> SyntaxResult<Token> {
    let t = self.consume_with_mode(mode);
    if t.typ != typ {
      Err(self.unexpected(&t, SyntaxErrorType::RequiredTokenNotFound(typ)))
    } else {
      Ok(t)
    }
  }

  pub fn require(&mut self, typ: TT) -> SyntaxResult<Token> {
    self.require_with_mode(typ, LexMode::Standard)
  }

  /// Skips the rest of a statement that failed to parse: through its `;`, or up to a line break or a `}` of an enclosing block. Braces the statement opened are skipped along with it, as are invalid tokens, so one malformed statement is reported once.
  ///
  /// `start` and `braces` are the stream position and open brace count when the statement began. At least one token is always skipped so that parsing makes progress.
  fn recover(&mut self, start: usize, braces: isize) {
    loop {
      let t = self.peek();
      let inside = self.stream.open_braces() > braces;
      match t.typ {
        TT::EOF => break,
        TT::BraceClose if !inside => break,
        TT::Semicolon if !inside => {
          self.consume();
          return;
        }
        _ if !inside && t.preceded_by_line_terminator && self.stream.consumed() > start => break,
        _ => {
          self.consume();
        }
      };
    }
    if self.stream.consumed() == start && self.peek().typ != TT::EOF {
      self.consume();
    };
  }

  /// Parses one statement of a statement list, reporting and skipping over it if it is malformed.
  pub fn statement_or_recover(&mut self) -> Node<Stmt> {
    let start = self.stream.consumed();
    let braces = self.stream.open_braces();
    match self.statement() {
      Ok(stmt) => stmt,
      Err(err) => {
        self.report_error(&err);
        self.recover(start, braces);
        self.node(err.loc, Stmt::Error)
      }
    }
  }

  pub fn parse_script(mut self) -> ParsedScript {
    let _base = StackBase::enter();
    let mut body = Vec::new();
    while self.peek().typ != TT::EOF {
      body.push(self.statement_or_recover());
    }
    let source = self.source();
    let end_line = self.line_of(source.len());
    let script = self.func.finish_parsing(
      body,
      Loc(0, source.len()),
      source.to_string(),
      self.options.source_name.clone(),
      end_line,
    );
    ParsedScript {
      script: Arc::new(script),
      error_count: self.error_count,
      hit_eof: self.hit_eof,
    }
  }
}
