use super::JumpKind;
use super::JumpTarget;
use super::Parser;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::ir::factory::CatchClause;
use crate::ir::factory::ForInTarget;
use crate::ir::function::FunctionKind;
use crate::ir::node::Node;
use crate::ir::Expr;
use crate::ir::Stmt;
use crate::ir::SwitchCase;
use crate::lex::LexMode;
use crate::loc::Loc;
use crate::token::TT;

/// Versions 1.0 and 1.1 accept a function keyword directly after a statement.
fn allows_function_after_statement(version: i32) -> bool {
  version == 100 || version == 110
}

impl<'a> Parser<'a> {
  pub fn statement(&mut self) -> SyntaxResult<Node<Stmt>> {
    self.with_depth(|p| p.labeled_statement(Vec::new()))
  }

  /// Parses a statement preceded by `labels`, which have already been consumed.
  fn labeled_statement(&mut self, labels: Vec<String>) -> SyntaxResult<Node<Stmt>> {
    let t = self.peek_with_mode(LexMode::SlashIsRegex);
    #[rustfmt::skip]
    let stmt = match t.typ {
      TT::KeywordDo => self.do_while_stmt(labels)?,
      TT::KeywordFor => self.for_stmt(labels)?,
      TT::KeywordSwitch => self.switch_stmt(labels)?,
      TT::KeywordWhile => self.while_stmt(labels)?,
      TT::BraceOpen => self.wrap_labeled(labels, |p| p.block_stmt())?,
      TT::KeywordBreak => self.wrap_labeled(labels, |p| p.break_stmt())?,
      TT::KeywordContinue => self.wrap_labeled(labels, |p| p.continue_stmt())?,
      TT::KeywordFunction => self.wrap_labeled(labels, |p| p.function_stmt())?,
      TT::KeywordIf => self.wrap_labeled(labels, |p| p.if_stmt())?,
      TT::KeywordReturn => self.wrap_labeled(labels, |p| p.return_stmt())?,
      TT::KeywordThrow => self.wrap_labeled(labels, |p| p.throw_stmt())?,
      TT::KeywordTry => self.wrap_labeled(labels, |p| p.try_stmt())?,
      TT::KeywordVar => self.wrap_labeled(labels, |p| p.var_stmt())?,
      TT::KeywordWith => self.wrap_labeled(labels, |p| p.with_stmt())?,
      TT::Semicolon => {
        self.consume();
        self.wrap_labeled(labels, |p| Ok(p.node(t.loc, Stmt::Empty)))?
      }
      _ => self.expr_stmt_or_label(labels)?,
    };
    Ok(stmt)
  }

  /// Parses a statement that is not a loop or switch, making it a target for `break` of its labels.
  fn wrap_labeled<F: FnOnce(&mut Self) -> SyntaxResult<Node<Stmt>>>(
    &mut self,
    labels: Vec<String>,
    f: F,
  ) -> SyntaxResult<Node<Stmt>> {
    if labels.is_empty() {
      return f(self);
    };
    self.targets.push(JumpTarget {
      kind: JumpKind::Labeled,
      labels: labels.clone(),
    });
    let res = f(self);
    self.targets.pop();
    Ok(res?.wrap(|body| Stmt::Labeled { labels, body }))
  }

  fn label_in_use(&self, label: &str) -> bool {
    self
      .targets
      .iter()
      .any(|t| t.labels.iter().any(|l| l == label))
  }

  /// Terminates a statement: a `;`, or something that implies one.
  pub fn auto_semi(&mut self) -> SyntaxResult<()> {
    let t = self.peek();
    match t.typ {
      TT::Semicolon => {
        self.consume();
        Ok(())
      }
      TT::EOF | TT::BraceClose => Ok(()),
      _ if t.preceded_by_line_terminator => Ok(()),
      TT::KeywordFunction if allows_function_after_statement(self.options.version) => Ok(()),
      _ => Err(self.unexpected(&t, SyntaxErrorType::MissingSemicolon)),
    }
  }

  /// Statements until `}` or the end of input. Does not consume the terminator.
  pub fn statement_list(&mut self) -> Vec<Node<Stmt>> {
    let mut body = Vec::new();
    loop {
      match self.peek().typ {
        TT::BraceClose | TT::EOF => break,
        _ => body.push(self.statement_or_recover()),
      };
    }
    body
  }

  pub fn block_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::BraceOpen)?.loc;
    let body = self.statement_list();
    let end = self.require(TT::BraceClose)?.loc;
    Ok(self.node(start.add(end), Stmt::Block { body }))
  }

  fn expr_stmt_or_label(&mut self, mut labels: Vec<String>) -> SyntaxResult<Node<Stmt>> {
    let start = self.stream.consumed();
    let expr = self.expr(true)?;
    if self.peek().typ == TT::Colon {
      let name = match &*expr.stx {
        Expr::Name { name } if self.stream.consumed() - start == 1 => name.clone(),
        _ => return Err(expr.error(SyntaxErrorType::InvalidLabel)),
      };
      if labels.contains(&name) || self.label_in_use(&name) {
        return Err(expr.error(SyntaxErrorType::DuplicateLabel));
      };
      self.consume();
      labels.push(name);
      return self.with_depth(|p| p.labeled_statement(labels));
    };
    self.auto_semi()?;
    let stmt = expr.wrap(|expr| Stmt::Expr { expr });
    Ok(if labels.is_empty() {
      stmt
    } else {
      stmt.wrap(|body| Stmt::Labeled { labels, body })
    })
  }

  /// `var a = 1, b`. Returns the declared names and the assignments for their initialisers.
  pub fn var_declarations(&mut self, in_allowed: bool) -> SyntaxResult<(Vec<String>, Vec<Node<Expr>>)> {
    let mut names = Vec::new();
    let mut inits = Vec::new();
    loop {
      let t = self.consume();
      let name = self.identifier(&t)?;
      self.func.add_var(&name);
      names.push(name.clone());
      if self.consume_if(TT::Equals).is_match() {
        let value = self.assign_expr(in_allowed)?;
        let target = self.node(t.loc, Expr::Name { name });
        inits.push(self.factory().create_assignment(None, target, value)?);
      };
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    Ok((names, inits))
  }

  fn inits_to_expr(&self, loc: Loc, mut inits: Vec<Node<Expr>>) -> Option<Node<Expr>> {
    match inits.len() {
      0 => None,
      1 => inits.pop(),
      _ => Some(self.node(loc, Expr::Comma { exprs: inits })),
    }
  }

  fn var_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordVar)?.loc;
    let (_, inits) = self.var_declarations(true)?;
    self.auto_semi()?;
    Ok(match self.inits_to_expr(start, inits) {
      Some(expr) => expr.wrap(|expr| Stmt::Expr { expr }),
      None => self.node(start, Stmt::Empty),
    })
  }

  fn if_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordIf)?.loc;
    self.require(TT::ParenthesisOpen)?;
    let test = self.expr(true)?;
    self.require(TT::ParenthesisClose)?;
    let consequent = self.statement()?;
    let alternate = if self.consume_if(TT::KeywordElse).is_match() {
      Some(self.statement()?)
    } else {
      None
    };
    Ok(self.node(start, Stmt::If {
      test,
      consequent,
      alternate,
    }))
  }

  /// Parses a loop body with the loop registered as a jump target.
  fn loop_body(&mut self, labels: &[String]) -> SyntaxResult<Node<Stmt>> {
    self.targets.push(JumpTarget {
      kind: JumpKind::Loop,
      labels: labels.to_vec(),
    });
    let body = self.statement();
    self.targets.pop();
    body
  }

  fn while_stmt(&mut self, labels: Vec<String>) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordWhile)?.loc;
    self.require(TT::ParenthesisOpen)?;
    let test = self.expr(true)?;
    self.require(TT::ParenthesisClose)?;
    let body = self.loop_body(&labels)?;
    Ok(self.node(start, Stmt::Loop {
      labels,
      init: None,
      test: Some(test),
      update: None,
      body,
      post_test: false,
    }))
  }

  fn do_while_stmt(&mut self, labels: Vec<String>) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordDo)?.loc;
    let body = self.loop_body(&labels)?;
    self.require(TT::KeywordWhile)?;
    self.require(TT::ParenthesisOpen)?;
    let test = self.expr(true)?;
    self.require(TT::ParenthesisClose)?;
    // The terminating semicolon is optional.
    let _ = self.consume_if(TT::Semicolon);
    Ok(self.node(start, Stmt::Loop {
      labels,
      init: None,
      test: Some(test),
      update: None,
      body,
      post_test: true,
    }))
  }

  fn for_stmt(&mut self, labels: Vec<String>) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordFor)?.loc;
    self.require(TT::ParenthesisOpen)?;
    let mut var_names = None;
    let init = match self.peek().typ {
      TT::Semicolon => None,
      TT::KeywordVar => {
        let var_loc = self.consume().loc;
        let (names, inits) = self.var_declarations(false)?;
        var_names = Some(names);
        self.inits_to_expr(var_loc, inits)
      }
      _ => Some(self.expr(false)?),
    };

    let in_token = self.consume_if(TT::KeywordIn);
    if let Some(in_loc) = in_token.match_loc() {
      let target = match (var_names, init) {
        (Some(mut names), init) => {
          if names.len() != 1 {
            return Err(in_loc.error(SyntaxErrorType::MultipleForInVariables, Some(TT::KeywordIn)));
          };
          // A `var` initialiser runs once before enumeration starts.
          (ForInTarget::Var(names.pop().unwrap_or_default()), init)
        }
        (None, Some(e)) => (ForInTarget::Expr(e), None),
        (None, None) => return Err(in_loc.error(SyntaxErrorType::InvalidForInTarget, Some(TT::KeywordIn))),
      };
      let obj = self.expr(true)?;
      self.require(TT::ParenthesisClose)?;
      let body = self.loop_body(&labels)?;
      let line = self.line_of(start.0);
      let (target, var_init) = target;
      let for_in = self.factory().create_for_in(start, line, labels, target, obj, body)?;
      return Ok(match var_init {
        None => for_in,
        Some(init) => self.node(start, Stmt::Block {
          body: vec![init.wrap(|expr| Stmt::Expr { expr }), for_in],
        }),
      });
    };

    self.require(TT::Semicolon)?;
    let test = match self.peek().typ {
      TT::Semicolon => None,
      _ => Some(self.expr(true)?),
    };
    self.require(TT::Semicolon)?;
    let update = match self.peek().typ {
      TT::ParenthesisClose => None,
      _ => Some(self.expr(true)?),
    };
    self.require(TT::ParenthesisClose)?;
    let body = self.loop_body(&labels)?;
    Ok(self.node(start, Stmt::Loop {
      labels,
      init,
      test,
      update,
      body,
      post_test: false,
    }))
  }

  fn switch_stmt(&mut self, labels: Vec<String>) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordSwitch)?.loc;
    self.require(TT::ParenthesisOpen)?;
    let discriminant = self.expr(true)?;
    self.require(TT::ParenthesisClose)?;
    self.require(TT::BraceOpen)?;
    self.targets.push(JumpTarget {
      kind: JumpKind::Switch,
      labels: labels.clone(),
    });
    let cases = self.switch_cases();
    self.targets.pop();
    let cases = cases?;
    self.require(TT::BraceClose)?;
    Ok(self.node(start, Stmt::Switch {
      labels,
      discriminant,
      cases,
    }))
  }

  fn switch_cases(&mut self) -> SyntaxResult<Vec<SwitchCase>> {
    let mut cases = Vec::new();
    let mut seen_default = false;
    loop {
      let t = self.peek();
      let test = match t.typ {
        TT::BraceClose => break,
        TT::KeywordCase => {
          self.consume();
          Some(self.expr(true)?)
        }
        TT::KeywordDefault => {
          self.consume();
          if seen_default {
            return Err(t.error(SyntaxErrorType::MultipleDefaults));
          };
          seen_default = true;
          None
        }
        _ => return Err(self.unexpected(&t, SyntaxErrorType::InvalidSwitch)),
      };
      self.require(TT::Colon)?;
      let mut body = Vec::new();
      while !matches!(
        self.peek().typ,
        TT::KeywordCase | TT::KeywordDefault | TT::BraceClose | TT::EOF
      ) {
        body.push(self.statement_or_recover());
      }
      cases.push(SwitchCase { test, body });
    }
    Ok(cases)
  }

  /// An optional label on `break` or `continue`, which must be on the same line.
  fn jump_label(&mut self) -> SyntaxResult<Option<(String, Loc)>> {
    let t = self.peek();
    if t.preceded_by_line_terminator || !matches!(t.typ, TT::Identifier | TT::ReservedWord) {
      return Ok(None);
    };
    self.consume();
    let name = self.identifier(&t)?;
    Ok(Some((name, t.loc)))
  }

  fn break_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordBreak)?.loc;
    let label = match self.jump_label()? {
      Some((name, loc)) => {
        if !self.label_in_use(&name) {
          return Err(loc.error(SyntaxErrorType::UndefinedLabel, Some(TT::Identifier)));
        };
        Some(name)
      }
      None => {
        if !self
          .targets
          .iter()
          .any(|t| matches!(t.kind, JumpKind::Loop | JumpKind::Switch))
        {
          return Err(start.error(SyntaxErrorType::BreakOutsideLoop, Some(TT::KeywordBreak)));
        };
        None
      }
    };
    self.auto_semi()?;
    Ok(self.node(start, Stmt::Break { label }))
  }

  fn continue_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordContinue)?.loc;
    let label = match self.jump_label()? {
      Some((name, loc)) => {
        let target = self
          .targets
          .iter()
          .rev()
          .find(|t| t.labels.iter().any(|l| *l == name));
        match target {
          None => return Err(loc.error(SyntaxErrorType::UndefinedLabel, Some(TT::Identifier))),
          Some(t) if t.kind != JumpKind::Loop => {
            return Err(loc.error(SyntaxErrorType::ContinueNonLoopLabel, Some(TT::Identifier)))
          }
          Some(_) => Some(name),
        }
      }
      None => {
        if !self.targets.iter().any(|t| t.kind == JumpKind::Loop) {
          return Err(start.error(SyntaxErrorType::ContinueOutsideLoop, Some(TT::KeywordContinue)));
        };
        None
      }
    };
    self.auto_semi()?;
    Ok(self.node(start, Stmt::Continue { label }))
  }

  fn return_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordReturn)?.loc;
    if self.func.kind == FunctionKind::Script {
      return Err(start.error(SyntaxErrorType::ReturnOutsideFunction, Some(TT::KeywordReturn)));
    };
    let t = self.peek();
    let value = match t.typ {
      TT::Semicolon | TT::BraceClose | TT::EOF => None,
      _ if t.preceded_by_line_terminator => None,
      _ => Some(self.expr(true)?),
    };
    self.auto_semi()?;
    Ok(self.node(start, Stmt::Return { value }))
  }

  fn throw_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordThrow)?.loc;
    let t = self.peek();
    if t.preceded_by_line_terminator {
      return Err(t.error(SyntaxErrorType::LineTerminatorAfterThrow));
    };
    let value = self.expr(true)?;
    self.auto_semi()?;
    Ok(self.node(start, Stmt::Throw { value }))
  }

  fn with_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordWith)?.loc;
    self.require(TT::ParenthesisOpen)?;
    let obj = self.expr(true)?;
    self.require(TT::ParenthesisClose)?;
    self.func.needs_activation = true;
    self.with_depth += 1;
    let body = self.statement();
    self.with_depth -= 1;
    let body = body?;
    Ok(self.node(start, Stmt::With { obj, body }))
  }

  fn try_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TT::KeywordTry)?.loc;
    let block = self.block_stmt()?;
    let mut catches = Vec::new();
    let mut seen_unconditional = false;
    while let Some(catch_loc) = self.consume_if(TT::KeywordCatch).match_loc() {
      if seen_unconditional {
        return Err(catch_loc.error(SyntaxErrorType::UnreachableCatch, Some(TT::KeywordCatch)));
      };
      self.require(TT::ParenthesisOpen)?;
      let t = self.consume();
      let name = self.identifier(&t)?;
      let guard = if self.consume_if(TT::KeywordIf).is_match() {
        Some(self.expr(true)?)
      } else {
        seen_unconditional = true;
        None
      };
      self.require(TT::ParenthesisClose)?;
      let body = self.block_stmt()?;
      catches.push(CatchClause {
        loc: catch_loc,
        line: self.line_of(catch_loc.0),
        name,
        guard,
        body,
      });
    }
    let finally = match self.consume_if(TT::KeywordFinally).is_match() {
      true => Some(self.block_stmt()?),
      false => None,
    };
    if catches.is_empty() && finally.is_none() {
      let t = self.peek();
      return Err(self.unexpected(&t, SyntaxErrorType::TryStatementHasNoCatchOrFinally));
    };
    let line = self.line_of(start.0);
    Ok(self.factory().create_try(start, line, block, catches, finally))
  }

  fn function_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let (start, member_target, index) = self.function(FunctionKind::Statement)?;
    match member_target {
      None => Ok(self.node(start, Stmt::Empty)),
      Some(target) => {
        let value = self.node(start, Expr::Function { index });
        let assign = self.factory().create_assignment(None, target, value)?;
        Ok(assign.wrap(|expr| Stmt::Expr { expr }))
      }
    }
  }
}
