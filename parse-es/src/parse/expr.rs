use super::operator::Infix;
use super::operator::ASSIGNMENT_OPERATOR_MAPPING;
use super::operator::INFIX_OPERATOR_MAPPING;
use super::Parser;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::ir::function::FunctionKind;
use crate::ir::node::Node;
use crate::ir::BinaryOp;
use crate::ir::Expr;
use crate::ir::UnaryOp;
use crate::lex::literal::decode_identifier;
use crate::lex::literal::decode_number;
use crate::lex::literal::decode_regex;
use crate::lex::literal::decode_string;
use crate::lex::LexMode;
use crate::num::number_to_string;
use crate::num::JsNumber;
use crate::report::WarningType;
use crate::token::Token;
use crate::token::TT;

impl<'a> Parser<'a> {
  /// Resolves an identifier token to its name. Reserved words are only accepted when configured to be, with a warning.
  pub fn identifier(&mut self, t: &Token) -> SyntaxResult<String> {
    match t.typ {
      TT::Identifier => Ok(decode_identifier(self.str(t.loc))),
      TT::ReservedWord if self.options.reserved_keyword_as_identifier => {
        let word = self.str(t.loc).to_string();
        self.report_warning(t.loc, WarningType::ReservedKeywordAsIdentifier(word.clone()));
        Ok(word)
      }
      TT::ReservedWord => Err(t.error(SyntaxErrorType::ReservedIdentifier)),
      _ => Err(self.unexpected(t, SyntaxErrorType::RequiredTokenNotFound(TT::Identifier))),
    }
  }

  /// Comma expression.
  pub fn expr(&mut self, in_allowed: bool) -> SyntaxResult<Node<Expr>> {
    let first = self.assign_expr(in_allowed)?;
    if self.peek().typ != TT::Comma {
      return Ok(first);
    };
    let mut loc = first.loc;
    let line = first.line;
    let mut exprs = vec![first];
    while self.consume_if(TT::Comma).is_match() {
      let e = self.assign_expr(in_allowed)?;
      loc.extend(e.loc);
      exprs.push(e);
    }
    Ok(Node::new(loc, line, Expr::Comma { exprs }))
  }

  pub fn assign_expr(&mut self, in_allowed: bool) -> SyntaxResult<Node<Expr>> {
    self.with_depth(|p| {
      let left = p.cond_expr(in_allowed)?;
      let t = p.peek();
      let Some(op) = ASSIGNMENT_OPERATOR_MAPPING.get(&t.typ).copied() else {
        return Ok(left);
      };
      p.consume();
      let right = p.assign_expr(in_allowed)?;
      p.factory().create_assignment(op, left, right)
    })
  }

  fn cond_expr(&mut self, in_allowed: bool) -> SyntaxResult<Node<Expr>> {
    let test = self.binary_expr(1, in_allowed)?;
    if !self.consume_if(TT::Question).is_match() {
      return Ok(test);
    };
    let consequent = self.assign_expr(true)?;
    self.require(TT::Colon)?;
    let alternate = self.assign_expr(in_allowed)?;
    let loc = test.loc.add(alternate.loc);
    let line = test.line;
    Ok(Node::new(loc, line, Expr::Cond {
      test,
      consequent,
      alternate,
    }))
  }

  /// Left-associative binary operators from `||` down to the multiplicative level, by precedence climbing.
  fn binary_expr(&mut self, min_prec: u8, in_allowed: bool) -> SyntaxResult<Node<Expr>> {
    let mut left = self.unary_expr()?;
    let mut links = 0;
    loop {
      let t = self.peek();
      let Some(&(infix, prec)) = INFIX_OPERATOR_MAPPING.get(&t.typ) else {
        break;
      };
      if prec < min_prec || (infix == Infix::Op(BinaryOp::In) && !in_allowed) {
        break;
      };
      links += 1;
      self.check_chain(links, &t)?;
      self.consume();
      let right = self.binary_expr(prec + 1, in_allowed)?;
      let loc = left.loc.add(right.loc);
      let line = left.line;
      left = match infix {
        Infix::And => Node::new(loc, line, Expr::And { left, right }),
        Infix::Or => Node::new(loc, line, Expr::Or { left, right }),
        Infix::Op(op) => self.factory().create_binary(op, left, right),
      };
    }
    Ok(left)
  }

  fn unary_expr(&mut self) -> SyntaxResult<Node<Expr>> {
    self.with_depth(|p| {
      let t = p.peek_with_mode(LexMode::SlashIsRegex);
      let op = match t.typ {
        TT::Exclamation => Some(UnaryOp::Not),
        TT::Hyphen => Some(UnaryOp::Neg),
        TT::Plus => Some(UnaryOp::Pos),
        TT::Tilde => Some(UnaryOp::BitNot),
        TT::KeywordVoid => Some(UnaryOp::Void),
        _ => None,
      };
      let line = p.line_of(t.loc.0);
      if let Some(op) = op {
        p.consume_with_mode(LexMode::SlashIsRegex);
        let operand = p.unary_expr()?;
        let loc = t.loc.add(operand.loc);
        return Ok(Node::new(loc, line, Expr::Unary { op, operand }));
      };
      match t.typ {
        TT::KeywordTypeof => {
          p.consume_with_mode(LexMode::SlashIsRegex);
          let operand = p.unary_expr()?;
          let loc = t.loc.add(operand.loc);
          Ok(p.factory().create_typeof(loc, line, operand))
        }
        TT::KeywordDelete => {
          p.consume_with_mode(LexMode::SlashIsRegex);
          let operand = p.unary_expr()?;
          let loc = t.loc.add(operand.loc);
          Ok(p.factory().create_delete(loc, line, operand))
        }
        TT::PlusPlus | TT::HyphenHyphen => {
          p.consume_with_mode(LexMode::SlashIsRegex);
          let operand = p.member_expr(true)?;
          let loc = t.loc.add(operand.loc);
          p.factory()
            .create_inc_dec(loc, line, operand, t.typ == TT::PlusPlus, false)
        }
        _ => p.postfix_expr(),
      }
    })
  }

  fn postfix_expr(&mut self) -> SyntaxResult<Node<Expr>> {
    let operand = self.member_expr(true)?;
    let t = self.peek();
    // A line break before `++` or `--` ends the expression, making them prefix operators of the next statement.
    if matches!(t.typ, TT::PlusPlus | TT::HyphenHyphen) && !t.preceded_by_line_terminator {
      self.consume();
      let loc = operand.loc.add(t.loc);
      let line = operand.line;
      return self
        .factory()
        .create_inc_dec(loc, line, operand, t.typ == TT::PlusPlus, true);
    };
    Ok(operand)
  }

  pub fn call_args(&mut self) -> SyntaxResult<Vec<Node<Expr>>> {
    self.require(TT::ParenthesisOpen)?;
    let mut args = Vec::new();
    if self.consume_if(TT::ParenthesisClose).is_match() {
      return Ok(args);
    };
    loop {
      args.push(self.assign_expr(true)?);
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    self.require(TT::ParenthesisClose)?;
    Ok(args)
  }

  /// Property accesses, `new`, and calls when `allow_call` is set.
  pub fn member_expr(&mut self, allow_call: bool) -> SyntaxResult<Node<Expr>> {
    let t = self.peek_with_mode(LexMode::SlashIsRegex);
    let head = if t.typ == TT::KeywordNew {
      self.consume_with_mode(LexMode::SlashIsRegex);
      let callee = self.with_depth(|p| p.member_expr(false))?;
      let args = if self.peek().typ == TT::ParenthesisOpen {
        self.call_args()?
      } else {
        Vec::new()
      };
      let loc = t.loc.add(callee.loc);
      self.node(loc, Expr::New { callee, args })
    } else {
      self.primary_expr()?
    };
    self.member_expr_tail(head, allow_call)
  }

  pub fn member_expr_tail(&mut self, mut e: Node<Expr>, allow_call: bool) -> SyntaxResult<Node<Expr>> {
    let mut links = 0;
    loop {
      let t = self.peek();
      if matches!(t.typ, TT::Dot | TT::BracketOpen | TT::ParenthesisOpen) {
        links += 1;
        self.check_chain(links, &t)?;
      };
      match t.typ {
        TT::Dot => {
          self.consume();
          let name_token = self.consume();
          let name = self.identifier(&name_token)?;
          let loc = e.loc.add(name_token.loc);
          let line = e.line;
          e = self.factory().create_property_get(loc, line, e, name);
        }
        TT::BracketOpen => {
          self.consume();
          let key = self.expr(true)?;
          let end = self.require(TT::BracketClose)?.loc;
          let loc = e.loc.add(end);
          let line = e.line;
          e = self.factory().create_element_get(loc, line, e, key);
        }
        TT::ParenthesisOpen if allow_call => {
          let args = self.call_args()?;
          let loc = e.loc.add(t.loc);
          let line = e.line;
          e = Node::new(loc, line, Expr::Call { callee: e, args });
        }
        _ => break,
      };
    }
    Ok(e)
  }

  fn array_literal(&mut self, start: Token) -> SyntaxResult<Node<Expr>> {
    let mut elements = Vec::new();
    let end = loop {
      let t = self.peek_with_mode(LexMode::SlashIsRegex);
      match t.typ {
        TT::BracketClose => {
          self.consume();
          break t.loc;
        }
        TT::Comma => {
          self.consume();
          elements.push(None);
          continue;
        }
        _ => {}
      };
      elements.push(Some(self.assign_expr(true)?));
      let t = self.peek();
      match t.typ {
        TT::Comma => {
          self.consume();
        }
        TT::BracketClose => {}
        _ => return Err(self.unexpected(&t, SyntaxErrorType::RequiredTokenNotFound(TT::BracketClose))),
      };
    };
    let loc = start.loc.add(end);
    let line = self.line_of(loc.0);
    Ok(self.factory().create_array_literal(loc, line, elements))
  }

  fn object_literal(&mut self, start: Token) -> SyntaxResult<Node<Expr>> {
    let mut props = Vec::new();
    let end = loop {
      let t = self.consume();
      let key = match t.typ {
        TT::BraceClose => break t.loc,
        TT::Identifier | TT::ReservedWord => self.identifier(&t)?,
        TT::LiteralString => decode_string(self.str(t.loc)),
        TT::LiteralNumber => number_to_string(decode_number(self.str(t.loc)).value),
        _ => return Err(self.unexpected(&t, SyntaxErrorType::InvalidPropertyId)),
      };
      self.require(TT::Colon)?;
      let value = self.assign_expr(true)?;
      props.push((key, value));
      if !self.consume_if(TT::Comma).is_match() {
        break self.require(TT::BraceClose)?.loc;
      };
    };
    let loc = start.loc.add(end);
    let line = self.line_of(loc.0);
    Ok(self.factory().create_object_literal(loc, line, props))
  }

  fn primary_expr(&mut self) -> SyntaxResult<Node<Expr>> {
    let t = self.consume_with_mode(LexMode::SlashIsRegex);
    let raw = self.str(t.loc);
    let stx = match t.typ {
      TT::KeywordFunction => {
        self.stream.unget(t);
        let (start, _, index) = self.function(FunctionKind::Expression)?;
        return Ok(self.node(start, Expr::Function { index }));
      }
      TT::BracketOpen => return self.array_literal(t),
      TT::BraceOpen => return self.object_literal(t),
      TT::ParenthesisOpen => {
        let e = self.expr(true)?;
        self.require(TT::ParenthesisClose)?;
        return Ok(e);
      }
      TT::Identifier | TT::ReservedWord => {
        let name = self.identifier(&t)?;
        if name == "arguments" {
          self.func.needs_activation = true;
        };
        Expr::Name { name }
      }
      TT::LiteralNumber => {
        let lit = decode_number(raw);
        if let Some(digit) = lit.bad_octal_digit {
          self.report_warning(t.loc, WarningType::BadOctalLiteral(digit));
        };
        Expr::Number {
          value: JsNumber(lit.value),
        }
      }
      TT::LiteralString => Expr::String {
        value: decode_string(raw),
      },
      TT::LiteralRegex => {
        let (pattern, flags) = decode_regex(raw);
        Expr::Regexp { pattern, flags }
      }
      TT::LiteralNull => Expr::Null,
      TT::LiteralTrue => Expr::Bool { value: true },
      TT::LiteralFalse => Expr::Bool { value: false },
      TT::KeywordThis => Expr::This,
      TT::EOF => return Err(t.error(SyntaxErrorType::UnexpectedEnd)),
      _ => return Err(self.unexpected(&t, SyntaxErrorType::ExpectedSyntax("expression"))),
    };
    Ok(self.node(t.loc, stx))
  }
}
