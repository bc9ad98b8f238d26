use super::Parser;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::ir::function::FunctionBuilder;
use crate::ir::function::FunctionKind;
use crate::ir::node::Node;
use crate::ir::Expr;
use crate::ir::PropKey;
use crate::ir::Stmt;
use crate::loc::Loc;
use crate::report::WarningType;
use crate::token::TT;
use std::mem;

impl<'a> Parser<'a> {
  /// Parses `function name(params) { body }` and adds it to the enclosing function's table.
  ///
  /// Returns the range of the whole function, the assignment target when the name is a member expression (`function a.b() {}`), and the function's index in the table.
  pub fn function(&mut self, kind: FunctionKind) -> SyntaxResult<(Loc, Option<Node<Expr>>, usize)> {
    let start = self.require(TT::KeywordFunction)?.loc;
    let member_names = self.options.member_expr_as_function_name;
    let mut name = None;
    let mut member_target = None;
    let t = self.peek();
    match t.typ {
      TT::Identifier | TT::ReservedWord => {
        self.consume();
        let id = self.identifier(&t)?;
        if member_names && self.peek().typ != TT::ParenthesisOpen {
          let head = self.node(t.loc, Expr::Name { name: id });
          member_target = Some(self.member_expr_tail(head, false)?);
        } else {
          name = Some(id);
        };
      }
      TT::ParenthesisOpen => {}
      _ if member_names => {
        member_target = Some(self.member_expr(false)?);
      }
      _ if kind == FunctionKind::Statement => {
        return Err(self.unexpected(&t, SyntaxErrorType::RequiredTokenNotFound(TT::Identifier)));
      }
      _ => {}
    };
    let kind = match &member_target {
      Some(target) => {
        if !target.stx.is_reference() {
          return Err(target.error(SyntaxErrorType::InvalidAssignmentTarget));
        };
        // The function takes the last component of the member expression as its name.
        name = match &*target.stx {
          Expr::Name { name } => Some(name.clone()),
          Expr::GetProp {
            key: PropKey::Named { name },
            ..
          } => Some(name.clone()),
          _ => None,
        };
        FunctionKind::ExpressionStatement
      }
      None => kind,
    };

    let nested = self.func.kind != FunctionKind::Script;
    let mut builder = FunctionBuilder::new(kind, name, start.0, self.line_of(start.0));
    if nested {
      // Nested functions must make sure their `this` is never an activation object.
      builder.check_this = true;
    };
    if nested || self.with_depth > 0 {
      builder.ignore_dynamic_scope = true;
    };
    self.func.needs_activation |= nested;

    let saved_func = mem::replace(&mut self.func, builder);
    let saved_targets = mem::take(&mut self.targets);
    let saved_with = mem::replace(&mut self.with_depth, 0);
    let res = self.function_rest();
    let builder = mem::replace(&mut self.func, saved_func);
    self.targets = saved_targets;
    self.with_depth = saved_with;
    let (body, end) = res?;

    let loc = start.add(end);
    let source = self.str(loc).to_string();
    let end_line = self.line_of(end.0);
    let node = builder.finish_parsing(body, loc, source, self.options.source_name.clone(), end_line);
    let index = self.func.add_function(node);
    Ok((loc, member_target, index))
  }

  /// Parameters and body. Returns the body and the location of the closing brace.
  fn function_rest(&mut self) -> SyntaxResult<(Vec<Node<Stmt>>, Loc)> {
    self.require(TT::ParenthesisOpen)?;
    if !self.consume_if(TT::ParenthesisClose).is_match() {
      loop {
        let t = self.consume();
        if !matches!(t.typ, TT::Identifier | TT::ReservedWord) {
          return Err(self.unexpected(&t, SyntaxErrorType::MissingFormalParameter));
        };
        let param = self.identifier(&t)?;
        if !self.func.add_param(param.clone()) {
          self.report_warning(t.loc, WarningType::DuplicateParameter(param));
        };
        if !self.consume_if(TT::Comma).is_match() {
          break;
        };
      }
      self.require(TT::ParenthesisClose)?;
    };
    self.require(TT::BraceOpen)?;
    let body = self.statement_list();
    let end = self.require(TT::BraceClose)?.loc;
    Ok((body, end))
  }
}
