use super::Completion;
use super::Frame;
use super::Temp;
use crate::builtins::new_error_object;
use crate::coerce::to_boolean;
use crate::coerce::to_object;
use crate::error::VmError;
use crate::object::enumerate::IdEnumeration;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::ops::shallow_eq;
use crate::property::Attributes;
use crate::scope::top_level_scope;
use crate::value::Value;
use parse_es::ir::node::Node;
use parse_es::ir::Expr;
use parse_es::ir::Stmt;
use parse_es::ir::SwitchCase;
use std::mem;

// Whether a jump with `label` ends the statement carrying `labels`. Unlabelled jumps target the nearest loop or switch.
fn targets(label: &Option<String>, labels: &[String]) -> bool {
  match label {
    None => true,
    Some(l) => labels.iter().any(|x| x == l),
  }
}

impl<'a> Frame<'a> {
  pub(super) fn exec_block(&mut self, stmts: &[Node<Stmt>]) -> Result<Completion, VmError> {
    let mut value = None;
    for stmt in stmts {
      match self.exec_stmt(stmt)? {
        Completion::Normal(v) => {
          if v.is_some() {
            value = v;
          };
        }
        abrupt => return Ok(abrupt),
      };
    }
    Ok(Completion::Normal(value))
  }

  fn test(&mut self, test: &Node<Expr>) -> Result<bool, VmError> {
    let v = self.eval(test)?;
    to_boolean(self.cx, &v)
  }

  pub(super) fn exec_stmt(&mut self, stmt: &Node<Stmt>) -> Result<Completion, VmError> {
    self.cx.check_stack()?;
    match &*stmt.stx {
      Stmt::Block { body } => return self.exec_block(body),
      Stmt::Empty => return Ok(Completion::empty()),
      _ => {}
    };
    self.cx.count_instruction()?;
    match &*stmt.stx {
      Stmt::Block { .. } | Stmt::Empty => Ok(Completion::empty()),
      Stmt::Expr { expr } => Ok(Completion::Normal(Some(self.eval(expr)?))),
      Stmt::If {
        test,
        consequent,
        alternate,
      } => {
        if self.test(test)? {
          self.exec_stmt(consequent)
        } else if let Some(alternate) = alternate {
          self.exec_stmt(alternate)
        } else {
          Ok(Completion::empty())
        }
      }
      Stmt::Loop {
        labels,
        init,
        test,
        update,
        body,
        post_test,
      } => self.exec_loop(labels, init, test, update, body, *post_test),
      Stmt::EnumInit { temp, obj } => {
        let v = self.eval(obj)?;
        let target = match v {
          Value::Undefined | Value::Null => None,
          v => Some(to_object(&self.scope, &v)?),
        };
        *self.temp(*temp)? = Temp::Enum(Box::new(IdEnumeration::new(target)));
        Ok(Completion::empty())
      }
      Stmt::EnumDone { temp } => {
        *self.temp(*temp)? = Temp::Value(Value::Undefined);
        Ok(Completion::empty())
      }
      Stmt::Switch {
        labels,
        discriminant,
        cases,
      } => self.exec_switch(labels, discriminant, cases),
      Stmt::Labeled { labels, body } => match self.exec_stmt(body)? {
        Completion::Break(Some(l)) if labels.contains(&l) => Ok(Completion::empty()),
        other => Ok(other),
      },
      Stmt::Break { label } => Ok(Completion::Break(label.clone())),
      Stmt::Continue { label } => Ok(Completion::Continue(label.clone())),
      Stmt::Return { value } => {
        let v = match value {
          Some(e) => self.eval(e)?,
          None => Value::Undefined,
        };
        Ok(Completion::Return(v))
      }
      Stmt::Throw { value } => Err(VmError::Throw(self.eval(value)?)),
      Stmt::Try {
        block,
        exn,
        handler,
        finally,
      } => self.exec_try(block, *exn, handler.as_ref(), finally.as_ref()),
      Stmt::CatchScope { name, exn, body } => {
        let exception = match self.temp(*exn)? {
          Temp::Value(v) => v.clone(),
          Temp::Enum(_) => Value::Undefined,
        };
        let catch_scope = ObjectRef::new(ClassTag::Catch, None, Some(self.scope.clone()));
        catch_scope.define_property(name.as_str(), exception, Attributes::PERMANENT)?;
        self.exec_in_scope(catch_scope, body)
      }
      Stmt::With { obj, body } => {
        let v = self.eval(obj)?;
        let target = to_object(&self.scope, &v)?;
        let with_scope = ObjectRef::new(ClassTag::With, Some(target), Some(self.scope.clone()));
        self.exec_in_scope(with_scope, body)
      }
      Stmt::Error => Err(self.cx.report_runtime_error(
        "statement could not be compiled",
        &self.node.source_name,
        stmt.line,
      )),
    }
  }

  // Runs `body` with `scope` pushed onto the scope chain. The previous scope is restored however the body completes.
  fn exec_in_scope(&mut self, scope: ObjectRef, body: &Node<Stmt>) -> Result<Completion, VmError> {
    let saved = mem::replace(&mut self.scope, scope);
    let res = self.exec_stmt(body);
    self.scope = saved;
    res
  }

  fn exec_loop(
    &mut self,
    labels: &[String],
    init: &Option<Node<Expr>>,
    test: &Option<Node<Expr>>,
    update: &Option<Node<Expr>>,
    body: &Node<Stmt>,
    post_test: bool,
  ) -> Result<Completion, VmError> {
    if let Some(init) = init {
      self.eval(init)?;
    };
    let mut value = None;
    loop {
      if !post_test {
        if let Some(test) = test {
          if !self.test(test)? {
            break;
          };
        };
      };
      self.cx.count_instruction()?;
      match self.exec_stmt(body)? {
        Completion::Normal(v) => {
          if v.is_some() {
            value = v;
          };
        }
        Completion::Break(label) if targets(&label, labels) => break,
        Completion::Continue(label) if targets(&label, labels) => {}
        abrupt => return Ok(abrupt),
      };
      if let Some(update) = update {
        self.eval(update)?;
      };
      if post_test {
        if let Some(test) = test {
          if !self.test(test)? {
            break;
          };
        };
      };
    }
    Ok(Completion::Normal(value))
  }

  fn exec_switch(
    &mut self,
    labels: &[String],
    discriminant: &Node<Expr>,
    cases: &[SwitchCase],
  ) -> Result<Completion, VmError> {
    let d = self.eval(discriminant)?;
    let mut start = None;
    for (i, case) in cases.iter().enumerate() {
      let Some(test) = &case.test else {
        continue;
      };
      let v = self.eval(test)?;
      if shallow_eq(&d, &v) {
        start = Some(i);
        break;
      };
    }
    let Some(start) = start.or_else(|| cases.iter().position(|c| c.test.is_none())) else {
      return Ok(Completion::empty());
    };
    let mut value = None;
    for case in &cases[start..] {
      match self.exec_block(&case.body)? {
        Completion::Normal(v) => {
          if v.is_some() {
            value = v;
          };
        }
        Completion::Break(label) if targets(&label, labels) => break,
        abrupt => return Ok(abrupt),
      };
    }
    Ok(Completion::Normal(value))
  }

  fn exec_try(
    &mut self,
    block: &Node<Stmt>,
    exn: u32,
    handler: Option<&Node<Stmt>>,
    finally: Option<&Node<Stmt>>,
  ) -> Result<Completion, VmError> {
    let mut res = self.exec_stmt(block);
    if let Some(handler) = handler {
      if let Err(err) = res {
        res = if err.is_catchable() {
          let exception = self.exception_value(err)?;
          *self.temp(exn)? = Temp::Value(exception);
          self.exec_stmt(handler)
        } else {
          Err(err)
        };
      };
    };
    let Some(finally) = finally else {
      return res;
    };
    if matches!(&res, Err(err) if !err.is_catchable()) {
      return res;
    };
    match self.exec_stmt(finally)? {
      Completion::Normal(_) => res,
      abrupt => Ok(abrupt),
    }
  }

  // The script-visible value of a caught error. Runtime errors become instances of their error constructor.
  fn exception_value(&self, err: VmError) -> Result<Value, VmError> {
    match err {
      VmError::Throw(v) => Ok(v),
      VmError::Ecma(e) => {
        let top = top_level_scope(&self.scope);
        Ok(Value::Object(new_error_object(self.cx, &top, e.kind, &e.message)?))
      }
      other => Err(other),
    }
  }
}
