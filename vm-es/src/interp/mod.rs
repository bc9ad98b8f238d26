//! Tree-walking evaluation of the desugared IR.
//!
//! A [`Frame`] runs one script or function body. Statements produce a [`Completion`]; exceptions and host-fatal errors travel as `Err(VmError)`.

mod expr;
mod stmt;

use crate::builtins::new_arguments;
use crate::coerce::to_object;
use crate::context::Context;
use crate::error::VmError;
use crate::function::new_interpreted_function;
use crate::object::enumerate::IdEnumeration;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::property::Attributes;
use crate::property::PropertyKey;
use crate::scope::top_level_scope;
use crate::value::Value;
use parse_es::ir::function::FunctionKind;
use parse_es::ir::function::FunctionNode;
use parse_es::ir::TempId;
use parse_es::stack::StackBase;
use std::sync::Arc;

/// The result of executing a statement.
///
/// The empty completion value is `Normal(None)` so that a statement list keeps the value of the last statement that produced one.
#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
  Normal(Option<Value>),
  Return(Value),
  Break(Option<String>),
  Continue(Option<String>),
}

impl Completion {
  pub fn empty() -> Self {
    Completion::Normal(None)
  }
}

#[derive(Debug)]
enum Temp {
  Value(Value),
  Enum(Box<IdEnumeration>),
}

/// Evaluation state of one script or function invocation.
pub(crate) struct Frame<'a> {
  cx: &'a Context,
  node: &'a FunctionNode,
  /// The innermost scope object. `with` and `catch` push onto it temporarily.
  scope: ObjectRef,
  this: Value,
  temps: Vec<Temp>,
}

impl<'a> Frame<'a> {
  fn new(cx: &'a Context, node: &'a FunctionNode, scope: ObjectRef, this: Value) -> Frame<'a> {
    let temps = (0..node.temp_count).map(|_| Temp::Value(Value::Undefined)).collect();
    Frame {
      cx,
      node,
      scope,
      this,
      temps,
    }
  }

  fn temp(&mut self, temp: TempId) -> Result<&mut Temp, VmError> {
    let source_name = &self.node.source_name;
    let line = self.node.base_line;
    let cx = self.cx;
    match self.temps.get_mut(temp as usize) {
      Some(t) => Ok(t),
      None => Err(cx.report_runtime_error(format!("invalid temporary {temp}"), source_name, line)),
    }
  }

  /// Defines `var`s as undefined and instantiates function statements on the variable object.
  fn hoist(&self, vars: &ObjectRef) -> Result<(), VmError> {
    for name in &self.node.vars {
      let key = PropertyKey::from_name(name);
      if !vars.has(&key) {
        vars.define_property(key, Value::Undefined, Attributes::PERMANENT)?;
      };
    }
    for f in self.node.hoisted_functions() {
      let Some(name) = &f.name else {
        continue;
      };
      let obj = new_interpreted_function(f.clone(), &self.scope)?;
      vars.define_property(name.as_str(), obj, Attributes::PERMANENT)?;
    }
    Ok(())
  }
}

/// Runs a compiled script with `scope` as its variable object and `this`. Produces the value of the last statement that had one.
pub fn exec_script(cx: &Context, node: &Arc<FunctionNode>, scope: &ObjectRef) -> Result<Value, VmError> {
  let _span = tracing::trace_span!("script", source = %node.source_name).entered();
  let _base = StackBase::enter();
  let mut frame = Frame::new(cx, node, scope.clone(), Value::Object(scope.clone()));
  frame.hoist(scope)?;
  Ok(match frame.exec_block(&node.body)? {
    Completion::Normal(v) => v.unwrap_or(Value::Undefined),
    Completion::Return(v) => v,
    Completion::Break(_) | Completion::Continue(_) => Value::Undefined,
  })
}

/// Calls a script function. Parameters, `var`s, nested function statements and `arguments` live on a new activation object whose parent is the closure scope.
pub fn call_interpreted(
  cx: &Context,
  f: &ObjectRef,
  node: &Arc<FunctionNode>,
  this: Value,
  args: &[Value],
) -> Result<Value, VmError> {
  let _span = tracing::trace_span!(
    "call",
    function = node.name.as_deref().unwrap_or("anonymous")
  )
  .entered();
  let closure = f.parent().unwrap_or_else(|| f.clone());
  let top = top_level_scope(&closure);
  let this = match this {
    Value::Undefined | Value::Null => Value::Object(top.clone()),
    Value::Object(o) if node.check_this && o.class().is_scope() => Value::Object(top.clone()),
    Value::Object(o) => Value::Object(o),
    prim => Value::Object(to_object(&closure, &prim)?),
  };

  let activation = ObjectRef::new(ClassTag::Call, None, Some(closure));
  for (i, param) in node.params.iter().enumerate() {
    let value = args.get(i).cloned().unwrap_or(Value::Undefined);
    activation.define_property(param.as_str(), value, Attributes::PERMANENT)?;
  }
  let arguments_key = PropertyKey::from_name("arguments");
  if !activation.has(&arguments_key) {
    let arguments = new_arguments(&top, f, args)?;
    activation.define_property(arguments_key, arguments, Attributes::PERMANENT)?;
  };
  if node.kind == FunctionKind::Expression {
    // A named function expression can refer to itself by name.
    if let Some(name) = &node.name {
      let key = PropertyKey::from_name(name);
      if !activation.has(&key) && !node.vars.contains(name) {
        activation.define_property(key, f.clone(), Attributes::DONTENUM)?;
      };
    };
  };

  let mut frame = Frame::new(cx, node, activation.clone(), this);
  frame.hoist(&activation)?;
  Ok(match frame.exec_block(&node.body)? {
    Completion::Return(v) => v,
    _ => Value::Undefined,
  })
}
