use super::Frame;
use super::Temp;
use crate::builtins::new_regexp;
use crate::coerce::to_boolean;
use crate::coerce::to_int32;
use crate::coerce::to_number;
use crate::coerce::to_object;
use crate::error::VmError;
use crate::function::call_function;
use crate::function::construct;
use crate::function::new_interpreted_function;
use crate::ops::binary;
use crate::ops::to_property_key;
use crate::property::PropertyKey;
use crate::scope;
use crate::value::Value;
use parse_es::ir::node::Node;
use parse_es::ir::Expr;
use parse_es::ir::PropKey;
use parse_es::ir::UnaryOp;

// How a callee is named in "is not a function" errors.
fn describe(callee: &Expr) -> String {
  match callee {
    Expr::Name { name } => name.clone(),
    Expr::GetProp {
      key: PropKey::Named { name },
      ..
    } => name.clone(),
    Expr::GetSpecial { prop, .. } => prop.name().to_string(),
    Expr::Function { .. } => "function".to_string(),
    _ => "expression".to_string(),
  }
}

impl<'a> Frame<'a> {
  fn prop_key(&mut self, key: &PropKey) -> Result<PropertyKey, VmError> {
    match key {
      PropKey::Named { name } => Ok(PropertyKey::from_name(name)),
      PropKey::Computed { key } => {
        let k = self.eval(key)?;
        to_property_key(self.cx, &k)
      }
    }
  }

  fn eval_args(&mut self, args: &[Node<Expr>]) -> Result<Vec<Value>, VmError> {
    args.iter().map(|a| self.eval(a)).collect()
  }

  // The function value and `this` of a call expression.
  fn callee(&mut self, callee: &Node<Expr>) -> Result<(Value, Value), VmError> {
    match &*callee.stx {
      Expr::Name { name } => scope::name_and_this(self.cx, &self.scope, name),
      Expr::GetProp { obj, key } => {
        let o = self.eval(obj)?;
        let key = self.prop_key(key)?;
        let target = to_object(&self.scope, &o)?;
        let f = target.get_property(self.cx, &key)?.unwrap_or(Value::Undefined);
        Ok((f, Value::Object(target)))
      }
      _ => Ok((self.eval(callee)?, Value::Null)),
    }
  }

  pub(super) fn eval(&mut self, expr: &Node<Expr>) -> Result<Value, VmError> {
    let cx = self.cx;
    cx.check_stack()?;
    Ok(match &*expr.stx {
      Expr::Bool { value } => Value::Bool(*value),
      Expr::Null => Value::Null,
      Expr::Number { value } => Value::Number(value.0),
      Expr::Regexp { pattern, flags } => Value::Object(new_regexp(cx, &self.scope, pattern, flags)?),
      Expr::String { value } => Value::str(value),
      Expr::This => self.this.clone(),
      Expr::Undefined => Value::Undefined,

      Expr::Name { name } => scope::name(cx, &self.scope, name)?,
      Expr::TypeofName { name } => Value::str(scope::typeof_name(cx, &self.scope, name)?),
      Expr::SetName { name, value } => {
        let v = self.eval(value)?;
        scope::set_name(cx, &self.scope, name, v.clone())?;
        v
      }

      Expr::GetProp { obj, key } => {
        let o = self.eval(obj)?;
        let key = self.prop_key(key)?;
        scope::get_prop(cx, &self.scope, &o, &key)?
      }
      Expr::SetProp { obj, key, value } => {
        let o = self.eval(obj)?;
        let key = self.prop_key(key)?;
        let v = self.eval(value)?;
        scope::set_prop(cx, &self.scope, &o, &key, v.clone())?;
        v
      }
      Expr::GetSpecial { obj, prop } => {
        let o = self.eval(obj)?;
        scope::get_special(&self.scope, &o, *prop)?
      }
      Expr::SetSpecial { obj, prop, value } => {
        let o = self.eval(obj)?;
        let v = self.eval(value)?;
        scope::set_special(&self.scope, &o, *prop, &v)?;
        v
      }
      Expr::DeleteName { name } => Value::Bool(scope::delete_name(&self.scope, name)?),
      Expr::DeleteProp { obj, key } => {
        let o = self.eval(obj)?;
        let k = self.eval(key)?;
        Value::Bool(scope::delete_prop(cx, &self.scope, &o, &k)?)
      }

      Expr::Call { callee, args } => {
        let (f, this) = self.callee(callee)?;
        let args = self.eval_args(args)?;
        let Value::Object(f) = f else {
          return Err(VmError::type_error(format!(
            "{} is not a function",
            describe(&callee.stx)
          )));
        };
        if !f.is_callable() {
          return Err(VmError::type_error(format!(
            "{} is not a function",
            describe(&callee.stx)
          )));
        };
        call_function(cx, &f, this, &args)?
      }
      Expr::New { callee, args } => {
        let f = self.eval(callee)?;
        let args = self.eval_args(args)?;
        match f {
          Value::Object(f) if f.is_callable() => construct(cx, &f, &args)?,
          _ => {
            return Err(VmError::type_error(format!(
              "{} is not a constructor",
              describe(&callee.stx)
            )))
          }
        }
      }
      Expr::Function { index } => {
        let Some(node) = self.node.function(*index) else {
          return Err(cx.report_runtime_error(
            format!("no function at index {index}"),
            &self.node.source_name,
            expr.line,
          ));
        };
        Value::Object(new_interpreted_function(node.clone(), &self.scope)?)
      }

      Expr::Unary { op, operand } => {
        let v = self.eval(operand)?;
        match op {
          UnaryOp::BitNot => Value::from(!to_int32(to_number(cx, &v)?)),
          UnaryOp::Neg => Value::Number(-to_number(cx, &v)?),
          UnaryOp::Not => Value::Bool(!to_boolean(cx, &v)?),
          UnaryOp::Pos | UnaryOp::ToNumber => Value::Number(to_number(cx, &v)?),
          UnaryOp::Typeof => Value::str(v.type_of()),
          UnaryOp::Void => Value::Undefined,
        }
      }
      Expr::Binary { op, left, right } => {
        let a = self.eval(left)?;
        let b = self.eval(right)?;
        binary(cx, *op, &a, &b)?
      }
      Expr::And { left, right } => {
        let a = self.eval(left)?;
        if to_boolean(cx, &a)? {
          self.eval(right)?
        } else {
          a
        }
      }
      Expr::Or { left, right } => {
        let a = self.eval(left)?;
        if to_boolean(cx, &a)? {
          a
        } else {
          self.eval(right)?
        }
      }
      Expr::Cond {
        test,
        consequent,
        alternate,
      } => {
        let t = self.eval(test)?;
        if to_boolean(cx, &t)? {
          self.eval(consequent)?
        } else {
          self.eval(alternate)?
        }
      }
      Expr::Comma { exprs } => {
        let mut last = Value::Undefined;
        for e in exprs {
          last = self.eval(e)?;
        }
        last
      }

      Expr::GetTemp { temp } => match self.temp(*temp)? {
        Temp::Value(v) => v.clone(),
        Temp::Enum(_) => Value::Undefined,
      },
      Expr::SetTemp { temp, value } => {
        let v = self.eval(value)?;
        *self.temp(*temp)? = Temp::Value(v.clone());
        v
      }
      Expr::EnumNext { temp } => match self.temp(*temp)? {
        Temp::Enum(e) => Value::Bool(e.next()),
        Temp::Value(_) => Value::Bool(false),
      },
      Expr::EnumId { temp } => match self.temp(*temp)? {
        Temp::Enum(e) => e.current(),
        Temp::Value(_) => Value::Undefined,
      },

      Expr::Error => {
        return Err(cx.report_runtime_error(
          "expression could not be compiled",
          &self.node.source_name,
          expr.line,
        ))
      }
    })
  }
}
