use super::arg;
use super::incompatible;
use super::FIXED;
use crate::coerce::to_string;
use crate::context::Context;
use crate::error::EcmaError;
use crate::error::EcmaErrorKind;
use crate::error::VmError;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::property::Attributes;
use crate::property::PropertyKey;
use crate::scope::class_prototype;
use crate::scope::top_level_scope;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegExpFn {
  Ctor,
  ToString,
}

impl RegExpFn {
  pub fn name(self) -> &'static str {
    match self {
      RegExpFn::Ctor => "RegExp",
      RegExpFn::ToString => "toString",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      RegExpFn::Ctor => 2,
      RegExpFn::ToString => 0,
    }
  }

  pub(super) fn call(self, cx: &Context, scope: &ObjectRef, this: &Value, args: &[Value]) -> Result<Value, VmError> {
    match self {
      RegExpFn::Ctor => {
        // `RegExp(re)` without flags returns `re` itself.
        if let (Value::Object(re), Value::Undefined) = (arg(args, 0), arg(args, 1)) {
          if re.class() == ClassTag::RegExp {
            return Ok(Value::Object(re));
          };
        };
        construct(cx, scope, args)
      }
      RegExpFn::ToString => {
        let Value::Object(re) = this else {
          return Err(incompatible(self.name()));
        };
        if re.class() != ClassTag::RegExp {
          return Err(incompatible(self.name()));
        };
        let source = match re.get_value(&PropertyKey::from_name("source")) {
          Some(Value::String(s)) => s,
          _ => "".into(),
        };
        Ok(Value::from(format!("/{source}/{}", flags_of(re))))
      }
    }
  }
}

fn flags_of(re: &ObjectRef) -> String {
  [("global", 'g'), ("ignoreCase", 'i'), ("multiline", 'm')]
    .into_iter()
    .filter(|(prop, _)| re.get_value(&PropertyKey::from_name(prop)) == Some(Value::Bool(true)))
    .map(|(_, flag)| flag)
    .collect()
}

/// Creates a RegExp object. Only the flags are validated; the pattern is kept as text.
pub fn new_regexp(_cx: &Context, scope: &ObjectRef, pattern: &str, flags: &str) -> Result<ObjectRef, VmError> {
  let (mut global, mut ignore_case, mut multiline) = (false, false, false);
  for c in flags.chars() {
    let seen = match c {
      'g' => &mut global,
      'i' => &mut ignore_case,
      'm' => &mut multiline,
      _ => {
        return Err(EcmaError::new(EcmaErrorKind::SyntaxError, format!("invalid flag '{c}' after regular expression")).into())
      }
    };
    if *seen {
      return Err(EcmaError::new(EcmaErrorKind::SyntaxError, format!("repeated flag '{c}' in regular expression")).into());
    };
    *seen = true;
  }
  let top = top_level_scope(scope);
  let re = ObjectRef::new(ClassTag::RegExp, class_prototype(&top, "RegExp"), Some(top));
  re.define_property("source", pattern, FIXED)?;
  re.define_property("global", global, FIXED)?;
  re.define_property("ignoreCase", ignore_case, FIXED)?;
  re.define_property("multiline", multiline, FIXED)?;
  re.define_property("lastIndex", 0, Attributes::DONTENUM | Attributes::PERMANENT)?;
  Ok(re)
}

pub(super) fn construct(cx: &Context, scope: &ObjectRef, args: &[Value]) -> Result<Value, VmError> {
  let (pattern, flags) = match (arg(args, 0), arg(args, 1)) {
    (Value::Object(re), Value::Undefined) if re.class() == ClassTag::RegExp => {
      let source = re
        .get_value(&PropertyKey::from_name("source"))
        .unwrap_or(Value::str(""));
      (to_string(cx, &source)?.to_string(), flags_of(&re))
    }
    (p, f) => {
      let pattern = match p {
        Value::Undefined => String::new(),
        p => to_string(cx, &p)?.to_string(),
      };
      let flags = match f {
        Value::Undefined => String::new(),
        f => to_string(cx, &f)?.to_string(),
      };
      (pattern, flags)
    }
  };
  Ok(Value::Object(new_regexp(cx, scope, &pattern, &flags)?))
}
