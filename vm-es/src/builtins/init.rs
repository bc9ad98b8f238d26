use super::math;
use super::number;
use super::ArrayFn;
use super::BooleanFn;
use super::BuiltinFn;
use super::DateFn;
use super::ErrorFn;
use super::FunctionFn;
use super::GlobalFn;
use super::MathFn;
use super::NumberFn;
use super::ObjectFn;
use super::RegExpFn;
use super::StringFn;
use super::FIXED;
use crate::context::Context;
use crate::error::EcmaErrorKind;
use crate::error::VmError;
use crate::function::new_builtin_function_with_proto;
use crate::function::FunctionData;
use crate::object::ClassTag;
use crate::object::ObjectData;
use crate::object::ObjectRef;
use crate::property::Attributes;
use crate::value::Value;

struct Installer {
  global: ObjectRef,
  object_proto: ObjectRef,
  function_proto: ObjectRef,
  /// Everything that gets sealed when sealing is requested.
  installed: Vec<ObjectRef>,
}

impl Installer {
  fn function(&self, builtin: BuiltinFn) -> Result<ObjectRef, VmError> {
    new_builtin_function_with_proto(&self.global, Some(self.function_proto.clone()), builtin)
  }

  fn methods(&self, target: &ObjectRef, members: impl IntoIterator<Item = BuiltinFn>) -> Result<(), VmError> {
    for m in members {
      target.define_property(m.name(), self.function(m)?, Attributes::DONTENUM)?;
    }
    Ok(())
  }

  // An object inheriting from Object.prototype.
  fn object(&self, class: ClassTag, data: ObjectData) -> ObjectRef {
    ObjectRef::with_data(class, Some(self.object_proto.clone()), Some(self.global.clone()), data)
  }

  /// Creates the constructor, links it with `proto` and defines it on the global object.
  fn class(&mut self, ctor: BuiltinFn, proto: ObjectRef, methods: &[BuiltinFn]) -> Result<ObjectRef, VmError> {
    let f = self.function(ctor)?;
    f.define_property("prototype", proto.clone(), FIXED)?;
    proto.define_property("constructor", f.clone(), Attributes::DONTENUM)?;
    self.methods(&proto, methods.iter().copied())?;
    self.global.define_property(ctor.name(), f.clone(), Attributes::DONTENUM)?;
    self.installed.push(f.clone());
    self.installed.push(proto);
    Ok(f)
  }
}

/// Installs the standard objects into `scope`, or into a new global object, and returns it.
///
/// With `sealed`, every installed constructor and prototype, and Math, is sealed afterwards.
pub fn init_standard_objects(_cx: &Context, scope: Option<ObjectRef>, sealed: bool) -> Result<ObjectRef, VmError> {
  let global = scope.unwrap_or_else(|| ObjectRef::new(ClassTag::Global, None, None));
  let object_proto = ObjectRef::new(ClassTag::Object, None, Some(global.clone()));
  let function_proto = ObjectRef::with_data(
    ClassTag::Function,
    Some(object_proto.clone()),
    Some(global.clone()),
    ObjectData::Function(FunctionData::Builtin(BuiltinFn::Function(FunctionFn::Prototype))),
  );
  function_proto.define_property("length", 0, FIXED)?;
  function_proto.define_property("name", "", FIXED)?;
  global.set_prototype(Some(object_proto.clone()))?;

  let mut ins = Installer {
    global: global.clone(),
    object_proto: object_proto.clone(),
    function_proto: function_proto.clone(),
    installed: Vec::new(),
  };

  ins.class(BuiltinFn::Object(ObjectFn::Ctor), object_proto, &[
    BuiltinFn::Object(ObjectFn::ToString),
    BuiltinFn::Object(ObjectFn::ToLocaleString),
    BuiltinFn::Object(ObjectFn::ValueOf),
    BuiltinFn::Object(ObjectFn::HasOwnProperty),
    BuiltinFn::Object(ObjectFn::IsPrototypeOf),
    BuiltinFn::Object(ObjectFn::PropertyIsEnumerable),
  ])?;
  ins.class(BuiltinFn::Function(FunctionFn::Ctor), function_proto, &[
    BuiltinFn::Function(FunctionFn::ToString),
    BuiltinFn::Function(FunctionFn::Call),
    BuiltinFn::Function(FunctionFn::Apply),
  ])?;

  let error_proto = ins.object(ClassTag::Error, ObjectData::None);
  error_proto.define_property("name", "Error", Attributes::DONTENUM)?;
  error_proto.define_property("message", "", Attributes::DONTENUM)?;
  ins.class(BuiltinFn::Error(ErrorFn::Ctor(EcmaErrorKind::Error)), error_proto.clone(), &[
    BuiltinFn::Error(ErrorFn::ToString),
  ])?;
  for kind in EcmaErrorKind::ALL {
    if kind == EcmaErrorKind::Error {
      continue;
    };
    let proto = ObjectRef::new(ClassTag::Error, Some(error_proto.clone()), Some(global.clone()));
    proto.define_property("name", kind.name(), Attributes::DONTENUM)?;
    proto.define_property("message", "", Attributes::DONTENUM)?;
    ins.class(BuiltinFn::Error(ErrorFn::Ctor(kind)), proto, &[])?;
  }

  let array_proto = ins.object(ClassTag::Array, ObjectData::None);
  array_proto.define_property("length", 0, Attributes::DONTENUM | Attributes::PERMANENT)?;
  ins.class(BuiltinFn::Array(ArrayFn::Ctor), array_proto, &[
    BuiltinFn::Array(ArrayFn::Join),
    BuiltinFn::Array(ArrayFn::ToString),
    BuiltinFn::Array(ArrayFn::Push),
    BuiltinFn::Array(ArrayFn::Pop),
    BuiltinFn::Array(ArrayFn::Reverse),
    BuiltinFn::Array(ArrayFn::Concat),
    BuiltinFn::Array(ArrayFn::Slice),
  ])?;

  let string_proto = ins.object(ClassTag::String, ObjectData::Primitive(Value::str("")));
  string_proto.define_property("length", 0, FIXED)?;
  let string_ctor = ins.class(BuiltinFn::String(StringFn::Ctor), string_proto, &[
    BuiltinFn::String(StringFn::CharAt),
    BuiltinFn::String(StringFn::CharCodeAt),
    BuiltinFn::String(StringFn::IndexOf),
    BuiltinFn::String(StringFn::LastIndexOf),
    BuiltinFn::String(StringFn::Substring),
    BuiltinFn::String(StringFn::ToLowerCase),
    BuiltinFn::String(StringFn::ToUpperCase),
    BuiltinFn::String(StringFn::ToString),
    BuiltinFn::String(StringFn::ValueOf),
  ])?;
  ins.methods(&string_ctor, [BuiltinFn::String(StringFn::FromCharCode)])?;

  let boolean_proto = ins.object(ClassTag::Boolean, ObjectData::Primitive(Value::Bool(false)));
  ins.class(BuiltinFn::Boolean(BooleanFn::Ctor), boolean_proto, &[
    BuiltinFn::Boolean(BooleanFn::ToString),
    BuiltinFn::Boolean(BooleanFn::ValueOf),
  ])?;

  let number_proto = ins.object(ClassTag::Number, ObjectData::Primitive(Value::Number(0.0)));
  let number_ctor = ins.class(BuiltinFn::Number(NumberFn::Ctor), number_proto, &[
    BuiltinFn::Number(NumberFn::ToString),
    BuiltinFn::Number(NumberFn::ValueOf),
  ])?;
  for (name, value) in number::CONSTANTS {
    number_ctor.define_property(name, value, FIXED)?;
  }

  let date_proto = ins.object(ClassTag::Date, ObjectData::Primitive(Value::Number(f64::NAN)));
  let date_ctor = ins.class(BuiltinFn::Date(DateFn::Ctor), date_proto, &[
    BuiltinFn::Date(DateFn::GetTime),
    BuiltinFn::Date(DateFn::ValueOf),
    BuiltinFn::Date(DateFn::ToString),
    BuiltinFn::Date(DateFn::GetYear),
    BuiltinFn::Date(DateFn::GetFullYear),
  ])?;
  ins.methods(&date_ctor, [BuiltinFn::Date(DateFn::Now)])?;

  let regexp_proto = ins.object(ClassTag::RegExp, ObjectData::None);
  ins.class(BuiltinFn::RegExp(RegExpFn::Ctor), regexp_proto, &[
    BuiltinFn::RegExp(RegExpFn::ToString),
  ])?;

  let math = ins.object(ClassTag::Math, ObjectData::None);
  for (name, value) in math::CONSTANTS {
    math.define_property(name, value, FIXED)?;
  }
  ins.methods(&math, MathFn::ALL.into_iter().map(BuiltinFn::Math))?;
  global.define_property("Math", math.clone(), Attributes::DONTENUM)?;
  ins.installed.push(math);

  ins.methods(&global, GlobalFn::ALL.into_iter().map(BuiltinFn::Global))?;
  let fixed_value = Attributes::DONTENUM | Attributes::PERMANENT;
  global.define_property("NaN", f64::NAN, fixed_value)?;
  global.define_property("Infinity", f64::INFINITY, fixed_value)?;
  global.define_property("undefined", Value::Undefined, fixed_value)?;

  for (name, package) in [("Packages", ""), ("java", "java")] {
    let ns = ins.object(ClassTag::HostNamespace, ObjectData::Namespace(package.to_string()));
    global.define_property(name, ns, Attributes::DONTENUM)?;
  }

  if sealed {
    for obj in &ins.installed {
      obj.seal();
    }
  };
  tracing::debug!(sealed, objects = ins.installed.len(), "standard objects initialized");
  Ok(global)
}
