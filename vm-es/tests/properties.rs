use vm_es::coerce::to_number;
use vm_es::coerce::to_string;
use vm_es::ops::eq;
use vm_es::ops::shallow_eq;
use vm_es::Attributes;
use vm_es::ClassTag;
use vm_es::Context;
use vm_es::IdEnumeration;
use vm_es::ObjectRef;
use vm_es::PropertyKey;
use vm_es::Value;
use vm_es::VmError;

const SAMPLES: [f64; 14] = [
  0.0,
  1.0,
  -1.5,
  0.1,
  1.0 / 3.0,
  123456789.0,
  1e21,
  1.5e-7,
  5e-324,
  f64::MAX,
  f64::MIN_POSITIVE,
  -2.5e300,
  9007199254740993.0,
  f64::INFINITY,
];

#[test]
fn number_string_round_trip() -> Result<(), VmError> {
  let cx = Context::new();
  for x in SAMPLES {
    let s = to_string(&cx, &Value::Number(x))?;
    let back = to_number(&cx, &Value::String(s.clone()))?;
    assert_eq!(back.to_bits(), x.to_bits(), "{x} printed as {s}");
  }
  let s = to_string(&cx, &Value::Number(-0.0))?;
  assert_eq!(&*s, "0");
  assert_eq!(to_number(&cx, &Value::String(s))?.to_bits(), 0.0f64.to_bits());
  Ok(())
}

#[test]
fn equality_is_symmetric() -> Result<(), VmError> {
  let cx = Context::new();
  let global = cx.init_standard_objects(None, false)?;
  let obj = cx.evaluate_string(&global, "({})", "eq.js", 1)?;
  let values = [
    Value::Undefined,
    Value::Null,
    Value::Bool(true),
    Value::Bool(false),
    Value::Number(0.0),
    Value::Number(1.0),
    Value::Number(f64::NAN),
    Value::str(""),
    Value::str("1"),
    Value::str("true"),
    obj,
  ];
  for x in &values {
    for y in &values {
      assert_eq!(eq(&cx, x, y)?, eq(&cx, y, x)?, "{x:?} == {y:?}");
    }
    if !matches!(x, Value::Number(n) if n.is_nan()) {
      assert!(shallow_eq(x, x), "{x:?} === itself");
    };
  }
  assert!(eq(&cx, &Value::Undefined, &Value::Null)?);
  assert!(eq(&cx, &Value::Number(1.0), &Value::str("1"))?);
  assert!(!shallow_eq(&Value::Number(1.0), &Value::str("1")));
  assert!(!eq(&cx, &Value::Number(f64::NAN), &Value::Number(f64::NAN))?);
  Ok(())
}

#[test]
fn prototype_cycles_are_rejected() {
  let a = ObjectRef::new(ClassTag::Object, None, None);
  let b = ObjectRef::new(ClassTag::Object, Some(a.clone()), None);
  let c = ObjectRef::new(ClassTag::Object, Some(b.clone()), None);
  let err = a.set_prototype(Some(c.clone())).unwrap_err();
  assert!(matches!(err, VmError::Ecma(_)));
  assert!(a.prototype().is_none());
  let err = b.set_prototype(Some(c)).unwrap_err();
  assert!(matches!(err, VmError::Ecma(_)));
  assert!(b.prototype().is_some_and(|p| p.ptr_eq(&a)));
}

#[test]
fn slot_attributes() -> Result<(), VmError> {
  let cx = Context::new();
  let o = ObjectRef::new(ClassTag::Object, None, None);
  o.define_property("p", 1, Attributes::PERMANENT)?;
  o.define_property("r", 2, Attributes::READONLY)?;
  o.define_property("h", 3, Attributes::DONTENUM)?;

  assert!(!o.delete_property(&PropertyKey::from_name("p"))?);
  assert_eq!(o.get_value(&PropertyKey::from_name("p")), Some(Value::Number(1.0)));

  o.put_property(&cx, &PropertyKey::from_name("r"), Value::Number(20.0))?;
  assert_eq!(o.get_value(&PropertyKey::from_name("r")), Some(Value::Number(2.0)));

  let ids = o.get_ids();
  assert!(!ids.contains(&PropertyKey::from_name("h")));
  assert!(o.get_all_ids().contains(&PropertyKey::from_name("h")));
  Ok(())
}

#[test]
fn shadowed_keys_enumerate_once() -> Result<(), VmError> {
  let base = ObjectRef::new(ClassTag::Object, None, None);
  base.define_property("a", 1, Attributes::EMPTY)?;
  base.define_property("b", 1, Attributes::EMPTY)?;
  base.define_property("c", 1, Attributes::DONTENUM)?;
  let derived = ObjectRef::new(ClassTag::Object, Some(base), None);
  derived.define_property("a", 2, Attributes::EMPTY)?;
  // Hidden here, so the enumerable `b` below is not visited either.
  derived.define_property("b", 2, Attributes::DONTENUM)?;
  derived.define_property("c", 2, Attributes::EMPTY)?;

  let mut e = IdEnumeration::new(Some(derived));
  let mut keys = Vec::new();
  while e.next() {
    keys.push(e.current());
  }
  assert_eq!(keys, vec![Value::str("a"), Value::str("c")]);
  Ok(())
}
