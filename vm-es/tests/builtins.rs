use vm_es::Context;
use vm_es::Feature;
use vm_es::Value;
use vm_es::VmError;

fn eval_in(cx: &Context, src: &str) -> Result<Value, VmError> {
  let global = cx.init_standard_objects(None, false)?;
  cx.evaluate_string(&global, src, "builtins.js", 1)
}

fn eval(src: &str) -> Value {
  match eval_in(&Context::new(), src) {
    Ok(v) => v,
    Err(e) => panic!("{src}: {e}"),
  }
}

fn string(src: &str) -> String {
  match eval(src) {
    Value::String(s) => s.to_string(),
    other => panic!("{src}: expected a string, got {other:?}"),
  }
}

#[test]
fn object_prototype_methods() {
  assert_eq!(string("({}).toString()"), "[object Object]");
  assert_eq!(eval("({a: 1}).hasOwnProperty('a')"), Value::Bool(true));
  assert_eq!(eval("({a: 1}).hasOwnProperty('toString')"), Value::Bool(false));
  assert_eq!(eval("Object.prototype.isPrototypeOf([])"), Value::Bool(true));
  assert_eq!(eval("[].propertyIsEnumerable('length')"), Value::Bool(false));
  assert_eq!(eval("var o = new Object(); o.x = 1; o.x"), Value::Number(1.0));
  assert_eq!(string("typeof Object('s')"), "object");
}

#[test]
fn function_constructor_and_apply() {
  assert_eq!(eval("Function('a', 'b', 'return a * b')(3, 4)"), Value::Number(12.0));
  assert_eq!(
    eval("var r; try { Function('return ('); } catch (e) { r = e instanceof SyntaxError; } r"),
    Value::Bool(true)
  );
  assert_eq!(
    eval("function f(a, b) { return this.k + a + b; } f.apply({k: 1}, [2, 3])"),
    Value::Number(6.0)
  );
  assert_eq!(
    eval("function g() { return arguments.length; } function f() { return g.apply(null, arguments); } f(1, 2)"),
    Value::Number(2.0)
  );
  assert_eq!(eval("(function (a, b, c) {}).length"), Value::Number(3.0));
}

#[test]
fn array_methods() {
  assert_eq!(string("[1, 2, 3].join('-')"), "1-2-3");
  assert_eq!(string("[1, [2, 3], null, undefined].toString()"), "1,2,3,,");
  assert_eq!(eval("new Array(3).length"), Value::Number(3.0));
  assert_eq!(string("new Array(1, 2).join()"), "1,2");
  assert_eq!(string("var a = [1, 2, 3]; a.length = 1; a.join()"), "1");
  assert_eq!(eval("var a = []; a[4] = 1; a.length"), Value::Number(5.0));
  assert_eq!(eval("[7, 9].pop()"), Value::Number(9.0));
  assert_eq!(eval("[].push(7, 9)"), Value::Number(2.0));
  assert_eq!(string("[1, 2, 3].reverse().join()"), "3,2,1");
  assert_eq!(string("[1].concat([2, 3], 4).join()"), "1,2,3,4");
  assert_eq!(string("[1, 2, 3, 4].slice(1, -1).join()"), "2,3");
  assert_eq!(
    eval("var r; try { new Array(-1); } catch (e) { r = e instanceof RangeError; } r"),
    Value::Bool(true)
  );
  // A cyclic array joins to an empty string where it refers to itself.
  assert_eq!(string("var a = [1]; a[1] = a; a.join()"), "1,");
}

#[test]
fn javascript_1_2_push_returns_last_element() -> Result<(), VmError> {
  let cx = Context::new();
  cx.set_language_version(120)?;
  assert_eq!(eval_in(&cx, "[].push(7, 9)")?, Value::Number(9.0));
  Ok(())
}

#[test]
fn to_string_as_source() -> Result<(), VmError> {
  let cx = Context::new();
  cx.set_feature(Feature::ToStringAsSource, true)?;
  assert_eq!(eval_in(&cx, "[1, 'a'].toString()")?, Value::str("[1, \"a\"]"));
  Ok(())
}

#[test]
fn string_methods() {
  assert_eq!(string("'abc'.charAt(1)"), "b");
  assert_eq!(string("'abc'.charAt(5)"), "");
  assert_eq!(eval("'abc'.charCodeAt(0)"), Value::Number(97.0));
  assert_eq!(eval("'abcabc'.indexOf('c')"), Value::Number(2.0));
  assert_eq!(eval("'abcabc'.lastIndexOf('c')"), Value::Number(5.0));
  assert_eq!(eval("'abc'.indexOf('z')"), Value::Number(-1.0));
  assert_eq!(string("'abc'.substring(2, 0)"), "ab");
  assert_eq!(string("'MiXed'.toLowerCase() + 'MiXed'.toUpperCase()"), "mixedMIXED");
  assert_eq!(string("String.fromCharCode(104, 105)"), "hi");
  assert_eq!(eval("'hello'.length"), Value::Number(5.0));
  assert_eq!(eval("new String('xy').length"), Value::Number(2.0));
  assert_eq!(string("String(12.5)"), "12.5");
}

#[test]
fn primitive_wrappers() {
  assert_eq!(eval("var s = new String('abc'); s.length = 9; s.length"), Value::Number(3.0));
  assert_eq!(eval("Object('ab').length"), Value::Number(2.0));
  assert_eq!(string("typeof new Number(1)"), "object");
  assert_eq!(eval("new Boolean(false).valueOf()"), Value::Bool(false));
  assert_eq!(eval("new Number(4) + 1"), Value::Number(5.0));
  assert_eq!(string("Array(1, 2).join('-')"), "1-2");
  assert_eq!(string("new Array(1, 2).join('+')"), "1+2");
}

#[test]
fn number_and_boolean() {
  assert_eq!(string("(255).toString(16)"), "ff");
  assert_eq!(string("(255).toString()"), "255");
  assert_eq!(eval("Number('  42 ')"), Value::Number(42.0));
  assert_eq!(eval("Number.MAX_VALUE"), Value::Number(f64::MAX));
  assert_eq!(
    eval("var r; try { (1).toString(99); } catch (e) { r = e instanceof RangeError; } r"),
    Value::Bool(true)
  );
  assert_eq!(eval("Boolean('')"), Value::Bool(false));
  assert_eq!(string("new Boolean(1).toString()"), "true");
  // Wrapper objects are always truthy.
  assert_eq!(eval("new Boolean(false) ? 1 : 2"), Value::Number(1.0));
}

#[test]
fn math() {
  assert_eq!(eval("Math.max(1, 3, 2)"), Value::Number(3.0));
  assert_eq!(eval("Math.min()"), Value::Number(f64::INFINITY));
  assert_eq!(eval("Math.abs(-4) + Math.floor(1.7) + Math.ceil(1.2)"), Value::Number(7.0));
  assert_eq!(eval("Math.round(-2.5)"), Value::Number(-2.0));
  assert_eq!(eval("Math.pow(2, 10)"), Value::Number(1024.0));
  assert_eq!(eval("Math.sqrt(81)"), Value::Number(9.0));
  assert_eq!(eval("var r = Math.random(); r >= 0 && r < 1"), Value::Bool(true));
  // Constants are read-only.
  assert_eq!(eval("Math.PI = 3; Math.PI"), Value::Number(std::f64::consts::PI));
}

#[test]
fn global_functions() {
  assert_eq!(eval("parseInt('0x10')"), Value::Number(16.0));
  assert_eq!(eval("parseInt('010')"), Value::Number(8.0));
  assert_eq!(eval("parseInt('12px')"), Value::Number(12.0));
  assert_eq!(eval("parseInt('ff', 16)"), Value::Number(255.0));
  assert_eq!(eval("parseFloat('3.5e1x')"), Value::Number(35.0));
  assert_eq!(eval("isNaN(parseInt('x'))"), Value::Bool(true));
  assert_eq!(eval("isFinite(1 / 0)"), Value::Bool(false));
  assert_eq!(string("typeof NaN + typeof Infinity + typeof undefined"), "numbernumberundefined");
}

#[test]
fn errors() {
  assert_eq!(string("new Error('m').toString()"), "Error: m");
  assert_eq!(string("new RangeError().toString()"), "RangeError");
  assert_eq!(string("var e = TypeError('t'); e.name + ':' + e.message"), "TypeError:t");
  assert_eq!(eval("new URIError('u') instanceof Error"), Value::Bool(true));
  assert_eq!(
    eval("var r; try { throw new EvalError('x'); } catch (e) { r = e.message; } r"),
    Value::str("x")
  );
}

#[test]
fn dates_are_utc() {
  assert_eq!(eval("new Date(0).getTime()"), Value::Number(0.0));
  assert_eq!(eval("new Date(2000, 0, 1).getFullYear()"), Value::Number(2000.0));
  assert_eq!(
    string("new Date(0).toString()"),
    "Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)"
  );
  assert_eq!(string("typeof Date()"), "string");
  assert_eq!(eval("isNaN(new Date('not a date').getTime())"), Value::Bool(true));
  assert_eq!(eval("Date.now() > 0"), Value::Bool(true));
}

#[test]
fn get_year_depends_on_feature() -> Result<(), VmError> {
  let cx = Context::new();
  assert_eq!(eval_in(&cx, "new Date(2000, 0, 1).getYear()")?, Value::Number(100.0));
  cx.set_feature(Feature::NonEcmaGetYear, true)?;
  assert_eq!(eval_in(&cx, "new Date(1995, 0, 1).getYear()")?, Value::Number(95.0));
  assert_eq!(eval_in(&cx, "new Date(2000, 0, 1).getYear()")?, Value::Number(2000.0));
  Ok(())
}

#[test]
fn regexp_objects() {
  assert_eq!(string("/ab+c/gi.toString()"), "/ab+c/gi");
  assert_eq!(eval("/x/m.multiline"), Value::Bool(true));
  assert_eq!(string("new RegExp('a.b', 'g').source"), "a.b");
  assert_eq!(
    eval("var r; try { new RegExp('a', 'gg'); } catch (e) { r = e instanceof SyntaxError; } r"),
    Value::Bool(true)
  );
}
