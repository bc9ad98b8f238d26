use super::arg;
use crate::coerce::to_number;
use crate::context::Context;
use crate::error::VmError;
use crate::value::Value;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::f64::consts;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Constants defined on the `Math` object.
pub(super) const CONSTANTS: [(&str, f64); 8] = [
  ("E", consts::E),
  ("PI", consts::PI),
  ("LN2", consts::LN_2),
  ("LN10", consts::LN_10),
  ("LOG2E", consts::LOG2_E),
  ("LOG10E", consts::LOG10_E),
  ("SQRT2", consts::SQRT_2),
  ("SQRT1_2", consts::FRAC_1_SQRT_2),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MathFn {
  Abs,
  Floor,
  Ceil,
  Round,
  Max,
  Min,
  Pow,
  Sqrt,
  Sin,
  Cos,
  Exp,
  Log,
  Random,
}

impl MathFn {
  pub const ALL: [MathFn; 13] = [
    MathFn::Abs,
    MathFn::Floor,
    MathFn::Ceil,
    MathFn::Round,
    MathFn::Max,
    MathFn::Min,
    MathFn::Pow,
    MathFn::Sqrt,
    MathFn::Sin,
    MathFn::Cos,
    MathFn::Exp,
    MathFn::Log,
    MathFn::Random,
  ];

  pub fn name(self) -> &'static str {
    match self {
      MathFn::Abs => "abs",
      MathFn::Floor => "floor",
      MathFn::Ceil => "ceil",
      MathFn::Round => "round",
      MathFn::Max => "max",
      MathFn::Min => "min",
      MathFn::Pow => "pow",
      MathFn::Sqrt => "sqrt",
      MathFn::Sin => "sin",
      MathFn::Cos => "cos",
      MathFn::Exp => "exp",
      MathFn::Log => "log",
      MathFn::Random => "random",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      MathFn::Random => 0,
      MathFn::Max | MathFn::Min | MathFn::Pow => 2,
      _ => 1,
    }
  }

  pub(super) fn call(self, cx: &Context, args: &[Value]) -> Result<Value, VmError> {
    let x = |i: usize| to_number(cx, &arg(args, i));
    Ok(Value::Number(match self {
      MathFn::Abs => x(0)?.abs(),
      MathFn::Floor => x(0)?.floor(),
      MathFn::Ceil => x(0)?.ceil(),
      MathFn::Round => round(x(0)?),
      MathFn::Max => {
        let mut m = f64::NEG_INFINITY;
        for v in args {
          let n = to_number(cx, v)?;
          if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
          };
          // +0 is larger than -0.
          if n > m || (n == 0.0 && m == 0.0 && m.is_sign_negative()) {
            m = n;
          };
        }
        m
      }
      MathFn::Min => {
        let mut m = f64::INFINITY;
        for v in args {
          let n = to_number(cx, v)?;
          if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
          };
          if n < m || (n == 0.0 && m == 0.0 && n.is_sign_negative()) {
            m = n;
          };
        }
        m
      }
      MathFn::Pow => pow(x(0)?, x(1)?),
      MathFn::Sqrt => x(0)?.sqrt(),
      MathFn::Sin => x(0)?.sin(),
      MathFn::Cos => x(0)?.cos(),
      MathFn::Exp => x(0)?.exp(),
      MathFn::Log => x(0)?.ln(),
      MathFn::Random => random(),
    }))
  }
}

fn round(x: f64) -> f64 {
  if !x.is_finite() || x == 0.0 {
    return x;
  };
  let r = (x + 0.5).floor();
  // Values in [-0.5, 0) round to -0.
  if r == 0.0 && x < 0.0 {
    -0.0
  } else {
    r
  }
}

// Differs from `powf` where ECMAScript requires NaN.
fn pow(x: f64, y: f64) -> f64 {
  if y.is_nan() {
    return f64::NAN;
  };
  if y == 0.0 {
    return 1.0;
  };
  if x.abs() == 1.0 && y.is_infinite() {
    return f64::NAN;
  };
  x.powf(y)
}

static RANDOM_STATE: Lazy<Mutex<u64>> = Lazy::new(|| {
  let seed = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map_or(0, |d| d.as_nanos() as u64);
  Mutex::new(seed | 1)
});

// xorshift64*, taking the top 53 bits as the fraction.
fn random() -> f64 {
  let mut state = RANDOM_STATE.lock();
  let mut s = *state;
  s ^= s >> 12;
  s ^= s << 25;
  s ^= s >> 27;
  *state = s;
  let r = s.wrapping_mul(0x2545_F491_4F6C_DD1D);
  (r >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
  use super::pow;
  use super::random;
  use super::round;

  #[test]
  fn test_round_half_up() {
    assert_eq!(round(2.5), 3.0);
    assert_eq!(round(-2.5), -2.0);
    assert!(round(-0.4).is_sign_negative());
    assert!(round(f64::NAN).is_nan());
  }

  #[test]
  fn test_pow_edge_cases() {
    assert_eq!(pow(f64::NAN, 0.0), 1.0);
    assert!(pow(1.0, f64::NAN).is_nan());
    assert!(pow(-1.0, f64::INFINITY).is_nan());
    assert_eq!(pow(2.0, 10.0), 1024.0);
  }

  #[test]
  fn test_random_range() {
    for _ in 0..1000 {
      let r = random();
      assert!((0.0..1.0).contains(&r));
    }
  }
}
