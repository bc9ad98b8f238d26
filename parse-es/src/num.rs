use core::hash::Hash;
use core::hash::Hasher;
use serde::Serialize;
use serde::Serializer;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

// This provides Eq for f64.
#[derive(Copy, Clone, Debug)]
pub struct JsNumber(pub f64);

impl Display for JsNumber {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl PartialEq for JsNumber {
  fn eq(&self, other: &Self) -> bool {
    if self.0.is_nan() {
      return other.0.is_nan();
    };
    self.0.to_bits() == other.0.to_bits()
  }
}

impl Eq for JsNumber {}

impl Ord for JsNumber {
  fn cmp(&self, other: &Self) -> Ordering {
    // Only NaNs cannot be compared, and we treat them as equal.
    self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
  }
}

impl PartialOrd for JsNumber {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Hash for JsNumber {
  fn hash<H: Hasher>(&self, state: &mut H) {
    if !self.0.is_nan() {
      self.0.to_bits().hash(state);
    };
  }
}

impl Serialize for JsNumber {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.0)
  }
}

fn digit_value(c: char, radix: u32) -> Option<u32> {
  c.to_digit(36).filter(|d| *d < radix)
}

/// Converts a run of digits in `radix` (2 to 36) to the nearest double.
///
/// Stops at the first character that is not a digit in `radix` and converts what came before it. Returns NaN if there are no digits at all. Radix 10 goes through the standard decimal parser so that long mantissas round correctly; power-of-two radixes are rounded half-to-even on the 53 significant bits.
pub fn string_to_number(digits: &str, radix: u32) -> f64 {
  let end = digits
    .char_indices()
    .find(|(_, c)| digit_value(*c, radix).is_none())
    .map(|(i, _)| i)
    .unwrap_or(digits.len());
  let digits = &digits[..end];
  if digits.is_empty() {
    return f64::NAN;
  };
  if radix == 10 {
    return digits.parse::<f64>().unwrap_or(f64::NAN);
  };

  let mut value = 0f64;
  for c in digits.chars() {
    // Checked above.
    let d = digit_value(c, radix).unwrap_or(0);
    value = value * radix as f64 + d as f64;
  }
  if value < 9007199254740992.0 || !radix.is_power_of_two() {
    return value;
  };
  power_of_two_radix_to_number(digits, radix)
}

fn power_of_two_radix_to_number(digits: &str, radix: u32) -> f64 {
  let bits_per_digit = radix.trailing_zeros();
  let mut bits = Vec::<bool>::with_capacity(digits.len() * bits_per_digit as usize);
  for c in digits.chars() {
    let d = digit_value(c, radix).unwrap_or(0);
    for shift in (0..bits_per_digit).rev() {
      bits.push((d >> shift) & 1 == 1);
    }
  }
  let first_one = match bits.iter().position(|b| *b) {
    Some(i) => i,
    None => return 0.0,
  };
  let bits = &bits[first_one..];
  if bits.len() <= 53 {
    return bits.iter().fold(0f64, |acc, b| acc * 2.0 + if *b { 1.0 } else { 0.0 });
  };
  let mut mantissa: u64 = 0;
  for b in &bits[..53] {
    mantissa = (mantissa << 1) | (*b as u64);
  }
  let round_bit = bits[53];
  let sticky = bits[54..].iter().any(|b| *b);
  if round_bit && (sticky || mantissa & 1 == 1) {
    mantissa += 1;
  };
  let exponent = (bits.len() - 53) as i32;
  (mantissa as f64) * 2f64.powi(exponent)
}

/// Shortest round-trip decimal digits of a finite positive number, and the exponent `n` such that the value is `0.digits * 10^n`.
fn shortest_digits(v: f64) -> (String, i32) {
  // `{:e}` formats with the shortest digit string that parses back to the same value.
  let formatted = format!("{v:e}");
  let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
  let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
  let digits = digits.trim_end_matches('0');
  let digits = if digits.is_empty() { "0" } else { digits };
  (digits.to_string(), exponent.parse::<i32>().unwrap_or(0) + 1)
}

/// Formats a number the way the language's ToString does.
pub fn number_to_string(v: f64) -> String {
  if v.is_nan() {
    return "NaN".to_string();
  };
  if v == 0.0 {
    return "0".to_string();
  };
  if v.is_infinite() {
    return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
  };
  if v < 0.0 {
    return format!("-{}", number_to_string(-v));
  };
  let (digits, n) = shortest_digits(v);
  let k = digits.len() as i32;
  if k <= n && n <= 21 {
    return format!("{digits}{}", "0".repeat((n - k) as usize));
  };
  if 0 < n && n <= 21 {
    let (int, frac) = digits.split_at(n as usize);
    return format!("{int}.{frac}");
  };
  if -6 < n && n <= 0 {
    return format!("0.{}{digits}", "0".repeat((-n) as usize));
  };
  let e = n - 1;
  let sign = if e < 0 { '-' } else { '+' };
  if k == 1 {
    return format!("{digits}e{sign}{}", e.abs());
  };
  let (first, rest) = digits.split_at(1);
  format!("{first}.{rest}e{sign}{}", e.abs())
}

/// Formats a number in `radix` (2 to 36). Radix 10 is the same as [`number_to_string`].
pub fn number_to_string_radix(v: f64, radix: u32) -> String {
  if radix == 10 || !(2..=36).contains(&radix) || !v.is_finite() {
    return number_to_string(v);
  };
  if v == 0.0 {
    return "0".to_string();
  };
  let negative = v < 0.0;
  let v = v.abs();
  let mut int = v.trunc();
  let mut frac = v - int;
  let r = radix as f64;
  let mut int_digits = Vec::new();
  if int == 0.0 {
    int_digits.push('0');
  };
  while int >= 1.0 {
    let d = (int % r) as u32;
    int_digits.push(char::from_digit(d, radix).unwrap_or('0'));
    int = ((int - d as f64) / r).trunc();
  }
  int_digits.reverse();
  let mut out = String::new();
  if negative {
    out.push('-');
  };
  out.extend(int_digits);
  if frac > 0.0 {
    out.push('.');
    // Enough digits to cover the 52 bits of fraction in radix 2.
    let mut remaining = 52;
    while frac > 0.0 && remaining > 0 {
      frac *= r;
      let d = frac.trunc();
      frac -= d;
      out.push(char::from_digit(d as u32, radix).unwrap_or('0'));
      remaining -= 1;
    }
  };
  out
}

#[cfg(test)]
mod tests {
  use super::number_to_string;
  use super::number_to_string_radix;
  use super::string_to_number;

  #[test]
  fn test_string_to_number_radixes() {
    assert_eq!(string_to_number("1F", 16), 31.0);
    assert_eq!(string_to_number("10", 8), 8.0);
    assert_eq!(string_to_number("1e2", 10), 1.0);
    assert_eq!(string_to_number("12z", 10), 12.0);
    assert!(string_to_number("", 16).is_nan());
  }

  #[test]
  fn test_string_to_number_rounds_long_hex() {
    // 2^53 + 1 is not representable and rounds to even.
    assert_eq!(string_to_number("20000000000001", 16), 9007199254740992.0);
    assert_eq!(string_to_number("20000000000003", 16), 9007199254740996.0);
  }

  #[test]
  fn test_number_to_string_forms() {
    assert_eq!(number_to_string(0.0), "0");
    assert_eq!(number_to_string(-0.0), "0");
    assert_eq!(number_to_string(139.0), "139");
    assert_eq!(number_to_string(1.5), "1.5");
    assert_eq!(number_to_string(-2.25), "-2.25");
    assert_eq!(number_to_string(0.000001), "0.000001");
    assert_eq!(number_to_string(0.0000001), "1e-7");
    assert_eq!(number_to_string(1e21), "1e+21");
    assert_eq!(number_to_string(1e20), "100000000000000000000");
    assert_eq!(number_to_string(1.25e22), "1.25e+22");
    assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(number_to_string(f64::NAN), "NaN");
    assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
  }

  #[test]
  fn test_number_to_string_radix() {
    assert_eq!(number_to_string_radix(255.0, 16), "ff");
    assert_eq!(number_to_string_radix(-8.0, 2), "-1000");
    assert_eq!(number_to_string_radix(0.5, 2), "0.1");
    assert_eq!(number_to_string_radix(35.0, 36), "z");
  }
}
