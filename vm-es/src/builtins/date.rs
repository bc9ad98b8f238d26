use super::incompatible;
use crate::coerce::to_integer;
use crate::coerce::to_number;
use crate::coerce::to_primitive;
use crate::context::Context;
use crate::context::Feature;
use crate::error::VmError;
use crate::object::ClassTag;
use crate::object::ObjectData;
use crate::object::ObjectRef;
use crate::scope::class_prototype;
use crate::scope::top_level_scope;
use crate::value::Value;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

const MS_PER_DAY: f64 = 86_400_000.0;
const DAY_NAMES: [&str; 7] = ["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"];
const MONTH_NAMES: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateFn {
  Ctor,
  Now,
  GetTime,
  ValueOf,
  ToString,
  GetYear,
  GetFullYear,
}

impl DateFn {
  pub fn name(self) -> &'static str {
    match self {
      DateFn::Ctor => "Date",
      DateFn::Now => "now",
      DateFn::GetTime => "getTime",
      DateFn::ValueOf => "valueOf",
      DateFn::ToString => "toString",
      DateFn::GetYear => "getYear",
      DateFn::GetFullYear => "getFullYear",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      DateFn::Ctor => 7,
      _ => 0,
    }
  }

  pub(super) fn call(self, cx: &Context, this: &Value, _args: &[Value]) -> Result<Value, VmError> {
    match self {
      // Called as a function, `Date()` ignores its arguments and describes the current time.
      DateFn::Ctor => Ok(Value::from(format_time(now()))),
      DateFn::Now => Ok(Value::Number(now())),
      DateFn::GetTime | DateFn::ValueOf => Ok(Value::Number(self.this_time(this)?)),
      DateFn::ToString => Ok(Value::from(format_time(self.this_time(this)?))),
      DateFn::GetYear => {
        let t = self.this_time(this)?;
        if t.is_nan() {
          return Ok(Value::Number(f64::NAN));
        };
        let year = year_from_time(t);
        let legacy = cx.has_feature(Feature::NonEcmaGetYear);
        Ok(Value::Number(if !legacy || (1900.0..2000.0).contains(&year) {
          year - 1900.0
        } else {
          year
        }))
      }
      DateFn::GetFullYear => {
        let t = self.this_time(this)?;
        Ok(Value::Number(if t.is_nan() { t } else { year_from_time(t) }))
      }
    }
  }

  fn this_time(self, this: &Value) -> Result<f64, VmError> {
    match this {
      Value::Object(o) if o.class() == ClassTag::Date => match o.primitive_value() {
        Some(Value::Number(t)) => Ok(*t),
        _ => Ok(f64::NAN),
      },
      _ => Err(incompatible(self.name())),
    }
  }
}

fn now() -> f64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map_or(0.0, |d| d.as_millis() as f64)
}

fn time_clip(t: f64) -> f64 {
  if !t.is_finite() || t.abs() > 8.64e15 {
    return f64::NAN;
  };
  to_integer(t) + 0.0
}

// Days since 1970-01-01 of the first day of `month` (0-based, may overflow into later years) in `year`.
fn make_day(year: f64, month: f64, date: f64) -> f64 {
  if !year.is_finite() || !month.is_finite() || !date.is_finite() {
    return f64::NAN;
  };
  let y = year + (month / 12.0).floor();
  let m = month.rem_euclid(12.0);
  days_from_civil(y as i64, m as i64 + 1, 1) as f64 + date - 1.0
}

// Howard Hinnant's days_from_civil, for the proleptic Gregorian calendar.
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
  let y = if m <= 2 { y - 1 } else { y };
  let era = y.div_euclid(400);
  let yoe = y - era * 400;
  let mp = (m + 9) % 12;
  let doy = (153 * mp + 2) / 5 + d - 1;
  let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
  era * 146_097 + doe - 719_468
}

// (year, month 1..=12, day 1..=31) of a day count since 1970-01-01.
fn civil_from_days(z: i64) -> (i64, i64, i64) {
  let z = z + 719_468;
  let era = z.div_euclid(146_097);
  let doe = z - era * 146_097;
  let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
  let y = yoe + era * 400;
  let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
  let mp = (5 * doy + 2) / 153;
  let d = doy - (153 * mp + 2) / 5 + 1;
  let m = if mp < 10 { mp + 3 } else { mp - 9 };
  (if m <= 2 { y + 1 } else { y }, m, d)
}

fn year_from_time(t: f64) -> f64 {
  civil_from_days((t / MS_PER_DAY).floor() as i64).0 as f64
}

/// `Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)`. Times are always shown in UTC.
fn format_time(t: f64) -> String {
  if t.is_nan() {
    return "Invalid Date".to_string();
  };
  let days = (t / MS_PER_DAY).floor();
  let ms_in_day = t - days * MS_PER_DAY;
  let days = days as i64;
  let (y, m, d) = civil_from_days(days);
  let secs = (ms_in_day / 1000.0).floor() as i64;
  format!(
    "{} {} {:02} {} {:02}:{:02}:{:02} GMT+0000 (UTC)",
    DAY_NAMES[days.rem_euclid(7) as usize],
    MONTH_NAMES[(m - 1) as usize],
    d,
    y,
    secs / 3600,
    secs / 60 % 60,
    secs % 60,
  )
}

/// `new Date()`, `new Date(ms)` or `new Date(year, month[, date, hours, minutes, seconds, ms])`, all in UTC. Date strings are not parsed and give an invalid date.
pub(super) fn construct(cx: &Context, scope: &ObjectRef, args: &[Value]) -> Result<Value, VmError> {
  let t = match args {
    [] => now(),
    [v] => match to_primitive(cx, v, None)? {
      Value::String(_) => f64::NAN,
      p => time_clip(to_number(cx, &p)?),
    },
    _ => {
      let mut fields = [f64::NAN, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
      for (i, v) in args.iter().take(7).enumerate() {
        fields[i] = to_number(cx, v)?;
      }
      let [mut year, month, date, h, min, s, ms] = fields;
      if year.is_finite() {
        year = to_integer(year);
        if (0.0..=99.0).contains(&year) {
          year += 1900.0;
        };
      };
      let day = make_day(year, to_integer(month), to_integer(date));
      let time = to_integer(h) * 3_600_000.0 + to_integer(min) * 60_000.0 + to_integer(s) * 1000.0 + to_integer(ms);
      if fields.iter().any(|f| !f.is_finite()) {
        f64::NAN
      } else {
        time_clip(day * MS_PER_DAY + time)
      }
    }
  };
  let top = top_level_scope(scope);
  Ok(Value::Object(ObjectRef::with_data(
    ClassTag::Date,
    class_prototype(&top, "Date"),
    Some(top),
    ObjectData::Primitive(Value::Number(t)),
  )))
}

#[cfg(test)]
mod tests {
  use super::civil_from_days;
  use super::days_from_civil;
  use super::format_time;
  use super::make_day;

  #[test]
  fn test_epoch_formatting() {
    assert_eq!(format_time(0.0), "Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)");
    assert_eq!(format_time(f64::NAN), "Invalid Date");
    assert_eq!(format_time(-1000.0), "Wed Dec 31 1969 23:59:59 GMT+0000 (UTC)");
  }

  #[test]
  fn test_civil_days() {
    assert_eq!(days_from_civil(1970, 1, 1), 0);
    assert_eq!(days_from_civil(2000, 3, 1), 11_017);
    assert_eq!(civil_from_days(11_017), (2000, 3, 1));
    assert_eq!(make_day(1999.0, 12.0, 1.0), 10_957.0);
  }
}
