//! Scalar function implementations.
//!
//! Every function except COALESCE returns null when any argument is null.

use crate::ast::ScalarFunc;
use crate::executor::{ExecutionError, ExecutionResult};
use alloc::format;
use alloc::string::{String, ToString};
use chrono::{Datelike, Days, NaiveDate};
use roster_core::Value;

/// Calls a scalar function on already evaluated arguments.
pub(crate) fn call(func: ScalarFunc, args: &[Value]) -> ExecutionResult<Value> {
    if func == ScalarFunc::Coalesce {
        return Ok(args.iter().find(|v| !v.is_null()).cloned().unwrap_or(Value::Null));
    }
    if args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }

    match func {
        ScalarFunc::Concat => {
            let mut out = String::new();
            for value in args {
                out.push_str(&value.to_string());
            }
            Ok(Value::Text(out))
        }
        ScalarFunc::Length => {
            let s = text(arg(args, 0, func)?, func)?;
            Ok(Value::Integer(s.chars().count() as i64))
        }
        ScalarFunc::Substr => {
            let s = text(arg(args, 0, func)?, func)?;
            let start = integer(arg(args, 1, func)?, func)?;
            let length = match args.get(2) {
                Some(v) => Some(integer(v, func)?),
                None => None,
            };
            substr(s, start, length).map(Value::Text)
        }
        ScalarFunc::Upper => Ok(Value::Text(text(arg(args, 0, func)?, func)?.to_uppercase())),
        ScalarFunc::Lower => Ok(Value::Text(text(arg(args, 0, func)?, func)?.to_lowercase())),
        ScalarFunc::Trim => Ok(Value::Text(text(arg(args, 0, func)?, func)?.trim().to_string())),
        ScalarFunc::Round => {
            let digits = match args.get(1) {
                Some(v) => integer(v, func)?,
                None => 0,
            };
            round(arg(args, 0, func)?, digits)
        }
        ScalarFunc::Abs => match arg(args, 0, func)? {
            Value::Integer(i) => i
                .checked_abs()
                .map(Value::Integer)
                .ok_or(ExecutionError::NumericOverflow),
            Value::Real(r) => Ok(Value::Real(libm::fabs(*r))),
            other => Err(wrong_type(func, other)),
        },
        ScalarFunc::DateAdd => {
            let date = date(arg(args, 0, func)?, func)?;
            let days = integer(arg(args, 1, func)?, func)?;
            let shifted = if days >= 0 {
                date.checked_add_days(Days::new(days as u64))
            } else {
                date.checked_sub_days(Days::new(days.unsigned_abs()))
            };
            shifted.map(Value::Date).ok_or(ExecutionError::NumericOverflow)
        }
        ScalarFunc::DateDiff => {
            let to = date(arg(args, 0, func)?, func)?;
            let from = date(arg(args, 1, func)?, func)?;
            Ok(Value::Integer(to.signed_duration_since(from).num_days()))
        }
        ScalarFunc::Year => Ok(Value::Integer(date(arg(args, 0, func)?, func)?.year() as i64)),
        ScalarFunc::Month => Ok(Value::Integer(date(arg(args, 0, func)?, func)?.month() as i64)),
        ScalarFunc::Day => Ok(Value::Integer(date(arg(args, 0, func)?, func)?.day() as i64)),
        ScalarFunc::Coalesce => Ok(Value::Null),
    }
}

fn arg(args: &[Value], index: usize, func: ScalarFunc) -> ExecutionResult<&Value> {
    args.get(index).ok_or_else(|| {
        ExecutionError::invalid_plan(format!("{} is missing argument {}", func.name(), index + 1))
    })
}

fn wrong_type(func: ScalarFunc, value: &Value) -> ExecutionError {
    ExecutionError::type_mismatch(format!(
        "{} does not accept {}",
        func.name(),
        value.data_type().map_or("null", |t| t.name())
    ))
}

fn text(value: &Value, func: ScalarFunc) -> ExecutionResult<&str> {
    value.as_str().ok_or_else(|| wrong_type(func, value))
}

fn integer(value: &Value, func: ScalarFunc) -> ExecutionResult<i64> {
    value.as_i64().ok_or_else(|| wrong_type(func, value))
}

/// Dates may also be given in their ISO text form.
fn date(value: &Value, func: ScalarFunc) -> ExecutionResult<NaiveDate> {
    match value {
        Value::Date(d) => Ok(*d),
        Value::Text(s) => s.parse::<NaiveDate>().map_err(|_| {
            ExecutionError::type_mismatch(format!("{} expects a date, got '{}'", func.name(), s))
        }),
        other => Err(wrong_type(func, other)),
    }
}

/// 1-based substring over characters. Positions before the first character
/// count against `length` but produce nothing.
fn substr(s: &str, start: i64, length: Option<i64>) -> ExecutionResult<String> {
    let end = match length {
        Some(len) if len < 0 => {
            return Err(ExecutionError::invalid_argument(format!(
                "SUBSTR length must not be negative, got {}",
                len
            )))
        }
        Some(len) => start.saturating_add(len),
        None => i64::MAX,
    };
    let begin = start.max(1);
    if end <= begin {
        return Ok(String::new());
    }
    let skip = usize::try_from(begin - 1).unwrap_or(usize::MAX);
    let take = usize::try_from(end - begin).unwrap_or(usize::MAX);
    Ok(s.chars().skip(skip).take(take).collect())
}

fn round(value: &Value, digits: i64) -> ExecutionResult<Value> {
    match value {
        Value::Integer(i) if digits >= 0 => Ok(Value::Integer(*i)),
        Value::Integer(i) => {
            let rounded = round_f64(*i as f64, digits);
            if rounded.is_finite() && libm::fabs(rounded) < i64::MAX as f64 {
                Ok(Value::Integer(rounded as i64))
            } else {
                Err(ExecutionError::NumericOverflow)
            }
        }
        Value::Real(r) => Ok(Value::Real(round_f64(*r, digits))),
        other => Err(wrong_type(ScalarFunc::Round, other)),
    }
}

/// Rounds half away from zero at the given number of decimal digits.
fn round_f64(x: f64, digits: i64) -> f64 {
    let digits = digits.clamp(-308, 308);
    let factor = libm::pow(10.0, digits.unsigned_abs() as f64);
    let rounded = if digits >= 0 {
        libm::round(x * factor) / factor
    } else {
        libm::round(x / factor) * factor
    };
    if rounded.is_finite() {
        rounded
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_null_propagation() {
        assert_eq!(call(ScalarFunc::Length, &[Value::Null]).unwrap(), Value::Null);
        assert_eq!(
            call(ScalarFunc::Concat, &[text("a"), Value::Null]).unwrap(),
            Value::Null
        );
        assert_eq!(
            call(ScalarFunc::Coalesce, &[Value::Null, text("x"), text("y")]).unwrap(),
            text("x")
        );
        assert_eq!(call(ScalarFunc::Coalesce, &[Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn test_string_functions() {
        assert_eq!(
            call(ScalarFunc::Concat, &[text("Ann"), text(" "), text("Lee")]).unwrap(),
            text("Ann Lee")
        );
        assert_eq!(
            call(ScalarFunc::Concat, &[text("pts:"), Value::Integer(300)]).unwrap(),
            text("pts:300")
        );
        assert_eq!(call(ScalarFunc::Length, &[text("café")]).unwrap(), Value::Integer(4));
        assert_eq!(call(ScalarFunc::Upper, &[text("ann")]).unwrap(), text("ANN"));
        assert_eq!(call(ScalarFunc::Lower, &[text("ANN")]).unwrap(), text("ann"));
        assert_eq!(call(ScalarFunc::Trim, &[text("  x ")]).unwrap(), text("x"));
        assert!(matches!(
            call(ScalarFunc::Length, &[Value::Integer(1)]),
            Err(ExecutionError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_substr() {
        let s = text("Portland");
        assert_eq!(
            call(ScalarFunc::Substr, &[s.clone(), Value::Integer(1), Value::Integer(4)]).unwrap(),
            text("Port")
        );
        assert_eq!(
            call(ScalarFunc::Substr, &[s.clone(), Value::Integer(5)]).unwrap(),
            text("land")
        );
        assert_eq!(
            call(ScalarFunc::Substr, &[s.clone(), Value::Integer(0), Value::Integer(3)]).unwrap(),
            text("Po")
        );
        assert_eq!(
            call(ScalarFunc::Substr, &[s.clone(), Value::Integer(20), Value::Integer(3)]).unwrap(),
            text("")
        );
        assert!(matches!(
            call(ScalarFunc::Substr, &[s, Value::Integer(1), Value::Integer(-1)]),
            Err(ExecutionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_round_and_abs() {
        assert_eq!(
            call(ScalarFunc::Round, &[Value::Real(2.5)]).unwrap(),
            Value::Real(3.0)
        );
        assert_eq!(
            call(ScalarFunc::Round, &[Value::Real(3.14159), Value::Integer(2)]).unwrap(),
            Value::Real(3.14)
        );
        assert_eq!(
            call(ScalarFunc::Round, &[Value::Integer(1234), Value::Integer(-2)]).unwrap(),
            Value::Integer(1200)
        );
        assert_eq!(
            call(ScalarFunc::Abs, &[Value::Integer(-7)]).unwrap(),
            Value::Integer(7)
        );
        assert_eq!(
            call(ScalarFunc::Abs, &[Value::Integer(i64::MIN)]),
            Err(ExecutionError::NumericOverflow)
        );
    }

    #[test]
    fn test_date_functions() {
        let jan_30 = Value::date(2021, 1, 30).unwrap();
        assert_eq!(
            call(ScalarFunc::DateAdd, &[jan_30.clone(), Value::Integer(3)]).unwrap(),
            Value::date(2021, 2, 2).unwrap()
        );
        assert_eq!(
            call(ScalarFunc::DateAdd, &[Value::date(2021, 1, 1).unwrap(), Value::Integer(-1)])
                .unwrap(),
            Value::date(2020, 12, 31).unwrap()
        );
        assert_eq!(
            call(ScalarFunc::DateAdd, &[text("2020-02-28"), Value::Integer(1)]).unwrap(),
            Value::date(2020, 2, 29).unwrap()
        );
        assert_eq!(
            call(
                ScalarFunc::DateDiff,
                &[Value::date(2021, 3, 1).unwrap(), Value::date(2021, 2, 1).unwrap()]
            )
            .unwrap(),
            Value::Integer(28)
        );
        assert_eq!(call(ScalarFunc::Year, &[jan_30.clone()]).unwrap(), Value::Integer(2021));
        assert_eq!(call(ScalarFunc::Month, &[jan_30.clone()]).unwrap(), Value::Integer(1));
        assert_eq!(call(ScalarFunc::Day, &[jan_30]).unwrap(), Value::Integer(30));
        assert!(matches!(
            call(ScalarFunc::Year, &[text("not a date")]),
            Err(ExecutionError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_missing_argument() {
        assert!(matches!(
            call(ScalarFunc::Length, &vec![]),
            Err(ExecutionError::InvalidPlan(_))
        ));
    }
}
