//! Value type definitions for Roster.
//!
//! This module defines the `Value` enum which represents any scalar a row cell
//! or an expression can hold.

use crate::error::{Error, Result};
use crate::types::DataType;
use alloc::format;
use alloc::string::{String, ToString};
use chrono::NaiveDate;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A scalar value.
#[derive(Clone, Debug)]
pub enum Value {
    /// Null value. Also stands for the *unknown* truth value.
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Real(f64),
    /// UTF-8 string
    Text(String),
    /// Calendar date
    Date(NaiveDate),
}

impl Value {
    /// Returns the data type of this value, or None if it's Null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Integer(_) => Some(DataType::Integer),
            Value::Real(_) => Some(DataType::Real),
            Value::Text(_) => Some(DataType::Text),
            Value::Date(_) => Some(DataType::Date),
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean value if this is a Boolean, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the i64 value if this is an Integer, None otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the f64 value if this is a Real, None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value widened to f64 if it is numeric.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is Text, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the date if this is a Date, None otherwise.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// Parses an ISO-8601 `YYYY-MM-DD` string into a Date value.
    pub fn parse_date(s: &str) -> Result<Value> {
        s.parse::<NaiveDate>()
            .map(Value::Date)
            .map_err(|_| Error::invalid_value(DataType::Date, s))
    }

    /// Builds a Date value from calendar components.
    pub fn date(year: i32, month: u32, day: u32) -> Result<Value> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Value::Date)
            .ok_or_else(|| Error::invalid_value(DataType::Date, format!("{}-{}-{}", year, month, day)))
    }

    /// SQL comparison.
    ///
    /// Returns `Ok(None)` when either side is null (the *unknown* outcome).
    /// Integers and reals are compared after promotion, and a date compared
    /// with text compares the date's canonical ISO-8601 form lexicographically.
    /// Any other pairing of different tags is a type error.
    pub fn sql_cmp(&self, other: &Value) -> Result<Option<Ordering>> {
        let ord = match (self, other) {
            (Value::Null, _) | (_, Value::Null) => return Ok(None),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Integer(a), Value::Real(b)) => cmp_int_real(*a, *b),
            (Value::Real(a), Value::Integer(b)) => cmp_int_real(*b, *a).reverse(),
            (Value::Real(a), Value::Real(b)) => cmp_f64(*a, *b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Date(a), Value::Text(b)) => a.to_string().as_str().cmp(b.as_str()),
            (Value::Text(a), Value::Date(b)) => a.as_str().cmp(b.to_string().as_str()),
            (a, b) => {
                return Err(Error::incompatible_types(
                    "compare",
                    a.data_type(),
                    b.data_type(),
                ))
            }
        };
        Ok(Some(ord))
    }

    /// Returns a type ordering value for comparing different types.
    fn type_order(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) | Value::Real(_) => 2,
            Value::Text(_) => 3,
            Value::Date(_) => 4,
        }
    }
}

// NaN sorts above every other real.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

// 2^63; every real in [-2^63, 2^63) truncates to an i64 without saturating.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Exact integer/real comparison, without rounding the integer through f64.
fn cmp_int_real(a: i64, b: f64) -> Ordering {
    if b.is_nan() || b >= I64_BOUND {
        return Ordering::Less;
    }
    if b < -I64_BOUND {
        return Ordering::Greater;
    }
    let whole = libm::trunc(b);
    match a.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0f64.partial_cmp(&(b - whole)).unwrap_or(Ordering::Equal),
        other => other,
    }
}

/// The integer a real equals exactly, if any.
fn integral(f: f64) -> Option<i64> {
    (libm::trunc(f) == f && (-I64_BOUND..I64_BOUND).contains(&f)).then(|| f as i64)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(a), Value::Real(b)) | (Value::Real(b), Value::Integer(a)) => {
                integral(*b) == Some(*a)
            }
            (Value::Real(a), Value::Real(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Integers and reals share a tag: 1 and 1.0 are equal.
        self.type_order().hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Real(f) => match integral(*f) {
                Some(i) => i.hash(state),
                None if f.is_nan() => f64::NAN.to_bits().hash(state),
                None => f.to_bits().hash(state),
            },
            Value::Text(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order used for sorting: null first, integers and reals compared
/// exactly by numeric value, mismatched tags ordered by tag.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Integer(a), Value::Real(b)) => cmp_int_real(*a, *b),
            (Value::Real(a), Value::Integer(b)) => cmp_int_real(*b, *a).reverse(),
            (Value::Real(a), Value::Real(b)) => cmp_f64(*a, *b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            _ => self.type_order().cmp(&other.type_order()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_check() {
        assert_eq!(Value::Integer(42).data_type(), Some(DataType::Integer));
        assert_eq!(Value::Null.data_type(), None);
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(100).as_i64(), Some(100));
        assert_eq!(Value::Real(3.5).as_f64(), Some(3.5));
        assert_eq!(Value::Integer(2).to_f64(), Some(2.0));
        assert_eq!(Value::Text("hello".into()).as_str(), Some("hello"));
        assert_eq!(Value::Text("x".into()).to_f64(), None);
    }

    #[test]
    fn test_parse_date() {
        let d = Value::parse_date("2021-03-14").unwrap();
        assert_eq!(d, Value::date(2021, 3, 14).unwrap());
        assert_eq!(d.to_string(), "2021-03-14");
        assert!(Value::parse_date("2021-02-30").is_err());
        assert!(Value::parse_date("not a date").is_err());
        assert!(Value::date(2021, 13, 1).is_err());
    }

    #[test]
    fn test_sql_cmp_null_is_unknown() {
        assert_eq!(Value::Null.sql_cmp(&Value::Integer(1)).unwrap(), None);
        assert_eq!(Value::Integer(1).sql_cmp(&Value::Null).unwrap(), None);
        assert_eq!(Value::Null.sql_cmp(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_sql_cmp_numeric_promotion() {
        assert_eq!(
            Value::Integer(2).sql_cmp(&Value::Real(2.0)).unwrap(),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Real(1.5).sql_cmp(&Value::Integer(2)).unwrap(),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_sql_cmp_date_against_text() {
        let d = Value::parse_date("2020-06-01").unwrap();
        assert_eq!(
            d.sql_cmp(&Value::from("2020-01-01")).unwrap(),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::from("2020-06-01").sql_cmp(&d).unwrap(),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_sql_cmp_incompatible() {
        assert!(Value::Integer(1).sql_cmp(&Value::from("1")).is_err());
        assert!(Value::Boolean(true).sql_cmp(&Value::Integer(1)).is_err());
    }

    #[test]
    fn test_value_ordering() {
        assert!(Value::Integer(1) < Value::Integer(2));
        assert!(Value::Text("a".into()) < Value::Text("b".into()));
        assert!(Value::Null < Value::Integer(i64::MIN));
        assert!(Value::Integer(1) < Value::Real(1.5));
    }

    #[test]
    fn test_value_equality_and_hash_of_zero() {
        use core::hash::BuildHasher;
        let state = hashbrown::hash_map::DefaultHashBuilder::default();
        assert_eq!(Value::Real(0.0), Value::Real(-0.0));
        assert_eq!(
            state.hash_one(&Value::Real(0.0)),
            state.hash_one(&Value::Real(-0.0))
        );
        assert_ne!(Value::Integer(1), Value::Real(1.5));
    }

    #[test]
    fn test_integral_real_equals_integer() {
        use core::hash::BuildHasher;
        let state = hashbrown::hash_map::DefaultHashBuilder::default();
        assert_eq!(Value::Integer(1), Value::Real(1.0));
        assert_eq!(Value::Real(-0.0), Value::Integer(0));
        assert_eq!(
            state.hash_one(&Value::Integer(1)),
            state.hash_one(&Value::Real(1.0))
        );
        assert_eq!(Value::Integer(1).cmp(&Value::Real(1.0)), Ordering::Equal);

        let mut set = hashbrown::HashSet::new();
        set.insert(Value::Integer(7));
        assert!(!set.insert(Value::Real(7.0)));
        assert!(set.insert(Value::Real(7.5)));
    }

    #[test]
    fn test_large_integer_real_comparison_is_exact() {
        let big = Value::Integer(i64::MAX);
        let two_pow_63 = Value::Real(9_223_372_036_854_775_808.0);
        assert_eq!(big.cmp(&two_pow_63), Ordering::Less);
        assert_ne!(big, two_pow_63);
        assert_eq!(
            Value::Integer(i64::MAX - 1).sql_cmp(&two_pow_63).unwrap(),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Real(f64::NAN).cmp(&big), Ordering::Greater);
    }

    #[test]
    fn test_value_from_impls() {
        let v: Value = 42i32.into();
        assert_eq!(v.as_i64(), Some(42));

        let v: Value = "hello".into();
        assert_eq!(v.as_str(), Some("hello"));

        let v: Value = None::<i64>.into();
        assert!(v.is_null());
    }
}
