//! Dynamic value representation for SDL literals.
//!
//! This module provides the [`Value`] enum, one variant per SDL literal type.
//! Tag values and attribute values are both `Value`s.
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use sdlang::Value;
//!
//! let null = Value::Null;
//! let boolean = Value::from(true);
//! let small = Value::from(42);
//! let large = Value::from(5_000_000_000i64);
//! let text = Value::from("hello");
//!
//! assert!(small.is_int32());
//! assert!(large.is_int64());
//! ```
//!
//! ### Literal Form
//!
//! `Display` writes the canonical SDL literal, which reads back as an equal
//! value:
//!
//! ```rust
//! use sdlang::Value;
//! use chrono::NaiveDate;
//!
//! assert_eq!(Value::from(42i64).to_string(), "42L");
//! assert_eq!(Value::from(1.5f32).to_string(), "1.5F");
//! assert_eq!(Value::from("say \"hi\"").to_string(), r#""say \"hi\"""#);
//! assert_eq!(Value::from(NaiveDate::from_ymd_opt(2005, 12, 5).unwrap()).to_string(), "2005/12/05");
//! assert_eq!(Value::Binary(b"Hello".to_vec()).to_string(), "[SGVsbG8=]");
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use sdlang::Value;
//! use std::convert::TryFrom;
//!
//! let value = Value::from(42);
//! let num: i64 = i64::try_from(value).unwrap();
//! assert_eq!(num, 42);
//! ```

use crate::timespan::TimeSpan;
use base64::{engine::general_purpose, Engine as _};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeZone, Timelike};
use num_bigint::{BigInt, Sign};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single SDL literal.
///
/// Equality is structural with one exception inherited from chrono: two
/// `DateTime` values denoting the same instant are equal even when their
/// offsets differ.
///
/// # Examples
///
/// ```rust
/// use sdlang::Value;
///
/// let null = Value::Null;
/// let num = Value::Int32(42);
/// let text = Value::String("hello".to_string());
///
/// assert!(null.is_null());
/// assert!(num.is_number());
/// assert!(text.is_string());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    String(String),
    Char(char),
    Int32(i32),
    Int64(i64),
    /// Arbitrary precision decimal, written with the `BD` suffix
    Decimal(BigDecimal),
    Float32(f32),
    Float64(f64),
    /// Calendar date without a time of day
    Date(NaiveDate),
    /// Date and time of day with a fixed UTC offset, millisecond precision
    DateTime(DateTime<FixedOffset>),
    TimeSpan(TimeSpan),
    Binary(Vec<u8>),
}

impl Value {
    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_char(&self) -> bool {
        matches!(self, Value::Char(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_int32(&self) -> bool {
        matches!(self, Value::Int32(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_int64(&self) -> bool {
        matches!(self, Value::Int64(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_decimal(&self) -> bool {
        matches!(self, Value::Decimal(_))
    }

    /// Returns `true` for any of the integer, float and decimal variants.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Int32(_) | Value::Int64(_) | Value::Decimal(_) | Value::Float32(_) | Value::Float64(_)
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Value::Date(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_date_time(&self) -> bool {
        matches!(self, Value::DateTime(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_time_span(&self) -> bool {
        matches!(self, Value::TimeSpan(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Value::Binary(_))
    }

    /// The SDL name of the value's type, as used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::String(_) => "string",
            Value::Char(_) => "character",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Decimal(_) => "decimal",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Date(_) => "date",
            Value::DateTime(_) => "date-time",
            Value::TimeSpan(_) => "time span",
            Value::Binary(_) => "binary",
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdlang::Value;
    ///
    /// assert_eq!(Value::from("hello").as_str(), Some("hello"));
    /// assert_eq!(Value::from('h').as_str(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the value of either integer variant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdlang::Value;
    ///
    /// assert_eq!(Value::Int32(42).as_i64(), Some(42));
    /// assert_eq!(Value::Int64(42).as_i64(), Some(42));
    /// assert_eq!(Value::Float64(42.0).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(i) => Some(i64::from(*i)),
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) => Some(*i),
            Value::Int64(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Returns the value of either float variant.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(f) => Some(f64::from(*f)),
            Value::Float64(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_date_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_time_span(&self) -> Option<TimeSpan> {
        match self {
            Value::TimeSpan(ts) => Some(*ts),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }
}

/// Escapes a string for a double-quoted literal, without the quotes.
pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_char(c: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '\'' => "\\'".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        _ => c.to_string(),
    }
}

/// Plain positional notation: SDL decimals have no exponent form.
pub(crate) fn format_decimal(d: &BigDecimal) -> String {
    let (digits, scale) = d.as_bigint_and_exponent();
    let magnitude = digits.magnitude().to_string();
    let mut out = String::with_capacity(magnitude.len() + 3);
    if digits.sign() == Sign::Minus {
        out.push('-');
    }

    if scale <= 0 {
        out.push_str(&magnitude);
        if magnitude != "0" {
            out.extend(std::iter::repeat('0').take(scale.unsigned_abs() as usize));
        }
    } else {
        let scale = scale as usize;
        if magnitude.len() > scale {
            let (int, frac) = magnitude.split_at(magnitude.len() - scale);
            out.push_str(int);
            out.push('.');
            out.push_str(frac);
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take(scale - magnitude.len()));
            out.push_str(&magnitude);
        }
    }
    out
}

fn format_float<T: fmt::Display>(f: T) -> String {
    let s = f.to_string();
    if s.contains('.') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        s + ".0"
    }
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    format!("{}/{:02}/{:02}", date.year(), date.month(), date.day())
}

/// `yyyy/mm/dd hh:mm:ss[.mmm][-GMT±hh:mm]`; the zone is left out for UTC.
pub(crate) fn format_date_time(dt: &DateTime<FixedOffset>) -> String {
    let local = dt.naive_local();
    let mut out = format!(
        "{} {:02}:{:02}:{:02}",
        format_date(&local.date()),
        local.hour(),
        local.minute(),
        local.second()
    );
    let millis = (local.nanosecond() / 1_000_000) % 1_000;
    if millis != 0 {
        out.push_str(&format!(".{:03}", millis));
    }

    let offset = dt.offset().local_minus_utc();
    if offset != 0 {
        let sign = if offset < 0 { '-' } else { '+' };
        let minutes = offset.unsigned_abs() / 60;
        out.push_str(&format!("-GMT{}{:02}:{:02}", sign, minutes / 60, minutes % 60));
    }
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Value::Char(c) => write!(f, "'{}'", escape_char(*c)),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}L", i),
            Value::Decimal(d) => write!(f, "{}BD", format_decimal(d)),
            Value::Float32(x) => write!(f, "{}F", format_float(x)),
            Value::Float64(x) => write!(f, "{}D", format_float(x)),
            Value::Date(d) => f.write_str(&format_date(d)),
            Value::DateTime(dt) => f.write_str(&format_date_time(dt)),
            Value::TimeSpan(ts) => write!(f, "{}", ts),
            Value::Binary(bytes) => write!(f, "[{}]", general_purpose::STANDARD.encode(bytes)),
        }
    }
}

// Literal-backed variants serialize as newtype structs around their SDL
// text. Formats such as JSON see a plain string; `crate::ser` recognizes the
// names and restores the variant.
pub(crate) const DECIMAL_MARKER: &str = "$sdlang::Decimal";
pub(crate) const DATE_MARKER: &str = "$sdlang::Date";
pub(crate) const DATE_TIME_MARKER: &str = "$sdlang::DateTime";
pub(crate) const TIME_SPAN_MARKER: &str = "$sdlang::TimeSpan";

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Int32(i) => serializer.serialize_i32(*i),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::Float32(x) => serializer.serialize_f32(*x),
            Value::Float64(x) => serializer.serialize_f64(*x),
            Value::Decimal(_) => serializer.serialize_newtype_struct(DECIMAL_MARKER, &self.to_string()),
            Value::Date(_) => serializer.serialize_newtype_struct(DATE_MARKER, &self.to_string()),
            Value::DateTime(_) => {
                serializer.serialize_newtype_struct(DATE_TIME_MARKER, &self.to_string())
            }
            Value::TimeSpan(_) => {
                serializer.serialize_newtype_struct(TIME_SPAN_MARKER, &self.to_string())
            }
            Value::Binary(bytes) => serializer.serialize_bytes(bytes),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a scalar SDL value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::from(value).narrowed())
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::from(value).narrowed())
            }

            fn visit_f32<E>(self, value: f32) -> Result<Self::Value, E> {
                Ok(Value::Float32(value))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Float64(value))
            }

            fn visit_char<E>(self, value: char) -> Result<Self::Value, E> {
                Ok(Value::Char(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E> {
                Ok(Value::Binary(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Self::Value, E> {
                Ok(Value::Binary(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl Value {
    /// Integers that fit 32 bits become `Int32`.
    fn narrowed(self) -> Value {
        match self {
            Value::Int64(i) => match i32::try_from(i) {
                Ok(small) => Value::Int32(small),
                Err(_) => Value::Int64(i),
            },
            other => other,
        }
    }
}

fn mismatch(expected: &str, value: &Value) -> crate::Error {
    crate::Error::custom(format!("expected {}, found {}", expected, value.type_name()))
}

// TryFrom implementations for extracting values from Value
impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_i64().ok_or_else(|| mismatch("integer", &value))
    }
}

impl TryFrom<Value> for i32 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_i32().ok_or_else(|| mismatch("32-bit integer", &value))
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_f64().ok_or_else(|| mismatch("float", &value))
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_bool().ok_or_else(|| mismatch("boolean", &value))
    }
}

impl TryFrom<Value> for char {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_char().ok_or_else(|| mismatch("character", &value))
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl TryFrom<Value> for BigDecimal {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Decimal(d) => Ok(d),
            other => Err(mismatch("decimal", &other)),
        }
    }
}

impl TryFrom<Value> for NaiveDate {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_date().ok_or_else(|| mismatch("date", &value))
    }
}

impl TryFrom<Value> for DateTime<FixedOffset> {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(mismatch("date-time", &other)),
        }
    }
}

impl TryFrom<Value> for TimeSpan {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_time_span().ok_or_else(|| mismatch("time span", &value))
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Binary(bytes) => Ok(bytes),
            other => Err(mismatch("binary", &other)),
        }
    }
}

// From implementations for creating Value from host types
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Int32(i32::from(value))
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Int32(i32::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Int32(i32::from(value))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int32(i32::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int64(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Int64(i),
            Err(_) => Value::Decimal(BigDecimal::from(value)),
        }
    }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        Value::from(BigInt::from(value))
    }
}

impl From<u128> for Value {
    fn from(value: u128) -> Self {
        Value::from(BigInt::from(value))
    }
}

/// Picks the narrowest of `Int32`, `Int64` and `Decimal` that holds the value.
impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        if let Ok(small) = i32::try_from(&value) {
            Value::Int32(small)
        } else if let Ok(large) = i64::try_from(&value) {
            Value::Int64(large)
        } else {
            Value::Decimal(BigDecimal::new(value, 0))
        }
    }
}

impl From<BigDecimal> for Value {
    fn from(value: BigDecimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

/// Keeps the offset and truncates to millisecond precision.
impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(value: DateTime<Tz>) -> Self {
        let fixed = value.with_timezone(&value.offset().fix());
        let millis = fixed.nanosecond() / 1_000_000 * 1_000_000;
        Value::DateTime(fixed.with_nanosecond(millis).unwrap_or(fixed))
    }
}

impl From<TimeSpan> for Value {
    fn from(value: TimeSpan) -> Self {
        Value::TimeSpan(value)
    }
}

impl From<chrono::Duration> for Value {
    fn from(value: chrono::Duration) -> Self {
        Value::TimeSpan(TimeSpan::from(value))
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Binary(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
