//! Conversion of raw token text into typed values.
//!
//! These functions take the processed token text (delimiters already
//! stripped by the tokenizer) and return typed values. Errors are
//! [`Error::Literal`] with no position; the reader relocates them to the
//! offending token with [`Error::at`].

use crate::error::{Error, Result};
use crate::timespan::TimeSpan;
use crate::value::Value;
use crate::zone::ZoneResolver;
use base64::{engine::general_purpose, Engine as _};
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::num::IntErrorKind;
use std::str::FromStr;

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?[0-9]+)/([0-9]+)/([0-9]+)$").expect("date pattern must compile"));

static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:([+-]?[0-9]+)d:)?([+-]?[0-9]+):([0-9]+)(?::([0-9]+)(?:\.([0-9]+))?)?(?:-([a-z0-9/_]+(?:[+-][0-9]+(?::[0-9]+)?)?))?$",
    )
    .expect("time pattern must compile")
});

/// Parses `true`, `false`, `on` or `off`.
pub fn parse_boolean(text: &str) -> Result<bool> {
    match text {
        "true" | "on" => Ok(true),
        "false" | "off" => Ok(false),
        _ => Err(Error::literal(format!("not a boolean: '{}'", text))),
    }
}

/// Parses an integer literal.
///
/// An `L` suffix always yields [`Value::Int64`]. Without it the narrowest of
/// `Int32` and `Int64` that holds the value is chosen.
///
/// # Examples
///
/// ```rust
/// use sdlang::literal::parse_integer;
/// use sdlang::Value;
///
/// assert_eq!(parse_integer("42").unwrap(), Value::Int32(42));
/// assert_eq!(parse_integer("42L").unwrap(), Value::Int64(42));
/// assert_eq!(parse_integer("3000000000").unwrap(), Value::Int64(3_000_000_000));
/// assert!(parse_integer("9223372036854775808").is_err());
/// ```
pub fn parse_integer(text: &str) -> Result<Value> {
    let (digits, long) = match text.strip_suffix(['L', 'l']) {
        Some(digits) => (digits, true),
        None => (text, false),
    };

    let n: i64 = digits.parse().map_err(|e: std::num::ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Error::literal(format!(
            "integer out of 64-bit range: '{}' (use the BD suffix)",
            text
        )),
        _ => Error::literal(format!("not an integer: '{}'", text)),
    })?;

    if long {
        return Ok(Value::Int64(n));
    }
    Ok(match i32::try_from(n) {
        Ok(small) => Value::Int32(small),
        Err(_) => Value::Int64(n),
    })
}

/// Parses a floating point literal: `F` for 32 bits, `D` or no suffix for
/// 64 bits, `BD` for an arbitrary precision decimal.
pub fn parse_float(text: &str) -> Result<Value> {
    let upper = text.to_ascii_uppercase();

    if let Some(number) = upper.strip_suffix("BD") {
        return parse_decimal(number, text).map(Value::Decimal);
    }
    if let Some(number) = upper.strip_suffix('F') {
        check_float_syntax(number, text)?;
        let f: f32 = number
            .parse()
            .map_err(|_| Error::literal(format!("not a float: '{}'", text)))?;
        if !f.is_finite() {
            return Err(Error::literal(format!("float out of range: '{}'", text)));
        }
        return Ok(Value::Float32(f));
    }

    let number = upper.strip_suffix('D').unwrap_or(&upper);
    check_float_syntax(number, text)?;
    let f: f64 = number
        .parse()
        .map_err(|_| Error::literal(format!("not a float: '{}'", text)))?;
    if !f.is_finite() {
        return Err(Error::literal(format!("float out of range: '{}'", text)));
    }
    Ok(Value::Float64(f))
}

fn check_float_syntax(number: &str, text: &str) -> Result<()> {
    let digits = number.strip_prefix(['+', '-']).unwrap_or(number);
    let well_formed = !digits.is_empty()
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().any(|c| c.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(Error::literal(format!("not a float: '{}'", text)))
    }
}

fn parse_decimal(number: &str, text: &str) -> Result<BigDecimal> {
    check_float_syntax(number, text)?;
    let (negative, digits) = match number.as_bytes().first() {
        Some(b'-') => (true, &number[1..]),
        Some(b'+') => (false, &number[1..]),
        _ => (false, number),
    };
    let mut normalized = String::with_capacity(digits.len() + 2);
    if negative {
        normalized.push('-');
    }
    if digits.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(digits);
    if normalized.ends_with('.') {
        normalized.push('0');
    }
    BigDecimal::from_str(&normalized).map_err(|_| Error::literal(format!("not a decimal: '{}'", text)))
}

/// Parses the text between the quotes of a character literal.
///
/// The escapes `\\`, `\'`, `\n`, `\r` and `\t` are recognized.
pub fn parse_character(text: &str) -> Result<char> {
    let mut chars = text.chars();
    let c = match (chars.next(), chars.next(), chars.next()) {
        (Some('\\'), Some(escaped), None) => match escaped {
            '\\' => '\\',
            '\'' => '\'',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            _ => {
                return Err(Error::literal(format!(
                    "illegal escape character in character literal: '{}'",
                    escaped
                )))
            }
        },
        (Some(c), None, None) if c != '\\' => c,
        _ => return Err(Error::literal(format!("illegal character literal: '{}'", text))),
    };
    Ok(c)
}

/// Resolves the escapes of a double-quoted string body.
///
/// # Examples
///
/// ```rust
/// use sdlang::literal::parse_double_quote_string;
///
/// assert_eq!(parse_double_quote_string(r#"a\tb\"c\""#).unwrap(), "a\tb\"c\"");
/// assert!(parse_double_quote_string(r"a\qb").is_err());
/// ```
pub fn parse_double_quote_string(text: &str) -> Result<String> {
    if !text.contains('\\') {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                return Err(Error::literal(format!(
                    "illegal escape character in string literal: '{}'",
                    other
                )))
            }
            None => return Err(Error::literal("orphan backslash at the end of a string")),
        }
    }
    Ok(out)
}

/// Decodes the base64 body of a binary literal. Whitespace is ignored.
pub fn decode_binary(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| Error::literal(format!("invalid base64 in binary literal: {}", e)))
}

/// Parses `yyyy/mm/dd`.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let invalid = || Error::literal(format!("invalid date: '{}'", text));
    let caps = DATE.captures(text).ok_or_else(invalid)?;
    let year: i32 = caps[1].parse().map_err(|_| invalid())?;
    let month: u32 = caps[2].parse().map_err(|_| invalid())?;
    let day: u32 = caps[3].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// The components of a `TimeOrTimespan` token.
///
/// A leading `-` negates the whole literal: every component below it carries
/// the sign, and the hours do too when a day component is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLiteral {
    pub days: Option<i64>,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
    pub zone: Option<String>,
}

/// Splits a time or time-span token into its components.
///
/// Fractions of a second beyond three digits are truncated.
///
/// # Examples
///
/// ```rust
/// use sdlang::literal::parse_time;
///
/// let t = parse_time("-5d:12:30:15.5").unwrap();
/// assert_eq!(t.days, Some(-5));
/// assert_eq!((t.hours, t.minutes, t.seconds, t.milliseconds), (-12, -30, -15, -500));
///
/// let t = parse_time("12:30-JST").unwrap();
/// assert_eq!(t.zone.as_deref(), Some("JST"));
/// ```
pub fn parse_time(text: &str) -> Result<TimeLiteral> {
    let invalid = || Error::literal(format!("invalid time: '{}'", text));
    let caps = TIME.captures(text).ok_or_else(invalid)?;
    let negative = text.starts_with('-');

    let number = |i: usize| -> Result<i64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().map_err(|_| invalid()),
            None => Ok(0),
        }
    };

    let days = match caps.get(1) {
        Some(m) => Some(m.as_str().parse::<i64>().map_err(|_| invalid())?),
        None => None,
    };
    let mut hours = number(2)?;
    let mut minutes = number(3)?;
    let mut seconds = number(4)?;
    let mut milliseconds = match caps.get(5) {
        Some(m) => {
            let digits: String = m.as_str().chars().chain(std::iter::repeat('0')).take(3).collect();
            digits.parse::<i64>().map_err(|_| invalid())?
        }
        None => 0,
    };

    if negative {
        if days.is_some() {
            hours = -hours;
        }
        minutes = -minutes;
        seconds = -seconds;
        milliseconds = -milliseconds;
    }

    Ok(TimeLiteral {
        days,
        hours,
        minutes,
        seconds,
        milliseconds,
        zone: caps.get(6).map(|m| m.as_str().to_string()),
    })
}

impl TimeLiteral {
    /// Reads the literal as a time span.
    pub fn to_time_span(&self) -> Result<TimeSpan> {
        if self.zone.is_some() {
            return Err(Error::literal("unexpected time zone in a timespan"));
        }
        TimeSpan::checked_new(
            self.days.unwrap_or(0),
            self.hours,
            self.minutes,
            self.seconds,
            self.milliseconds,
        )
        .ok_or_else(|| Error::literal("time span out of range"))
    }

    /// Reads the literal as the time of day on `date`.
    ///
    /// A missing zone means UTC; other zones go through `resolver`.
    pub fn on_date(&self, date: NaiveDate, resolver: &dyn ZoneResolver) -> Result<DateTime<FixedOffset>> {
        if self.days.is_some() {
            return Err(Error::literal("a time of day cannot have a day component"));
        }

        let component = |n: i64| u32::try_from(n).ok();
        let time = match (
            component(self.hours),
            component(self.minutes),
            component(self.seconds),
            component(self.milliseconds),
        ) {
            (Some(h), Some(m), Some(s), Some(ms)) => NaiveTime::from_hms_milli_opt(h, m, s, ms),
            _ => None,
        }
        .ok_or_else(|| Error::literal("invalid time of day"))?;

        let offset = match &self.zone {
            None => FixedOffset::east_opt(0),
            Some(zone) => resolver.resolve(zone),
        }
        .ok_or_else(|| {
            Error::literal(format!(
                "unknown time zone: '{}'",
                self.zone.as_deref().unwrap_or_default()
            ))
        })?;

        offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .ok_or_else(|| Error::literal("invalid date-time"))
    }
}
