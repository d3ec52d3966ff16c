//! Coercion of Rust values into SDL [`Value`]s.
//!
//! Any `T: Serialize` whose serde representation is a scalar maps onto one
//! [`Value`] variant. Sequences, maps, structs and enum variants carrying
//! data have no literal form, and neither do NaN and the infinities; they are
//! rejected with
//! [`Error::NotCoercible`](crate::Error::NotCoercible) naming the Rust type.
//!
//! | serde data model               | SDL value          |
//! |--------------------------------|--------------------|
//! | `bool`                         | `Bool`             |
//! | `i8`, `i16`, `i32`, `u8`, `u16` | `Int32`            |
//! | `i64`, `u32`                   | `Int64`            |
//! | `u64`, `i128`, `u128`          | narrowest fit      |
//! | finite `f32` / `f64`           | `Float32` / `Float64` |
//! | `char`                         | `Char`             |
//! | `str`                          | `String`           |
//! | bytes                          | `Binary`           |
//! | `None`, `()`, unit structs     | `Null`             |
//! | unit enum variants             | `String` (variant name) |
//!
//! [`Value`] itself coerces to an equal value, including the date, decimal
//! and time span variants.
//!
//! ## Examples
//!
//! ```rust
//! use sdlang::{coerce, is_coercible, Value};
//!
//! assert_eq!(coerce(&42u8).unwrap(), Value::Int32(42));
//! assert_eq!(coerce(&Some("hi")).unwrap(), Value::from("hi"));
//! assert_eq!(coerce(&None::<i32>).unwrap(), Value::Null);
//!
//! assert!(!is_coercible(&vec![1, 2, 3]));
//! let err = coerce(&vec![1, 2, 3]).unwrap_err();
//! assert!(err.to_string().contains("Vec<i32>"));
//! ```

use crate::literal::{parse_date, parse_float, parse_time};
use crate::value::{DATE_MARKER, DATE_TIME_MARKER, DECIMAL_MARKER, TIME_SPAN_MARKER};
use crate::zone::FixedZoneResolver;
use crate::{Error, Result, Value};
use serde::ser::{self, Impossible, Serialize};

/// Converts `value` into the SDL value its serde representation maps to.
///
/// # Errors
///
/// Returns [`Error::NotCoercible`] with the name of `T` when the value is
/// not a scalar.
pub fn coerce<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer).map_err(|err| match err {
        Error::NotCoercible { .. } => Error::not_coercible(std::any::type_name::<T>()),
        other => other,
    })
}

/// True if [`coerce`] would succeed.
#[must_use]
pub fn is_coercible<T: Serialize + ?Sized>(value: &T) -> bool {
    coerce(value).is_ok()
}

/// Serializer producing a single [`Value`].
pub struct ValueSerializer;

impl ValueSerializer {
    fn restore(name: &str, text: &str) -> Result<Value> {
        match name {
            DECIMAL_MARKER => parse_float(text),
            DATE_MARKER => parse_date(text).map(Value::Date),
            DATE_TIME_MARKER => {
                let (date, time) = text
                    .split_once(' ')
                    .ok_or_else(|| Error::literal(format!("invalid date-time: '{}'", text)))?;
                let date = parse_date(date)?;
                parse_time(time)?
                    .on_date(date, &FixedZoneResolver::new())
                    .map(Value::DateTime)
            }
            _ => parse_time(text)?.to_time_span().map(Value::TimeSpan),
        }
    }
}

type Unsupported = Impossible<Value, Error>;

fn unsupported(kind: &str) -> Error {
    Error::not_coercible(kind)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = Unsupported;
    type SerializeTuple = Unsupported;
    type SerializeTupleStruct = Unsupported;
    type SerializeTupleVariant = Unsupported;
    type SerializeMap = Unsupported;
    type SerializeStruct = Unsupported;
    type SerializeStructVariant = Unsupported;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Int32(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int64(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        if !v.is_finite() {
            return Err(unsupported("non-finite float"));
        }
        Ok(Value::Float32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        if !v.is_finite() {
            return Err(unsupported("non-finite float"));
        }
        Ok(Value::Float64(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Binary(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(ValueSerializer)?;
        match (name, &inner) {
            (DECIMAL_MARKER | DATE_MARKER | DATE_TIME_MARKER | TIME_SPAN_MARKER, Value::String(text)) => {
                Self::restore(name, text)
            }
            _ => Ok(inner),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Err(unsupported("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(unsupported("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(unsupported("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(unsupported("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(unsupported("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(unsupported("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(unsupported("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(unsupported("struct variant"))
    }
}
