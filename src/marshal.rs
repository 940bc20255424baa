//! Conversion between wire-encoded column values and native values.
//!
//! Column stores describe each output column with a type tag and ship every
//! cell as a raw byte string. This module resolves tags to [`WireType`],
//! decodes cell bytes into [`Value`], and renders values back out, either as
//! wire bytes or as literal text for inline inclusion in a statement.
//!
//! # Overview
//!
//! Decoding is strict: a cell that is not a well-formed encoding of its
//! declared type is an error, never a guess. The single exception is the
//! zero-length cell, which means "no value" and decodes as [`Value::Null`]
//! for every type.
//!
//! Integer cells of arbitrary precision travel as big-endian two's-complement
//! byte strings of minimal length. Decimals prepend a four byte scale to the
//! same representation.
//!
//! # Key Components
//!
//! - [`WireType`]: the column types a node may declare.
//! - [`Value`]: a decoded native value.
//! - [`decode`] / [`encode`]: cell bytes to value and back.
//! - [`quote`] / [`quote_str`]: literal fragments for statement text.
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Column types understood by the driver.
///
/// Declared tags may be fully qualified (`x.y.UTF8Type`); resolution matches
/// on the trailing dot-separated component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    LexicalUuid,
    Text,
    TimeUuid,
    Timestamp,
    Uuid,
    Varint,
}

impl WireType {
    /// Resolves a declared column type tag, or `None` when the tag names a
    /// type this driver does not understand.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let name = tag.rsplit('.').next().unwrap_or(tag);
        let ty = match name {
            "AsciiType" => Self::Ascii,
            "BooleanType" => Self::Boolean,
            "BytesType" => Self::Blob,
            "CounterColumnType" => Self::Counter,
            "DateType" => Self::Timestamp,
            "DecimalType" => Self::Decimal,
            "DoubleType" => Self::Double,
            "FloatType" => Self::Float,
            "Int32Type" => Self::Int,
            "IntegerType" => Self::Varint,
            "LexicalUUIDType" => Self::LexicalUuid,
            "LongType" => Self::Bigint,
            "TimeUUIDType" => Self::TimeUuid,
            "UTF8Type" => Self::Text,
            "UUIDType" => Self::Uuid,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ascii => "AsciiType",
            Self::Bigint => "LongType",
            Self::Blob => "BytesType",
            Self::Boolean => "BooleanType",
            Self::Counter => "CounterColumnType",
            Self::Decimal => "DecimalType",
            Self::Double => "DoubleType",
            Self::Float => "FloatType",
            Self::Int => "Int32Type",
            Self::LexicalUuid => "LexicalUUIDType",
            Self::Text => "UTF8Type",
            Self::TimeUuid => "TimeUUIDType",
            Self::Timestamp => "DateType",
            Self::Uuid => "UUIDType",
            Self::Varint => "IntegerType",
        }
    }
}

/// A decoded native value.
///
/// Several wire types share a native shape: counters decode as [`Bigint`],
/// ascii as [`Text`], and all three UUID flavors as [`Uuid`].
///
/// [`Bigint`]: Value::Bigint
/// [`Text`]: Value::Text
/// [`Uuid`]: Value::Uuid
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Bigint(i64),
    Int(i32),
    Varint(i128),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Decimal { unscaled: i128, scale: i32 },
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Blob(Vec<u8>),
}

/// Decodes the raw bytes of one cell declared as `ty`.
///
/// A zero-length cell decodes as [`Value::Null`] regardless of type. Any
/// other input that is not a well-formed encoding of `ty` fails with
/// [`Error::Decode`].
pub fn decode(ty: WireType, raw: &[u8]) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }

    let value = match ty {
        WireType::Ascii => {
            let s = std::str::from_utf8(raw).map_err(|e| bad(ty, &e.to_string()))?;
            if !s.is_ascii() {
                return Err(bad(ty, "non-ascii byte in ascii value"));
            }
            Value::Text(s.to_string())
        }
        WireType::Text => {
            let s = std::str::from_utf8(raw).map_err(|e| bad(ty, &e.to_string()))?;
            Value::Text(s.to_string())
        }
        WireType::Bigint | WireType::Counter => Value::Bigint(i64::from_be_bytes(fixed(ty, raw)?)),
        WireType::Int => Value::Int(i32::from_be_bytes(fixed(ty, raw)?)),
        WireType::Varint => Value::Varint(varint(ty, raw)?),
        WireType::Float => Value::Float(f32::from_be_bytes(fixed(ty, raw)?)),
        WireType::Double => Value::Double(f64::from_be_bytes(fixed(ty, raw)?)),
        WireType::Boolean => {
            if raw.len() != 1 {
                return Err(bad(ty, "boolean wider than one byte"));
            }
            Value::Boolean(raw[0] != 0)
        }
        WireType::Decimal => {
            if raw.len() < 5 {
                return Err(bad(ty, "decimal needs a scale and at least one unscaled byte"));
            }
            let scale = i32::from_be_bytes(fixed(ty, &raw[..4])?);
            let unscaled = varint(ty, &raw[4..])?;
            Value::Decimal { unscaled, scale }
        }
        WireType::Uuid | WireType::TimeUuid | WireType::LexicalUuid => {
            let bytes: [u8; 16] = raw
                .try_into()
                .map_err(|_| bad(ty, "uuid must be exactly 16 bytes"))?;
            Value::Uuid(Uuid::from_bytes(bytes))
        }
        WireType::Timestamp => {
            let millis = i64::from_be_bytes(fixed(ty, raw)?);
            match Utc.timestamp_millis_opt(millis).single() {
                Some(at) => Value::Timestamp(at),
                None => return Err(bad(ty, "millisecond count out of range")),
            }
        }
        WireType::Blob => Value::Blob(raw.to_vec()),
    };

    Ok(value)
}

/// Produces the wire bytes for a value. `Null` encodes as the empty byte
/// string, matching how absent cells arrive.
pub fn encode(value: &Value) -> Vec<u8> {
    match value {
        Value::Null => Vec::new(),
        Value::Text(s) => s.as_bytes().to_vec(),
        Value::Bigint(v) => v.to_be_bytes().to_vec(),
        Value::Int(v) => v.to_be_bytes().to_vec(),
        Value::Varint(v) => encode_varint(*v),
        Value::Float(v) => v.to_be_bytes().to_vec(),
        Value::Double(v) => v.to_be_bytes().to_vec(),
        Value::Boolean(v) => vec![u8::from(*v)],
        Value::Decimal { unscaled, scale } => {
            let mut out = scale.to_be_bytes().to_vec();
            out.extend(encode_varint(*unscaled));
            out
        }
        Value::Uuid(u) => u.as_bytes().to_vec(),
        Value::Timestamp(at) => at.timestamp_millis().to_be_bytes().to_vec(),
        Value::Blob(b) => b.clone(),
    }
}

/// Quotes a string for inline inclusion in statement text: wraps it in
/// single quotes and doubles every embedded quote character.
pub fn quote_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Renders a value as a literal fragment of statement text.
pub fn quote(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Text(s) => quote_str(s),
        Value::Bigint(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Varint(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Boolean(v) => v.to_string(),
        Value::Decimal { unscaled, scale } => format_decimal(*unscaled, *scale),
        Value::Uuid(u) => u.to_string(),
        Value::Timestamp(at) => at.timestamp_millis().to_string(),
        Value::Blob(b) => {
            let hex: String = b.iter().map(|byte| format!("{byte:02x}")).collect();
            format!("0x{hex}")
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bigint(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Varint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Decimal { unscaled, scale } => write!(f, "{}", format_decimal(*unscaled, *scale)),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Timestamp(at) => write!(f, "{}", at.to_rfc3339()),
            Value::Blob(b) => {
                write!(f, "0x")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

fn bad(ty: WireType, reason: &str) -> Error {
    Error::Decode {
        kind: ty.name().to_string(),
        reason: reason.to_string(),
    }
}

/// Fixed-width reinterpretation; the value must be exactly `N` bytes.
fn fixed<const N: usize>(ty: WireType, raw: &[u8]) -> Result<[u8; N]> {
    raw.try_into()
        .map_err(|_| bad(ty, &format!("expected {N} bytes, got {}", raw.len())))
}

/// Sign-extending read of a big-endian two's-complement byte string.
fn varint(ty: WireType, raw: &[u8]) -> Result<i128> {
    let Some(&first) = raw.first() else {
        return Err(bad(ty, "empty integer"));
    };
    if raw.len() > 16 {
        return Err(bad(ty, "integer wider than 128 bits"));
    }
    let mut acc: i128 = if first & 0x80 != 0 { -1 } else { 0 };
    for &byte in raw {
        acc = (acc << 8) | i128::from(byte);
    }
    Ok(acc)
}

/// Minimal-length big-endian two's-complement encoding.
fn encode_varint(v: i128) -> Vec<u8> {
    let bytes = v.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = match bytes[start] {
            0x00 => bytes[start + 1] & 0x80 == 0,
            0xFF => bytes[start + 1] & 0x80 != 0,
            _ => false,
        };
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

/// Plain point notation for an unscaled/scale pair: (12345, 2) is "123.45".
fn format_decimal(unscaled: i128, scale: i32) -> String {
    if scale <= 0 {
        let zeros = "0".repeat(scale.unsigned_abs() as usize);
        return format!("{unscaled}{zeros}");
    }
    let digits = unscaled.unsigned_abs().to_string();
    let scale = scale as usize;
    let sign = if unscaled < 0 { "-" } else { "" };
    if digits.len() > scale {
        let (int, frac) = digits.split_at(digits.len() - scale);
        format!("{sign}{int}.{frac}")
    } else {
        let pad = "0".repeat(scale - digits.len());
        format!("{sign}0.{pad}{digits}")
    }
}
