use std::fmt;

use crate::{
    error::{ConversionError, Result},
    typespec::PhysicalType,
};

/// A single scalar leaf value as decoded by the upstream reader.
///
/// Decimal and INT96 payloads travel as `Int32`/`Int64` or `Bytes` according
/// to their physical encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Parses a textual literal into the variant carried by `physical`.
    ///
    /// `null` (any case) yields [`Value::Null`]. Binary types accept
    /// `0x`-prefixed hex or raw text; `INT96` must be given as hex.
    pub fn parse_literal(text: &str, physical: PhysicalType) -> Result<Value> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("null") {
            return Ok(Value::Null);
        }
        let invalid = |what: &str| {
            ConversionError::invalid(format!("Failed to parse '{trimmed}' as {what}"))
        };
        let parsed = match physical {
            PhysicalType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Value::Boolean(true),
                "false" | "f" | "0" => Value::Boolean(false),
                _ => return Err(invalid("boolean")),
            },
            PhysicalType::Int32 => Value::Int32(trimmed.parse().map_err(|_| invalid("int32"))?),
            PhysicalType::Int64 => Value::Int64(trimmed.parse().map_err(|_| invalid("int64"))?),
            PhysicalType::Float => Value::Float32(trimmed.parse().map_err(|_| invalid("float"))?),
            PhysicalType::Double => {
                Value::Float64(trimmed.parse().map_err(|_| invalid("double"))?)
            }
            PhysicalType::Int96 => {
                let digits = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                    .unwrap_or(trimmed);
                Value::Bytes(hex::decode(digits).map_err(|_| invalid("INT96 hex"))?)
            }
            PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_) => {
                match trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                {
                    Some(digits) => {
                        Value::Bytes(hex::decode(digits).map_err(|_| invalid("hex bytes"))?)
                    }
                    None => Value::Bytes(text.as_bytes().to_vec()),
                }
            }
        };
        Ok(parsed)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) if text.chars().all(|c| !c.is_control()) => write!(f, "{text:?}"),
                _ => write!(f, "0x{}", hex::encode(bytes)),
            },
        }
    }
}
