//! Legacy INT96 timestamps.
//!
//! Layout (12 bytes, little-endian): bytes 0..8 hold nanoseconds since
//! local midnight, bytes 8..12 hold a signed Julian day number.

use chrono::{DateTime, NaiveDateTime};

use crate::{
    error::{ConversionError, Result},
    typespec::LogicalType,
    value::Value,
};

pub const INT96_LEN: usize = 12;
/// Julian day of 1970-01-01.
pub const UNIX_EPOCH_JULIAN_DAY: i64 = 2_440_588;
pub const NANOS_PER_DAY: i64 = 86_400_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampUnit {
    Nanos,
    Micros,
    Millis,
}

impl TimestampUnit {
    pub fn from_logical(logical: LogicalType) -> Option<Self> {
        match logical {
            LogicalType::TimestampNanos => Some(TimestampUnit::Nanos),
            LogicalType::TimestampMicros => Some(TimestampUnit::Micros),
            LogicalType::TimestampMillis => Some(TimestampUnit::Millis),
            _ => None,
        }
    }

    fn nanos_per_unit(&self) -> i64 {
        match self {
            TimestampUnit::Nanos => 1,
            TimestampUnit::Micros => 1_000,
            TimestampUnit::Millis => 1_000_000,
        }
    }

    /// Nanoseconds into this unit, rounding half away from zero.
    pub fn scale_nanos(&self, nanos: i64) -> i64 {
        round_half_away(nanos, self.nanos_per_unit())
    }

    pub fn to_datetime(&self, value: i64) -> Option<NaiveDateTime> {
        let datetime = match self {
            TimestampUnit::Nanos => DateTime::from_timestamp_nanos(value),
            TimestampUnit::Micros => DateTime::from_timestamp_micros(value)?,
            TimestampUnit::Millis => DateTime::from_timestamp_millis(value)?,
        };
        Some(datetime.naive_utc())
    }
}

/// INT96 bytes to an INT64 timestamp in the requested unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int96Conversion {
    unit: TimestampUnit,
}

impl Int96Conversion {
    pub fn new(unit: TimestampUnit) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> TimestampUnit {
        self.unit
    }

    pub fn convert(&self, value: Value) -> Result<Value> {
        let bytes = match value {
            Value::Bytes(bytes) => bytes,
            other => {
                return Err(ConversionError::TypeMismatch {
                    expected: "bytes",
                    found: other.type_name(),
                });
            }
        };
        let nanos = decode_int96(&bytes)?;
        Ok(Value::Int64(self.unit.scale_nanos(nanos)))
    }
}

/// Nanoseconds since the Unix epoch encoded by a 12-byte INT96 value.
pub fn decode_int96(bytes: &[u8]) -> Result<i64> {
    let raw: &[u8; INT96_LEN] = bytes.try_into().map_err(|_| {
        ConversionError::invalid(format!("INT96 must be 12 bytes, got {}", bytes.len()))
    })?;
    let mut nanos_bytes = [0u8; 8];
    nanos_bytes.copy_from_slice(&raw[0..8]);
    let mut day_bytes = [0u8; 4];
    day_bytes.copy_from_slice(&raw[8..12]);

    let nanos_of_day = i64::from_le_bytes(nanos_bytes);
    let julian_day = i32::from_le_bytes(day_bytes);
    if !(0..NANOS_PER_DAY).contains(&nanos_of_day) {
        return Err(ConversionError::invalid(format!(
            "invalid nanoseconds of day: {nanos_of_day}"
        )));
    }

    let days = i128::from(julian_day) - i128::from(UNIX_EPOCH_JULIAN_DAY);
    let total = days * i128::from(NANOS_PER_DAY) + i128::from(nanos_of_day);
    i64::try_from(total).map_err(|_| {
        ConversionError::overflow(format!(
            "INT96 Julian day {julian_day} is outside the int64 nanosecond range"
        ))
    })
}

/// Encodes nanoseconds since the Unix epoch as INT96, mainly for fixtures.
pub fn timestamp_nanos_to_int96(nanos: i64) -> [u8; INT96_LEN] {
    let days = nanos.div_euclid(NANOS_PER_DAY);
    let nanos_of_day = nanos.rem_euclid(NANOS_PER_DAY);
    // |days| <= 106_752 for any i64, so the Julian day always fits.
    let julian_day = (days + UNIX_EPOCH_JULIAN_DAY) as i32;

    let mut out = [0u8; INT96_LEN];
    out[0..8].copy_from_slice(&nanos_of_day.to_le_bytes());
    out[8..12].copy_from_slice(&julian_day.to_le_bytes());
    out
}

fn round_half_away(value: i64, divisor: i64) -> i64 {
    let quotient = value / divisor;
    let remainder = value % divisor;
    if remainder.abs() * 2 >= divisor {
        quotient + value.signum()
    } else {
        quotient
    }
}
