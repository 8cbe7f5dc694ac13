//! Type descriptors and the `PRIMITIVE[(params)]:LOGICAL[(params)]` grammar.
//!
//! A [`TypeSpec`] is the validated description of a conversion target. It is
//! only ever produced through [`TypeSpec::new`] or parsing, both of which
//! enforce the physical/logical pairing rules, so a value of this type is
//! never partially valid. [`SourceTypeInfo`] carries the same shape for an
//! existing column and is taken as-is from the schema layer.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, Result};

/// Matches `NAME` or `NAME(args)` after upper-casing.
static TYPE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z0-9_]+)\s*(?:\(([^()]*)\))?$").expect("type token pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(u32),
}

impl PhysicalType {
    pub fn name(&self) -> &'static str {
        match self {
            PhysicalType::Boolean => "BOOLEAN",
            PhysicalType::Int32 => "INT32",
            PhysicalType::Int64 => "INT64",
            PhysicalType::Int96 => "INT96",
            PhysicalType::Float => "FLOAT",
            PhysicalType::Double => "DOUBLE",
            PhysicalType::ByteArray => "BYTE_ARRAY",
            PhysicalType::FixedLenByteArray(_) => "FIXED_LEN_BYTE_ARRAY",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &[
            "BOOLEAN",
            "INT32",
            "INT64",
            "INT96",
            "FLOAT",
            "DOUBLE",
            "BYTE_ARRAY",
            "FIXED_LEN_BYTE_ARRAY(n)",
        ]
    }

    pub fn fixed_len(&self) -> Option<u32> {
        match self {
            PhysicalType::FixedLenByteArray(len) => Some(*len),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PhysicalType::Int32 | PhysicalType::Int64 | PhysicalType::Float | PhysicalType::Double
        )
    }

    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_)
        )
    }

    pub fn can_hold_decimal(&self) -> bool {
        matches!(
            self,
            PhysicalType::Int32
                | PhysicalType::Int64
                | PhysicalType::ByteArray
                | PhysicalType::FixedLenByteArray(_)
        )
    }

    /// Largest decimal precision the physical type can carry.
    ///
    /// `None` means the representation is unbounded (`BYTE_ARRAY`); types
    /// that cannot hold a decimal at all report `Some(0)`.
    pub fn max_decimal_precision(&self) -> Option<u32> {
        match self {
            PhysicalType::Int32 => Some(9),
            PhysicalType::Int64 => Some(18),
            PhysicalType::FixedLenByteArray(len) => {
                let bits = (u64::from(*len) * 8).saturating_sub(1);
                let digits = (bits as f64 * std::f64::consts::LOG10_2).floor();
                Some(digits.min(f64::from(u32::MAX)) as u32)
            }
            PhysicalType::ByteArray => None,
            _ => Some(0),
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let parsed = match name {
            "BOOLEAN" => PhysicalType::Boolean,
            "INT32" => PhysicalType::Int32,
            "INT64" => PhysicalType::Int64,
            "INT96" => PhysicalType::Int96,
            "FLOAT" => PhysicalType::Float,
            "DOUBLE" => PhysicalType::Double,
            "BYTE_ARRAY" => PhysicalType::ByteArray,
            "FIXED_LEN_BYTE_ARRAY" => PhysicalType::FixedLenByteArray(0),
            _ => return None,
        };
        Some(parsed)
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalType::FixedLenByteArray(len) => write!(f, "FIXED_LEN_BYTE_ARRAY({len})"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalSpec {
    pub precision: u32,
    pub scale: u32,
}

impl DecimalSpec {
    pub fn signature(&self) -> String {
        format!("DECIMAL({},{})", self.precision, self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    None,
    String,
    Decimal(DecimalSpec),
    TimestampNanos,
    TimestampMicros,
    TimestampMillis,
    Date,
    TimeMillis,
    TimeMicros,
    TimeNanos,
    Uuid,
    Enum,
    Json,
    Bson,
}

impl LogicalType {
    pub fn name(&self) -> &'static str {
        match self {
            LogicalType::None => "NONE",
            LogicalType::String => "STRING",
            LogicalType::Decimal(_) => "DECIMAL",
            LogicalType::TimestampNanos => "TIMESTAMP_NANOS",
            LogicalType::TimestampMicros => "TIMESTAMP_MICROS",
            LogicalType::TimestampMillis => "TIMESTAMP_MILLIS",
            LogicalType::Date => "DATE",
            LogicalType::TimeMillis => "TIME_MILLIS",
            LogicalType::TimeMicros => "TIME_MICROS",
            LogicalType::TimeNanos => "TIME_NANOS",
            LogicalType::Uuid => "UUID",
            LogicalType::Enum => "ENUM",
            LogicalType::Json => "JSON",
            LogicalType::Bson => "BSON",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &[
            "NONE",
            "STRING",
            "DECIMAL(p,s)",
            "TIMESTAMP_NANOS",
            "TIMESTAMP_MICROS",
            "TIMESTAMP_MILLIS",
            "DATE",
            "TIME_MILLIS",
            "TIME_MICROS",
            "TIME_NANOS",
            "UUID",
            "ENUM",
            "JSON",
            "BSON",
        ]
    }

    pub fn decimal_spec(&self) -> Option<&DecimalSpec> {
        match self {
            LogicalType::Decimal(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, LogicalType::Decimal(_))
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(
            self,
            LogicalType::TimestampNanos | LogicalType::TimestampMicros | LogicalType::TimestampMillis
        )
    }

    fn from_name(name: &str) -> Option<Self> {
        let parsed = match name {
            "NONE" => LogicalType::None,
            "STRING" => LogicalType::String,
            "DECIMAL" => LogicalType::Decimal(DecimalSpec {
                precision: 0,
                scale: 0,
            }),
            "TIMESTAMP_NANOS" => LogicalType::TimestampNanos,
            "TIMESTAMP_MICROS" => LogicalType::TimestampMicros,
            "TIMESTAMP_MILLIS" => LogicalType::TimestampMillis,
            "DATE" => LogicalType::Date,
            "TIME_MILLIS" => LogicalType::TimeMillis,
            "TIME_MICROS" => LogicalType::TimeMicros,
            "TIME_NANOS" => LogicalType::TimeNanos,
            "UUID" => LogicalType::Uuid,
            "ENUM" => LogicalType::Enum,
            "JSON" => LogicalType::Json,
            "BSON" => LogicalType::Bson,
            _ => return None,
        };
        Some(parsed)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Decimal(spec) => f.write_str(&spec.signature()),
            other => f.write_str(other.name()),
        }
    }
}

/// Validated target type of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeSpec {
    physical: PhysicalType,
    logical: LogicalType,
}

impl TypeSpec {
    pub fn new(physical: PhysicalType, logical: LogicalType) -> Result<Self> {
        let spec = TypeSpec { physical, logical };
        spec.ensure_valid(&spec.to_string())?;
        Ok(spec)
    }

    pub fn physical(&self) -> PhysicalType {
        self.physical
    }

    pub fn logical(&self) -> LogicalType {
        self.logical
    }

    pub fn primitive_len(&self) -> Option<u32> {
        self.physical.fixed_len()
    }

    pub fn decimal_spec(&self) -> Option<&DecimalSpec> {
        self.logical.decimal_spec()
    }

    fn ensure_valid(&self, spec: &str) -> Result<()> {
        if let PhysicalType::FixedLenByteArray(0) = self.physical {
            return Err(constraint(spec, "FIXED_LEN_BYTE_ARRAY length must be positive, got 0"));
        }
        if self.logical.is_timestamp() && self.physical != PhysicalType::Int64 {
            return Err(constraint(
                spec,
                format!(
                    "{} requires INT64 primitive type, got {}",
                    self.logical.name(),
                    self.physical.name()
                ),
            ));
        }
        if self.logical == LogicalType::String && self.physical != PhysicalType::ByteArray {
            return Err(constraint(
                spec,
                format!(
                    "STRING requires BYTE_ARRAY primitive type, got {}",
                    self.physical.name()
                ),
            ));
        }
        if self.logical == LogicalType::Date && self.physical != PhysicalType::Int32 {
            return Err(constraint(
                spec,
                format!("DATE requires INT32 primitive type, got {}", self.physical.name()),
            ));
        }
        if let LogicalType::Decimal(decimal) = self.logical {
            if !self.physical.can_hold_decimal() {
                return Err(constraint(
                    spec,
                    format!(
                        "DECIMAL requires INT32, INT64, BYTE_ARRAY, or FIXED_LEN_BYTE_ARRAY primitive type, got {}",
                        self.physical.name()
                    ),
                ));
            }
            if decimal.precision == 0 {
                return Err(constraint(spec, "DECIMAL precision must be positive"));
            }
            if decimal.scale > decimal.precision {
                return Err(constraint(
                    spec,
                    format!(
                        "DECIMAL scale ({}) cannot exceed precision ({})",
                        decimal.scale, decimal.precision
                    ),
                ));
            }
            if let Some(max) = self.physical.max_decimal_precision()
                && decimal.precision > max
            {
                return Err(constraint(
                    spec,
                    format!(
                        "DECIMAL precision {} exceeds maximum {} for {}",
                        decimal.precision,
                        max,
                        self.physical.name()
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.physical, self.logical)
    }
}

impl FromStr for TypeSpec {
    type Err = ConversionError;

    fn from_str(spec: &str) -> Result<Self> {
        if spec.trim().is_empty() {
            return Err(format_error(spec, "empty type specification"));
        }
        let (primitive_part, logical_part) = spec
            .split_once(':')
            .ok_or_else(|| format_error(spec, "must be PRIMITIVE:LOGICAL format"))?;
        let primitive_part = primitive_part.trim();
        let logical_part = logical_part.trim();
        if primitive_part.is_empty() {
            return Err(format_error(spec, "missing primitive type"));
        }
        if logical_part.is_empty() {
            return Err(format_error(spec, "missing logical type"));
        }

        let physical = parse_physical(spec, primitive_part)?;
        let logical = parse_logical(spec, logical_part)?;
        let parsed = TypeSpec { physical, logical };
        parsed.ensure_valid(spec)?;
        Ok(parsed)
    }
}

impl TryFrom<String> for TypeSpec {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TypeSpec> for String {
    fn from(spec: TypeSpec) -> Self {
        spec.to_string()
    }
}

/// Current type of an existing column, as reported by the schema layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceTypeInfo {
    pub physical: PhysicalType,
    pub logical: LogicalType,
}

impl SourceTypeInfo {
    pub fn new(physical: PhysicalType, logical: LogicalType) -> Self {
        Self { physical, logical }
    }

    pub fn decimal_spec(&self) -> Option<&DecimalSpec> {
        self.logical.decimal_spec()
    }
}

impl From<TypeSpec> for SourceTypeInfo {
    fn from(spec: TypeSpec) -> Self {
        Self {
            physical: spec.physical,
            logical: spec.logical,
        }
    }
}

impl fmt::Display for SourceTypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.physical, self.logical)
    }
}

impl FromStr for SourceTypeInfo {
    type Err = ConversionError;

    fn from_str(spec: &str) -> Result<Self> {
        TypeSpec::from_str(spec).map(SourceTypeInfo::from)
    }
}

impl TryFrom<String> for SourceTypeInfo {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SourceTypeInfo> for String {
    fn from(info: SourceTypeInfo) -> Self {
        info.to_string()
    }
}

fn split_token(spec: &str, part: &str) -> Result<(String, Option<String>)> {
    let upper = part.to_ascii_uppercase();
    let captures = TYPE_TOKEN
        .captures(&upper)
        .ok_or_else(|| format_error(spec, format!("malformed type token [{part}]")))?;
    let name = captures[1].to_string();
    let params = captures.get(2).map(|m| m.as_str().trim().to_string());
    Ok((name, params))
}

fn parse_physical(spec: &str, part: &str) -> Result<PhysicalType> {
    let (name, params) = split_token(spec, part)?;
    let physical = PhysicalType::from_name(&name).ok_or_else(|| ConversionError::UnknownType {
        spec: spec.to_string(),
        reason: format!(
            "unknown primitive type [{part}]. Supported types: {}",
            PhysicalType::variants().join(", ")
        ),
    })?;

    match (physical, params) {
        (PhysicalType::FixedLenByteArray(_), None) => Err(constraint(
            spec,
            "FIXED_LEN_BYTE_ARRAY requires length, use FIXED_LEN_BYTE_ARRAY(n)",
        )),
        (PhysicalType::FixedLenByteArray(_), Some(raw)) => {
            let length = parse_integer(spec, &raw, "FIXED_LEN_BYTE_ARRAY length")?;
            if length <= 0 {
                return Err(constraint(
                    spec,
                    format!("FIXED_LEN_BYTE_ARRAY length must be positive, got {length}"),
                ));
            }
            let length = u32::try_from(length).map_err(|_| {
                constraint(spec, format!("FIXED_LEN_BYTE_ARRAY length {length} is too large"))
            })?;
            Ok(PhysicalType::FixedLenByteArray(length))
        }
        (other, Some(_)) => Err(constraint(
            spec,
            format!("{} does not take parameters", other.name()),
        )),
        (other, None) => Ok(other),
    }
}

fn parse_logical(spec: &str, part: &str) -> Result<LogicalType> {
    let (name, params) = split_token(spec, part)?;
    let logical = LogicalType::from_name(&name).ok_or_else(|| ConversionError::UnknownType {
        spec: spec.to_string(),
        reason: format!(
            "unknown logical type [{part}]. Supported types: {}",
            LogicalType::variants().join(", ")
        ),
    })?;

    match (logical, params) {
        (LogicalType::Decimal(_), None) => Err(constraint(
            spec,
            "DECIMAL requires precision and scale, use DECIMAL(p,s)",
        )),
        (LogicalType::Decimal(_), Some(raw)) => {
            let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
            let [precision, scale] = parts.as_slice() else {
                return Err(constraint(
                    spec,
                    "DECIMAL requires precision and scale, use DECIMAL(p,s)",
                ));
            };
            let precision = parse_integer(spec, precision, "DECIMAL precision")?;
            let scale = parse_integer(spec, scale, "DECIMAL scale")?;
            if precision <= 0 {
                return Err(constraint(spec, "DECIMAL precision must be positive"));
            }
            if scale < 0 {
                return Err(constraint(spec, "DECIMAL scale must be non-negative"));
            }
            let precision = u32::try_from(precision)
                .map_err(|_| constraint(spec, format!("DECIMAL precision {precision} is too large")))?;
            let scale = u32::try_from(scale)
                .map_err(|_| constraint(spec, format!("DECIMAL scale {scale} is too large")))?;
            Ok(LogicalType::Decimal(DecimalSpec { precision, scale }))
        }
        (other, Some(_)) => Err(constraint(
            spec,
            format!("{} does not take parameters", other.name()),
        )),
        (other, None) => Ok(other),
    }
}

fn parse_integer(spec: &str, raw: &str, what: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| format_error(spec, format!("invalid {what} [{raw}]")))
}

fn format_error(spec: &str, reason: impl Into<String>) -> ConversionError {
    ConversionError::Format {
        spec: spec.to_string(),
        reason: reason.into(),
    }
}

fn constraint(spec: &str, reason: impl Into<String>) -> ConversionError {
    ConversionError::Constraint {
        spec: spec.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_fixed_len_decimal() {
        let spec: TypeSpec = "FIXED_LEN_BYTE_ARRAY(16):DECIMAL(38,10)"
            .parse()
            .expect("parse flba decimal");
        assert_eq!(spec.physical(), PhysicalType::FixedLenByteArray(16));
        assert_eq!(spec.primitive_len(), Some(16));
        assert_eq!(
            spec.logical(),
            LogicalType::Decimal(DecimalSpec {
                precision: 38,
                scale: 10
            })
        );
    }

    #[test]
    fn parsing_is_case_insensitive() {
        let spec: TypeSpec = "fixed_len_byte_array(4):decimal(9,2)"
            .parse()
            .expect("lowercase spec");
        assert_eq!(spec.to_string(), "FIXED_LEN_BYTE_ARRAY(4):DECIMAL(9,2)");

        let spec: TypeSpec = " int64 : timestamp_micros ".parse().expect("padded spec");
        assert_eq!(spec.logical(), LogicalType::TimestampMicros);
    }

    #[test]
    fn fixed_len_capacity_follows_bit_width() {
        assert_eq!(PhysicalType::FixedLenByteArray(1).max_decimal_precision(), Some(2));
        assert_eq!(PhysicalType::FixedLenByteArray(4).max_decimal_precision(), Some(9));
        assert_eq!(PhysicalType::FixedLenByteArray(8).max_decimal_precision(), Some(18));
        assert_eq!(PhysicalType::FixedLenByteArray(16).max_decimal_precision(), Some(38));
        assert_eq!(PhysicalType::ByteArray.max_decimal_precision(), None);
    }

    #[test]
    fn bare_parameterised_types_are_constraint_errors() {
        let err = "FIXED_LEN_BYTE_ARRAY:NONE".parse::<TypeSpec>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Constraint);
        assert!(err.to_string().contains("requires length"));

        let err = "INT64:DECIMAL".parse::<TypeSpec>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Constraint);
        assert!(err.to_string().contains("requires precision and scale"));

        for raw in ["INT64:DECIMAL()", "INT64:DECIMAL(5)", "INT64:DECIMAL(5,2,1)"] {
            let err = raw.parse::<TypeSpec>().expect_err(raw);
            assert_eq!(err.kind(), ErrorKind::Constraint, "{raw}");
            assert!(err.to_string().contains("requires precision and scale"));
        }
        let err = "INT64:DECIMAL(5,x)".parse::<TypeSpec>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn new_rejects_zero_length_fixed_array() {
        let err = TypeSpec::new(PhysicalType::FixedLenByteArray(0), LogicalType::None)
            .expect_err("zero length");
        assert_eq!(err.kind(), ErrorKind::Constraint);
    }

    #[test]
    fn source_info_parses_through_the_same_grammar() {
        let info: SourceTypeInfo = "INT96:NONE".parse().expect("int96 source");
        assert_eq!(info.physical, PhysicalType::Int96);
        assert_eq!(info.logical, LogicalType::None);
        assert_eq!(info.to_string(), "INT96:NONE");
    }
}
