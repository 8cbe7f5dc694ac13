use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::{
    error::{ConversionError, Result},
    typespec::{DecimalSpec, PhysicalType},
    unscaled::{decode_twos_complement, encode_twos_complement, fits_precision, rescale},
    value::Value,
};

/// Physical carrier of a decimal unscaled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalRepr {
    Int32,
    Int64,
    ByteArray,
    FixedLenByteArray(usize),
}

impl DecimalRepr {
    pub fn from_physical(physical: PhysicalType) -> Option<Self> {
        match physical {
            PhysicalType::Int32 => Some(DecimalRepr::Int32),
            PhysicalType::Int64 => Some(DecimalRepr::Int64),
            PhysicalType::ByteArray => Some(DecimalRepr::ByteArray),
            PhysicalType::FixedLenByteArray(len) => Some(DecimalRepr::FixedLenByteArray(len as usize)),
            _ => None,
        }
    }

    pub fn decode(&self, value: Value) -> Result<BigInt> {
        match (self, value) {
            (DecimalRepr::Int32, Value::Int32(v)) => Ok(BigInt::from(v)),
            (DecimalRepr::Int64, Value::Int64(v)) => Ok(BigInt::from(v)),
            (DecimalRepr::ByteArray | DecimalRepr::FixedLenByteArray(_), Value::Bytes(bytes)) => {
                Ok(decode_twos_complement(&bytes))
            }
            (repr, other) => Err(ConversionError::TypeMismatch {
                expected: repr.value_name(),
                found: other.type_name(),
            }),
        }
    }

    pub fn encode(&self, unscaled: &BigInt) -> Result<Value> {
        match self {
            DecimalRepr::Int32 => unscaled.to_i32().map(Value::Int32).ok_or_else(|| {
                ConversionError::overflow(format!("decimal value {unscaled} overflows int32 range"))
            }),
            DecimalRepr::Int64 => unscaled.to_i64().map(Value::Int64).ok_or_else(|| {
                ConversionError::overflow(format!("decimal value {unscaled} overflows int64 range"))
            }),
            DecimalRepr::ByteArray => Ok(Value::Bytes(encode_twos_complement(unscaled, 0))),
            DecimalRepr::FixedLenByteArray(len) => {
                let bytes = encode_twos_complement(unscaled, *len);
                if bytes.len() > *len {
                    return Err(ConversionError::overflow(format!(
                        "decimal value requires {} bytes, but FIXED_LEN_BYTE_ARRAY length is {len}",
                        bytes.len()
                    )));
                }
                Ok(Value::Bytes(bytes))
            }
        }
    }

    fn value_name(&self) -> &'static str {
        match self {
            DecimalRepr::Int32 => "int32",
            DecimalRepr::Int64 => "int64",
            DecimalRepr::ByteArray | DecimalRepr::FixedLenByteArray(_) => "bytes",
        }
    }
}

/// Decode, rescale, precision check, encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalConversion {
    source: DecimalRepr,
    target: DecimalRepr,
    scale_delta: i64,
    target_precision: u32,
}

impl DecimalConversion {
    pub fn new(
        source: DecimalRepr,
        source_spec: DecimalSpec,
        target: DecimalRepr,
        target_spec: DecimalSpec,
    ) -> Self {
        Self {
            source,
            target,
            scale_delta: i64::from(target_spec.scale) - i64::from(source_spec.scale),
            target_precision: target_spec.precision,
        }
    }

    pub fn convert(&self, value: Value) -> Result<Value> {
        let unscaled = self.source.decode(value)?;
        let rescaled = rescale(&unscaled, self.scale_delta);
        if !fits_precision(&rescaled, self.target_precision) {
            return Err(ConversionError::overflow(format!(
                "decimal value exceeds precision {}",
                self.target_precision
            )));
        }
        self.target.encode(&rescaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn spec(precision: u32, scale: u32) -> DecimalSpec {
        DecimalSpec { precision, scale }
    }

    #[test]
    fn int32_to_int64_keeps_unscaled_value() {
        let conv = DecimalConversion::new(DecimalRepr::Int32, spec(9, 2), DecimalRepr::Int64, spec(18, 2));
        assert_eq!(conv.convert(Value::Int32(12345)).unwrap(), Value::Int64(12345));
    }

    #[test]
    fn scale_changes_multiply_or_round() {
        let up = DecimalConversion::new(DecimalRepr::Int64, spec(10, 2), DecimalRepr::Int64, spec(12, 4));
        assert_eq!(up.convert(Value::Int64(12345)).unwrap(), Value::Int64(1234500));

        let down = DecimalConversion::new(DecimalRepr::Int64, spec(12, 4), DecimalRepr::Int64, spec(10, 2));
        assert_eq!(down.convert(Value::Int64(1234550)).unwrap(), Value::Int64(12346));
        assert_eq!(down.convert(Value::Int64(1234549)).unwrap(), Value::Int64(12345));
        assert_eq!(down.convert(Value::Int64(-1234550)).unwrap(), Value::Int64(-12346));
    }

    #[test]
    fn precision_overflow_is_reported() {
        let conv = DecimalConversion::new(DecimalRepr::Int64, spec(18, 0), DecimalRepr::Int32, spec(5, 0));
        let err = conv.convert(Value::Int64(999999)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert!(err.to_string().contains("exceeds precision 5"));
    }

    #[test]
    fn integer_width_overflow_is_distinct_from_precision() {
        let conv = DecimalConversion::new(
            DecimalRepr::ByteArray,
            spec(10, 0),
            DecimalRepr::Int32,
            spec(10, 0),
        );
        let bytes = encode_twos_complement(&BigInt::from(3_000_000_000i64), 0);
        let err = conv.convert(Value::Bytes(bytes)).unwrap_err();
        assert!(err.to_string().contains("overflows int32 range"));
    }

    #[test]
    fn fixed_len_target_sign_extends() {
        let conv = DecimalConversion::new(
            DecimalRepr::Int32,
            spec(9, 2),
            DecimalRepr::FixedLenByteArray(4),
            spec(9, 2),
        );
        assert_eq!(
            conv.convert(Value::Int32(-1)).unwrap(),
            Value::Bytes(vec![0xff; 4])
        );
        assert_eq!(
            conv.convert(Value::Int32(0)).unwrap(),
            Value::Bytes(vec![0; 4])
        );
    }

    #[test]
    fn fixed_len_target_rejects_wide_values() {
        let conv = DecimalConversion::new(
            DecimalRepr::ByteArray,
            spec(10, 0),
            DecimalRepr::FixedLenByteArray(2),
            spec(10, 0),
        );
        let bytes = encode_twos_complement(&BigInt::from(70_000), 0);
        let err = conv.convert(Value::Bytes(bytes)).unwrap_err();
        assert!(err.to_string().contains("requires 3 bytes"));
    }

    #[test]
    fn source_variant_must_match_repr() {
        let conv = DecimalConversion::new(DecimalRepr::Int32, spec(9, 2), DecimalRepr::Int64, spec(18, 2));
        let err = conv.convert(Value::Bytes(vec![1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }
}
