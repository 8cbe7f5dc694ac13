use crate::{
    error::{ConversionError, Result},
    typespec::{LogicalType, PhysicalType, SourceTypeInfo, TypeSpec},
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryConversion {
    /// BYTE_ARRAY into a fixed width, right-padded with zeros.
    PadToFixed(usize),
    /// FIXED_LEN_BYTE_ARRAY into BYTE_ARRAY.
    Unfix,
    /// FIXED_LEN_BYTE_ARRAY width change; only zero bytes may be cut.
    Resize(usize),
    /// Adds the STRING annotation.
    ValidateUtf8,
    PassThrough,
}

impl BinaryConversion {
    pub fn for_pair(source: &SourceTypeInfo, target: &TypeSpec) -> Option<Self> {
        let adds_string =
            target.logical() == LogicalType::String && source.logical != LogicalType::String;
        let conversion = match (source.physical, target.physical()) {
            (PhysicalType::ByteArray, PhysicalType::FixedLenByteArray(len)) => {
                BinaryConversion::PadToFixed(len as usize)
            }
            (PhysicalType::FixedLenByteArray(_), PhysicalType::ByteArray) if adds_string => {
                BinaryConversion::ValidateUtf8
            }
            (PhysicalType::FixedLenByteArray(_), PhysicalType::ByteArray) => {
                BinaryConversion::Unfix
            }
            (PhysicalType::ByteArray, PhysicalType::ByteArray) if adds_string => {
                BinaryConversion::ValidateUtf8
            }
            (PhysicalType::ByteArray, PhysicalType::ByteArray) => BinaryConversion::PassThrough,
            (PhysicalType::FixedLenByteArray(_), PhysicalType::FixedLenByteArray(len)) => {
                BinaryConversion::Resize(len as usize)
            }
            _ => return None,
        };
        Some(conversion)
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
        let converted = match *self {
            BinaryConversion::PadToFixed(len) => {
                if bytes.len() > len {
                    return Err(ConversionError::overflow(format!(
                        "byte array length {} exceeds FIXED_LEN_BYTE_ARRAY length {len}",
                        bytes.len()
                    )));
                }
                pad_right(bytes, len)
            }
            BinaryConversion::Unfix | BinaryConversion::PassThrough => bytes,
            BinaryConversion::Resize(len) => {
                if bytes.len() > len {
                    if bytes[len..].iter().any(|b| *b != 0) {
                        return Err(ConversionError::overflow(
                            "FIXED_LEN_BYTE_ARRAY truncation would lose non-zero data",
                        ));
                    }
                    let mut bytes = bytes;
                    bytes.truncate(len);
                    bytes
                } else {
                    pad_right(bytes, len)
                }
            }
            BinaryConversion::ValidateUtf8 => {
                if std::str::from_utf8(&bytes).is_err() {
                    return Err(ConversionError::invalid(
                        "byte array contains invalid UTF-8 and cannot be converted to STRING",
                    ));
                }
                bytes
            }
        };
        Ok(Value::Bytes(converted))
    }
}

fn pad_right(mut bytes: Vec<u8>, len: usize) -> Vec<u8> {
    if bytes.len() < len {
        bytes.resize(len, 0);
    }
    bytes
}
