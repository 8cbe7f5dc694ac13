//! Which (source, target) type pairs may be converted at all.
//!
//! Both sides are reduced to a normalized key: the bare physical name when
//! no logical annotation is present, `PHYSICAL:DECIMAL` for decimals (the
//! precision and scale are checked separately), `INT64:TIMESTAMP` for every
//! timestamp unit and `PHYSICAL:LOGICAL` otherwise.

use crate::{
    error::{ConversionError, Result},
    typespec::{LogicalType, PhysicalType, SourceTypeInfo, TypeSpec},
};

const ALLOWED_CONVERSIONS: &[(&str, &str)] = &[
    ("INT32", "INT64"),
    ("INT64", "INT32"),
    ("FLOAT", "DOUBLE"),
    ("DOUBLE", "FLOAT"),
    ("INT32", "FLOAT"),
    ("INT32", "DOUBLE"),
    ("INT64", "FLOAT"),
    ("INT64", "DOUBLE"),
    ("FLOAT", "INT32"),
    ("FLOAT", "INT64"),
    ("DOUBLE", "INT32"),
    ("DOUBLE", "INT64"),
    ("INT96", "INT64:TIMESTAMP"),
    ("BYTE_ARRAY", "FIXED_LEN_BYTE_ARRAY"),
    ("FIXED_LEN_BYTE_ARRAY", "BYTE_ARRAY"),
    ("BYTE_ARRAY", "BYTE_ARRAY"),
    ("FIXED_LEN_BYTE_ARRAY", "FIXED_LEN_BYTE_ARRAY"),
    ("BYTE_ARRAY", "BYTE_ARRAY:STRING"),
    ("BYTE_ARRAY:STRING", "BYTE_ARRAY"),
    ("BYTE_ARRAY:STRING", "BYTE_ARRAY:STRING"),
    ("BYTE_ARRAY:STRING", "FIXED_LEN_BYTE_ARRAY"),
    ("FIXED_LEN_BYTE_ARRAY", "BYTE_ARRAY:STRING"),
    ("INT32:DECIMAL", "INT32:DECIMAL"),
    ("INT32:DECIMAL", "INT64:DECIMAL"),
    ("INT32:DECIMAL", "BYTE_ARRAY:DECIMAL"),
    ("INT32:DECIMAL", "FIXED_LEN_BYTE_ARRAY:DECIMAL"),
    ("INT64:DECIMAL", "INT32:DECIMAL"),
    ("INT64:DECIMAL", "INT64:DECIMAL"),
    ("INT64:DECIMAL", "BYTE_ARRAY:DECIMAL"),
    ("INT64:DECIMAL", "FIXED_LEN_BYTE_ARRAY:DECIMAL"),
    ("BYTE_ARRAY:DECIMAL", "INT32:DECIMAL"),
    ("BYTE_ARRAY:DECIMAL", "INT64:DECIMAL"),
    ("BYTE_ARRAY:DECIMAL", "BYTE_ARRAY:DECIMAL"),
    ("BYTE_ARRAY:DECIMAL", "FIXED_LEN_BYTE_ARRAY:DECIMAL"),
    ("FIXED_LEN_BYTE_ARRAY:DECIMAL", "INT32:DECIMAL"),
    ("FIXED_LEN_BYTE_ARRAY:DECIMAL", "INT64:DECIMAL"),
    ("FIXED_LEN_BYTE_ARRAY:DECIMAL", "BYTE_ARRAY:DECIMAL"),
    ("FIXED_LEN_BYTE_ARRAY:DECIMAL", "FIXED_LEN_BYTE_ARRAY:DECIMAL"),
];

pub fn type_key(physical: PhysicalType, logical: LogicalType) -> String {
    match logical {
        LogicalType::None => physical.name().to_string(),
        LogicalType::Decimal(_) => format!("{}:DECIMAL", physical.name()),
        other if other.is_timestamp() => "INT64:TIMESTAMP".to_string(),
        other => format!("{}:{}", physical.name(), other.name()),
    }
}

pub fn is_conversion_allowed(source_key: &str, target_key: &str) -> bool {
    ALLOWED_CONVERSIONS
        .iter()
        .any(|(from, to)| *from == source_key && *to == target_key)
}

/// Confirms the pair is on the allow-list and, for decimal pairs, that a
/// scale increase still fits the target precision.
pub fn validate_conversion(source: &SourceTypeInfo, target: &TypeSpec) -> Result<()> {
    let source_key = type_key(source.physical, source.logical);
    let target_key = type_key(target.physical(), target.logical());
    if !is_conversion_allowed(&source_key, &target_key) {
        return Err(ConversionError::UnsupportedConversion {
            from: source_key,
            to: target_key,
        });
    }

    if let (Some(from), Some(to)) = (source.decimal_spec(), target.decimal_spec())
        && to.scale > from.scale
    {
        let required = u64::from(from.precision) + u64::from(to.scale - from.scale);
        if required > u64::from(to.precision) {
            return Err(ConversionError::ScaleIncompatibility {
                source_scale: from.scale,
                target_scale: to.scale,
                required,
                target_precision: to.precision,
            });
        }
    }
    Ok(())
}

/// Normalized target keys reachable from `source`, in allow-list order.
pub fn allowed_targets(source: &SourceTypeInfo) -> Vec<&'static str> {
    let source_key = type_key(source.physical, source.logical);
    ALLOWED_CONVERSIONS
        .iter()
        .filter(|(from, _)| *from == source_key)
        .map(|(_, to)| *to)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::typespec::DecimalSpec;

    fn source(spec: &str) -> SourceTypeInfo {
        spec.parse().expect("valid source spec")
    }

    fn target(spec: &str) -> TypeSpec {
        spec.parse().expect("valid target spec")
    }

    #[test]
    fn type_key_collapses_timestamp_units_and_decimal_parameters() {
        assert_eq!(
            type_key(PhysicalType::Int64, LogicalType::TimestampMillis),
            "INT64:TIMESTAMP"
        );
        assert_eq!(
            type_key(
                PhysicalType::FixedLenByteArray(16),
                LogicalType::Decimal(DecimalSpec {
                    precision: 38,
                    scale: 4
                })
            ),
            "FIXED_LEN_BYTE_ARRAY:DECIMAL"
        );
        assert_eq!(type_key(PhysicalType::Int32, LogicalType::None), "INT32");
        assert_eq!(type_key(PhysicalType::Int32, LogicalType::Date), "INT32:DATE");
    }

    #[test]
    fn all_decimal_pairs_are_allowed() {
        let keys = [
            "INT32:DECIMAL",
            "INT64:DECIMAL",
            "BYTE_ARRAY:DECIMAL",
            "FIXED_LEN_BYTE_ARRAY:DECIMAL",
        ];
        for from in keys {
            for to in keys {
                assert!(is_conversion_allowed(from, to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn scale_increase_beyond_precision_is_rejected() {
        let err = validate_conversion(
            &source("INT64:DECIMAL(10,2)"),
            &target("INT64:DECIMAL(11,4)"),
        )
        .expect_err("needs precision 12");
        assert_eq!(err.kind(), ErrorKind::ScaleIncompatibility);
        assert!(err.to_string().contains("requires precision 12"));

        validate_conversion(&source("INT64:DECIMAL(10,2)"), &target("INT64:DECIMAL(12,4)"))
            .expect("precision 12 is enough");
        validate_conversion(&source("INT64:DECIMAL(10,4)"), &target("INT32:DECIMAL(5,2)"))
            .expect("scale decrease is checked per value only");
    }

    #[test]
    fn boolean_to_int_is_not_supported() {
        let err = validate_conversion(&source("BOOLEAN:NONE"), &target("INT32:NONE"))
            .expect_err("unrelated domains");
        assert_eq!(err.kind(), ErrorKind::UnsupportedConversion);
    }

    #[test]
    fn allowed_targets_follow_table_order() {
        assert_eq!(
            allowed_targets(&source("INT32:NONE")),
            vec!["INT64", "FLOAT", "DOUBLE"]
        );
        assert_eq!(allowed_targets(&source("INT96:NONE")), vec!["INT64:TIMESTAMP"]);
        assert!(allowed_targets(&source("BOOLEAN:NONE")).is_empty());
    }
}
