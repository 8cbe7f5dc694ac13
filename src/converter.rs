//! Builds a single-value converter for a validated (source, target) pair.

use log::debug;

use crate::{
    binary::BinaryConversion,
    decimal::{DecimalConversion, DecimalRepr},
    error::{ConversionError, Result},
    int96::{Int96Conversion, TimestampUnit},
    matrix::validate_conversion,
    numeric::NumericConversion,
    typespec::{PhysicalType, SourceTypeInfo, TypeSpec},
    value::Value,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ConverterKind {
    Numeric(NumericConversion),
    Binary(BinaryConversion),
    Decimal(DecimalConversion),
    Int96(Int96Conversion),
}

/// Null-safe conversion of one value. Holds only read-only parameters, so a
/// single instance can be shared across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Converter {
    kind: ConverterKind,
}

impl Converter {
    pub fn kind(&self) -> &ConverterKind {
        &self.kind
    }

    pub fn convert(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match &self.kind {
            ConverterKind::Numeric(conv) => conv.convert(value),
            ConverterKind::Binary(conv) => conv.convert(value),
            ConverterKind::Decimal(conv) => conv.convert(value),
            ConverterKind::Int96(conv) => conv.convert(value),
        }
    }
}

/// Validates the pair, then selects the converter family.
pub fn build(source: &SourceTypeInfo, target: &TypeSpec) -> Result<Converter> {
    validate_conversion(source, target)?;
    let kind = dispatch(source, target)?;
    debug!("Built {kind:?} converter for {source} -> {target}");
    Ok(Converter { kind })
}

fn dispatch(source: &SourceTypeInfo, target: &TypeSpec) -> Result<ConverterKind> {
    let either_decimal = source.logical.is_decimal() || target.logical().is_decimal();
    let (from, to) = (source.physical, target.physical());

    if from == PhysicalType::Int96 && to == PhysicalType::Int64 {
        let unit = TimestampUnit::from_logical(target.logical())
            .ok_or_else(|| ConversionError::UnsupportedTimestamp(target.logical().to_string()))?;
        return Ok(ConverterKind::Int96(Int96Conversion::new(unit)));
    }

    if from.is_numeric() && to.is_numeric() {
        if either_decimal {
            return decimal_converter(source, target).map(ConverterKind::Decimal);
        }
        return NumericConversion::for_pair(from, to)
            .map(ConverterKind::Numeric)
            .ok_or_else(|| no_converter(source, target));
    }

    if from.is_binary() && to.is_binary() {
        if either_decimal {
            return decimal_converter(source, target).map(ConverterKind::Decimal);
        }
        return BinaryConversion::for_pair(source, target)
            .map(ConverterKind::Binary)
            .ok_or_else(|| no_converter(source, target));
    }

    if either_decimal {
        return decimal_converter(source, target).map(ConverterKind::Decimal);
    }
    Err(no_converter(source, target))
}

fn decimal_converter(source: &SourceTypeInfo, target: &TypeSpec) -> Result<DecimalConversion> {
    let (Some(source_spec), Some(target_spec)) = (source.decimal_spec(), target.decimal_spec())
    else {
        return Err(no_converter(source, target));
    };
    let (Some(source_repr), Some(target_repr)) = (
        DecimalRepr::from_physical(source.physical),
        DecimalRepr::from_physical(target.physical()),
    ) else {
        return Err(no_converter(source, target));
    };
    Ok(DecimalConversion::new(
        source_repr,
        *source_spec,
        target_repr,
        *target_spec,
    ))
}

fn no_converter(source: &SourceTypeInfo, target: &TypeSpec) -> ConversionError {
    ConversionError::NoConverter {
        from: source.to_string(),
        to: target.to_string(),
    }
}
