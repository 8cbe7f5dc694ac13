use crate::{
    error::{ConversionError, Result},
    typespec::PhysicalType,
    value::Value,
};

/// 2^63, the first double above the `i64` range.
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericConversion {
    Int32ToInt64,
    Int64ToInt32,
    FloatToDouble,
    DoubleToFloat,
    Int32ToFloat,
    Int32ToDouble,
    Int64ToFloat,
    Int64ToDouble,
    FloatToInt32,
    FloatToInt64,
    DoubleToInt32,
    DoubleToInt64,
}

impl NumericConversion {
    pub fn for_pair(source: PhysicalType, target: PhysicalType) -> Option<Self> {
        use PhysicalType::{Double, Float, Int32, Int64};
        let conversion = match (source, target) {
            (Int32, Int64) => NumericConversion::Int32ToInt64,
            (Int64, Int32) => NumericConversion::Int64ToInt32,
            (Float, Double) => NumericConversion::FloatToDouble,
            (Double, Float) => NumericConversion::DoubleToFloat,
            (Int32, Float) => NumericConversion::Int32ToFloat,
            (Int32, Double) => NumericConversion::Int32ToDouble,
            (Int64, Float) => NumericConversion::Int64ToFloat,
            (Int64, Double) => NumericConversion::Int64ToDouble,
            (Float, Int32) => NumericConversion::FloatToInt32,
            (Float, Int64) => NumericConversion::FloatToInt64,
            (Double, Int32) => NumericConversion::DoubleToInt32,
            (Double, Int64) => NumericConversion::DoubleToInt64,
            _ => return None,
        };
        Some(conversion)
    }

    pub fn convert(&self, value: Value) -> Result<Value> {
        match (self, value) {
            (NumericConversion::Int32ToInt64, Value::Int32(v)) => Ok(Value::Int64(i64::from(v))),
            (NumericConversion::Int64ToInt32, Value::Int64(v)) => i32::try_from(v)
                .map(Value::Int32)
                .map_err(|_| {
                    ConversionError::overflow(format!("int64 value {v} overflows int32 range"))
                }),
            (NumericConversion::FloatToDouble, Value::Float32(v)) => {
                Ok(Value::Float64(f64::from(v)))
            }
            (NumericConversion::DoubleToFloat, Value::Float64(v)) => {
                if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                    return Err(ConversionError::overflow(format!(
                        "float64 value {v} overflows float32 range"
                    )));
                }
                Ok(Value::Float32(v as f32))
            }
            (NumericConversion::Int32ToFloat, Value::Int32(v)) => Ok(Value::Float32(v as f32)),
            (NumericConversion::Int32ToDouble, Value::Int32(v)) => {
                Ok(Value::Float64(f64::from(v)))
            }
            (NumericConversion::Int64ToFloat, Value::Int64(v)) => Ok(Value::Float32(v as f32)),
            (NumericConversion::Int64ToDouble, Value::Int64(v)) => Ok(Value::Float64(v as f64)),
            (NumericConversion::FloatToInt32, Value::Float32(v)) => {
                float_to_int32(f64::from(v), "float32")
            }
            (NumericConversion::FloatToInt64, Value::Float32(v)) => {
                float_to_int64(f64::from(v), "float32")
            }
            (NumericConversion::DoubleToInt32, Value::Float64(v)) => float_to_int32(v, "float64"),
            (NumericConversion::DoubleToInt64, Value::Float64(v)) => float_to_int64(v, "float64"),
            (conversion, other) => Err(ConversionError::TypeMismatch {
                expected: conversion.expected_input(),
                found: other.type_name(),
            }),
        }
    }

    fn expected_input(&self) -> &'static str {
        match self {
            NumericConversion::Int32ToInt64
            | NumericConversion::Int32ToFloat
            | NumericConversion::Int32ToDouble => "int32",
            NumericConversion::Int64ToInt32
            | NumericConversion::Int64ToFloat
            | NumericConversion::Int64ToDouble => "int64",
            NumericConversion::FloatToDouble
            | NumericConversion::FloatToInt32
            | NumericConversion::FloatToInt64 => "float32",
            NumericConversion::DoubleToFloat
            | NumericConversion::DoubleToInt32
            | NumericConversion::DoubleToInt64 => "float64",
        }
    }
}

fn truncate_finite(value: f64, target: &str) -> Result<f64> {
    if value.is_nan() {
        return Err(ConversionError::invalid(format!(
            "cannot convert NaN to {target}"
        )));
    }
    if value.is_infinite() {
        return Err(ConversionError::invalid(format!(
            "cannot convert Inf to {target}"
        )));
    }
    Ok(value.trunc())
}

fn float_to_int32(value: f64, source: &str) -> Result<Value> {
    let truncated = truncate_finite(value, "int32")?;
    if truncated < f64::from(i32::MIN) || truncated > f64::from(i32::MAX) {
        return Err(ConversionError::overflow(format!(
            "{source} value {value} overflows int32 range"
        )));
    }
    Ok(Value::Int32(truncated as i32))
}

fn float_to_int64(value: f64, source: &str) -> Result<Value> {
    let truncated = truncate_finite(value, "int64")?;
    if truncated < -I64_UPPER_BOUND || truncated >= I64_UPPER_BOUND {
        return Err(ConversionError::overflow(format!(
            "{source} value {value} overflows int64 range"
        )));
    }
    Ok(Value::Int64(truncated as i64))
}
