use thiserror::Error;

/// Coarse classification of a [`ConversionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    UnknownType,
    Constraint,
    UnsupportedConversion,
    ScaleIncompatibility,
    TypeMismatch,
    Overflow,
    InvalidValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("invalid type specification [{spec}]: {reason}")]
    Format { spec: String, reason: String },

    #[error("invalid type specification [{spec}]: {reason}")]
    UnknownType { spec: String, reason: String },

    #[error("invalid type specification [{spec}]: {reason}")]
    Constraint { spec: String, reason: String },

    #[error("conversion from {from} to {to} is not supported")]
    UnsupportedConversion { from: String, to: String },

    #[error("no converter available for {from} -> {to}")]
    NoConverter { from: String, to: String },

    #[error("unsupported timestamp logical type: {0}")]
    UnsupportedTimestamp(String),

    #[error(
        "scale increase from {source_scale} to {target_scale} requires precision {required}, but target precision is {target_precision}"
    )]
    ScaleIncompatibility {
        source_scale: u32,
        target_scale: u32,
        required: u64,
        target_precision: u32,
    },

    #[error("expected {expected} value, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    Overflow(String),

    #[error("{0}")]
    InvalidValue(String),
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::Format { .. } => ErrorKind::Format,
            ConversionError::UnknownType { .. } => ErrorKind::UnknownType,
            ConversionError::Constraint { .. } => ErrorKind::Constraint,
            ConversionError::UnsupportedConversion { .. }
            | ConversionError::NoConverter { .. }
            | ConversionError::UnsupportedTimestamp(_) => ErrorKind::UnsupportedConversion,
            ConversionError::ScaleIncompatibility { .. } => ErrorKind::ScaleIncompatibility,
            ConversionError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ConversionError::Overflow(_) => ErrorKind::Overflow,
            ConversionError::InvalidValue(_) => ErrorKind::InvalidValue,
        }
    }

    pub(crate) fn overflow(message: impl Into<String>) -> Self {
        ConversionError::Overflow(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ConversionError::InvalidValue(message.into())
    }
}

pub type Result<T, E = ConversionError> = std::result::Result<T, E>;
