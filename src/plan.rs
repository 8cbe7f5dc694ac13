//! Per-column conversion plans.
//!
//! A [`SourceSchema`] lists the leaf columns of an existing file with their
//! current types. [`FieldTypeRule`]s (`field.path=PRIMITIVE:LOGICAL`) select
//! which of those columns change type. [`ConversionPlan::build`] validates
//! every rule up front so the value pipeline never meets a bad pairing.

use std::{
    collections::{BTreeMap, HashSet},
    fs::File,
    io::BufReader,
    path::Path,
    str::FromStr,
};

use anyhow::Context;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    converter::{self, Converter},
    error::ConversionError,
    typespec::{SourceTypeInfo, TypeSpec},
    value::Value,
};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid field type format [{0}], expected 'field.path=PRIMITIVE:LOGICAL'")]
    InvalidRule(String),

    #[error("empty field path in [{0}]")]
    EmptyPath(String),

    #[error("empty type specification in [{0}]")]
    EmptySpec(String),

    #[error("invalid type specification for field [{field}]")]
    InvalidSpec {
        field: String,
        #[source]
        source: ConversionError,
    },

    #[error("field [{0}] has more than one type conversion")]
    DuplicateField(String),

    #[error("field [{0}] not found in schema")]
    UnknownField(String),

    #[error("cannot convert field [{field}]")]
    Unconvertible {
        field: String,
        #[source]
        source: ConversionError,
    },

    #[error("field [{field}] value could not be converted")]
    Value {
        field: String,
        #[source]
        source: ConversionError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeRule {
    pub path: String,
    pub target: TypeSpec,
}

impl FromStr for FieldTypeRule {
    type Err = PlanError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (path, spec) = raw
            .split_once('=')
            .ok_or_else(|| PlanError::InvalidRule(raw.to_string()))?;
        let path = path.trim();
        let spec = spec.trim();
        if path.is_empty() {
            return Err(PlanError::EmptyPath(raw.to_string()));
        }
        if spec.is_empty() {
            return Err(PlanError::EmptySpec(raw.to_string()));
        }
        let target = spec.parse().map_err(|source| PlanError::InvalidSpec {
            field: path.to_string(),
            source,
        })?;
        Ok(FieldTypeRule {
            path: path.to_string(),
            target,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumn {
    pub path: String,
    #[serde(rename = "type")]
    pub source: SourceTypeInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSchema {
    pub columns: Vec<SourceColumn>,
}

impl SourceSchema {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening source schema {path:?}"))?;
        let reader = BufReader::new(file);
        let schema: SourceSchema =
            serde_yaml::from_reader(reader).context("Parsing source schema YAML")?;
        Ok(schema)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("Parsing source schema YAML")
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(self).context("Serializing source schema to YAML")
    }

    pub fn column(&self, path: &str) -> Option<&SourceColumn> {
        self.columns.iter().find(|column| column.path == path)
    }
}

#[derive(Debug, Clone)]
pub struct ColumnConversion {
    pub source: SourceTypeInfo,
    pub target: TypeSpec,
    pub converter: Converter,
}

#[derive(Debug, Clone, Default)]
pub struct ConversionPlan {
    columns: BTreeMap<String, ColumnConversion>,
}

impl ConversionPlan {
    pub fn build(schema: &SourceSchema, rules: &[FieldTypeRule]) -> Result<Self, PlanError> {
        let mut seen = HashSet::new();
        let mut columns = BTreeMap::new();
        for rule in rules {
            if !seen.insert(rule.path.as_str()) {
                return Err(PlanError::DuplicateField(rule.path.clone()));
            }
            let column = schema
                .column(&rule.path)
                .ok_or_else(|| PlanError::UnknownField(rule.path.clone()))?;
            let converter = converter::build(&column.source, &rule.target).map_err(|source| {
                PlanError::Unconvertible {
                    field: rule.path.clone(),
                    source,
                }
            })?;
            debug!(
                "Field '{}' will convert {} -> {}",
                rule.path, column.source, rule.target
            );
            columns.insert(
                rule.path.clone(),
                ColumnConversion {
                    source: column.source,
                    target: rule.target,
                    converter,
                },
            );
        }
        info!(
            "Conversion plan covers {} of {} column(s)",
            columns.len(),
            schema.columns.len()
        );
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, path: &str) -> Option<&ColumnConversion> {
        self.columns.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnConversion)> {
        self.columns
            .iter()
            .map(|(path, column)| (path.as_str(), column))
    }

    /// Converts one value of `path`; columns without a rule pass through.
    pub fn convert(&self, path: &str, value: Value) -> Result<Value, PlanError> {
        match self.columns.get(path) {
            Some(column) => column
                .converter
                .convert(value)
                .map_err(|source| PlanError::Value {
                    field: path.to_string(),
                    source,
                }),
            None => Ok(value),
        }
    }

    /// `schema` with every planned column switched to its target type.
    pub fn target_schema(&self, schema: &SourceSchema) -> SourceSchema {
        let columns = schema
            .columns
            .iter()
            .map(|column| match self.columns.get(&column.path) {
                Some(planned) => SourceColumn {
                    path: column.path.clone(),
                    source: SourceTypeInfo::from(planned.target),
                },
                None => column.clone(),
            })
            .collect();
        SourceSchema { columns }
    }
}
