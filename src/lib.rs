pub mod binary;
pub mod cli;
pub mod converter;
pub mod decimal;
pub mod error;
pub mod int96;
pub mod matrix;
pub mod numeric;
pub mod plan;
pub mod typespec;
pub mod unscaled;
pub mod value;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    decimal::DecimalRepr,
    int96::TimestampUnit,
    plan::{ConversionPlan, FieldTypeRule, SourceSchema},
    typespec::{SourceTypeInfo, TypeSpec},
    unscaled::format_unscaled,
    value::Value,
};

pub use converter::{Converter, build};
pub use error::{ConversionError, ErrorKind};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("parquet_retype", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Targets(args) => handle_targets(&args),
        Commands::Check(args) => handle_check(&args),
        Commands::Convert(args) => handle_convert(&args),
    }
}

fn handle_targets(args: &cli::TargetsArgs) -> Result<()> {
    let source: SourceTypeInfo = args
        .source
        .parse()
        .with_context(|| format!("Parsing source type '{}'", args.source))?;
    let targets = matrix::allowed_targets(&source);
    debug!("{} target(s) reachable from {source}", targets.len());
    if args.json {
        let rendered = serde_json::to_string_pretty(&targets).context("Serializing targets")?;
        println!("{rendered}");
    } else if targets.is_empty() {
        info!("No conversions are available from {source}");
    } else {
        println!("{}", targets.iter().join("\n"));
    }
    Ok(())
}

fn handle_check(args: &cli::CheckArgs) -> Result<()> {
    let schema = SourceSchema::load(&args.schema)
        .with_context(|| format!("Loading source schema from {:?}", args.schema))?;
    let rules = args
        .field_types
        .iter()
        .map(|raw| raw.parse::<FieldTypeRule>())
        .collect::<Result<Vec<_>, _>>()
        .context("Parsing --field-type definitions")?;
    let plan = ConversionPlan::build(&schema, &rules)
        .with_context(|| format!("Planning conversions for {:?}", args.schema))?;
    if args.emit_schema {
        print!("{}", plan.target_schema(&schema).to_yaml_string()?);
    } else {
        for (path, column) in plan.iter() {
            println!("{path}: {} -> {}", column.source, column.target);
        }
    }
    info!("✓ {} field conversion(s) are valid", plan.len());
    Ok(())
}

fn handle_convert(args: &cli::ConvertArgs) -> Result<()> {
    let source: SourceTypeInfo = args
        .from
        .parse()
        .with_context(|| format!("Parsing source type '{}'", args.from))?;
    let target: TypeSpec = args
        .to
        .parse()
        .with_context(|| format!("Parsing target type '{}'", args.to))?;
    let converter = build(&source, &target)
        .with_context(|| format!("Building converter {source} -> {target}"))?;
    for raw in &args.values {
        let input = Value::parse_literal(raw, source.physical)
            .with_context(|| format!("Reading value '{raw}' as {source}"))?;
        let output = converter
            .convert(input)
            .with_context(|| format!("Converting '{raw}' from {source} to {target}"))?;
        println!("{}", render_value(&output, &target));
    }
    Ok(())
}

fn render_value(value: &Value, target: &TypeSpec) -> String {
    if value.is_null() {
        return value.to_string();
    }
    if let (Some(spec), Some(repr)) = (
        target.decimal_spec(),
        DecimalRepr::from_physical(target.physical()),
    ) && let Ok(unscaled) = repr.decode(value.clone())
    {
        return format!("{value} ({})", format_unscaled(&unscaled, spec.scale));
    }
    if let (Some(unit), Value::Int64(raw)) = (TimestampUnit::from_logical(target.logical()), value)
        && let Some(datetime) = unit.to_datetime(*raw)
    {
        return format!("{value} ({})", datetime.format("%Y-%m-%d %H:%M:%S%.f"));
    }
    value.to_string()
}
