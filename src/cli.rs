use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Validate and apply Parquet column type conversions",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the target types reachable from a source type
    Targets(TargetsArgs),
    /// Validate field type conversions against a source schema
    Check(CheckArgs),
    /// Convert literal values from one type to another
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
pub struct TargetsArgs {
    /// Source type such as `INT32:DECIMAL(9,2)` or `INT96:NONE`
    #[arg(short, long)]
    pub source: String,
    /// Emit the target list as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// YAML file listing column paths and their current types
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Field type conversion in 'field.path=PRIMITIVE:LOGICAL' format (repeatable)
    #[arg(short = 't', long = "field-type", action = clap::ArgAction::Append, required = true)]
    pub field_types: Vec<String>,
    /// Print the resulting schema as YAML instead of the per-column summary
    #[arg(long)]
    pub emit_schema: bool,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Current type of the values
    #[arg(short, long)]
    pub from: String,
    /// Desired type of the values
    #[arg(short, long)]
    pub to: String,
    /// Values to convert (`null`, numbers, text or 0x-prefixed hex)
    #[arg(required = true, allow_hyphen_values = true)]
    pub values: Vec<String>,
}
