use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::fill::FillPolicy;

#[derive(Debug, Parser)]
#[command(author, version, about = "Compile and exercise spreadsheet forms", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a dictionary sheet (CSV export) into a form structure JSON
    Compile(CompileArgs),
    /// Check a form structure for duplicate ids and leaves without ids
    Validate(ValidateArgs),
    /// List every field id in a form structure with its description
    Ids(IdsArgs),
    /// Compare two JSON files recursively, ignoring key order
    Diff(DiffArgs),
    /// Generate synthetic field values for a form structure
    Fill(FillArgs),
    /// Generate one synthetic data set per fill policy
    Scenarios(ScenariosArgs),
    /// Build the enumeration catalog from enumeration sheet exports
    Catalog(CatalogArgs),
}

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Dictionary sheet exported as CSV
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination structure JSON file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// YAML file describing the sheet layout
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Existing structure to fold the compiled fields onto
    #[arg(long)]
    pub skeleton: Option<PathBuf>,
    /// 1-based row holding the column headers (overrides the config file)
    #[arg(long = "header-row")]
    pub header_row: Option<usize>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Form structure JSON file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,
}

#[derive(Debug, Args)]
pub struct IdsArgs {
    /// Form structure JSON file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// First JSON file
    pub first: PathBuf,
    /// Second JSON file
    pub second: PathBuf,
    /// Top-level keys to drop from both files before comparing (repeatable)
    #[arg(long = "ignore-key", action = clap::ArgAction::Append)]
    pub ignore_keys: Vec<String>,
}

#[derive(Debug, Args)]
pub struct FillArgs {
    /// Form structure JSON file
    #[arg(short, long)]
    pub form: PathBuf,
    /// Enumeration catalog JSON file
    #[arg(short, long)]
    pub enums: PathBuf,
    /// How fields with a default value are represented
    #[arg(long, value_enum, default_value = "non-default")]
    pub policy: FillPolicy,
    /// YAML file with fill overrides
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Output JSON file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ScenariosArgs {
    /// Form structure JSON file
    #[arg(short, long)]
    pub form: PathBuf,
    /// Enumeration catalog JSON file
    #[arg(short, long)]
    pub enums: PathBuf,
    /// YAML file with fill overrides
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Output JSON file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// YAML manifest listing the enumeration sheet exports
    #[arg(short, long)]
    pub manifest: PathBuf,
    /// Destination catalog JSON file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// CSV delimiter character for the sheet exports
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the sheet exports (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
