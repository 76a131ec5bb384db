//! CLI argument definitions for `ccv`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use ccv_model::Language;

#[derive(Parser)]
#[command(
    name = "ccv",
    version,
    about = "Build Canadian Common CV import documents from YAML/TOML records",
    long_about = "Build Canadian Common CV import documents from YAML/TOML records.\n\n\
                  Records are validated against the registry schema (cv.xml and cv-lov.xml)\n\
                  and written as generic-cv XML; sections of an existing document can be\n\
                  exported back to editable records."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Where the schema comes from and how values are matched.
#[derive(Args)]
pub struct SchemaArgs {
    /// Settings file (default: ./ccv.toml when present).
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding cv.xml and cv-lov.xml.
    #[arg(long = "schema-dir", value_name = "DIR", global = true)]
    pub schema_dir: Option<PathBuf>,

    /// Label language of the schema and of record keys.
    #[arg(long = "language", value_enum, global = true)]
    pub language: Option<LanguageArg>,

    /// Accept typographic quotes and ASCII apostrophes interchangeably when
    /// matching list values.
    #[arg(long = "normalize-punctuation", global = true)]
    pub normalize_punctuation: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the sections of the schema.
    Sections(SectionsArgs),

    /// Print an empty record for a section.
    Template(TemplateArgs),

    /// Validate record files and write them into a CV document.
    Build(BuildArgs),

    /// Write sections of a CV document back out as records.
    Export(ExportArgs),
}

#[derive(Parser)]
pub struct SectionsArgs {
    /// Include container sections that hold no fields.
    #[arg(long = "all")]
    pub all: bool,
}

#[derive(Parser)]
pub struct TemplateArgs {
    /// Section identifier, label, or `Parent > Child`.
    #[arg(value_name = "SECTION")]
    pub section: String,

    /// Leave out descriptions, types and constraints.
    #[arg(long = "bare")]
    pub bare: bool,

    /// Use identifiers instead of labels as keys.
    #[arg(long = "ids")]
    pub ids: bool,

    /// Write to a file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Record file, or directory searched recursively for record files.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output document.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: PathBuf,

    /// Existing document to add to (default: start from an empty one).
    #[arg(long = "cv", value_name = "FILE")]
    pub cv: Option<PathBuf>,

    /// Only ingest files matching this glob (matched on path and file name).
    #[arg(long = "pattern", value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Write the ingest report, including every validation error, as JSON.
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Validate and report without writing the document.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// CV document to read.
    #[arg(value_name = "CV")]
    pub cv: PathBuf,

    /// Sections to export (identifier, label, or `Parent > Child`).
    #[arg(value_name = "SECTION", required = true)]
    pub sections: Vec<String>,

    /// Write to a file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LanguageArg {
    English,
    French,
}

impl From<LanguageArg> for Language {
    fn from(value: LanguageArg) -> Self {
        match value {
            LanguageArg::English => Language::English,
            LanguageArg::French => Language::French,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
