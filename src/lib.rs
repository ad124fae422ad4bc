//! pbdataset: assemble PacBio-style datasets from XML, BAM and manifest files.
//!
//! A dataset is a tree of external resources, filters, metadata and nested
//! sub-datasets. The reader resolves file references (paths or URIs),
//! expands dataset XML files and file-of-file-names manifests, wraps data
//! files with their index and companion files, and merges everything into
//! one in-memory [`model::DataSet`].
//!
//! # Modules
//!
//! - [`model`]: dataset tree types (DataSet, ExternalResource, Filters, metadata)
//! - [`reader`]: file classification, XML parsing and dataset population
//! - [`error`]: Error types for dataset operations

pub mod error;
pub mod model;
pub mod reader;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

pub use error::DataSetError;

use model::DataSetKind;
use reader::stats::{parse_metadata, parse_stats};
use reader::{detect_kind, open_dataset, PopulateOptions};

/// The pbdataset CLI application.
#[derive(Parser)]
#[command(name = "pbdataset")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Build a dataset from files and print a summary.
    Summarize(SummarizeArgs),
    /// Print the DataSetMetadata element of a dataset XML file.
    Metadata(RecordArgs),
    /// Print the summary statistics of an .sts.xml file.
    Stats(RecordArgs),
}

/// Arguments for the summarize subcommand.
#[derive(clap::Args)]
struct SummarizeArgs {
    /// Dataset XML, BAM or .fofn files (paths or xml:/bam:/fofn: URIs).
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Dataset kind (e.g. 'SubreadSet', 'alignmentset'). Defaults to the
    /// root element of the first XML input.
    #[arg(long)]
    kind: Option<String>,

    /// Do not load .sts.xml statistics.
    #[arg(long)]
    no_stats: bool,

    /// Output format ('text', 'json' or 'yaml').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the metadata and stats subcommands.
#[derive(clap::Args)]
struct RecordArgs {
    /// Input file (path or URI).
    input: String,

    /// Output format ('json' or 'yaml').
    #[arg(long, default_value = "json")]
    output: String,
}

/// Run the pbdataset CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DataSetError> {
    // Ignore the error when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Summarize(args)) => run_summarize(args),
        Some(Commands::Metadata(args)) => emit(&parse_metadata(&args.input)?, &args.output),
        Some(Commands::Stats(args)) => emit(&parse_stats(&args.input)?, &args.output),
        None => {
            println!("pbdataset {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Assemble datasets from XML, BAM and manifest files.");
            println!();
            println!("Run 'pbdataset --help' for usage information.");
            Ok(())
        }
    }
}

fn run_summarize(args: SummarizeArgs) -> Result<(), DataSetError> {
    let kind = match args.kind.as_deref() {
        Some(kind) => kind.parse::<DataSetKind>()?,
        None => detect_kind(&args.inputs)?,
    };
    let options = PopulateOptions {
        kind,
        load_stats: !args.no_stats,
        ..Default::default()
    };
    let dataset = open_dataset(&args.inputs, &options)?;

    match args.output.as_str() {
        "text" => {
            print!("{dataset}");
            Ok(())
        }
        other => emit(&dataset, other),
    }
}

fn emit<T: Serialize>(value: &T, output: &str) -> Result<(), DataSetError> {
    match output {
        "json" => println!("{}", serde_json::to_string_pretty(value)?),
        "yaml" => print!("{}", serde_yaml::to_string(value)?),
        other => {
            return Err(DataSetError::UnsupportedFormat(format!(
                "'{other}' (supported: json, yaml)"
            )));
        }
    }
    Ok(())
}
