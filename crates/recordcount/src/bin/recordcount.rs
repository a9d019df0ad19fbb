//! recordcount CLI
//!
//! Rebuild the record counts of a tree ensemble from a labeled dataset.
//!
//! # Usage
//!
//! ```bash
//! # Write the recounted model to a file
//! recordcount --model-input model.json --csv-input data.csv --model-output recounted.json
//!
//! # Semicolon separated data with "NA" for missing cells, model to stdout
//! recordcount --model-input model.json --csv-input data.csv --separator ';' --missing-value NA
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use recordcount::{run, RecountError, ReplayConfig, ReplaySummary};

/// Rebuild node record counts of a decision-tree ensemble by replaying a
/// labeled dataset through it.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "recordcount", version, about)]
struct Cli {
    /// Model document to recount
    #[arg(long, value_name = "PATH")]
    model_input: PathBuf,

    /// Labeled dataset, first line naming the fields
    #[arg(long, value_name = "PATH")]
    csv_input: PathBuf,

    /// Where to write the recounted model (stdout if not specified)
    #[arg(long, value_name = "PATH")]
    model_output: Option<PathBuf>,

    /// Cell separator
    #[arg(long, default_value_t = ',')]
    separator: char,

    /// Cell text read as a missing value (repeatable; default: empty cell)
    #[arg(long = "missing-value", value_name = "TOKEN")]
    missing_values: Vec<String>,

    /// Trim whitespace around header names and cells
    #[arg(long)]
    trim: bool,

    /// Write the model on a single line
    #[arg(long)]
    compact: bool,

    /// Log per-row detail
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Info
        }
    }

    fn config(&self) -> Result<ReplayConfig, RecountError> {
        let missing_values = if self.missing_values.is_empty() {
            vec![String::new()]
        } else {
            self.missing_values.clone()
        };
        let config = ReplayConfig::builder()
            .delimiter(self.separator)
            .missing_values(missing_values)
            .trim(self.trim)
            .pretty(!self.compact)
            .build()?;
        Ok(config)
    }
}

fn execute(cli: &Cli) -> Result<ReplaySummary, RecountError> {
    let config = cli.config()?;
    run(&cli.model_input, &cli.csv_input, cli.model_output.as_deref(), &config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = env_logger::Env::default().default_filter_or(cli.log_level().as_str());
    env_logger::Builder::from_env(env).format_timestamp(None).init();

    match execute(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
