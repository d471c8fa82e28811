use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::path::PathBuf;

use crate::config::{load_config, TablegenConfig};
use crate::errors::Result;

#[derive(Parser, Debug, Default)]
#[command(name = "tablegen")]
#[command(
    about = "Move static lookup tables out of Rust source into CSV files",
    long_about = "Scans the *.rs files of the input directory for `static *_MAP` tables \
                  built from literals, writes each table to <output-dir>/<NAME>.csv and \
                  rewrites the module to load the table from that file at start-up."
)]
#[command(version)]
pub struct Cli {
    /// Directory holding the modules to rewrite [default: csv]
    #[arg(long = "input-dir", env = "TABLEGEN_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory for the generated CSV files [default: <input-dir>/output]
    #[arg(long = "output-dir", env = "TABLEGEN_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Identifier suffix that marks a table [default: _MAP]
    #[arg(long)]
    pub suffix: Option<String>,

    /// Configuration file (defaults to ./tablegen.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (can be repeated: -v, -vv)
    /// -v: Show skipped candidates
    /// -vv: Show everything
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbosity: u8,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Configuration file values with the command-line flags applied on top.
    pub fn resolve_config(&self) -> Result<TablegenConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(input_dir) = &self.input_dir {
            config.input_dir = input_dir.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = Some(output_dir.clone());
        }
        if let Some(suffix) = &self.suffix {
            config.suffix = suffix.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn log_level_filter(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
