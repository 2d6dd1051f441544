use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::io::OutputFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Terminal,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Terminal => OutputFormat::Terminal,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "reefmap")]
#[command(about = "Marine protected area overlap metrics and report aggregation", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute report metric bundles from geometry-oracle overlap input
    Report {
        /// Report input JSON: sketch plus per-report overlap metrics
        input: PathBuf,

        /// Project configuration file
        #[arg(short, long, default_value = "reefmap.toml")]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatArg,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Flatten a computed bundle into per-group aggregates
    Flatten {
        /// Bundle JSON produced by the report command
        input: PathBuf,

        /// Report id to aggregate
        #[arg(short, long)]
        report: String,

        /// Project configuration file
        #[arg(short, long, default_value = "reefmap.toml")]
        config: PathBuf,

        /// Geography the precalculated totals were computed for
        #[arg(long)]
        geography: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: FormatArg,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
