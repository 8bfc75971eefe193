use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::progress::ProgressMode;

#[derive(Parser, Debug)]
#[command(
    name = "jar-sizer",
    about = "Walk a Maven repository and record the on-disk size of every artifact",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Measure every artifact under ROOT and update its disk_size record
    Collect(CollectArgs),
}

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Repository root to walk (e.g. ~/.m2/repository)
    pub root: PathBuf,

    /// Config file [default: ./.jar-sizer/config.toml, fallback ~/.config/jar-sizer/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum number of artifacts processed at once
    #[arg(short = 'j', long, value_name = "K")]
    pub concurrency: Option<usize>,

    /// Seed for the directory shuffle, for reproducible walk order
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path segment marking the start of the group id
    #[arg(long, value_name = "NAME")]
    pub anchor: Option<String>,

    /// File name suffix of artifacts to measure
    #[arg(long, value_name = "EXT")]
    pub suffix: Option<String>,

    /// Table holding the disk_size column
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,

    /// Progress reporting interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Progress output style
    #[arg(long, default_value = "lines", value_name = "STYLE")]
    pub progress: ProgressArg,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Log the updates instead of writing them; no database needed
    #[arg(long)]
    pub dry_run: bool,

    /// Count artifacts without a matching record as failures
    #[arg(long)]
    pub strict: bool,

    /// Debug logging and a full failure table
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ProgressArg {
    Lines,
    Bar,
    #[value(name = "none")]
    Off,
}

impl From<ProgressArg> for ProgressMode {
    fn from(arg: ProgressArg) -> Self {
        match arg {
            ProgressArg::Lines => ProgressMode::Lines,
            ProgressArg::Bar => ProgressMode::Bar,
            ProgressArg::Off => ProgressMode::Silent,
        }
    }
}
