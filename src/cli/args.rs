//! Command-line arguments

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    calc::CalcArgs, completions::CompletionsArgs, init::InitArgs, stats::StatsArgs,
    vendor::VendorArgs,
};

#[derive(Parser, Debug)]
#[command(name = "netlimits")]
#[command(author, version, about = "3-sigma LSL/USL limits from electrical measurement grids")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive limits for every NET and judge them against vendor specs
    Calc(CalcArgs),

    /// Print per-NET statistics only
    Stats(StatsArgs),

    /// Show the vendor lookup table or resolve one key
    Vendor(VendorArgs),

    /// Write a default netlimits.yaml
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Config file, merged over the user and working-directory configs
    #[arg(long, short = 'c', global = true, env = "NETLIMITS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress summaries and warnings
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Table on a terminal, CSV otherwise (or by output file extension)
    #[default]
    Auto,
    Table,
    Csv,
    Tsv,
    Json,
}
