use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use meshmap_common::types::WeightPolicy;

#[derive(Parser, Clone)]
#[clap(
    name = "meshmap",
    about = "Infers a service-to-service coupling graph from captured workload traffic",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Path to a TOML config file
    #[clap(long, global = true)]
    pub config: Option<String>,
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Capture traffic in a namespace and write the coupling graph
    Run(RunArgs),

    /// Build the coupling graph from existing capture files
    Analyze(AnalyzeArgs),

    /// Show the effective configuration
    Info,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Kubernetes namespace to observe
    #[clap(long, short)]
    pub namespace: Option<String>,

    /// Where to write the graph JSON
    #[clap(long, short)]
    pub output: Option<String>,

    /// Weighting policy for the final graph
    #[clap(long, value_enum)]
    pub policy: Option<WeightPolicy>,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Capture files to analyze
    #[clap(required = true)]
    pub captures: Vec<PathBuf>,

    /// JSON file mapping network addresses to entity names
    #[clap(long, short)]
    pub identity: PathBuf,

    /// Where to write the graph JSON
    #[clap(long, short)]
    pub output: Option<String>,

    /// Weighting policy for the final graph
    #[clap(long, value_enum)]
    pub policy: Option<WeightPolicy>,
}
