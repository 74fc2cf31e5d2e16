//! CLI argument parsing with clap. The chart path is the only input.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "chart-version",
    version,
    about = "Print the version of a packaging chart descriptor",
    after_help = "Examples:\n  chart-version Chart.yaml\n  chart-version charts/app/Chart.yaml"
)]
pub struct Cli {
    /// Path to the chart's YAML descriptor
    pub chart: PathBuf,
}
