//! chart-version: print the `version` field of a chart descriptor.
//! Re-exports the chart reader and contains the `run()` pipeline: load, look up, print.

pub mod chart;
pub mod cli;
pub mod error;
mod node;

use std::io::Write;

use anyhow::{Context, Result};

use cli::Cli;

pub use chart::{ChartDocument, ChartVersion, read_version};
pub use error::{ChartError, ErrorKind};

/// Run the CLI with parsed arguments.
///
/// Nothing reaches stdout unless the version was read successfully.
pub fn run(cli: Cli) -> Result<()> {
    let version = read_version(&cli.chart)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{version}").context("failed to write version to stdout")?;
    stdout.flush().context("failed to write version to stdout")
}
