//! Thin binary entry point. Parses CLI args and delegates to `chart_version::run()`.

use std::process::ExitCode;

use clap::Parser;
use console::style;

fn main() -> ExitCode {
    let cli = chart_version::cli::Cli::parse();

    match chart_version::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style("error:").for_stderr().red().bold());
            ExitCode::FAILURE
        }
    }
}
