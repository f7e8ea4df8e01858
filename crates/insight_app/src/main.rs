use std::process::ExitCode;

use clap::Parser;
use insight_app::cli::Cli;

fn main() -> ExitCode {
    match insight_app::run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
