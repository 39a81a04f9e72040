//! vsp - declarative block-storage automation for Hitachi VSP arrays

use std::process::ExitCode;

use clap::Parser;
use vsp_cli::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
