use std::process::ExitCode;

use clap::Parser;
use thalo_core::cli::Arguments;

fn main() -> ExitCode {
    let args = Arguments::parse();
    match thalo_core::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(2)
        }
    }
}
