//! CLI layer - user-facing command-line interface.
//!
//! Handles argument parsing, command dispatch, and diagnostic reporting.
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions using clap (`check`, `merge`)
//! - `exit_status`: exit status codes
//! - `report`: diagnostic and merge-result reporting and formatting
//! - `run`: command dispatcher

use std::process::ExitCode;

use anyhow::Result;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;

pub mod args;
mod exit_status;
pub mod report;
mod run;

pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitCode::from(0));
    };

    let status = run::run(args)?;
    Ok(status.into())
}
