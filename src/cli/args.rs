//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: run the checker over a workspace and print diagnostics
//! - `merge`: three-way merge two versions of a document against a base

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::merge::MarkerStyle;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Check(cmd)) => cmd.verbose,
            Some(Command::Merge(_)) | None => false,
        }
    }
}

/// `id:severity` override, e.g. `unresolved-link:warning`.
#[derive(Debug, Clone)]
pub struct RuleOverride {
    pub id: String,
    pub severity: crate::diagnostics::Severity,
}

impl std::str::FromStr for RuleOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, severity) = s
            .split_once(':')
            .ok_or_else(|| format!("expected `id:severity`, got {s:?}"))?;
        let severity = match severity {
            "off" => crate::diagnostics::Severity::Off,
            "warning" => crate::diagnostics::Severity::Warning,
            "error" => crate::diagnostics::Severity::Error,
            other => return Err(format!("unknown severity {other:?} (expected off, warning, or error)")),
        };
        Ok(RuleOverride { id: id.to_string(), severity })
    }
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Workspace root directories or files to check (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Per-rule severity override, may be repeated: `--rule unresolved-link:warning`
    #[arg(long = "rule", value_name = "ID:SEVERITY")]
    pub rules: Vec<RuleOverride>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarkerStyleArg {
    Git,
    Diff3,
}

impl From<MarkerStyleArg> for MarkerStyle {
    fn from(value: MarkerStyleArg) -> Self {
        match value {
            MarkerStyleArg::Git => MarkerStyle::Git,
            MarkerStyleArg::Diff3 => MarkerStyle::Diff3,
        }
    }
}

#[derive(Debug, Args)]
pub struct MergeCommand {
    /// Common ancestor version
    pub base: PathBuf,
    /// Our version
    pub ours: PathBuf,
    /// Their version
    pub theirs: PathBuf,

    /// Conflict-marker style
    #[arg(long = "marker-style", value_enum, default_value = "git")]
    pub marker_style: MarkerStyleArg,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a workspace for diagnostics
    Check(CheckCommand),
    /// Three-way merge two versions of a document against a common base
    Merge(MergeCommand),
}
