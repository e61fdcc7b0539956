//! Command dispatcher: builds a Workspace from discovered files and runs the
//! requested subcommand.

use std::{fs, path::Path};

use anyhow::{Context, Result};

use super::{
    args::{Arguments, Command},
    exit_status::ExitStatus,
    report,
};
use crate::config::load_config;
use crate::core::workspace::Workspace;
use crate::diagnostics::{Report, Severity, SeverityConfig};
use crate::merge::merge;
use crate::rules::{default_rules, run_checks};
use crate::utils::discover_files;

pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Check(cmd)) => run_check(cmd),
        Some(Command::Merge(cmd)) => run_merge(cmd),
        None => anyhow::bail!("no command provided; use --help to see available commands"),
    }
}

fn run_check(cmd: super::args::CheckCommand) -> Result<ExitStatus> {
    let start_dir = cmd.paths.first().cloned().unwrap_or_else(|| Path::new(".").to_path_buf());
    let config_result = load_config(&start_dir)?;
    let config = config_result.config;
    config.validate()?;

    let roots = if cmd.paths.is_empty() { vec![start_dir.clone()] } else { cmd.paths.clone() };

    let mut workspace = Workspace::new();
    let mut files_checked = 0usize;
    for root in &roots {
        if root.is_file() {
            add_file(&mut workspace, root)?;
            files_checked += 1;
        } else {
            let files = discover_files(root, &config.workspace_globs, &config.ignore_globs)?;
            for file in &files {
                add_file(&mut workspace, file)?;
                files_checked += 1;
            }
        }
    }

    let mut severity_config: SeverityConfig = config.rules.clone();
    for rule_override in &cmd.rules {
        severity_config.insert(rule_override.id.clone(), rule_override.severity);
    }

    let rules = default_rules();
    let report_result = run_checks(&workspace, &rules, &severity_config);

    if report_result.diagnostics.is_empty() {
        report::print_success(files_checked);
    } else {
        report::report(&workspace, &report_result);
    }

    Ok(status_for_check(&report_result))
}

fn status_for_check(report: &Report) -> ExitStatus {
    if report.diagnostics.iter().any(|d| d.severity == Severity::Error) {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    }
}

fn add_file(workspace: &mut Workspace, path: &Path) -> Result<()> {
    let source = fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
    let filename = path.to_string_lossy().into_owned();
    workspace.add_document(&filename, &source, None);
    Ok(())
}

fn run_merge(cmd: super::args::MergeCommand) -> Result<ExitStatus> {
    let base = fs::read_to_string(&cmd.base).with_context(|| format!("failed to read base file {:?}", cmd.base))?;
    let ours = fs::read_to_string(&cmd.ours).with_context(|| format!("failed to read ours file {:?}", cmd.ours))?;
    let theirs = fs::read_to_string(&cmd.theirs).with_context(|| format!("failed to read theirs file {:?}", cmd.theirs))?;

    let result = merge(&base, &ours, &theirs, cmd.marker_style.into())?;

    print!("{}", result.content);
    report::report_merge(&result);

    Ok(if result.success { ExitStatus::Success } else { ExitStatus::Failure })
}
