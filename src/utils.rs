//! Workspace file discovery (A4): `walkdir` traversal filtered by glob
//! patterns, grounded on the teacher's directory scanning conventions and
//! `config.rs`'s glob validation. Used by the CLI to seed a `Workspace` from
//! a directory; the library itself never touches the filesystem outside this
//! module.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use walkdir::WalkDir;

use crate::error::ThaloError;

/// Walks `root`, returning every file matching at least one of `globs` and
/// none of `ignore`. Glob patterns are matched against the path relative to
/// `root`, so `**/*.thalo` matches at any depth.
pub fn discover_files(root: &Path, globs: &[String], ignore: &[String]) -> Result<Vec<PathBuf>> {
    let include_patterns = compile_patterns(globs)?;
    let ignore_patterns = compile_patterns(ignore)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry.with_context(|| format!("failed to walk workspace directory {root:?}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if ignore_patterns.iter().any(|p| p.matches_path(relative)) {
            continue;
        }
        if include_patterns.iter().any(|p| p.matches_path(relative)) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn compile_patterns(globs: &[String]) -> crate::error::Result<Vec<Pattern>> {
    globs
        .iter()
        .map(|g| Pattern::new(g).map_err(|source| ThaloError::InvalidGlob { pattern: g.clone(), source }))
        .collect()
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}
