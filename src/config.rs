//! Workspace configuration: `.thalorc.json`, resolved by walking up from a
//! start directory until a config file or a `.git` directory is found.
//!
//! Grounded verbatim on the teacher's `config.rs` (`find_config_file`,
//! `load_config`/`ConfigLoadResult` shape); field set and defaults are
//! specific to Thalo.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::error::ThaloError;
use crate::merge::MarkerStyle;

pub const CONFIG_FILE_NAME: &str = ".thalorc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThaloConfig {
    #[serde(default = "default_workspace_globs")]
    pub workspace_globs: Vec<String>,
    #[serde(default)]
    pub rules: std::collections::HashMap<String, crate::diagnostics::Severity>,
    #[serde(default)]
    pub merge_marker_style: MarkerStyle,
    #[serde(default)]
    pub ignore_globs: Vec<String>,
}

fn default_workspace_globs() -> Vec<String> {
    vec!["**/*.thalo".to_string(), "**/*.md".to_string()]
}

impl Default for ThaloConfig {
    fn default() -> Self {
        Self {
            workspace_globs: default_workspace_globs(),
            rules: std::collections::HashMap::new(),
            merge_marker_style: MarkerStyle::default(),
            ignore_globs: Vec::new(),
        }
    }
}

impl ThaloConfig {
    /// Validates every glob pattern in `workspace_globs` and `ignore_globs`.
    pub fn validate(&self) -> Result<()> {
        for pattern in self.workspace_globs.iter().chain(&self.ignore_globs) {
            Pattern::new(pattern)
                .map_err(|source| ThaloError::InvalidGlob { pattern: pattern.clone(), source })?;
        }
        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = ThaloConfig::default();
    serde_json::to_string_pretty(&config).context("failed to generate default config")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

pub struct ConfigLoadResult {
    pub config: ThaloConfig,
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: ThaloConfig =
                serde_json::from_str(&content).with_context(|| format!("failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult { config, from_file: true })
        }
        None => Ok(ConfigLoadResult {
            config: ThaloConfig::default(),
            from_file: false,
        }),
    }
}
