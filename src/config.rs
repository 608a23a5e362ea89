use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostics::CompileError;

pub const CONFIG_FILE: &str = "throwck.toml";

/// Settings read from `throwck.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Worker threads used when checking several modules.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Whether reported diagnostics fail the run.
    #[serde(default = "default_fatal")]
    pub fatal: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self { jobs: default_jobs(), fatal: default_fatal() }
    }
}

fn default_jobs() -> usize {
    1
}

fn default_fatal() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Parse config text. `path` is only used for error messages.
pub fn parse_config(content: &str, path: &Path) -> Result<Config, CompileError> {
    let config: Config = toml::from_str(content).map_err(|e| {
        CompileError::config(format!("{CONFIG_FILE}: invalid syntax: {e}"), path.to_path_buf())
    })?;

    if config.check.jobs == 0 {
        return Err(CompileError::config(
            format!("{CONFIG_FILE}: 'check.jobs' must be at least 1"),
            path.to_path_buf(),
        ));
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config, CompileError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CompileError::config(format!("{CONFIG_FILE}: could not read file: {e}"), path.to_path_buf())
    })?;
    parse_config(&content, path)
}

/// Walk from start_dir up to .git or FS root, looking for throwck.toml.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        // .git may be a file in worktrees and submodules
        if dir.join(".git").exists() {
            return None;
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Load the nearest config file, or the defaults when there is none.
pub fn discover_config(start_dir: &Path) -> Result<Config, CompileError> {
    match find_config(start_dir) {
        Some(path) => load_config(&path),
        None => Ok(Config::default()),
    }
}
