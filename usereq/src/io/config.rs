//! Project configuration stored under `.req/config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ReqError;
use crate::exit_codes;
use crate::io::write_atomic;

/// Directory layout chosen at `req --base ... --docs-dir ...` time.
///
/// Paths are project-relative and keep any trailing slash the user typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    #[serde(rename = "guidelines-dir")]
    pub guidelines_dir: String,
    #[serde(rename = "docs-dir")]
    pub docs_dir: String,
    #[serde(rename = "tests-dir")]
    pub tests_dir: String,
    #[serde(rename = "src-dir")]
    pub src_dirs: Vec<String>,
}

pub fn config_path(project_base: &Path) -> PathBuf {
    project_base.join(".req").join("config.json")
}

/// Load and validate `.req/config.json`.
///
/// Accepts the legacy `doc-dir`/`test-dir` keys when the current ones are
/// absent or empty.
pub fn load_config(project_base: &Path) -> Result<ProjectConfig> {
    let path = config_path(project_base);
    if !path.is_file() {
        return Err(ReqError::new(
            "Error: .req/config.json not found in the project root",
            exit_codes::CONFIG,
        )
        .into());
    }
    debug!(path = %path.display(), "loading project config");
    let contents = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let payload: Value = serde_json::from_str(&contents)
        .map_err(|_| ReqError::new("Error: .req/config.json is not valid", exit_codes::CONFIG))?;

    let guidelines_dir = string_field(&payload, &["guidelines-dir"])?;
    let docs_dir = string_field(&payload, &["docs-dir", "doc-dir"])?;
    let tests_dir = string_field(&payload, &["tests-dir", "test-dir"])?;
    let src_dirs = payload
        .get("src-dir")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().filter(|s| !s.trim().is_empty()).map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| invalid_field("src-dir"))?;

    Ok(ProjectConfig {
        guidelines_dir,
        docs_dir,
        tests_dir,
        src_dirs,
    })
}

/// Atomically write `.req/config.json` (pretty, two-space indent).
pub fn write_config(project_base: &Path, cfg: &ProjectConfig) -> Result<()> {
    let path = config_path(project_base);
    debug!(path = %path.display(), "writing project config");
    let mut buf = serde_json::to_string_pretty(cfg).context("serialize config json")?;
    buf.push('\n');
    write_atomic(&path, &buf)
}

fn string_field(payload: &Value, keys: &[&str]) -> Result<String, ReqError> {
    keys.iter()
        .find_map(|key| {
            payload
                .get(*key)
                .and_then(Value::as_str)
                .filter(|value| !value.trim().is_empty())
        })
        .map(str::to_string)
        .ok_or_else(|| invalid_field(keys[0]))
}

fn invalid_field(key: &str) -> ReqError {
    ReqError::new(
        format!("Error: missing or invalid '{key}' field in .req/config.json"),
        exit_codes::CONFIG,
    )
}
