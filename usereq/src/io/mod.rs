//! I/O helpers for `req` commands: filesystem layout, git, subprocesses.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub mod config;
pub mod context;
pub mod git;
pub mod guidelines;
pub mod init;
pub mod paths;
pub mod process;
pub mod resolve;
pub mod run_state;
pub mod scan;
pub mod workflows;

/// Write `contents` to a sibling temp file, then rename it over `path`.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp = match path.extension() {
        Some(ext) => path.with_extension(format!("{}.tmp", ext.to_string_lossy())),
        None => path.with_extension("tmp"),
    };
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
