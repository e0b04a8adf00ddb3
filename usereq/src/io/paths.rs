//! Project base resolution and directory-argument normalisation.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::ReqError;
use crate::exit_codes;

/// Resolve `--base` (or the current directory for `--here`) to a canonical
/// existing directory.
pub fn resolve_project_base(base: Option<&Path>) -> Result<PathBuf> {
    let raw = match base {
        Some(base) => base.to_path_buf(),
        None => std::env::current_dir().context("read current directory")?,
    };
    let absolute = std::path::absolute(&raw).unwrap_or_else(|_| raw.clone());
    let absolute = normalize_lexically(&absolute);
    if !absolute.exists() {
        return Err(ReqError::new(
            format!("Error: PROJECT_BASE '{}' does not exist", absolute.display()),
            exit_codes::BASE_MISSING,
        )
        .into());
    }
    let canonical = absolute
        .canonicalize()
        .with_context(|| format!("canonicalize {}", absolute.display()))?;
    debug!(project_base = %canonical.display(), "resolved project base");
    Ok(canonical)
}

/// Collapse `.` and `..` without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Normalise a user-supplied directory to a path relative to `project_base`.
///
/// A leading component equal to the project directory name is dropped, as is
/// everything up to a later occurrence of that name when the remainder exists
/// under the base. Absolute paths under the base become relative. Anything
/// else is returned unchanged.
pub fn make_relative_if_contains_project(value: &str, project_base: &Path) -> String {
    if value.is_empty() {
        return String::new();
    }
    let base_name = project_base
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut candidate = PathBuf::from(value);

    if !candidate.is_absolute() && !base_name.is_empty() {
        let parts: Vec<String> = candidate
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.len() > 1 && parts[0] == base_name {
            candidate = parts[1..].iter().collect();
        } else if let Some(idx) = parts.iter().rposition(|part| *part == base_name)
            && idx + 1 < parts.len()
        {
            let suffix: PathBuf = parts[idx + 1..].iter().collect();
            if normalize_lexically(&project_base.join(&suffix)).exists() {
                candidate = suffix;
            }
        }
    }

    if candidate.is_absolute() {
        return match candidate.strip_prefix(project_base) {
            Ok(rel) => display_relative(rel),
            Err(_) => candidate.to_string_lossy().into_owned(),
        };
    }

    let resolved = normalize_lexically(&project_base.join(&candidate));
    if let Ok(rel) = resolved.strip_prefix(project_base) {
        return display_relative(rel);
    }
    let base_str = project_base.to_string_lossy();
    if let Some(rest) = value.strip_prefix(&*base_str) {
        return rest.trim_start_matches(['/', '\\']).to_string();
    }
    value.to_string()
}

fn display_relative(rel: &Path) -> String {
    let text = rel.to_string_lossy().into_owned();
    if text.is_empty() { ".".to_string() } else { text }
}

/// Check that `--<flag> <value>` names an existing directory under the base.
pub fn ensure_directory(flag: &str, value: &str, project_base: &Path) -> Result<(), ReqError> {
    let normalized = make_relative_if_contains_project(value, project_base);
    let dir = project_base.join(&normalized);
    if !normalize_lexically(&dir).starts_with(project_base) {
        return Err(ReqError::new(
            format!("Error: --{flag} must be under the project base"),
            exit_codes::INVALID_DIR,
        ));
    }
    if !dir.exists() {
        return Err(ReqError::new(
            format!(
                "Error: the --{flag} directory '{normalized}' does not exist under {}",
                project_base.display()
            ),
            exit_codes::INVALID_DIR,
        ));
    }
    if !dir.is_dir() {
        return Err(ReqError::new(
            format!("Error: --{flag} must specify a directory, not a file"),
            exit_codes::INVALID_DIR,
        ));
    }
    Ok(())
}

pub fn has_trailing_slash(value: &str) -> bool {
    value.ends_with('/') || value.ends_with('\\')
}

/// Project-relative path with `/` separators, if `path` is under the base.
pub fn relative_display(path: &Path, project_base: &Path) -> Option<String> {
    path.strip_prefix(project_base)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}
