//! Source-file discovery under the configured source directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::core::languages::SCAN_EXTENSIONS;

/// Directory names never descended into.
pub const EXCLUDED_DIRS: [&str; 15] = [
    ".git",
    ".vscode",
    "tmp",
    "temp",
    ".cache",
    ".pytest_cache",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "dist",
    "build",
    ".tox",
    ".mypy_cache",
    ".ruff_cache",
];

/// Collect source files under each `src_dirs` entry (relative to the base).
///
/// Within a directory, files come first sorted by name, then subdirectories
/// in name order. Missing directories are skipped.
pub fn collect_source_files(src_dirs: &[String], project_base: &Path) -> Vec<PathBuf> {
    let mut collected = Vec::new();
    for src_dir in src_dirs {
        let root = project_base.join(src_dir);
        if !root.is_dir() {
            debug!(dir = %root.display(), "skipping missing source dir");
            continue;
        }
        let walker = WalkDir::new(&root)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_excluded_dir(entry));
        for entry in walker.filter_map(Result::ok) {
            if entry.file_type().is_file() && has_scan_extension(entry.path()) {
                collected.push(entry.into_path());
            }
        }
    }
    debug!(count = collected.len(), "collected source files");
    collected
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

fn has_scan_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCAN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Regular files directly inside `dir`, sorted by path.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read dir entry in {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read a source file, replacing invalid UTF-8.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, "x").expect("write");
    }

    #[test]
    fn walks_sources_and_prunes_excluded_dirs() {
        let temp = tempfile::tempdir().expect("tempdir");
        let base = temp.path();
        touch(&base.join("src/z.py"));
        touch(&base.join("src/a.rs"));
        touch(&base.join("src/notes.txt"));
        touch(&base.join("src/pkg/b.go"));
        touch(&base.join("src/node_modules/dep.js"));
        touch(&base.join("src/__pycache__/c.py"));
        touch(&base.join("src/UPPER.PY"));

        let files = collect_source_files(&["src".to_string(), "missing".to_string()], base);
        let rel: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(base).expect("rel").to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["src/UPPER.PY", "src/a.rs", "src/z.py", "src/pkg/b.go"]);
    }

    #[test]
    fn list_files_skips_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(&temp.path().join("b.md"));
        touch(&temp.path().join("a.md"));
        touch(&temp.path().join("sub/c.md"));
        let names: Vec<_> = list_files(temp.path())
            .expect("list")
            .iter()
            .map(|p| p.file_name().expect("name").to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bad.py");
        fs::write(&path, b"x = 1\xff\n").expect("write");
        assert_eq!(read_source(&path).expect("read"), "x = 1\u{fffd}\n");
    }
}
