//! File-argument expansion for `--test-static-check`.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use glob::MatchOptions;
use tracing::debug;

const GLOB_CHARS: [char; 3] = ['*', '?', '['];

/// Expand `inputs` into canonical, de-duplicated file paths in input order.
///
/// Glob patterns (`**` included) expand recursively, directories contribute
/// their direct children, and plain paths must be regular files. Anything
/// else is reported on `warnings` and skipped.
pub fn resolve_files(inputs: &[String], warnings: &mut impl Write) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();
    let mut push = |path: &Path| {
        if let Ok(canonical) = path.canonicalize()
            && seen.insert(canonical.clone())
        {
            resolved.push(canonical);
        }
    };

    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    for entry in inputs {
        if entry.contains(GLOB_CHARS) {
            let mut matches: Vec<PathBuf> = match glob::glob_with(entry, options) {
                Ok(paths) => paths.filter_map(Result::ok).collect(),
                Err(err) => {
                    debug!(pattern = %entry, error = %err, "invalid glob pattern");
                    Vec::new()
                }
            };
            matches.sort();
            for path in matches.iter().filter(|p| p.is_file()) {
                push(path);
            }
            continue;
        }

        let path = Path::new(entry);
        if path.is_dir() {
            let mut children: Vec<PathBuf> = fs::read_dir(path)?
                .filter_map(|child| child.ok().map(|c| c.path()))
                .collect();
            children.sort();
            for child in children.iter().filter(|p| p.is_file()) {
                push(child);
            }
        } else if path.is_file() {
            push(path);
        } else {
            writeln!(warnings, "  Warning: skipping (not found or not a file): {entry}")?;
        }
    }
    Ok(resolved)
}
