//! Guidelines directory helpers: listing its files and seeding it with the
//! bundled templates.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::ReqError;
use crate::exit_codes;
use crate::io::paths::relative_display;

/// Bundled guideline templates, sorted by file name.
pub const TEMPLATES: [(&str, &str); 2] = [
    (
        "requirements-writing.md",
        include_str!("../../resources/guidelines/requirements-writing.md"),
    ),
    (
        "source-code.md",
        include_str!("../../resources/guidelines/source-code.md"),
    ),
];

/// What happened to one template during [`copy_guidelines_templates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyAction {
    Copied,
    Overwrote,
    Skipped,
}

impl CopyAction {
    pub fn label(self) -> &'static str {
        match self {
            CopyAction::Copied => "COPIED",
            CopyAction::Overwrote => "OVERWROTE",
            CopyAction::Skipped => "SKIPPED (already exists)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub file_name: &'static str,
    pub action: CopyAction,
}

impl CopyReport {
    pub fn copied(&self) -> bool {
        self.action != CopyAction::Skipped
    }
}

/// Project-relative paths of the non-hidden files in `dir`, sorted.
///
/// Falls back to the directory itself (with a trailing `/`) when it holds no
/// files. Returns nothing when `dir` is missing or outside the base.
pub fn guidelines_file_items(dir: &Path, project_base: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_file() && !hidden {
            entries.push(path);
        }
    }
    entries.sort();

    let items: Vec<String> = entries
        .iter()
        .filter_map(|path| relative_display(path, project_base))
        .collect();
    if !items.is_empty() {
        return Ok(items);
    }
    Ok(relative_display(dir, project_base)
        .map(|rel| vec![format!("{rel}/")])
        .unwrap_or_default())
}

/// Same as [`guidelines_file_items`], backticked and comma-joined.
pub fn guidelines_file_list(dir: &Path, project_base: &Path) -> Result<String> {
    Ok(guidelines_file_items(dir, project_base)?
        .iter()
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", "))
}

/// Copy the bundled templates into `dest`.
///
/// Existing files are left alone unless `overwrite` is set.
pub fn copy_guidelines_templates(dest: &Path, overwrite: bool) -> Result<Vec<CopyReport>> {
    if !dest.is_dir() {
        return Err(ReqError::new(
            format!(
                "Error: target guidelines directory '{}' does not exist",
                dest.display()
            ),
            exit_codes::GUIDELINES,
        )
        .into());
    }
    let mut reports = Vec::with_capacity(TEMPLATES.len());
    for (file_name, contents) in TEMPLATES {
        let target = dest.join(file_name);
        let existed = target.exists();
        let action = match (existed, overwrite) {
            (true, false) => CopyAction::Skipped,
            (true, true) => CopyAction::Overwrote,
            (false, _) => CopyAction::Copied,
        };
        if action != CopyAction::Skipped {
            fs::write(&target, contents)
                .with_context(|| format!("write {}", target.display()))?;
        }
        debug!(target = %target.display(), action = action.label(), "guideline template");
        reports.push(CopyReport { file_name, action });
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::find_req_error;

    #[test]
    fn lists_visible_files_relative_to_base() {
        let temp = tempfile::tempdir().expect("tempdir");
        let base = temp.path();
        let dir = base.join("guidelines");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join("b.md"), "b").expect("write");
        fs::write(dir.join("a.md"), "a").expect("write");
        fs::write(dir.join(".hidden"), "h").expect("write");

        assert_eq!(
            guidelines_file_items(&dir, base).expect("items"),
            vec!["guidelines/a.md", "guidelines/b.md"]
        );
        assert_eq!(
            guidelines_file_list(&dir, base).expect("list"),
            "`guidelines/a.md`, `guidelines/b.md`"
        );
    }

    #[test]
    fn empty_directory_lists_itself() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("guidelines");
        fs::create_dir_all(&dir).expect("mkdir");
        assert_eq!(
            guidelines_file_list(&dir, temp.path()).expect("list"),
            "`guidelines/`"
        );
    }

    #[test]
    fn copy_skips_existing_unless_overwriting() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dest = temp.path();
        fs::write(dest.join("source-code.md"), "custom").expect("write");

        let reports = copy_guidelines_templates(dest, false).expect("copy");
        assert_eq!(reports.iter().filter(|r| r.copied()).count(), 1);
        assert_eq!(
            fs::read_to_string(dest.join("source-code.md")).expect("read"),
            "custom"
        );

        let reports = copy_guidelines_templates(dest, true).expect("copy");
        assert!(reports.iter().all(|r| r.action == CopyAction::Overwrote));
        assert_eq!(
            fs::read_to_string(dest.join("source-code.md")).expect("read"),
            TEMPLATES[1].1
        );
    }

    #[test]
    fn missing_destination_is_code_8() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = copy_guidelines_templates(&temp.path().join("nope"), false).expect_err("missing");
        assert_eq!(
            find_req_error(&err).expect("req error").code,
            exit_codes::GUIDELINES
        );
    }
}
