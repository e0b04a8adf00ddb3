//! Handlers for the file and project-scan commands: token counts,
//! requirement ID checks and source directory resolution.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::requirements::{renumber_ids, validate_ids};
use crate::core::tokens::{FileMetrics, TokenCounter, format_pack_summary};
use crate::error::ReqError;
use crate::io::config::{config_path, load_config};
use crate::io::paths::{ensure_directory, make_relative_if_contains_project, resolve_project_base};
use crate::io::scan::{collect_source_files, list_files};
use crate::io::write_atomic;

/// Count tokens and characters for each file. Unreadable files are reported
/// in their metrics rather than failing the batch.
pub fn count_files_metrics(files: &[PathBuf]) -> Result<Vec<FileMetrics>> {
    let counter = TokenCounter::new()?;
    Ok(files
        .iter()
        .map(|path| {
            let name = path.to_string_lossy().into_owned();
            match fs::read(path) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    FileMetrics::counted(
                        name,
                        counter.count_tokens(&content),
                        TokenCounter::count_chars(&content),
                    )
                }
                Err(err) => FileMetrics::failed(name, err.to_string()),
            }
        })
        .collect())
}

/// Keep the entries of `files` that exist as regular files, warning about the rest.
pub fn existing_files(files: &[String], warnings: &mut impl Write) -> Result<Vec<PathBuf>> {
    let mut valid = Vec::with_capacity(files.len());
    for file in files {
        let path = PathBuf::from(file);
        if path.is_file() {
            valid.push(path);
        } else {
            writeln!(warnings, "  Warning: skipping (not found): {file}")
                .context("write warning")?;
        }
    }
    if valid.is_empty() {
        return Err(ReqError::failure("Error: no valid files provided.").into());
    }
    Ok(valid)
}

/// `--files-tokens` / `--tokens`: print the pack summary for `files`.
#[instrument(skip_all, fields(files = files.len()))]
pub fn print_token_summary(files: &[PathBuf], out: &mut impl Write) -> Result<()> {
    let metrics = count_files_metrics(files)?;
    writeln!(out, "{}", format_pack_summary(&metrics)).context("write token summary")
}

/// Base directory for project scan commands.
pub fn scan_project_base(base: Option<&Path>, here: bool) -> Result<PathBuf> {
    if base.is_none() && !here {
        return Err(ReqError::failure(
            "Error: --references, --compress, and --tokens require --base or --here.",
        )
        .into());
    }
    resolve_project_base(base)
}

/// Source directories for a project scan: the saved config under `--here`,
/// otherwise `--src-dir` with the config as fallback.
pub fn resolve_src_dirs(project_base: &Path, here: bool, src_dirs: &[String]) -> Result<Vec<String>> {
    let dirs = if here {
        load_config(project_base)?.src_dirs
    } else if !src_dirs.is_empty() {
        src_dirs.to_vec()
    } else if config_path(project_base).is_file() {
        load_config(project_base)?.src_dirs
    } else {
        return Err(ReqError::failure(
            "Error: --src-dir is required or .req/config.json must exist.",
        )
        .into());
    };
    if dirs.is_empty() {
        return Err(ReqError::failure("Error: no source directories configured.").into());
    }
    Ok(dirs)
}

/// Collect the project's source files, failing when the scan finds nothing.
pub fn project_source_files(project_base: &Path, src_dirs: &[String]) -> Result<Vec<PathBuf>> {
    let files = collect_source_files(src_dirs, project_base);
    if files.is_empty() {
        return Err(
            ReqError::failure("Error: no source files found in configured directories.").into(),
        );
    }
    debug!(count = files.len(), "collected project source files");
    Ok(files)
}

/// Files directly under the docs directory, sorted, for `--tokens`.
pub fn docs_files(project_base: &Path, here: bool, docs_dir: Option<&str>) -> Result<Vec<PathBuf>> {
    let docs_dir = if here {
        load_config(project_base)?.docs_dir
    } else {
        docs_dir
            .filter(|dir| !dir.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ReqError::failure("Error: --tokens requires --docs-dir."))?
    };
    ensure_directory("docs-dir", &docs_dir, project_base)?;
    let dir = project_base.join(make_relative_if_contains_project(&docs_dir, project_base));
    let files = list_files(&dir)?;
    if files.is_empty() {
        return Err(ReqError::failure("Error: no files found in --docs-dir.").into());
    }
    Ok(files)
}

/// `--files-check-ids`: report ID violations per file. Returns whether every
/// file is clean.
#[instrument(skip_all, fields(files = files.len()))]
pub fn check_ids(files: &[PathBuf], out: &mut impl Write) -> Result<bool> {
    let mut clean = true;
    for path in files {
        let doc = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let issues = validate_ids(&doc);
        if issues.is_empty() {
            writeln!(out, "{}: OK", path.display()).context("write report")?;
            continue;
        }
        clean = false;
        writeln!(out, "{}: {} issue(s)", path.display(), issues.len()).context("write report")?;
        for issue in &issues {
            writeln!(out, "  - {issue}").context("write report")?;
        }
    }
    Ok(clean)
}

/// `--files-renumber-ids`: rewrite each file with sequential IDs and print
/// the renames.
#[instrument(skip_all, fields(files = files.len()))]
pub fn renumber_files(files: &[PathBuf], out: &mut impl Write) -> Result<()> {
    for path in files {
        let doc = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let renumbered = renumber_ids(&doc);
        if !renumbered.changed() {
            writeln!(out, "{}: IDs already sequential", path.display()).context("write report")?;
            continue;
        }
        write_atomic(path, &renumbered.text)?;
        info!(path = %path.display(), renamed = renumbered.mapping.len(), "renumbered requirement IDs");
        writeln!(out, "{}:", path.display()).context("write report")?;
        for (old, new) in renumbered.mapping.iter().filter(|(old, new)| old != new) {
            writeln!(out, "  {old} -> {new}").context("write report")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::find_req_error;

    fn message(result: Result<impl std::fmt::Debug>) -> String {
        let err = result.expect_err("should fail");
        find_req_error(&err).expect("req error").message.clone()
    }

    #[test]
    fn missing_files_are_skipped_with_a_warning() {
        let temp = tempfile::tempdir().expect("tempdir");
        let present = temp.path().join("a.md");
        fs::write(&present, "hello").expect("write");
        let inputs = vec![
            present.to_string_lossy().into_owned(),
            "nope.md".to_string(),
        ];

        let mut warnings = Vec::new();
        let files = existing_files(&inputs, &mut warnings).expect("files");
        assert_eq!(files, vec![present]);
        assert_eq!(
            String::from_utf8(warnings).expect("utf8"),
            "  Warning: skipping (not found): nope.md\n"
        );

        let mut sink = Vec::new();
        assert_eq!(
            message(existing_files(&["nope.md".to_string()], &mut sink)),
            "Error: no valid files provided."
        );
    }

    #[test]
    fn scan_requires_base_or_here() {
        assert_eq!(
            message(scan_project_base(None, false)),
            "Error: --references, --compress, and --tokens require --base or --here."
        );
    }

    #[test]
    fn src_dirs_need_flag_or_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(
            message(resolve_src_dirs(temp.path(), false, &[])),
            "Error: --src-dir is required or .req/config.json must exist."
        );
        assert_eq!(
            resolve_src_dirs(temp.path(), false, &["lib".to_string()]).expect("dirs"),
            vec!["lib"]
        );
    }

    #[test]
    fn empty_scan_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("src")).expect("mkdir");
        assert_eq!(
            message(project_source_files(temp.path(), &["src".to_string()])),
            "Error: no source files found in configured directories."
        );
    }

    #[test]
    fn docs_files_are_sorted_direct_children() {
        let temp = tempfile::tempdir().expect("tempdir");
        let docs = temp.path().join("docs");
        fs::create_dir_all(docs.join("nested")).expect("mkdir");
        fs::write(docs.join("b.md"), "b").expect("write");
        fs::write(docs.join("a.md"), "a").expect("write");

        let files = docs_files(temp.path(), false, Some("docs")).expect("files");
        assert_eq!(files, vec![docs.join("a.md"), docs.join("b.md")]);
        assert_eq!(
            message(docs_files(temp.path(), false, None)),
            "Error: --tokens requires --docs-dir."
        );
    }

    #[test]
    fn check_ids_reports_each_violation() {
        let temp = tempfile::tempdir().expect("tempdir");
        let good = temp.path().join("good.md");
        let bad = temp.path().join("bad.md");
        fs::write(&good, "- REQ-001: one\n- REQ-002: two\n").expect("write");
        fs::write(&bad, "- REQ-001: one\n- REQ-003: three\n").expect("write");

        let mut out = Vec::new();
        let clean = check_ids(&[good.clone(), bad.clone()], &mut out).expect("check");
        assert!(!clean);
        let report = String::from_utf8(out).expect("utf8");
        assert_eq!(
            report,
            format!(
                "{}: OK\n{}: 1 issue(s)\n  - requirement ID REQ-003 on line 2 breaks the sequence (expected REQ-002)\n",
                good.display(),
                bad.display()
            )
        );
    }

    #[test]
    fn renumber_rewrites_file_and_lists_renames() {
        let temp = tempfile::tempdir().expect("tempdir");
        let doc = temp.path().join("requirements.md");
        fs::write(&doc, "- REQ-001: one\n- REQ-005: two, see REQ-001\n").expect("write");

        let mut out = Vec::new();
        renumber_files(&[doc.clone()], &mut out).expect("renumber");
        assert_eq!(
            fs::read_to_string(&doc).expect("read"),
            "- REQ-001: one\n- REQ-002: two, see REQ-001\n"
        );
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            format!("{}:\n  REQ-005 -> REQ-002\n", doc.display())
        );
    }

    #[test]
    fn token_summary_counts_every_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("note.md");
        fs::write(&file, "hello world").expect("write");
        let metrics = count_files_metrics(&[file]).expect("metrics");
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].chars, 11);
        assert!(metrics[0].tokens > 0);
        assert!(metrics[0].error.is_none());
    }
}
