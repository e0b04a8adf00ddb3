//! Orchestration for `--references` and `--files-references`.
//!
//! Each file is analyzed, enriched and rendered with
//! [`format_markdown`](crate::core::markdown::format_markdown); the per-file
//! documents are joined with horizontal rules.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, instrument};

use crate::core::analyzer::{analyze, enrich};
use crate::core::languages::Language;
use crate::core::lexing::split_lines;
use crate::core::markdown::format_markdown;
use crate::core::tree::files_structure_markdown;
use crate::error::ReqError;
use crate::io::paths::relative_display;
use crate::io::scan::read_source;
use crate::progress::Progress;

const FILE_SEPARATOR: &str = "\n\n---\n\n";

/// Render the markdown reference for `files`.
///
/// Missing files and unsupported extensions are skipped. Fails when nothing
/// could be processed.
#[instrument(skip_all, fields(files = files.len()))]
pub fn generate_markdown(files: &[PathBuf], progress: &mut Progress<'_>) -> Result<String> {
    let mut parts = Vec::new();
    let mut failed = 0usize;

    for path in files {
        let shown = path.display();
        if !path.is_file() {
            progress.skip(&shown, "file not found");
            continue;
        }
        let Some(lang) = Language::from_path(path) else {
            progress.skip(&shown, "unsupported extension");
            continue;
        };
        match file_markdown(path, lang) {
            Ok(markdown) => {
                parts.push(markdown);
                progress.ok(&shown);
            }
            Err(err) => {
                progress.fail(&shown, format_args!("{err:#}"));
                failed += 1;
            }
        }
    }

    if parts.is_empty() {
        return Err(ReqError::failure("No valid source files processed").into());
    }
    progress.line(format_args!(
        "\n  Processed: {} ok, {failed} failed",
        parts.len()
    ));
    debug!(ok = parts.len(), failed, "markdown generated");
    Ok(parts.join(FILE_SEPARATOR))
}

/// `# Files Structure` tree of `files` followed by their markdown reference.
pub fn project_references(
    files: &[PathBuf],
    project_base: &Path,
    progress: &mut Progress<'_>,
) -> Result<String> {
    let markdown = generate_markdown(files, progress)?;
    let relative: Vec<String> = files
        .iter()
        .filter_map(|path| relative_display(path, project_base))
        .collect();
    Ok(format!("{}\n\n{markdown}", files_structure_markdown(&relative)))
}

fn file_markdown(path: &Path, lang: Language) -> Result<String> {
    let source = read_source(path)?;
    let lines = split_lines(&source);
    let mut elements = analyze(&source, lang);
    enrich(&mut elements, lang, Some(&lines));
    Ok(format_markdown(
        &elements,
        &path.to_string_lossy(),
        lang.display_name(),
        lines.len(),
    ))
}
