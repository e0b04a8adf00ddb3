//! Multi-file drivers for `--compress`/`--files-compress` and
//! `--find`/`--files-find`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, instrument};

use crate::core::analyzer::{analyze, enrich};
use crate::core::compress::compress_source;
use crate::core::find::{
    ConstructFilter, format_available_tags, format_construct, language_supports_any,
    parse_tag_filter,
};
use crate::core::languages::Language;
use crate::core::lexing::split_lines;
use crate::error::ReqError;
use crate::io::paths::relative_display;
use crate::io::scan::read_source;
use crate::progress::Progress;

/// Compress `files` and concatenate them, each under an `@@@ <path> | <lang>` header.
///
/// Header paths are relative to `output_base` when it is given and contains the file.
#[instrument(skip_all, fields(files = files.len(), line_numbers))]
pub fn compress_files(
    files: &[PathBuf],
    line_numbers: bool,
    output_base: Option<&Path>,
    progress: &mut Progress<'_>,
) -> Result<String> {
    let mut parts = Vec::new();
    let mut failed = 0usize;

    for path in files {
        let shown = path.display();
        if !path.is_file() {
            progress.skip(&shown, "not found");
            continue;
        }
        let Some(lang) = Language::from_path(path) else {
            progress.skip(&shown, "unsupported extension");
            continue;
        };
        let source = match read_source(path) {
            Ok(source) => source,
            Err(err) => {
                progress.fail(&shown, format_args!("{err:#}"));
                failed += 1;
                continue;
            }
        };

        let numbered = compress_source(&source, lang, true);
        let (start, end) = line_range(&numbered);
        let body = if line_numbers {
            numbered
        } else {
            compress_source(&source, lang, false)
        };
        let header_path = output_base
            .and_then(|base| relative_display(path, base))
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        parts.push(format!(
            "@@@ {header_path} | {}\n> Lines: {start}-{end}\n```\n{body}\n```",
            lang.key()
        ));
        progress.ok(&shown);
    }

    if parts.is_empty() {
        return Err(ReqError::failure("No valid source files processed").into());
    }
    progress.line(format_args!(
        "\n  Compressed: {} ok, {failed} failed",
        parts.len()
    ));
    debug!(ok = parts.len(), failed, "files compressed");
    Ok(parts.join("\n\n"))
}

/// First and last `<n>:` prefix of numbered compressed output, or `(0, 0)`.
fn line_range(numbered: &str) -> (usize, usize) {
    let mut numbers = numbered.lines().filter_map(|line| {
        let (marker, _) = line.split_once(':')?;
        marker.parse::<usize>().ok()
    });
    let Some(first) = numbers.next() else {
        return (0, 0);
    };
    (first, numbers.last().unwrap_or(first))
}

/// Extract every construct whose tag is in `tag_filter` and whose name
/// matches `pattern`.
#[instrument(skip_all, fields(files = files.len(), tag_filter, pattern))]
pub fn find_constructs_in_files(
    files: &[PathBuf],
    tag_filter: &str,
    pattern: &str,
    line_numbers: bool,
    progress: &mut Progress<'_>,
) -> Result<String> {
    let tags = parse_tag_filter(tag_filter);
    if tags.is_empty() {
        return Err(ReqError::failure(format!(
            "No valid tags specified in tag filter.\n\nAvailable tags by language:\n{}",
            format_available_tags()
        ))
        .into());
    }
    let filter = ConstructFilter::new(tags, pattern);

    let mut parts = Vec::new();
    let mut failed = 0usize;
    let mut total_matches = 0usize;

    for path in files {
        let shown = path.display();
        if !path.is_file() {
            progress.skip(&shown, "not found");
            continue;
        }
        let Some(lang) = Language::from_path(path) else {
            progress.skip(&shown, "unsupported extension");
            continue;
        };
        if !language_supports_any(lang, filter.tags()) {
            progress.skip(
                &shown,
                format_args!("language {} does not support any requested tags", lang.key()),
            );
            continue;
        }
        let source = match read_source(path) {
            Ok(source) => source,
            Err(err) => {
                progress.fail(&shown, format_args!("{err:#}"));
                failed += 1;
                continue;
            }
        };

        let lines = split_lines(&source);
        let mut elements = analyze(&source, lang);
        enrich(&mut elements, lang, Some(&lines));
        let constructs: Vec<String> = elements
            .iter()
            .filter(|element| filter.matches(element))
            .map(|element| format_construct(element, &lines, line_numbers))
            .collect();

        if constructs.is_empty() {
            progress.skip(&shown, "no matches");
            continue;
        }
        progress.ok(format_args!("{shown} ({} matches)", constructs.len()));
        total_matches += constructs.len();
        parts.push(format!(
            "@@@ {} | {}\n\n{}",
            path.display(),
            lang.key(),
            constructs.join("\n\n")
        ));
    }

    if parts.is_empty() {
        return Err(ReqError::failure(format!(
            "No constructs found matching the specified criteria.\n\nAvailable tags by language:\n{}",
            format_available_tags()
        ))
        .into());
    }
    progress.line(format_args!(
        "\n  Found: {total_matches} constructs in {} files ({failed} failed)",
        parts.len()
    ));
    Ok(parts.join("\n\n"))
}
