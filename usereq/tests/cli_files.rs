//! CLI tests for the standalone `--files-*` commands and `--test-static-check`.
//!
//! Spawns the `req` binary and checks stdout, stderr and exit codes.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use usereq::exit_codes;

fn req(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_req"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run req")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn no_arguments_prints_help() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = req(temp.path(), &[]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(stdout(&output).contains("--files-references"));
}

#[test]
fn unknown_flag_is_an_argument_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = req(temp.path(), &["--no-such-flag"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID_ARGS));
}

#[test]
fn files_tokens_skips_missing_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("notes.md"), "hello tokens").expect("write");

    let output = req(temp.path(), &["--files-tokens", "notes.md", "gone.md"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(stderr(&output).contains("  Warning: skipping (not found): gone.md"));
    assert!(stdout(&output).contains("notes.md"));

    let output = req(temp.path(), &["--files-tokens", "gone.md"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(stderr(&output).ends_with("Error: no valid files provided.\n"));
}

#[test]
fn files_references_renders_markdown_per_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("lib.rs"),
        "/// Adds one.\npub fn bump(x: u32) -> u32 {\n    x + 1\n}\n",
    )
    .expect("write");

    let output = req(temp.path(), &["--files-references", "lib.rs"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let markdown = stdout(&output);
    assert!(markdown.starts_with("# lib.rs | Rust |"));
    assert!(markdown.contains("bump"));
    assert!(stderr(&output).is_empty(), "progress is quiet without --verbose");
}

/// `--verbose` progress goes to stderr, leaving stdout as pure output.
#[test]
fn files_compress_reports_progress_with_verbose() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("tool.py"), "# comment\nx = 1\n").expect("write");

    let output = req(
        temp.path(),
        &["--verbose", "--enable-line-numbers", "--files-compress", "tool.py", "README"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        stdout(&output),
        "@@@ tool.py | python\n> Lines: 2-2\n```\n2: x = 1\n```\n"
    );
    let progress = stderr(&output);
    assert!(progress.contains("  OK    tool.py"));
    assert!(progress.contains("  SKIP  README (not found)"));
}

#[test]
fn files_find_requires_tag_pattern_and_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = req(temp.path(), &["--files-find", "FUNCTION", "main"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(stderr(&output).contains("--files-find requires at least TAG, PATTERN, and one FILE."));
}

#[test]
fn check_then_renumber_requirement_ids() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("requirements.md"),
        "- **REQ-001**: first\n- **REQ-003**: third, after REQ-001\n",
    )
    .expect("write");

    let output = req(temp.path(), &["--files-check-ids", "requirements.md"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(stdout(&output).starts_with("requirements.md: 1 issue(s)\n"));

    let output = req(temp.path(), &["--files-renumber-ids", "requirements.md"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "requirements.md:\n  REQ-003 -> REQ-002\n");

    let output = req(temp.path(), &["--files-check-ids", "requirements.md"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "requirements.md: OK\n");
}

#[test]
fn static_check_dummy_passes_every_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(temp.path().join("pkg")).expect("mkdir");
    fs::write(temp.path().join("pkg/a.py"), "a = 1\n").expect("write");
    fs::write(temp.path().join("pkg/b.py"), "b = 2\n").expect("write");

    let output = req(temp.path(), &["--test-static-check", "dummy", "pkg/*.py"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let report = stdout(&output);
    assert_eq!(report.matches("# Static-Check(Dummy): ").count(), 2);
    assert_eq!(report.matches("Result: OK").count(), 2);
}

#[test]
fn static_check_without_subcommand_fails() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = req(temp.path(), &["--test-static-check"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert_eq!(
        stderr(&output),
        "Error: --test-static-check requires a subcommand: dummy, pylance, ruff, command.\n"
    );
}

#[test]
fn version_prints_package_version() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = req(temp.path(), &["--ver"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), format!("{}\n", env!("CARGO_PKG_VERSION")));
}
