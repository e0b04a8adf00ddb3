//! CLI tests for project installation (`--base`/`--here` init and `--remove`)
//! and the project scan commands.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use usereq::exit_codes;
use usereq::io::config::load_config;

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

fn layout(root: &Path) {
    for dir in ["guidelines", "docs", "tests", "src"] {
        fs::create_dir_all(root.join(dir)).expect("mkdir");
    }
    fs::write(
        root.join("src/shapes.py"),
        "class Square:\n    def area(self):\n        return 4\n",
    )
    .expect("write");
}

const INIT: &[&str] = &[
    "--base",
    ".",
    "--guidelines-dir",
    "guidelines/",
    "--docs-dir",
    "docs",
    "--tests-dir",
    "tests",
    "--src-dir",
    "src",
    "--add-guidelines",
];

#[test]
fn init_creates_config_workflows_and_requirements() {
    let temp = tempfile::tempdir().expect("tempdir");
    layout(temp.path());

    let output = req(temp.path(), INIT);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    let summary = stdout(&output);
    assert!(summary.starts_with("Installation completed successfully in "));
    assert!(summary.contains("- guidelines/requirements-writing.md"));

    let cfg = load_config(temp.path()).expect("config");
    assert_eq!(cfg.guidelines_dir, "guidelines/");
    assert_eq!(cfg.src_dirs, vec!["src"]);
    assert!(temp.path().join(".req/workflows/change.toml").is_file());
    assert!(temp.path().join(".req/workflows/renumber.toml").is_file());
    assert!(temp.path().join("docs/requirements.md").is_file());
}

#[test]
fn init_requires_all_directories_without_here() {
    let temp = tempfile::tempdir().expect("tempdir");
    layout(temp.path());
    let output = req(temp.path(), &["--base", ".", "--docs-dir", "docs"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID_ARGS));
}

#[test]
fn init_rejects_missing_guidelines_dir() {
    let temp = tempfile::tempdir().expect("tempdir");
    layout(temp.path());
    fs::remove_dir(temp.path().join("guidelines")).expect("rmdir");

    let output = req(temp.path(), INIT);
    assert_eq!(output.status.code(), Some(exit_codes::GUIDELINES));
    assert!(stderr(&output).starts_with("Error: GUIDELINES_DIR directory 'guidelines' does not exist"));
}

#[test]
fn missing_base_exits_with_base_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = req(temp.path(), &["--base", "nope", "--references"]);
    assert_eq!(output.status.code(), Some(exit_codes::BASE_MISSING));
}

#[test]
fn remove_deletes_req_dir_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    layout(temp.path());
    assert_eq!(req(temp.path(), INIT).status.code(), Some(exit_codes::OK));

    let output = req(temp.path(), &["--here", "--remove"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    assert!(!temp.path().join(".req").exists());

    let output = req(temp.path(), &["--here", "--remove"]);
    assert_eq!(output.status.code(), Some(exit_codes::CONFIG));
    assert_eq!(
        stderr(&output),
        "Error: .req/config.json not found in the project root\n"
    );
}

#[test]
fn references_use_saved_config_with_here() {
    let temp = tempfile::tempdir().expect("tempdir");
    layout(temp.path());
    assert_eq!(req(temp.path(), INIT).status.code(), Some(exit_codes::OK));

    let output = req(temp.path(), &["--here", "--references"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    let markdown = stdout(&output);
    assert!(markdown.starts_with("# Files Structure\n```\n.\n└── src\n    └── shapes.py\n```\n"));
    assert!(markdown.contains("Square"));
}

#[test]
fn compress_headers_are_project_relative() {
    let temp = tempfile::tempdir().expect("tempdir");
    layout(temp.path());

    let output = req(temp.path(), &["--base", ".", "--src-dir", "src", "--compress"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("@@@ src/shapes.py | python\n> Lines: 1-3\n"));
}

#[test]
fn find_extracts_methods_from_project() {
    let temp = tempfile::tempdir().expect("tempdir");
    layout(temp.path());

    let output = req(
        temp.path(),
        &["--base", ".", "--src-dir", "src", "--find", "METHOD|FUNCTION", "^area$"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    assert!(stdout(&output).contains("`area`"));
}

#[test]
fn scan_without_base_or_here_fails() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = req(temp.path(), &["--compress"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert_eq!(
        stderr(&output),
        "Error: --references, --compress, and --tokens require --base or --here.\n"
    );
}

#[test]
fn tokens_count_docs_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    layout(temp.path());
    fs::write(temp.path().join("docs/overview.md"), "# Overview\n").expect("write");

    let output = req(temp.path(), &["--base", ".", "--docs-dir", "docs", "--tokens"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    assert!(stdout(&output).contains("overview.md"));
}
