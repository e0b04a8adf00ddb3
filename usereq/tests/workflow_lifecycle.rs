//! End-to-end tests for the `change` and `renumber` workflows.
//!
//! Each test installs `.req/` into a committed git fixture and drives the
//! `req` binary through start, approval and rejection.

use std::path::Path;
use std::process::{Command, Output};

use usereq::core::sequencer::RunStatus;
use usereq::exit_codes;
use usereq::io::context::read_phase_markers;
use usereq::io::run_state::{load_run_state, run_state_path};
use usereq::test_support::TestRepo;

fn req(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_req"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
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

/// Proposal lives outside the repository so it never dirties the work tree.
fn proposal_file(dir: &Path) -> String {
    let path = dir.join("proposal.md");
    std::fs::write(&path, "Add REQ-002 for exporting reports.\n").expect("write proposal");
    path.to_string_lossy().into_owned()
}

/// Full change request: gates pass, the run stops for approval, the agent
/// edits the document, and `--approve` renumbers and re-validates it.
#[test]
fn change_request_stops_for_approval_then_completes() {
    let repo = TestRepo::new().expect("repo");
    repo.install().expect("install");
    let outside = tempfile::tempdir().expect("tempdir");
    let proposal = proposal_file(outside.path());

    let output = req(
        repo.path(),
        &["--here", "--workflow", "change", "--proposal", proposal.as_str()],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    assert!(stdout(&output).starts_with(
        "Workflow 'change' is awaiting approval before 'renumber-requirements'."
    ));

    let markers = read_phase_markers(repo.path()).expect("read").expect("markers");
    assert_eq!(markers.previous.as_deref(), Some("approve-proposal"));
    assert_eq!(markers.next.as_deref(), Some("renumber-requirements"));
    assert!(
        repo.read(".req/context/proposal.md")
            .expect("proposal")
            .contains("Add REQ-002 for exporting reports.")
    );

    // The agent applies the proposal with a gap in the numbering.
    let doc = repo.read("docs/requirements.md").expect("doc");
    let edited = doc.replace(
        "- **REQ-001**: Describe the first functional requirement.",
        "- **REQ-001**: Describe the first functional requirement.\n- **REQ-007**: Export reports, extending REQ-001.",
    );
    repo.write("docs/requirements.md", &edited).expect("edit doc");

    let output = req(repo.path(), &["--here", "--approve"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Workflow 'change' completed.\n");

    let doc = repo.read("docs/requirements.md").expect("doc");
    assert!(doc.contains("- **REQ-002**: Export reports, extending REQ-001."));
    assert!(!doc.contains("REQ-007"));

    let state = load_run_state(&run_state_path(repo.path())).expect("state");
    assert_eq!(state.status, RunStatus::Completed);
    assert_eq!(
        state.approved_proposal.as_deref(),
        Some("Add REQ-002 for exporting reports.\n")
    );
}

#[test]
fn dirty_work_tree_aborts_with_git_sentinel() {
    let repo = TestRepo::new().expect("repo");
    repo.install().expect("install");
    repo.write("src/scratch.py", "x = 1\n").expect("write");

    let output = req(repo.path(), &["--here", "--workflow", "renumber"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    let err = stderr(&output);
    assert!(err.contains("?? src/scratch.py"));
    assert!(err.ends_with("GIT status check FAILED!\n"));
    assert!(!err.contains("worktree not clean"), "{err}");
    assert!(!err.contains("WARN"), "{err}");

    let failure = repo.read(".req/context/failure.md").expect("failure");
    assert!(failure.contains("check-git-status"));
}

#[test]
fn changes_under_req_do_not_block_the_git_gate() {
    let repo = TestRepo::new().expect("repo");
    repo.install().expect("install");
    repo.write(".req/notes.md", "scratch\n").expect("write");

    let output = req(repo.path(), &["--here", "--workflow", "renumber"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Workflow 'renumber' completed.\n");
}

#[test]
fn reject_aborts_with_workflow_sentinel() {
    let repo = TestRepo::new().expect("repo");
    repo.install().expect("install");
    let outside = tempfile::tempdir().expect("tempdir");
    let proposal = proposal_file(outside.path());

    let output = req(
        repo.path(),
        &["--here", "--workflow", "change", "--proposal", proposal.as_str()],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));

    let output = req(repo.path(), &["--here", "--reject"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(stderr(&output).ends_with("proposal rejected\nChange request FAILED!\n"));

    let output = req(repo.path(), &["--here", "--workflow-status"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let status = stdout(&output);
    assert!(status.contains("STATUS: failed"));
    assert!(status.contains("SENTINEL: Change request FAILED!"));

    let output = req(repo.path(), &["--here", "--approve"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert_eq!(stderr(&output), "Error: no proposal is awaiting approval\n");
}

#[test]
fn second_start_is_refused_while_awaiting_approval() {
    let repo = TestRepo::new().expect("repo");
    repo.install().expect("install");
    let outside = tempfile::tempdir().expect("tempdir");
    let proposal = proposal_file(outside.path());
    let args = ["--here", "--workflow", "change", "--proposal", proposal.as_str()];

    assert_eq!(req(repo.path(), &args).status.code(), Some(exit_codes::OK));
    let output = req(repo.path(), &args);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(stderr(&output).contains("is awaiting approval; run --approve or --reject first"));
}
