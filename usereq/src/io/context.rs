//! Context writer for `.req/context/`, rewritten after every run transition.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use tracing::debug;

use crate::core::sequencer::RunState;

const PHASE_TEMPLATE: &str = include_str!("templates/phase.md");
const PROPOSAL_TEMPLATE: &str = include_str!("templates/proposal.md");
const FAILURE_TEMPLATE: &str = include_str!("templates/failure.md");

/// Resolved paths for context files.
#[derive(Debug, Clone)]
pub struct ContextPaths {
    pub dir: PathBuf,
    pub phase_path: PathBuf,
    pub proposal_path: PathBuf,
    pub failure_path: PathBuf,
}

impl ContextPaths {
    pub fn new(root: &Path) -> Self {
        let dir = root.join(".req").join("context");
        Self {
            dir: dir.clone(),
            phase_path: dir.join("phase.md"),
            proposal_path: dir.join("proposal.md"),
            failure_path: dir.join("failure.md"),
        }
    }
}

/// `PREVIOUS-PHASE` / `NEXT-PHASE` markers read back from `phase.md`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseMarkers {
    pub previous: Option<String>,
    pub next: Option<String>,
}

struct ContextEngine {
    env: Environment<'static>,
}

impl ContextEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_template("phase", PHASE_TEMPLATE)
            .expect("phase template should be valid");
        env.add_template("proposal", PROPOSAL_TEMPLATE)
            .expect("proposal template should be valid");
        env.add_template("failure", FAILURE_TEMPLATE)
            .expect("failure template should be valid");
        Self { env }
    }

    fn render_phase(&self, state: &RunState) -> Result<String> {
        let template = self.env.get_template("phase")?;
        Ok(template.render(context! {
            workflow => state.workflow.as_deref().unwrap_or("none"),
            status => state.status.as_str(),
            previous_phase => state.previous_phase.as_deref().unwrap_or("none"),
            next_phase => state.next_phase.as_deref().unwrap_or("none"),
        })?)
    }

    fn render_proposal(&self, state: &RunState) -> Result<String> {
        let template = self.env.get_template("proposal")?;
        let proposal = state
            .pending_proposal
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("None.");
        Ok(template.render(context! { proposal => proposal })?)
    }

    fn render_failure(&self, state: &RunState) -> Result<String> {
        let template = self.env.get_template("failure")?;
        Ok(template.render(context! { failure => state.failure.as_ref() })?)
    }
}

/// Clear `.req/context/` and write fresh context files for `state`.
pub fn write_context(root: &Path, state: &RunState) -> Result<ContextPaths> {
    debug!(root = %root.display(), status = state.status.as_str(), "writing context");
    let engine = ContextEngine::new();
    let paths = ContextPaths::new(root);
    clear_context_dir(&paths.dir)?;

    write_file(&paths.phase_path, &engine.render_phase(state)?)?;
    write_file(&paths.proposal_path, &engine.render_proposal(state)?)?;
    write_file(&paths.failure_path, &engine.render_failure(state)?)?;

    debug!(
        has_proposal = state.pending_proposal.is_some(),
        has_failure = state.failure.is_some(),
        "context written"
    );
    Ok(paths)
}

/// Parse phase markers from `.req/context/phase.md`, if present.
pub fn read_phase_markers(root: &Path) -> Result<Option<PhaseMarkers>> {
    let path = ContextPaths::new(root).phase_path;
    if !path.is_file() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let mut markers = PhaseMarkers::default();
    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("PREVIOUS-PHASE:") {
            markers.previous = phase_value(value);
        } else if let Some(value) = line.strip_prefix("NEXT-PHASE:") {
            markers.next = phase_value(value);
        }
    }
    Ok(Some(markers))
}

fn phase_value(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty() && value != "none").then(|| value.to_string())
}

fn clear_context_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        debug!(dir = %dir.display(), "clearing context dir");
        fs::remove_dir_all(dir).with_context(|| format!("remove context dir {}", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("create context dir {}", dir.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sequencer::{Failure, RunStatus};

    fn awaiting() -> RunState {
        RunState {
            workflow: Some("change".to_string()),
            status: RunStatus::AwaitingApproval,
            next_step: 3,
            previous_phase: Some("approve-proposal".to_string()),
            next_phase: Some("renumber-requirements".to_string()),
            pending_proposal: Some("Add PRJ-004.\n".to_string()),
            approved_proposal: None,
            failure: None,
        }
    }

    /// Verifies that write_context clears stale files from the context directory.
    #[test]
    fn context_rewrite_clears_previous_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        let dir = root.join(".req").join("context");
        fs::create_dir_all(&dir).expect("create context dir");
        fs::write(dir.join("stale.txt"), "stale").expect("write stale");

        let paths = write_context(root, &awaiting()).expect("write context");

        assert!(paths.phase_path.is_file());
        assert!(paths.proposal_path.is_file());
        assert!(paths.failure_path.is_file());
        assert!(!dir.join("stale.txt").exists());
    }

    /// Phase markers written for a suspended run read back unchanged.
    #[test]
    fn phase_markers_round_trip() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = write_context(temp.path(), &awaiting()).expect("write context");

        let phase = fs::read_to_string(&paths.phase_path).expect("read phase");
        assert_eq!(
            phase,
            "# Phase\n\nWORKFLOW: change\nSTATUS: awaiting-approval\nPREVIOUS-PHASE: approve-proposal\nNEXT-PHASE: renumber-requirements\n"
        );
        assert_eq!(
            read_phase_markers(temp.path()).expect("read"),
            Some(PhaseMarkers {
                previous: Some("approve-proposal".to_string()),
                next: Some("renumber-requirements".to_string()),
            })
        );
        let proposal = fs::read_to_string(&paths.proposal_path).expect("read proposal");
        assert_eq!(proposal, "# Pending Proposal\n\nAdd PRJ-004.\n");
    }

    #[test]
    fn idle_state_renders_placeholders() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = write_context(temp.path(), &RunState::default()).expect("write context");

        let failure = fs::read_to_string(&paths.failure_path).expect("read failure");
        assert_eq!(failure, "# Failure\n\nNone.\n");
        let proposal = fs::read_to_string(&paths.proposal_path).expect("read proposal");
        assert!(proposal.contains("None."));
        assert_eq!(
            read_phase_markers(temp.path()).expect("read"),
            Some(PhaseMarkers::default())
        );
    }

    #[test]
    fn failure_lists_sentinel_step_and_detail() {
        let temp = tempfile::tempdir().expect("tempdir");
        let state = RunState {
            workflow: Some("change".to_string()),
            status: RunStatus::Failed,
            failure: Some(Failure {
                step: Some("check-git-status".to_string()),
                sentinel: "GIT status check FAILED!".to_string(),
                detail: " M src/lib.rs".to_string(),
            }),
            ..RunState::default()
        };
        let paths = write_context(temp.path(), &state).expect("write context");
        let failure = fs::read_to_string(&paths.failure_path).expect("read failure");
        assert_eq!(
            failure,
            "# Failure\n\nGIT status check FAILED!\n\nStep: check-git-status\n\n M src/lib.rs\n"
        );
    }

    #[test]
    fn missing_phase_file_reads_as_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(read_phase_markers(temp.path()).expect("read"), None);
    }
}
