//! Run state storage for workflow runs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::sequencer::RunState;
use crate::io::write_atomic;

/// `.req/state/run_state.json` under the project base.
pub fn run_state_path(project_base: &Path) -> PathBuf {
    project_base.join(".req").join("state").join("run_state.json")
}

/// Load run state from disk; a missing file is an idle state.
pub fn load_run_state(path: &Path) -> Result<RunState> {
    if !path.exists() {
        debug!(path = %path.display(), "no run state; starting idle");
        return Ok(RunState::default());
    }
    debug!(path = %path.display(), "loading run state");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read run state {}", path.display()))?;
    let state: RunState = serde_json::from_str(&contents)
        .with_context(|| format!("parse run state {}", path.display()))?;
    debug!(workflow = ?state.workflow, status = state.status.as_str(), next_step = state.next_step, "run state loaded");
    Ok(state)
}

/// Atomically write run state to disk (temp file + rename).
pub fn write_run_state(path: &Path, state: &RunState) -> Result<()> {
    debug!(path = %path.display(), workflow = ?state.workflow, status = state.status.as_str(), "writing run state");
    let mut buf = serde_json::to_string_pretty(state)?;
    buf.push('\n');
    write_atomic(path, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sequencer::{Failure, RunStatus};

    /// Verifies write → read preserves all fields.
    #[test]
    fn run_state_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = run_state_path(temp.path());

        let state = RunState {
            workflow: Some("change".to_string()),
            status: RunStatus::Failed,
            next_step: 2,
            previous_phase: Some("check-git-status".to_string()),
            next_phase: Some("approve-proposal".to_string()),
            pending_proposal: None,
            approved_proposal: Some("text".to_string()),
            failure: Some(Failure {
                step: Some("check-requirements".to_string()),
                sentinel: "Change request FAILED!".to_string(),
                detail: "line 4 references undefined requirement ID PRJ-009".to_string(),
            }),
        };

        write_run_state(&path, &state).expect("write");
        let loaded = load_run_state(&path).expect("load");
        assert_eq!(loaded, state);
        assert!(!path.with_extension("json.tmp").exists());
    }

    /// Ensures the idle state serializes to a known, stable JSON format.
    #[test]
    fn run_state_defaults_are_deterministic() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("run_state.json");

        write_run_state(&path, &RunState::default()).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        let expected = "{\n  \"workflow\": null,\n  \"status\": \"idle\",\n  \"next_step\": 0,\n  \"previous_phase\": null,\n  \"next_phase\": null,\n  \"pending_proposal\": null,\n  \"approved_proposal\": null,\n  \"failure\": null\n}\n";
        assert_eq!(contents, expected);
    }

    #[test]
    fn missing_file_loads_idle() {
        let temp = tempfile::tempdir().expect("tempdir");
        let state = load_run_state(&temp.path().join("absent.json")).expect("load");
        assert_eq!(state, RunState::default());
    }
}
