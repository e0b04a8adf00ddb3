//! Linear, gated step sequencing with an approval checkpoint.
//!
//! This module only computes transitions. Executing a step and persisting the
//! resulting [`RunState`] are the caller's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel printed when a workflow aborts without its own message.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Change request FAILED!";

/// A named, ordered list of steps loaded from `.req/workflows/<name>.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workflow {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    #[serde(flatten)]
    pub action: StepAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StepAction {
    /// Precondition; an unmet gate aborts the run.
    Gate { condition: Gate },
    /// External command; a non-zero exit aborts the run.
    Command {
        command: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_secs: Option<u64>,
    },
    /// Suspends the run until `--approve` or `--reject`.
    Approval {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proposal: Option<String>,
    },
    /// Rewrites requirement IDs in place.
    RenumberIds { path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Gate {
    /// Working tree clean apart from `.req/`.
    GitClean,
    FileExists { path: String },
    /// Requirement document has no ID violations.
    RequirementIds { path: String },
}

impl StepAction {
    pub fn kind(&self) -> &'static str {
        match self {
            StepAction::Gate { .. } => "gate",
            StepAction::Command { .. } => "command",
            StepAction::Approval { .. } => "approval",
            StepAction::RenumberIds { .. } => "renumber-ids",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("workflow '{0}' has no steps")]
    EmptyWorkflow(String),
    #[error("workflow '{workflow}' defines step '{step}' more than once")]
    DuplicateStep { workflow: String, step: String },
    #[error("workflow '{workflow}' has a step with an empty name")]
    UnnamedStep { workflow: String },
    #[error("workflow '{0}' is awaiting approval; run --approve or --reject first")]
    AwaitingApproval(String),
    #[error("no proposal is awaiting approval")]
    NothingPending,
    #[error("run state belongs to workflow '{found}', not '{expected}'")]
    WrongWorkflow { expected: String, found: String },
    #[error("no step is pending for workflow '{0}'")]
    NoPendingStep(String),
}

impl Workflow {
    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.steps.is_empty() {
            return Err(SequenceError::EmptyWorkflow(self.name.clone()));
        }
        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(SequenceError::UnnamedStep {
                    workflow: self.name.clone(),
                });
            }
            if !seen.insert(step.name.as_str()) {
                return Err(SequenceError::DuplicateStep {
                    workflow: self.name.clone(),
                    step: step.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Terminal message for a run of this workflow.
    pub fn sentinel(&self) -> &str {
        self.failure_message.as_deref().unwrap_or(DEFAULT_FAILURE_MESSAGE)
    }

    /// Terminal message when `step` fails: the step's own, else the workflow's.
    pub fn step_sentinel<'a>(&'a self, step: &'a Step) -> &'a str {
        step.failure_message.as_deref().unwrap_or_else(|| self.sentinel())
    }

    fn step_name(&self, index: usize) -> Option<String> {
        self.steps.get(index).map(|step| step.name.clone())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    AwaitingApproval,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::AwaitingApproval => "awaiting-approval",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

/// Why a run stopped short.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Failure {
    /// Step that failed, or `None` for a rejected proposal.
    pub step: Option<String>,
    /// Sentinel printed verbatim.
    pub sentinel: String,
    pub detail: String,
}

/// Persisted progress of the current workflow run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RunState {
    pub workflow: Option<String>,
    pub status: RunStatus,
    /// Index of the next step to execute (monotonic within a run).
    pub next_step: usize,
    pub previous_phase: Option<String>,
    pub next_phase: Option<String>,
    pub pending_proposal: Option<String>,
    pub approved_proposal: Option<String>,
    pub failure: Option<Failure>,
}

/// Result of executing one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    Failed { detail: String },
    AwaitApproval { proposal: String },
}

impl RunState {
    /// Fresh running state for `workflow`. Refused while a proposal is pending.
    pub fn begin(&self, workflow: &Workflow) -> Result<RunState, SequenceError> {
        if self.status == RunStatus::AwaitingApproval {
            let name = self.workflow.clone().unwrap_or_else(|| workflow.name.clone());
            return Err(SequenceError::AwaitingApproval(name));
        }
        workflow.validate()?;
        Ok(RunState {
            workflow: Some(workflow.name.clone()),
            status: RunStatus::Running,
            next_step: 0,
            previous_phase: None,
            next_phase: workflow.step_name(0),
            pending_proposal: None,
            approved_proposal: None,
            failure: None,
        })
    }

    /// Step to execute next, if the run is still going.
    pub fn current_step<'a>(&self, workflow: &'a Workflow) -> Option<&'a Step> {
        if self.status != RunStatus::Running {
            return None;
        }
        workflow.steps.get(self.next_step)
    }

    /// Apply the outcome of the current step.
    pub fn record(&mut self, workflow: &Workflow, outcome: StepOutcome) -> Result<(), SequenceError> {
        self.ensure_workflow(workflow)?;
        let step = self
            .current_step(workflow)
            .ok_or_else(|| SequenceError::NoPendingStep(workflow.name.clone()))?;

        match outcome {
            StepOutcome::Passed => {
                self.previous_phase = Some(step.name.clone());
                self.advance(workflow);
            }
            StepOutcome::Failed { detail } => {
                self.failure = Some(Failure {
                    step: Some(step.name.clone()),
                    sentinel: workflow.step_sentinel(step).to_string(),
                    detail,
                });
                self.status = RunStatus::Failed;
            }
            StepOutcome::AwaitApproval { proposal } => {
                self.previous_phase = Some(step.name.clone());
                self.pending_proposal = Some(proposal);
                self.next_step += 1;
                self.next_phase = workflow.step_name(self.next_step);
                self.status = RunStatus::AwaitingApproval;
            }
        }
        Ok(())
    }

    /// Accept the pending proposal and resume at `next_phase`.
    pub fn approve(&mut self, workflow: &Workflow) -> Result<(), SequenceError> {
        self.ensure_workflow(workflow)?;
        if self.status != RunStatus::AwaitingApproval {
            return Err(SequenceError::NothingPending);
        }
        self.approved_proposal = self.pending_proposal.take();
        self.status = if self.next_step < workflow.steps.len() {
            RunStatus::Running
        } else {
            RunStatus::Completed
        };
        Ok(())
    }

    /// Discard the pending proposal and fail the run with the workflow sentinel.
    pub fn reject(&mut self, workflow: &Workflow) -> Result<(), SequenceError> {
        self.ensure_workflow(workflow)?;
        if self.status != RunStatus::AwaitingApproval {
            return Err(SequenceError::NothingPending);
        }
        self.pending_proposal = None;
        self.failure = Some(Failure {
            step: None,
            sentinel: workflow.sentinel().to_string(),
            detail: "proposal rejected".to_string(),
        });
        self.status = RunStatus::Failed;
        Ok(())
    }

    fn advance(&mut self, workflow: &Workflow) {
        self.next_step += 1;
        self.next_phase = workflow.step_name(self.next_step);
        if self.next_step >= workflow.steps.len() {
            self.status = RunStatus::Completed;
        }
    }

    fn ensure_workflow(&self, workflow: &Workflow) -> Result<(), SequenceError> {
        match &self.workflow {
            Some(name) if *name == workflow.name => Ok(()),
            Some(name) => Err(SequenceError::WrongWorkflow {
                expected: workflow.name.clone(),
                found: name.clone(),
            }),
            None => Err(SequenceError::NothingPending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str, action: StepAction) -> Step {
        Step {
            name: name.to_string(),
            failure_message: None,
            action,
        }
    }

    fn workflow() -> Workflow {
        Workflow {
            name: "change".to_string(),
            description: None,
            failure_message: None,
            steps: vec![
                Step {
                    failure_message: Some("GIT status check FAILED!".to_string()),
                    ..step(
                        "check-git",
                        StepAction::Gate {
                            condition: Gate::GitClean,
                        },
                    )
                },
                step("review", StepAction::Approval { proposal: None }),
                step(
                    "renumber",
                    StepAction::RenumberIds {
                        path: "docs/requirements.md".to_string(),
                    },
                ),
            ],
        }
    }

    #[test]
    fn steps_run_in_order_through_approval() {
        let wf = workflow();
        let mut state = RunState::default().begin(&wf).expect("begin");
        assert_eq!(state.next_phase.as_deref(), Some("check-git"));

        state.record(&wf, StepOutcome::Passed).expect("gate");
        assert_eq!(state.previous_phase.as_deref(), Some("check-git"));
        assert_eq!(state.current_step(&wf).map(|s| s.name.as_str()), Some("review"));

        state
            .record(
                &wf,
                StepOutcome::AwaitApproval {
                    proposal: "add PRJ-004".to_string(),
                },
            )
            .expect("approval");
        assert_eq!(state.status, RunStatus::AwaitingApproval);
        assert_eq!(state.next_phase.as_deref(), Some("renumber"));
        assert!(state.current_step(&wf).is_none());

        state.approve(&wf).expect("approve");
        assert_eq!(state.approved_proposal.as_deref(), Some("add PRJ-004"));
        assert!(state.pending_proposal.is_none());

        state.record(&wf, StepOutcome::Passed).expect("renumber");
        assert_eq!(state.status, RunStatus::Completed);
        assert_eq!(state.next_step, 3);
        assert!(state.next_phase.is_none());
    }

    #[test]
    fn failed_gate_uses_step_sentinel() {
        let wf = workflow();
        let mut state = RunState::default().begin(&wf).expect("begin");
        state
            .record(
                &wf,
                StepOutcome::Failed {
                    detail: "M src/lib.rs".to_string(),
                },
            )
            .expect("record");
        assert_eq!(state.status, RunStatus::Failed);
        assert!(state.current_step(&wf).is_none());
        let failure = state.failure.expect("failure");
        assert_eq!(failure.sentinel, "GIT status check FAILED!");
        assert_eq!(failure.step.as_deref(), Some("check-git"));
    }

    #[test]
    fn reject_discards_proposal_and_fails_with_workflow_sentinel() {
        let wf = workflow();
        let mut state = RunState::default().begin(&wf).expect("begin");
        state.record(&wf, StepOutcome::Passed).expect("gate");
        state
            .record(
                &wf,
                StepOutcome::AwaitApproval {
                    proposal: "p".to_string(),
                },
            )
            .expect("approval");

        state.reject(&wf).expect("reject");
        assert!(state.pending_proposal.is_none());
        assert_eq!(state.status, RunStatus::Failed);
        assert_eq!(
            state.failure.as_ref().map(|f| f.sentinel.as_str()),
            Some(DEFAULT_FAILURE_MESSAGE)
        );
        assert_eq!(state.reject(&wf), Err(SequenceError::NothingPending));
    }

    #[test]
    fn begin_is_refused_while_awaiting_approval() {
        let wf = workflow();
        let state = RunState {
            workflow: Some("change".to_string()),
            status: RunStatus::AwaitingApproval,
            ..RunState::default()
        };
        assert_eq!(
            state.begin(&wf),
            Err(SequenceError::AwaitingApproval("change".to_string()))
        );
    }

    #[test]
    fn approve_without_pending_is_refused() {
        let wf = workflow();
        let mut state = RunState::default().begin(&wf).expect("begin");
        assert_eq!(state.approve(&wf), Err(SequenceError::NothingPending));
    }

    #[test]
    fn validation_rejects_empty_and_duplicate_steps() {
        let mut wf = workflow();
        wf.steps[1].name = "check-git".to_string();
        assert!(matches!(wf.validate(), Err(SequenceError::DuplicateStep { .. })));

        wf.steps.clear();
        assert_eq!(wf.validate(), Err(SequenceError::EmptyWorkflow("change".to_string())));
    }

    #[test]
    fn state_belongs_to_one_workflow() {
        let wf = workflow();
        let mut state = RunState::default().begin(&wf).expect("begin");
        let mut other = workflow();
        other.name = "renumber".to_string();
        assert!(matches!(
            state.record(&other, StepOutcome::Passed),
            Err(SequenceError::WrongWorkflow { .. })
        ));
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&RunStatus::AwaitingApproval).expect("json");
        assert_eq!(json, "\"awaiting-approval\"");
    }
}
