//! Orchestration for `--workflow`, `--approve`, `--reject` and `--workflow-status`.
//!
//! Transitions come from [`RunState`]; this module executes steps through a
//! [`StepRunner`] and persists the run state plus `.req/context/` after every
//! transition so an interrupted run can be inspected and resumed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::placeholders::{PlaceholderValues, apply_replacements};
use crate::core::requirements::{renumber_ids, validate_ids};
use crate::core::sequencer::{
    Gate, RunState, RunStatus, SequenceError, Step, StepAction, StepOutcome, Workflow,
};
use crate::error::ReqError;
use crate::io::config::{config_path, load_config};
use crate::io::context::{ContextPaths, write_context};
use crate::io::git::{Git, format_entries};
use crate::io::guidelines::guidelines_file_items;
use crate::io::process::run_command_with_timeout;
use crate::io::run_state::{load_run_state, run_state_path, write_run_state};
use crate::io::workflows::load_workflow;
use crate::io::write_atomic;
use crate::progress::Progress;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const COMMAND_OUTPUT_LIMIT_BYTES: usize = 1_000_000;

/// Paths the git-clean gate tolerates as dirty.
const ALLOWED_DIRTY_PREFIXES: &[&str] = &[".req/"];

/// Everything a step needs besides its own definition.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub project_base: PathBuf,
    pub placeholders: PlaceholderValues,
    /// `--proposal FILE` given on the command line.
    pub proposal_file: Option<PathBuf>,
}

impl StepContext {
    /// Build placeholder values from `.req/config.json` when it exists.
    pub fn load(project_base: &Path, proposal_file: Option<&Path>) -> Result<Self> {
        let placeholders = if config_path(project_base).is_file() {
            let cfg = load_config(project_base)?;
            let guidelines_files =
                guidelines_file_items(&project_base.join(&cfg.guidelines_dir), project_base)?;
            PlaceholderValues {
                docs_dir: cfg.docs_dir,
                guidelines_dir: cfg.guidelines_dir,
                guidelines_files,
                tests_dir: cfg.tests_dir,
                src_dirs: cfg.src_dirs,
            }
        } else {
            warn!(base = %project_base.display(), "no project config; placeholders use defaults");
            PlaceholderValues::default()
        };
        Ok(Self {
            project_base: project_base.to_path_buf(),
            placeholders,
            proposal_file: proposal_file.map(Path::to_path_buf),
        })
    }

    /// Expand placeholders in `raw` and anchor relative results at the project base.
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        let expanded = apply_replacements(raw, &self.placeholders.replacements());
        let path = PathBuf::from(expanded);
        if path.is_absolute() {
            path
        } else {
            self.project_base.join(path)
        }
    }
}

pub trait StepRunner {
    fn run_step(&self, step: &Step, ctx: &StepContext) -> Result<StepOutcome>;
}

/// Executes steps against the real project: git, the filesystem and child processes.
pub struct ProjectStepRunner;

impl StepRunner for ProjectStepRunner {
    #[instrument(skip_all, fields(step = %step.name, kind = step.action.kind()))]
    fn run_step(&self, step: &Step, ctx: &StepContext) -> Result<StepOutcome> {
        match &step.action {
            StepAction::Gate { condition } => check_gate(condition, ctx),
            StepAction::Command {
                command,
                timeout_secs,
            } => run_command_step(command, timeout_secs.map(Duration::from_secs), ctx),
            StepAction::Approval { proposal } => read_proposal(proposal.as_deref(), ctx),
            StepAction::RenumberIds { path } => renumber_document(&ctx.resolve_path(path)),
        }
    }
}

fn check_gate(gate: &Gate, ctx: &StepContext) -> Result<StepOutcome> {
    match gate {
        Gate::GitClean => {
            let git = Git::new(&ctx.project_base);
            if !git.is_work_tree()? {
                return Ok(failed(format!(
                    "{} is not inside a git work tree",
                    ctx.project_base.display()
                )));
            }
            let dirty = git.disallowed_changes(ALLOWED_DIRTY_PREFIXES)?;
            if dirty.is_empty() {
                Ok(StepOutcome::Passed)
            } else {
                Ok(failed(format!(
                    "uncommitted changes outside .req/:\n{}",
                    format_entries(&dirty)
                )))
            }
        }
        Gate::FileExists { path } => {
            let resolved = ctx.resolve_path(path);
            if resolved.exists() {
                Ok(StepOutcome::Passed)
            } else {
                Ok(failed(format!("missing {}", resolved.display())))
            }
        }
        Gate::RequirementIds { path } => {
            let resolved = ctx.resolve_path(path);
            if !resolved.is_file() {
                return Ok(failed(format!("missing {}", resolved.display())));
            }
            let doc = fs::read_to_string(&resolved)
                .with_context(|| format!("read {}", resolved.display()))?;
            let issues = validate_ids(&doc);
            if issues.is_empty() {
                return Ok(StepOutcome::Passed);
            }
            let lines: Vec<String> = issues.iter().map(|issue| format!("- {issue}")).collect();
            Ok(failed(format!(
                "{} has {} requirement ID issue(s):\n{}",
                resolved.display(),
                issues.len(),
                lines.join("\n")
            )))
        }
    }
}

fn run_command_step(
    argv: &[String],
    timeout: Option<Duration>,
    ctx: &StepContext,
) -> Result<StepOutcome> {
    let argv = ctx.placeholders.expand_argv(argv);
    let Some((program, args)) = argv.split_first() else {
        return Ok(failed("command step has an empty command"));
    };
    let timeout = timeout.unwrap_or(DEFAULT_COMMAND_TIMEOUT);
    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(&ctx.project_base);
    debug!(program = %program, args = ?args, "running command step");
    let output = match run_command_with_timeout(cmd, None, timeout, COMMAND_OUTPUT_LIMIT_BYTES) {
        Ok(output) => output,
        Err(err) => return Ok(failed(format!("{program}: {err:#}"))),
    };
    if output.success() {
        return Ok(StepOutcome::Passed);
    }
    let reason = if output.timed_out {
        format!("timed out after {}s", timeout.as_secs())
    } else {
        match output.status.code() {
            Some(code) => format!("exited with code {code}"),
            None => "terminated by signal".to_string(),
        }
    };
    let text = output.combined_text();
    let text = text.trim_end();
    if text.is_empty() {
        Ok(failed(format!("{program} {reason}")))
    } else {
        Ok(failed(format!("{program} {reason}\n{text}")))
    }
}

fn read_proposal(step_file: Option<&str>, ctx: &StepContext) -> Result<StepOutcome> {
    let path = match (step_file, &ctx.proposal_file) {
        (Some(raw), _) => ctx.resolve_path(raw),
        (None, Some(path)) => path.clone(),
        (None, None) => {
            return Ok(failed(
                "no proposal provided; pass --proposal FILE with --workflow",
            ));
        }
    };
    if !path.is_file() {
        return Ok(failed(format!("proposal file {} not found", path.display())));
    }
    let proposal =
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    Ok(StepOutcome::AwaitApproval { proposal })
}

fn renumber_document(path: &Path) -> Result<StepOutcome> {
    if !path.is_file() {
        return Ok(failed(format!("missing {}", path.display())));
    }
    let doc = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let renumbered = renumber_ids(&doc);
    if renumbered.changed() {
        write_atomic(path, &renumbered.text)?;
        info!(path = %path.display(), renamed = renumbered.mapping.len(), "renumbered requirement IDs");
    }
    Ok(StepOutcome::Passed)
}

fn failed(detail: impl Into<String>) -> StepOutcome {
    StepOutcome::Failed {
        detail: detail.into(),
    }
}

/// Workflow and state after a command, ready for [`print_report`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub workflow: Workflow,
    pub state: RunState,
    pub context: ContextPaths,
}

/// `--workflow NAME`: begin a fresh run and execute until it completes,
/// fails, or stops for approval.
#[instrument(skip_all, fields(base = %project_base.display(), workflow = name))]
pub fn start_workflow(
    project_base: &Path,
    name: &str,
    proposal_file: Option<&Path>,
    runner: &dyn StepRunner,
    progress: &mut Progress<'_>,
) -> Result<RunReport> {
    let state_path = run_state_path(project_base);
    let previous = load_run_state(&state_path)?;
    let workflow = load_workflow(project_base, name)?;
    let mut state = previous.begin(&workflow).map_err(sequence_error)?;
    info!(steps = workflow.steps.len(), "workflow started");
    persist(project_base, &state)?;

    let ctx = StepContext::load(project_base, proposal_file)?;
    drive(project_base, &workflow, &mut state, runner, &ctx, progress)?;
    finish(project_base, workflow, state)
}

/// `--approve`: accept the pending proposal and continue the run.
#[instrument(skip_all, fields(base = %project_base.display()))]
pub fn approve_workflow(
    project_base: &Path,
    proposal_file: Option<&Path>,
    runner: &dyn StepRunner,
    progress: &mut Progress<'_>,
) -> Result<RunReport> {
    let (workflow, mut state) = load_pending(project_base)?;
    state.approve(&workflow).map_err(sequence_error)?;
    info!(workflow = %workflow.name, next = ?state.next_phase, "proposal approved");
    persist(project_base, &state)?;

    let ctx = StepContext::load(project_base, proposal_file)?;
    drive(project_base, &workflow, &mut state, runner, &ctx, progress)?;
    finish(project_base, workflow, state)
}

/// `--reject`: discard the pending proposal and fail the run.
#[instrument(skip_all, fields(base = %project_base.display()))]
pub fn reject_workflow(project_base: &Path) -> Result<RunReport> {
    let (workflow, mut state) = load_pending(project_base)?;
    state.reject(&workflow).map_err(sequence_error)?;
    info!(workflow = %workflow.name, "proposal rejected");
    finish(project_base, workflow, state)
}

/// `--workflow-status`: human-readable summary of the persisted run.
pub fn workflow_status(project_base: &Path) -> Result<String> {
    let state = load_run_state(&run_state_path(project_base))?;
    let Some(workflow) = state.workflow.as_deref() else {
        return Ok("No workflow run recorded.".to_string());
    };
    let mut lines = vec![
        format!("WORKFLOW: {workflow}"),
        format!("STATUS: {}", state.status.as_str()),
        format!(
            "PREVIOUS-PHASE: {}",
            state.previous_phase.as_deref().unwrap_or("none")
        ),
        format!("NEXT-PHASE: {}", state.next_phase.as_deref().unwrap_or("none")),
    ];
    if state.pending_proposal.is_some() {
        lines.push("PROPOSAL: pending (see .req/context/proposal.md)".to_string());
    }
    if let Some(failure) = &state.failure {
        lines.push(format!(
            "FAILED-STEP: {}",
            failure.step.as_deref().unwrap_or("none")
        ));
        lines.push(format!("SENTINEL: {}", failure.sentinel));
    }
    Ok(lines.join("\n"))
}

/// Print the outcome of a run and return the exit code.
///
/// A failed run prints its detail and then the sentinel, verbatim, on stderr.
pub fn print_report(
    report: &RunReport,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    let name = &report.workflow.name;
    match report.state.status {
        RunStatus::Failed => {
            if let Some(failure) = &report.state.failure {
                let detail = failure.detail.trim_end();
                if !detail.is_empty() {
                    writeln!(err, "{detail}").context("write report")?;
                }
                writeln!(err, "{}", failure.sentinel).context("write report")?;
            } else {
                writeln!(err, "{}", report.workflow.sentinel()).context("write report")?;
            }
            Ok(1)
        }
        RunStatus::AwaitingApproval => {
            writeln!(
                out,
                "Workflow '{name}' is awaiting approval before '{}'.\nProposal: {}\nRun `req --approve` or `req --reject`.",
                report.state.next_phase.as_deref().unwrap_or("none"),
                report.context.proposal_path.display()
            )
            .context("write report")?;
            Ok(0)
        }
        RunStatus::Completed => {
            writeln!(out, "Workflow '{name}' completed.").context("write report")?;
            Ok(0)
        }
        RunStatus::Idle | RunStatus::Running => {
            writeln!(out, "Workflow '{name}' is {}.", report.state.status.as_str())
                .context("write report")?;
            Ok(0)
        }
    }
}

fn drive(
    project_base: &Path,
    workflow: &Workflow,
    state: &mut RunState,
    runner: &dyn StepRunner,
    ctx: &StepContext,
    progress: &mut Progress<'_>,
) -> Result<()> {
    while let Some(step) = state.current_step(workflow) {
        debug!(step = %step.name, index = state.next_step, "executing step");
        // Runner errors abort the run like any failed step so the sentinel is still emitted.
        let outcome = runner.run_step(step, ctx).unwrap_or_else(|err| {
            warn!(step = %step.name, error = %err, "step errored");
            failed(format!("{err:#}"))
        });
        match &outcome {
            StepOutcome::Passed => progress.ok(&step.name),
            StepOutcome::Failed { detail } => {
                progress.fail(&step.name, detail.lines().next().unwrap_or("failed"));
            }
            StepOutcome::AwaitApproval { .. } => {
                progress.line(format_args!("  WAIT  {} (approval required)", step.name));
            }
        }
        state.record(workflow, outcome).map_err(sequence_error)?;
        persist(project_base, state)?;
    }
    Ok(())
}

fn load_pending(project_base: &Path) -> Result<(Workflow, RunState)> {
    let state = load_run_state(&run_state_path(project_base))?;
    let Some(name) = state.workflow.as_deref() else {
        return Err(sequence_error(SequenceError::NothingPending));
    };
    let workflow = load_workflow(project_base, name)?;
    Ok((workflow, state))
}

fn finish(project_base: &Path, workflow: Workflow, state: RunState) -> Result<RunReport> {
    let context = persist(project_base, &state)?;
    info!(workflow = %workflow.name, status = state.status.as_str(), "workflow stopped");
    Ok(RunReport {
        workflow,
        state,
        context,
    })
}

fn persist(project_base: &Path, state: &RunState) -> Result<ContextPaths> {
    write_run_state(&run_state_path(project_base), state)?;
    write_context(project_base, state)
}

fn sequence_error(err: SequenceError) -> anyhow::Error {
    ReqError::failure(format!("Error: {err}")).into()
}
