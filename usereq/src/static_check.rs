//! `--test-static-check`: run a static analysis tool over a resolved file list.
//!
//! The [`StaticChecker`] trait separates per-file checking from reporting so
//! tests can substitute a scripted checker.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::error::ReqError;
use crate::io::process::run_command_with_timeout;
use crate::io::resolve::resolve_files;

pub const CHECK_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const CHECK_OUTPUT_LIMIT_BYTES: usize = 1_000_000;

const SUBCOMMANDS: &str = "dummy, pylance, ruff, command";

/// Verdict for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Ok,
    Fail { evidence: String },
}

pub trait StaticChecker {
    /// Label shown in `# Static-Check(<label>): <path>`.
    fn label(&self) -> String;
    fn check(&self, file: &Path) -> Result<CheckResult>;
}

/// Accepts every file.
pub struct DummyChecker;

impl StaticChecker for DummyChecker {
    fn label(&self) -> String {
        "Dummy".to_string()
    }

    fn check(&self, _file: &Path) -> Result<CheckResult> {
        Ok(CheckResult::Ok)
    }
}

/// Runs `<program> [leading_args...] <file>`; a non-zero exit is a failure.
pub struct ToolChecker {
    label: String,
    program: String,
    leading_args: Vec<String>,
    missing_note: String,
}

impl ToolChecker {
    pub fn pylance() -> Self {
        Self {
            label: "Pylance".to_string(),
            program: "pyright".to_string(),
            leading_args: Vec::new(),
            missing_note: "pyright not found on PATH".to_string(),
        }
    }

    pub fn ruff() -> Self {
        Self {
            label: "Ruff".to_string(),
            program: "ruff".to_string(),
            leading_args: vec!["check".to_string()],
            missing_note: "ruff not found on PATH".to_string(),
        }
    }

    /// Arbitrary command; it must be on `PATH` up front.
    pub fn command(program: &str) -> Result<Self, ReqError> {
        if which::which(program).is_err() {
            return Err(ReqError::failure(format!(
                "Error: external command '{program}' not found on PATH."
            )));
        }
        Ok(Self {
            label: format!("Command[{program}]"),
            program: program.to_string(),
            leading_args: Vec::new(),
            missing_note: format!("command '{program}' not found on PATH"),
        })
    }
}

impl StaticChecker for ToolChecker {
    fn label(&self) -> String {
        self.label.clone()
    }

    #[instrument(skip_all, fields(program = %self.program, file = %file.display()))]
    fn check(&self, file: &Path) -> Result<CheckResult> {
        if which::which(&self.program).is_err() {
            return Ok(CheckResult::Fail {
                evidence: format!("  {}", self.missing_note),
            });
        }
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args).arg(file);
        let output = run_command_with_timeout(cmd, None, CHECK_TIMEOUT, CHECK_OUTPUT_LIMIT_BYTES)
            .with_context(|| format!("run {}", self.program))?;
        debug!(exit_code = ?output.status.code(), timed_out = output.timed_out, "check finished");
        if output.success() {
            return Ok(CheckResult::Ok);
        }
        let mut evidence = output.combined_text().trim_end().to_string();
        if output.timed_out {
            evidence.push_str(&format!(
                "\n{} timed out after {}s",
                self.program,
                CHECK_TIMEOUT.as_secs()
            ));
        }
        Ok(CheckResult::Fail { evidence })
    }
}

/// Check every file and print one report block per file. Returns the exit code.
pub fn run_checker(
    checker: &dyn StaticChecker,
    files: &[PathBuf],
    out: &mut impl Write,
    warnings: &mut impl Write,
) -> Result<i32> {
    if files.is_empty() {
        writeln!(warnings, "  Warning: no files resolved for static check.")
            .context("write warning")?;
        return Ok(0);
    }
    let label = checker.label();
    let mut code = 0;
    for file in files {
        writeln!(out, "# Static-Check({label}): {}", file.display()).context("write report")?;
        match checker.check(file)? {
            CheckResult::Ok => writeln!(out, "Result: OK").context("write report")?,
            CheckResult::Fail { evidence } => {
                code = 1;
                writeln!(out, "Result: FAIL\nEvidence:\n{evidence}").context("write report")?;
            }
        }
    }
    Ok(code)
}

/// Parse `<sub> [cmd] [FILES...]` and run the selected checker.
pub fn run_static_check(
    argv: &[String],
    out: &mut impl Write,
    warnings: &mut impl Write,
) -> Result<i32> {
    let Some((subcommand, rest)) = argv.split_first() else {
        return Err(ReqError::failure(format!(
            "Error: --test-static-check requires a subcommand: {SUBCOMMANDS}."
        ))
        .into());
    };
    let (checker, inputs): (Box<dyn StaticChecker>, &[String]) = match subcommand.as_str() {
        "dummy" => (Box::new(DummyChecker), rest),
        "pylance" => (Box::new(ToolChecker::pylance()), rest),
        "ruff" => (Box::new(ToolChecker::ruff()), rest),
        "command" => {
            let Some((program, files)) = rest.split_first() else {
                return Err(ReqError::failure(
                    "Error: --test-static-check command requires a <cmd> argument.",
                )
                .into());
            };
            (Box::new(ToolChecker::command(program)?), files)
        }
        other => {
            return Err(ReqError::failure(format!(
                "Error: unknown --test-static-check subcommand '{other}'. Valid subcommands: {SUBCOMMANDS}."
            ))
            .into());
        }
    };
    let files = resolve_files(inputs, warnings)?;
    run_checker(checker.as_ref(), &files, out, warnings)
}
