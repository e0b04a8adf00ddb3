//! Test-only helpers: a git-backed project fixture and a scripted step runner.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tempfile::TempDir;

use crate::core::sequencer::{Step, StepOutcome};
use crate::io::init::{InitOptions, InitOutcome, init_project};
use crate::workflow::{StepContext, StepRunner};

/// Temporary git repository with the standard `req` layout:
/// `guidelines/`, `docs/`, `tests/` and `src/`.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create the layout and commit it so the work tree starts clean.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        let repo = Self { dir };
        for sub in ["guidelines", "docs", "tests", "src"] {
            fs::create_dir_all(repo.path().join(sub))
                .with_context(|| format!("create {sub}"))?;
        }
        repo.write("src/app.py", "def main():\n    return 0\n")?;
        repo.git(&["init", "-q"])?;
        repo.git(&["config", "user.email", "test@example.com"])?;
        repo.git(&["config", "user.name", "Test"])?;
        repo.commit_all("initial layout")?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn read(&self, rel: &str) -> Result<String> {
        let path = self.path().join(rel);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }

    /// Options matching the fixture layout, as a fresh `req --base` install.
    pub fn init_options(&self) -> InitOptions {
        InitOptions {
            guidelines_dir: Some("guidelines".to_string()),
            docs_dir: Some("docs".to_string()),
            tests_dir: Some("tests".to_string()),
            src_dirs: vec!["src".to_string()],
            ..InitOptions::default()
        }
    }

    /// Install `.req/` and commit everything, leaving the tree clean.
    pub fn install(&self) -> Result<InitOutcome> {
        let outcome = init_project(self.path(), &self.init_options())?;
        self.commit_all("install req")?;
        Ok(outcome)
    }

    pub fn commit_all(&self, message: &str) -> Result<()> {
        self.git(&["add", "-A"])?;
        self.git(&["commit", "-q", "--allow-empty", "-m", message])
    }

    pub fn git(&self, args: &[&str]) -> Result<()> {
        let status = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .status()
            .with_context(|| format!("run git {args:?}"))?;
        if !status.success() {
            bail!("git {args:?} failed with {status}");
        }
        Ok(())
    }
}

/// Step runner that replays queued outcomes and records the steps it saw.
/// Once the queue is empty every step passes.
#[derive(Default)]
pub struct ScriptedStepRunner {
    outcomes: RefCell<VecDeque<StepOutcome>>,
    seen: RefCell<Vec<String>>,
}

impl ScriptedStepRunner {
    pub fn new(outcomes: Vec<StepOutcome>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Names of the steps executed so far.
    pub fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl StepRunner for ScriptedStepRunner {
    fn run_step(&self, step: &Step, _ctx: &StepContext) -> Result<StepOutcome> {
        self.seen.borrow_mut().push(step.name.clone());
        Ok(self
            .outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(StepOutcome::Passed))
    }
}
