//! Project initialisation: validates the directory layout, saves
//! `.req/config.json` and seeds `.req/` with its default contents.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::error::ReqError;
use crate::exit_codes;
use crate::io::config::{ProjectConfig, config_path, load_config, write_config};
use crate::io::guidelines::{CopyReport, copy_guidelines_templates, guidelines_file_items};
use crate::io::paths::{
    ensure_directory, has_trailing_slash, make_relative_if_contains_project, normalize_lexically,
};
use crate::io::workflows::{workflows_dir, write_default_workflows};

const REQUIREMENTS_TEMPLATE: &str = include_str!("../../resources/docs/requirements_template.md");
const REQ_GITIGNORE: &str = "context/\nstate/\n";

/// Canonical paths within `.req/` for a project base.
#[derive(Debug, Clone)]
pub struct ReqPaths {
    pub root: PathBuf,
    pub req_dir: PathBuf,
    pub workflows_dir: PathBuf,
    pub gitignore_path: PathBuf,
    pub config_path: PathBuf,
}

impl ReqPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let req_dir = root.join(".req");
        Self {
            workflows_dir: workflows_dir(&root),
            gitignore_path: req_dir.join(".gitignore"),
            config_path: config_path(&root),
            req_dir,
            root,
        }
    }
}

/// Directory flags and mode switches for [`init_project`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Reuse the saved configuration (`--here`).
    pub here: bool,
    /// Refresh `.req/` from the saved configuration without rewriting it.
    pub update: bool,
    pub guidelines_dir: Option<String>,
    pub docs_dir: Option<String>,
    pub tests_dir: Option<String>,
    pub src_dirs: Vec<String>,
    /// Copy guideline templates, keeping existing files.
    pub add_guidelines: bool,
    /// Copy guideline templates, overwriting existing files.
    pub upgrade_guidelines: bool,
}

impl InitOptions {
    fn has_directory_flags(&self) -> bool {
        self.guidelines_dir.is_some()
            || self.docs_dir.is_some()
            || self.tests_dir.is_some()
            || !self.src_dirs.is_empty()
    }
}

/// Everything [`init_project`] did, for the caller to report.
#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub paths: ReqPaths,
    pub config: ProjectConfig,
    pub config_saved: bool,
    pub guidelines: Vec<CopyReport>,
    pub requirements_created: Option<PathBuf>,
    pub workflows_written: Vec<PathBuf>,
    /// Project-relative guideline files, as substituted for `%%GUIDELINES_FILES%%`.
    pub guidelines_items: Vec<String>,
}

/// Validate the requested layout and create `.req/` under `project_base`.
pub fn init_project(project_base: &Path, options: &InitOptions) -> Result<InitOutcome> {
    let requested = requested_config(project_base, options)?;

    ensure_directory("docs-dir", &requested.docs_dir, project_base)?;
    ensure_directory("tests-dir", &requested.tests_dir, project_base)?;
    for src in &requested.src_dirs {
        ensure_directory("src-dir", src, project_base)?;
    }

    let config = ProjectConfig {
        guidelines_dir: normalize_dir(
            &requested.guidelines_dir,
            project_base,
            "GUIDELINES_DIR",
            exit_codes::INVALID_DIR,
        )?,
        docs_dir: normalize_dir(
            &requested.docs_dir,
            project_base,
            "DOCS_DIR",
            exit_codes::INVALID_ARGS,
        )?,
        tests_dir: normalize_dir(
            &requested.tests_dir,
            project_base,
            "TESTS_DIR",
            exit_codes::INVALID_ARGS,
        )?,
        src_dirs: requested
            .src_dirs
            .iter()
            .map(|src| normalize_dir(src, project_base, "SRC_DIR", exit_codes::INVALID_ARGS))
            .collect::<Result<_, _>>()?,
    };
    debug!(?config, "normalised project layout");

    let guidelines_rel = config.guidelines_dir.trim_end_matches('/');
    let guidelines_dest = project_base.join(guidelines_rel);
    if !normalize_lexically(&guidelines_dest).starts_with(project_base) {
        return Err(ReqError::new(
            "Error: --guidelines-dir must be under the project base",
            exit_codes::GUIDELINES,
        )
        .into());
    }
    if !guidelines_dest.is_dir() {
        return Err(ReqError::new(
            format!(
                "Error: GUIDELINES_DIR directory '{guidelines_rel}' does not exist under {}",
                project_base.display()
            ),
            exit_codes::GUIDELINES,
        )
        .into());
    }

    let guidelines = if options.add_guidelines || options.upgrade_guidelines {
        copy_guidelines_templates(&guidelines_dest, options.upgrade_guidelines)?
    } else {
        Vec::new()
    };

    let config_saved = !options.update;
    if config_saved {
        write_config(project_base, &config)?;
    }

    let paths = ReqPaths::new(project_base);
    create_dir(&paths.req_dir)?;
    if !paths.gitignore_path.exists() {
        write_file(&paths.gitignore_path, REQ_GITIGNORE)?;
    }

    let docs_dir = project_base.join(config.docs_dir.trim_end_matches('/'));
    let requirements_created = seed_requirements(&docs_dir)?;
    let workflows_written = write_default_workflows(project_base)?;
    let guidelines_items = guidelines_file_items(&guidelines_dest, project_base)?;

    info!(
        project_base = %project_base.display(),
        config_saved,
        workflows = workflows_written.len(),
        "project initialised"
    );
    Ok(InitOutcome {
        paths,
        config,
        config_saved,
        guidelines,
        requirements_created,
        workflows_written,
        guidelines_items,
    })
}

/// Delete `.req/` after checking the `--remove` flag rules.
pub fn remove_project(project_base: &Path, options: &InitOptions) -> Result<PathBuf> {
    if options.update {
        return Err(ReqError::new(
            "Error: --remove does not accept --update",
            exit_codes::INVALID_ARGS,
        )
        .into());
    }
    if !options.here && options.has_directory_flags() {
        return Err(ReqError::new(
            "Error: --remove does not accept --guidelines-dir, --docs-dir, --tests-dir, or --src-dir without --here",
            exit_codes::INVALID_ARGS,
        )
        .into());
    }
    let paths = ReqPaths::new(project_base);
    if !paths.config_path.is_file() {
        return Err(ReqError::new(
            "Error: .req/config.json not found in the project root",
            exit_codes::CONFIG,
        )
        .into());
    }
    fs::remove_dir_all(&paths.req_dir)
        .with_context(|| format!("remove {}", paths.req_dir.display()))?;
    info!(dir = %paths.req_dir.display(), "removed .req");
    Ok(paths.req_dir)
}

/// Human-readable completion summary printed after initialisation.
pub fn format_summary(project_base: &Path, outcome: &InitOutcome) -> String {
    let mut lines = vec![format!(
        "Installation completed successfully in {}",
        project_base.display()
    )];
    if outcome.guidelines_items.is_empty() {
        lines.push(format!(
            "The folder {} does not contain any files",
            outcome.config.guidelines_dir
        ));
    } else {
        lines.extend(outcome.guidelines_items.iter().map(|item| format!("- {item}")));
    }
    lines.join("\n")
}

/// Pick the raw directory values from flags or the saved configuration.
fn requested_config(project_base: &Path, options: &InitOptions) -> Result<ProjectConfig> {
    if options.update && !options.here && options.has_directory_flags() {
        return Err(ReqError::new(
            "Error: --update does not accept --guidelines-dir, --docs-dir, --tests-dir, or --src-dir",
            exit_codes::INVALID_ARGS,
        )
        .into());
    }
    if options.here || options.update {
        return load_config(project_base);
    }
    match (
        &options.guidelines_dir,
        &options.docs_dir,
        &options.tests_dir,
        options.src_dirs.is_empty(),
    ) {
        (Some(guidelines), Some(docs), Some(tests), false) => Ok(ProjectConfig {
            guidelines_dir: guidelines.clone(),
            docs_dir: docs.clone(),
            tests_dir: tests.clone(),
            src_dirs: options.src_dirs.clone(),
        }),
        _ => Err(ReqError::new(
            "Error: --guidelines-dir, --docs-dir, --tests-dir, and --src-dir are required without --update",
            exit_codes::INVALID_ARGS,
        )
        .into()),
    }
}

/// Project-relative form of `raw`, keeping a trailing slash the user typed.
fn normalize_dir(raw: &str, project_base: &Path, name: &str, code: i32) -> Result<String, ReqError> {
    let normalized = make_relative_if_contains_project(raw, project_base)
        .replace('\\', "/")
        .trim_end_matches('/')
        .to_string();
    if Path::new(&normalized).is_absolute() {
        return Err(ReqError::new(
            format!("Error: {name} must be a relative path under PROJECT_BASE"),
            code,
        ));
    }
    if has_trailing_slash(raw) && !normalized.is_empty() {
        Ok(format!("{normalized}/"))
    } else {
        Ok(normalized)
    }
}

/// Copy the requirements template into an empty docs directory.
fn seed_requirements(docs_dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries =
        fs::read_dir(docs_dir).with_context(|| format!("read directory {}", docs_dir.display()))?;
    if entries.next().is_some() {
        return Ok(None);
    }
    let target = docs_dir.join("requirements.md");
    write_file(&target, REQUIREMENTS_TEMPLATE)?;
    debug!(target = %target.display(), "seeded requirements document");
    Ok(Some(target))
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("create directory {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("write file {}", path.display()))
}
