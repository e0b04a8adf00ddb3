//! Command-line surface of `req` and dispatch to the command modules.
//!
//! `req` is flag driven: the first matching command group wins, in this order:
//! version, static check, standalone file commands, project scans, workflow
//! commands, and finally project initialisation.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::debug;

use crate::commands::{
    check_ids, docs_files, existing_files, print_token_summary, project_source_files,
    renumber_files, resolve_src_dirs, scan_project_base,
};
use crate::error::ReqError;
use crate::exit_codes;
use crate::extract::{compress_files, find_constructs_in_files};
use crate::io::init::{InitOptions, format_summary, init_project, remove_project};
use crate::io::paths::resolve_project_base;
use crate::progress::Progress;
use crate::references::{generate_markdown, project_references};
use crate::static_check::run_static_check;
use crate::workflow::{
    ProjectStepRunner, RunReport, approve_workflow, print_report, reject_workflow,
    start_workflow, workflow_status,
};

#[derive(Debug, Default, Parser)]
#[command(
    name = "req",
    about = "Requirements workflow helper and source-analysis toolkit",
    disable_version_flag = true
)]
pub struct Cli {
    /// Project root directory.
    #[arg(long, value_name = "DIR")]
    pub base: Option<PathBuf>,
    /// Use the current directory as project root and the saved configuration.
    #[arg(long)]
    pub here: bool,
    #[arg(long, value_name = "DIR")]
    pub guidelines_dir: Option<String>,
    #[arg(long, value_name = "DIR")]
    pub docs_dir: Option<String>,
    #[arg(long, value_name = "DIR")]
    pub tests_dir: Option<String>,
    /// Source directory; repeat for several.
    #[arg(long = "src-dir", value_name = "DIR", action = ArgAction::Append)]
    pub src_dirs: Vec<String>,
    /// Refresh an existing installation without rewriting the config.
    #[arg(long)]
    pub update: bool,
    /// Delete `.req/` from the project.
    #[arg(long)]
    pub remove: bool,
    /// Copy guideline templates, keeping existing files.
    #[arg(long)]
    pub add_guidelines: bool,
    /// Copy guideline templates, overwriting existing files.
    #[arg(long)]
    pub upgrade_guidelines: bool,
    /// Print per-file progress on stderr.
    #[arg(long)]
    pub verbose: bool,
    /// Enable debug tracing.
    #[arg(long)]
    pub debug: bool,
    /// Prefix compressed and extracted lines with `<n>: `.
    #[arg(long)]
    pub enable_line_numbers: bool,

    /// Token and character counts for the given files.
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub files_tokens: Option<Vec<String>>,
    /// Markdown reference for the given files.
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub files_references: Option<Vec<String>>,
    /// Compressed source for the given files.
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub files_compress: Option<Vec<String>>,
    /// Extract constructs: TAG PATTERN FILE...
    #[arg(long, value_name = "ARG", num_args = 1..)]
    pub files_find: Option<Vec<String>>,
    /// Validate requirement IDs in the given documents.
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub files_check_ids: Option<Vec<String>>,
    /// Renumber requirement IDs in the given documents.
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub files_renumber_ids: Option<Vec<String>>,

    /// Markdown reference for the project's source directories.
    #[arg(long)]
    pub references: bool,
    /// Compressed source for the project's source directories.
    #[arg(long)]
    pub compress: bool,
    /// Token counts for the files in the docs directory.
    #[arg(long)]
    pub tokens: bool,
    /// Extract constructs from the project's source directories.
    #[arg(long, num_args = 2, value_names = ["TAG", "PATTERN"])]
    pub find: Option<Vec<String>>,

    /// Start the named workflow from `.req/workflows/`.
    #[arg(long, value_name = "NAME")]
    pub workflow: Option<String>,
    /// Proposal file for approval steps.
    #[arg(long, value_name = "FILE")]
    pub proposal: Option<PathBuf>,
    /// Accept the pending proposal and resume the workflow.
    #[arg(long)]
    pub approve: bool,
    /// Reject the pending proposal and abort the workflow.
    #[arg(long)]
    pub reject: bool,
    /// Show the persisted workflow state.
    #[arg(long)]
    pub workflow_status: bool,

    /// Run a static checker: <dummy|pylance|ruff|command CMD> [FILES...]
    #[arg(long, value_name = "ARGS", num_args = 0.., allow_hyphen_values = true)]
    pub test_static_check: Option<Vec<String>>,

    /// Print the version.
    #[arg(long = "ver", visible_alias = "version")]
    pub ver: bool,
}

impl Cli {
    fn is_standalone_command(&self) -> bool {
        self.files_tokens.is_some()
            || self.files_references.is_some()
            || self.files_compress.is_some()
            || self.files_find.is_some()
            || self.files_check_ids.is_some()
            || self.files_renumber_ids.is_some()
    }

    fn is_project_scan_command(&self) -> bool {
        self.references || self.compress || self.tokens || self.find.is_some()
    }

    fn is_workflow_command(&self) -> bool {
        self.workflow.is_some() || self.approve || self.reject || self.workflow_status
    }

    fn init_options(&self) -> InitOptions {
        InitOptions {
            here: self.here,
            update: self.update,
            guidelines_dir: self.guidelines_dir.clone(),
            docs_dir: self.docs_dir.clone(),
            tests_dir: self.tests_dir.clone(),
            src_dirs: self.src_dirs.clone(),
            add_guidelines: self.add_guidelines,
            upgrade_guidelines: self.upgrade_guidelines,
        }
    }
}

/// Execute the parsed command line. Returns the process exit code; expected
/// failures come back as [`ReqError`] inside the error chain.
pub fn run(cli: &Cli, out: &mut impl Write, err: &mut impl Write) -> Result<i32> {
    if cli.ver {
        writeln!(out, "{}", env!("CARGO_PKG_VERSION")).context("write version")?;
        return Ok(exit_codes::OK);
    }
    if let Some(argv) = &cli.test_static_check {
        return run_static_check(argv, out, err);
    }
    if cli.is_standalone_command() {
        return run_standalone(cli, out, err);
    }
    if cli.is_project_scan_command() {
        return run_project_scan(cli, out, err);
    }
    if cli.is_workflow_command() {
        return run_workflow_command(cli, out, err);
    }
    run_init(cli, out)
}

fn run_standalone(cli: &Cli, out: &mut impl Write, err: &mut impl Write) -> Result<i32> {
    let line_numbers = cli.enable_line_numbers;
    if let Some(files) = &cli.files_tokens {
        let files = existing_files(files, err)?;
        print_token_summary(&files, out)?;
    } else if let Some(files) = &cli.files_references {
        let markdown = generate_markdown(&as_paths(files), &mut Progress::new(cli.verbose, err))?;
        emit(out, &markdown)?;
    } else if let Some(files) = &cli.files_compress {
        let compressed = compress_files(
            &as_paths(files),
            line_numbers,
            None,
            &mut Progress::new(cli.verbose, err),
        )?;
        emit(out, &compressed)?;
    } else if let Some(args) = &cli.files_find {
        let [tag_filter, pattern, files @ ..] = args.as_slice() else {
            return Err(ReqError::failure(
                "Error: --files-find requires at least TAG, PATTERN, and one FILE.",
            )
            .into());
        };
        if files.is_empty() {
            return Err(ReqError::failure(
                "Error: --files-find requires at least TAG, PATTERN, and one FILE.",
            )
            .into());
        }
        let found = find_constructs_in_files(
            &as_paths(files),
            tag_filter,
            pattern,
            line_numbers,
            &mut Progress::new(cli.verbose, err),
        )?;
        emit(out, &found)?;
    } else if let Some(files) = &cli.files_check_ids {
        let files = existing_files(files, err)?;
        if !check_ids(&files, out)? {
            return Ok(exit_codes::FAILURE);
        }
    } else if let Some(files) = &cli.files_renumber_ids {
        let files = existing_files(files, err)?;
        renumber_files(&files, out)?;
    }
    Ok(exit_codes::OK)
}

fn run_project_scan(cli: &Cli, out: &mut impl Write, err: &mut impl Write) -> Result<i32> {
    let project_base = scan_project_base(cli.base.as_deref(), cli.here)?;
    debug!(project_base = %project_base.display(), "project scan");

    if cli.tokens && !cli.references && !cli.compress {
        let files = docs_files(&project_base, cli.here, cli.docs_dir.as_deref())?;
        print_token_summary(&files, out)?;
        return Ok(exit_codes::OK);
    }

    let src_dirs = resolve_src_dirs(&project_base, cli.here, &cli.src_dirs)?;
    let files = project_source_files(&project_base, &src_dirs)?;
    let mut progress = Progress::new(cli.verbose, err);
    let output = if cli.references {
        project_references(&files, &project_base, &mut progress)?
    } else if cli.compress {
        compress_files(
            &files,
            cli.enable_line_numbers,
            Some(&project_base),
            &mut progress,
        )?
    } else if let Some([tag_filter, pattern]) = cli.find.as_deref() {
        find_constructs_in_files(
            &files,
            tag_filter,
            pattern,
            cli.enable_line_numbers,
            &mut progress,
        )?
    } else {
        return Err(ReqError::new(
            "Error: --find requires TAG and PATTERN.",
            exit_codes::INVALID_ARGS,
        )
        .into());
    };
    emit(out, &output)?;
    Ok(exit_codes::OK)
}

fn run_workflow_command(cli: &Cli, out: &mut impl Write, err: &mut impl Write) -> Result<i32> {
    let project_base = required_base(
        cli,
        "Error: --workflow, --approve, --reject, and --workflow-status require --base or --here.",
    )?;
    let proposal = cli
        .proposal
        .as_deref()
        .map(absolute_from_cwd)
        .transpose()?;

    if cli.workflow_status {
        let status = workflow_status(&project_base)?;
        writeln!(out, "{status}").context("write status")?;
        return Ok(exit_codes::OK);
    }

    let report: RunReport = {
        let mut progress = Progress::new(cli.verbose, err);
        if let Some(name) = &cli.workflow {
            start_workflow(
                &project_base,
                name,
                proposal.as_deref(),
                &ProjectStepRunner,
                &mut progress,
            )?
        } else if cli.approve {
            approve_workflow(
                &project_base,
                proposal.as_deref(),
                &ProjectStepRunner,
                &mut progress,
            )?
        } else {
            reject_workflow(&project_base)?
        }
    };
    print_report(&report, out, err)
}

fn run_init(cli: &Cli, out: &mut impl Write) -> Result<i32> {
    let project_base = required_base(cli, "Error: --base or --here is required for initialization.")?;
    let options = cli.init_options();
    if cli.remove {
        let removed = remove_project(&project_base, &options)?;
        writeln!(out, "Removed {}", removed.display()).context("write summary")?;
        return Ok(exit_codes::OK);
    }
    let outcome = init_project(&project_base, &options)?;
    writeln!(out, "{}", format_summary(&project_base, &outcome)).context("write summary")?;
    Ok(exit_codes::OK)
}

fn required_base(cli: &Cli, message: &str) -> Result<PathBuf> {
    if cli.base.is_none() && !cli.here {
        return Err(ReqError::failure(message).into());
    }
    resolve_project_base(cli.base.as_deref())
}

/// Proposal paths are relative to where `req` was invoked, not the project base.
fn absolute_from_cwd(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("resolve {}", path.display()))
}

fn as_paths(files: &[String]) -> Vec<PathBuf> {
    files.iter().map(PathBuf::from).collect()
}

fn emit(out: &mut impl Write, text: &str) -> Result<()> {
    writeln!(out, "{text}").context("write output")
}
