//! Workflow definitions under `.req/workflows/<name>.toml`.
//!
//! Files are parsed as TOML, checked against the embedded JSON Schema, then
//! deserialised and validated for step ordering rules.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::debug;

use crate::core::sequencer::Workflow;
use crate::error::ReqError;

pub const WORKFLOW_SCHEMA: &str = include_str!("../../schemas/workflow.schema.json");

/// Workflows written by `req` initialisation when missing.
pub const DEFAULT_WORKFLOWS: [(&str, &str); 2] = [
    ("change", include_str!("../../resources/workflows/change.toml")),
    ("renumber", include_str!("../../resources/workflows/renumber.toml")),
];

pub fn workflows_dir(project_base: &Path) -> PathBuf {
    project_base.join(".req").join("workflows")
}

pub fn workflow_path(project_base: &Path, name: &str) -> PathBuf {
    workflows_dir(project_base).join(format!("{name}.toml"))
}

/// Load `.req/workflows/<name>.toml`.
pub fn load_workflow(project_base: &Path, name: &str) -> Result<Workflow> {
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(ReqError::failure(format!("Error: invalid workflow name '{name}'.")).into());
    }
    let path = workflow_path(project_base, name);
    if !path.is_file() {
        return Err(ReqError::failure(format!(
            "Error: workflow '{name}' not found at {}.",
            path.display()
        ))
        .into());
    }
    debug!(path = %path.display(), "loading workflow");
    let contents = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    parse_workflow(&contents).with_context(|| format!("load workflow {}", path.display()))
}

/// Parse and validate workflow TOML text.
pub fn parse_workflow(contents: &str) -> Result<Workflow> {
    let value: Value = toml::from_str(contents).context("parse workflow toml")?;
    validate_schema(&value)?;
    let workflow: Workflow = serde_json::from_value(value).context("deserialize workflow")?;
    workflow.validate()?;
    Ok(workflow)
}

fn validate_schema(workflow: &Value) -> Result<()> {
    let schema_value: Value =
        serde_json::from_str(WORKFLOW_SCHEMA).context("parse embedded workflow schema")?;
    let compiled =
        validator_for(&schema_value).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(workflow) {
        let messages = compiled
            .iter_errors(workflow)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "workflow schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}

/// Write the bundled workflows that do not exist yet. Returns written paths.
pub fn write_default_workflows(project_base: &Path) -> Result<Vec<PathBuf>> {
    let dir = workflows_dir(project_base);
    fs::create_dir_all(&dir).with_context(|| format!("create directory {}", dir.display()))?;
    let mut written = Vec::new();
    for (name, contents) in DEFAULT_WORKFLOWS {
        let path = workflow_path(project_base, name);
        if path.exists() {
            continue;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sequencer::{Gate, StepAction};

    #[test]
    fn bundled_workflows_are_valid() {
        for (name, contents) in DEFAULT_WORKFLOWS {
            let workflow = parse_workflow(contents).expect(name);
            assert_eq!(workflow.name, name);
        }
    }

    #[test]
    fn parses_gate_and_command_steps() {
        let workflow = parse_workflow(
            r#"
name = "ci"

[[steps]]
name = "clean"
kind = "gate"
condition = { type = "git-clean" }

[[steps]]
name = "tests"
kind = "command"
command = ["cargo", "test"]
timeout_secs = 600
"#,
        )
        .expect("parse");
        assert_eq!(
            workflow.steps[0].action,
            StepAction::Gate {
                condition: Gate::GitClean
            }
        );
        assert_eq!(
            workflow.steps[1].action,
            StepAction::Command {
                command: vec!["cargo".to_string(), "test".to_string()],
                timeout_secs: Some(600),
            }
        );
        assert_eq!(workflow.sentinel(), "Change request FAILED!");
    }

    #[test]
    fn schema_rejects_unknown_kind_and_missing_fields() {
        let unknown = "name = \"x\"\n[[steps]]\nname = \"a\"\nkind = \"deploy\"\n";
        let err = parse_workflow(unknown).expect_err("unknown kind");
        assert!(format!("{err:#}").contains("schema validation failed"));

        let missing_path = "name = \"x\"\n[[steps]]\nname = \"a\"\nkind = \"renumber-ids\"\n";
        assert!(parse_workflow(missing_path).is_err());

        let no_steps = "name = \"x\"\nsteps = []\n";
        assert!(parse_workflow(no_steps).is_err());
    }

    #[test]
    fn duplicate_step_names_are_rejected() {
        let text = "name = \"x\"\n[[steps]]\nname = \"a\"\nkind = \"approval\"\n[[steps]]\nname = \"a\"\nkind = \"approval\"\n";
        let err = parse_workflow(text).expect_err("duplicate");
        assert!(format!("{err:#}").contains("more than once"));
    }

    #[test]
    fn defaults_are_written_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        let first = write_default_workflows(temp.path()).expect("write");
        assert_eq!(first.len(), 2);
        let second = write_default_workflows(temp.path()).expect("write again");
        assert!(second.is_empty());
        assert!(load_workflow(temp.path(), "change").is_ok());
    }

    #[test]
    fn missing_workflow_is_a_req_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_workflow(temp.path(), "nope").expect_err("missing");
        assert!(crate::error::find_req_error(&err).is_some());
    }
}
