//! Build subprocess steps.
//!
//! An ordered command sequence executed in the project directory with
//! fail-fast semantics: the first non-zero exit stops the chain and later
//! steps never run. Step output goes straight to the operator's terminal;
//! the orchestrator never parses it.

use std::path::Path;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::info;

use super::orchestrator::PipelineError;

/// One build subprocess invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStep {
    /// Step name used in logs and failure reports.
    pub name: String,

    /// Program to invoke.
    pub program: String,

    /// Program arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

impl BuildStep {
    pub fn new(name: &str, program: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// The default sequence: install dependencies, build, then drop the
/// dependency directory so it is never published.
pub fn default_steps() -> Vec<BuildStep> {
    vec![
        BuildStep::new("install", "bun", &["install"]),
        BuildStep::new("build", "bun", &["run", "build"]),
        BuildStep::new("prune", "rm", &["-rf", "node_modules"]),
    ]
}

/// Run `steps` in order inside `working_dir`, stopping at the first failure.
pub async fn run_steps(steps: &[BuildStep], working_dir: &Path) -> Result<(), PipelineError> {
    for step in steps {
        info!(step = %step.name, program = %step.program, "running build step");

        let status = Command::new(&step.program)
            .args(&step.args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| PipelineError::StepSpawn {
                step: step.name.clone(),
                source,
            })?;

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            return Err(PipelineError::Step {
                step: step.name.clone(),
                code,
            });
        }

        info!(step = %step.name, "build step completed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sequence_installs_builds_prunes() {
        let steps = default_steps();
        let names: Vec<&str> = steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["install", "build", "prune"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_reported_with_its_code() {
        let dir = tempfile::tempdir().unwrap();
        let steps = vec![BuildStep::new("boom", "sh", &["-c", "exit 7"])];

        let err = run_steps(&steps, dir.path()).await.unwrap_err();
        match err {
            PipelineError::Step { step, code } => {
                assert_eq!(step, "boom");
                assert_eq!(code, 7);
            }
            other => panic!("expected Step failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let steps = vec![BuildStep::new(
            "ghost",
            "definitely-not-a-real-program-xyz",
            &[],
        )];

        let err = run_steps(&steps, dir.path()).await.unwrap_err();
        assert!(matches!(err, PipelineError::StepSpawn { step, .. } if step == "ghost"));
    }
}
