//! Build pipeline orchestrator.
//!
//! Sequences fetch → build → publish around an ephemeral workspace and
//! guarantees exactly one cleanup attempt per invocation, whatever fails.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::BuildConfig;
use crate::store::ObjectStore;
use crate::transfer::{fetch_tree, publish_tree};

use super::steps::run_steps;
use super::workspace::Workspace;

/// Failure classification for one pipeline run.
///
/// Display strings name the failing stage (and step), never internal
/// filesystem paths; the full cause chain is logged server-side only.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or missing project name; rejected before any resource is
    /// allocated.
    #[error("invalid project name: {reason}")]
    InvalidProject { reason: String },

    /// Workspace creation failed. Nothing was allocated, so there is
    /// nothing to clean up.
    #[error("failed to create build workspace")]
    Workspace(#[source] std::io::Error),

    /// Downloading the source tree failed.
    #[error("failed to fetch project source")]
    Fetch(anyhow::Error),

    /// A build step exited non-zero; later steps were never run.
    #[error("build step '{step}' failed with exit code {code}")]
    Step { step: String, code: i32 },

    /// A build step could not be started at all.
    #[error("build step '{step}' could not be started")]
    StepSpawn {
        step: String,
        source: std::io::Error,
    },

    /// Uploading the built artifacts failed.
    #[error("failed to publish build artifacts")]
    Publish(anyhow::Error),
}

/// Record of one completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub run_id: Uuid,
    pub project: String,
    pub files_fetched: usize,
    pub files_published: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Sequences the build pipeline: fetch source, run the build steps, publish
/// artifacts, always clean up.
///
/// The store handle is injected and shared; concurrent runs each own a
/// private workspace and may only race on bucket keys (last write wins).
pub struct Orchestrator {
    store: Arc<dyn ObjectStore>,
    config: BuildConfig,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn ObjectStore>, config: BuildConfig) -> Self {
        Self { store, config }
    }

    /// Run the full pipeline for `project`.
    ///
    /// Exactly one workspace is created and exactly one cleanup attempt is
    /// made, regardless of which stage fails.
    #[instrument(skip(self))]
    pub async fn run(&self, project: &str) -> Result<BuildReport, PipelineError> {
        validate_project_name(project)?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, project, "starting build pipeline");

        let workspace = Workspace::create().map_err(PipelineError::Workspace)?;

        let outcome = self
            .execute(&workspace, project, run_id, started_at)
            .await;

        // Mandatory terminal stage: runs on every exit path and never
        // overrides the pipeline outcome.
        workspace.cleanup();

        match &outcome {
            Ok(report) => info!(
                %run_id,
                project,
                fetched = report.files_fetched,
                published = report.files_published,
                "build pipeline succeeded"
            ),
            Err(err) => error!(%run_id, project, error = %err, "build pipeline failed"),
        }

        outcome
    }

    async fn execute(
        &self,
        workspace: &Workspace,
        project: &str,
        run_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> Result<BuildReport, PipelineError> {
        let output_dir = &self.config.output_dir;

        // Never pull previously published artifacts into a fresh source tree.
        let exclusions = vec![format!("{project}/{output_dir}/")];
        let files_fetched = fetch_tree(
            self.store.as_ref(),
            project,
            workspace.path(),
            &exclusions,
        )
        .await
        .map_err(PipelineError::Fetch)?;

        // Fetched paths mirror full keys, so the project tree lands in a
        // subdirectory named after the project.
        let project_dir = workspace.path().join(project);
        run_steps(&self.config.steps, &project_dir).await?;

        let artifact_root = project_dir.join(output_dir);
        let artifact_prefix = format!("{project}/{output_dir}");
        let files_published = publish_tree(
            Arc::clone(&self.store),
            &artifact_root,
            &artifact_prefix,
            self.config.upload_concurrency,
        )
        .await
        .map_err(PipelineError::Publish)?;

        Ok(BuildReport {
            run_id,
            project: project.to_string(),
            files_fetched,
            files_published,
            started_at,
            completed_at: Utc::now(),
        })
    }
}

/// Reject names that cannot serve as both a key prefix and a local path
/// component.
fn validate_project_name(project: &str) -> Result<(), PipelineError> {
    if project.is_empty() {
        return Err(PipelineError::InvalidProject {
            reason: "project name is required".to_string(),
        });
    }
    if project.contains(['/', '\\'])
        || project.contains("..")
        || project.chars().any(char::is_whitespace)
    {
        return Err(PipelineError::InvalidProject {
            reason: "project name must be a single path-safe segment".to_string(),
        });
    }
    Ok(())
}
