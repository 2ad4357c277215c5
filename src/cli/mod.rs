//! Command-line interface for siteforge.
//!
//! Provides commands for running the HTTP service, triggering one-off
//! builds, probing store connectivity, and inspecting configuration.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::core::Orchestrator;
use crate::http::{self, AppState};
use crate::store::{ObjectStore, S3Store, PROBE_PREFIX};

/// siteforge - multi-tenant static-site build and publish service
#[derive(Parser, Debug)]
#[command(name = "siteforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Port to listen on (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch, build, and publish one project
    Build {
        /// Project name (bucket key prefix)
        project: String,
    },

    /// Probe object-store connectivity
    Check,

    /// Show resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Commands::Serve { port } => serve(config, port).await,
            Commands::Build { project } => build(config, &project).await,
            Commands::Check => check(config).await,
            Commands::Config => show_config(&config),
        }
    }
}

/// Run the HTTP service until shutdown.
async fn serve(config: Config, port_override: Option<u16>) -> Result<()> {
    let store: Arc<dyn ObjectStore> = Arc::new(S3Store::from_config(&config.store)?);
    let orchestrator = Orchestrator::new(Arc::clone(&store), config.build.clone());

    let state = Arc::new(AppState {
        store,
        orchestrator,
        output_dir: config.build.output_dir.clone(),
    });

    let port = port_override.unwrap_or(config.server.port);
    http::serve(state, port).await
}

/// Run one build pipeline from the command line.
async fn build(config: Config, project: &str) -> Result<()> {
    let store: Arc<dyn ObjectStore> = Arc::new(S3Store::from_config(&config.store)?);
    let orchestrator = Orchestrator::new(store, config.build.clone());

    match orchestrator.run(project).await {
        Ok(report) => {
            println!("Run ID: {}", report.run_id);
            println!("Project: {}", report.project);
            println!("Fetched: {} files", report.files_fetched);
            println!("Published: {} files", report.files_published);
            Ok(())
        }
        Err(err) => {
            eprintln!("Build failed: {err}");
            std::process::exit(1);
        }
    }
}

/// Probe store connectivity, the way the service's /healthz route does.
async fn check(config: Config) -> Result<()> {
    let store = S3Store::from_config(&config.store)?;

    match store.list(PROBE_PREFIX).await {
        Ok(_) => {
            println!("Successfully connected to bucket '{}'", config.store.bucket);
            Ok(())
        }
        Err(err) => {
            eprintln!("Store connectivity check failed: {err}");
            std::process::exit(1);
        }
    }
}

/// Show the resolved configuration (for debugging). Secrets are redacted.
fn show_config(config: &Config) -> Result<()> {
    println!(
        "Config file: {}",
        config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Store:");
    println!("  Endpoint:   {}", display_or_unset(&config.store.endpoint));
    println!("  Region:     {}", config.store.region);
    println!("  Bucket:     {}", display_or_unset(&config.store.bucket));
    println!("  Timeout:    {}s", config.store.timeout_seconds);
    println!("  Path style: {}", config.store.path_style);
    println!(
        "  Access key: {}",
        if config.store.access_key.is_empty() { "(unset)" } else { "(set)" }
    );
    println!(
        "  Secret key: {}",
        if config.store.secret_key.is_empty() { "(unset)" } else { "(set)" }
    );
    println!();
    println!("Server:");
    println!("  Port: {}", config.server.port);
    println!();
    println!("Build:");
    println!("  Output dir:         {}", config.build.output_dir);
    println!("  Upload concurrency: {}", config.build.upload_concurrency);
    println!("  Steps:");
    for step in &config.build.steps {
        println!("    {}: {} {}", step.name, step.program, step.args.join(" "));
    }

    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}
