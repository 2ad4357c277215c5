//! siteforge - multi-tenant static-site build-and-publish service
//!
//! Given a project name, siteforge pulls the project's source tree from an
//! S3-compatible bucket, builds it inside a throwaway workspace, pushes the
//! build output back under the project's artifact prefix, and serves
//! published sites by hostname.
//!
//! # Architecture
//!
//! Three layers, leaves first:
//! - `store`: a capability interface over one bucket (list/get/put)
//! - `transfer`: tree fetch and publish over that capability
//! - `core`: the build pipeline around an ephemeral workspace
//!
//! The `http` and `cli` modules are thin surfaces over `core`.
//!
//! # Usage
//!
//! ```bash
//! # Run the service
//! siteforge serve
//!
//! # Build and publish one project
//! siteforge build docs-site
//!
//! # Probe bucket connectivity
//! siteforge check
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod http;
pub mod store;
pub mod transfer;

// Re-export main types at crate root for convenience
pub use config::{BuildConfig, Config, StoreConfig};
pub use core::{BuildReport, Orchestrator, PipelineError, Workspace};
pub use store::{MemoryStore, ObjectStore, S3Store, StoreError};
pub use transfer::{content_type_for, fetch_tree, publish_tree};
