//! Object store capability.
//!
//! A thin interface over one bucket: list by prefix, get, put. The transfer
//! engine and the HTTP layer only ever see this trait, so tests substitute
//! the in-memory store and production wires up the S3 backend.

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use s3::S3Store;

/// Prefix used by connectivity probes. Listing it proves endpoint,
/// credentials, and bucket access without paging real data.
pub const PROBE_PREFIX: &str = ".siteforge-healthcheck";

/// One object returned by a prefix listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Full object key, forward-slash delimited.
    pub key: String,

    /// Object size in bytes as reported by the listing.
    pub size: u64,
}

/// A fetched object body.
#[derive(Debug, Clone)]
pub struct ObjectBody {
    /// Raw object bytes.
    pub bytes: Vec<u8>,

    /// Content type recorded at upload time, when the backend reports one.
    pub content_type: Option<String>,
}

/// Failures reported by a store backend.
///
/// Callers need to tell timeouts, missing objects, and credential problems
/// apart; everything else is an opaque backend failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("permission denied by storage backend")]
    PermissionDenied,

    #[error("storage backend error: {0}")]
    Backend(anyhow::Error),
}

/// Capability interface over a single bucket.
///
/// The bucket is bound at construction; all keys are relative to it. The
/// handle is shared process-wide behind an `Arc` and is safe for concurrent
/// use by multiple pipeline invocations.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every object whose key starts with `prefix`.
    ///
    /// An empty result is not an error.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError>;

    /// Retrieve one object body.
    async fn get(&self, key: &str) -> Result<ObjectBody, StoreError>;

    /// Store `body` under `key` with the given content type, overwriting
    /// any existing object.
    async fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), StoreError>;
}
