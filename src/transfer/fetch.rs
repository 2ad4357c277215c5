//! Bucket-prefix to local-directory fetch.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::store::ObjectStore;

/// Download every object under `key_prefix` into `dest_root`.
///
/// The destination mirrors the full object key, prefix included. An object
/// is skipped when its key contains any of `exclusions` as a substring, or
/// when its body turns out to be empty; neither is an error. Existing files
/// are overwritten. Returns the number of files written.
///
/// A list or get failure aborts the whole operation; files already written
/// are left on disk — the caller owns `dest_root` and its cleanup.
pub async fn fetch_tree(
    store: &dyn ObjectStore,
    key_prefix: &str,
    dest_root: &Path,
    exclusions: &[String],
) -> Result<usize> {
    let entries = store
        .list(key_prefix)
        .await
        .with_context(|| format!("failed to list objects under '{key_prefix}'"))?;

    if entries.is_empty() {
        info!(prefix = key_prefix, "no objects under prefix, nothing to fetch");
        return Ok(0);
    }

    debug!(prefix = key_prefix, count = entries.len(), "fetching objects");

    let mut written = 0usize;
    for entry in entries {
        // Defensive; should not occur from a well-formed store.
        if entry.key.is_empty() {
            continue;
        }

        if let Some(pattern) = exclusions.iter().find(|p| entry.key.contains(p.as_str())) {
            debug!(key = %entry.key, pattern = %pattern, "skipping excluded object");
            continue;
        }

        let dest = dest_path(dest_root, &entry.key)?;

        let body = store
            .get(&entry.key)
            .await
            .with_context(|| format!("failed to download object '{}'", entry.key))?;

        if body.bytes.is_empty() {
            debug!(key = %entry.key, "skipping object with empty body");
            continue;
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directories for '{}'", entry.key))?;
        }
        tokio::fs::write(&dest, &body.bytes)
            .await
            .with_context(|| format!("failed to write object '{}'", entry.key))?;
        written += 1;
    }

    info!(prefix = key_prefix, written, "fetch complete");
    Ok(written)
}

/// Map an object key onto a path under `root`.
///
/// Keys are forward-slash delimited. A key that would escape `root` aborts
/// the fetch: nothing may ever be written outside the destination tree.
fn dest_path(root: &Path, key: &str) -> Result<PathBuf> {
    let mut path = root.to_path_buf();
    for component in key.split('/') {
        match component {
            "" | "." => continue,
            ".." => bail!("object key '{key}' escapes the destination root"),
            part => path.push(part),
        }
    }
    if path == root {
        bail!("object key '{key}' resolves to no file path");
    }
    Ok(path)
}
