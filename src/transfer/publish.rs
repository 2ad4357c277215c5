//! Local-directory to bucket-prefix publish.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::store::ObjectStore;

use super::mime::content_type_for;

/// Upload every regular file under `local_root` to `key_prefix`.
///
/// Each key is the prefix joined with the file's path relative to
/// `local_root`, forward-slash separated on every platform, with a content
/// type classified from the extension. Uploads run concurrently, bounded by
/// `max_concurrency`; there is no ordering between files. Any single failed
/// upload fails the whole call — already-uploaded objects are left in place.
/// Returns the number of files uploaded.
///
/// Symbolic links are skipped. Object stores have no directory entries, so
/// empty directories are not represented.
pub async fn publish_tree(
    store: Arc<dyn ObjectStore>,
    local_root: &Path,
    key_prefix: &str,
    max_concurrency: usize,
) -> Result<usize> {
    let files = collect_files(local_root)?;
    let total = files.len();

    info!(
        root = %local_root.display(),
        prefix = key_prefix,
        count = total,
        "publishing files"
    );

    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut uploads = JoinSet::new();

    for file in files {
        let relative = file
            .strip_prefix(local_root)
            .with_context(|| format!("file '{}' is outside the publish root", file.display()))?
            .to_path_buf();
        let key = join_key(key_prefix, &relative)?;
        let content_type = content_type_for(&file);

        let store = Arc::clone(&store);
        let semaphore = Arc::clone(&semaphore);
        uploads.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| anyhow::anyhow!("upload limiter closed"))?;

            let body = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            store
                .put(&key, &body, content_type)
                .await
                .with_context(|| format!("failed to upload '{key}'"))?;

            debug!(%key, bytes = body.len(), "uploaded");
            Ok::<(), anyhow::Error>(())
        });
    }

    let mut first_error: Option<anyhow::Error> = None;
    while let Some(joined) = uploads.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(anyhow::Error::new(err).context("upload task failed"));
                }
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    info!(prefix = key_prefix, uploaded = total, "publish complete");
    Ok(total)
}

/// Recursively collect regular files under `root`.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir)
            .with_context(|| format!("failed to read directory '{}'", dir.display()))?;
        for entry in entries {
            let entry =
                entry.with_context(|| format!("failed to read entry in '{}'", dir.display()))?;
            let file_type = entry.file_type().with_context(|| {
                format!("failed to stat '{}'", entry.path().display())
            })?;

            if file_type.is_symlink() {
                warn!(path = %entry.path().display(), "skipping symbolic link");
            } else if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }

    Ok(files)
}

/// Join a key prefix with a relative path, always using forward slashes.
fn join_key(prefix: &str, relative: &Path) -> Result<String> {
    let mut key = prefix.trim_end_matches('/').to_string();
    for component in relative.components() {
        let part = component
            .as_os_str()
            .to_str()
            .with_context(|| format!("non-UTF-8 file name in '{}'", relative.display()))?;
        if !key.is_empty() {
            key.push('/');
        }
        key.push_str(part);
    }
    Ok(key)
}
