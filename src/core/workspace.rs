//! Ephemeral build workspace.
//!
//! One workspace per build invocation: created before the fetch, populated
//! by the fetch and the build subprocess, destroyed exactly once when the
//! pipeline leaves — success or failure.

use std::io;
use std::path::Path;

use tempfile::TempDir;
use tracing::{debug, error};

/// An exclusively-owned temporary build directory.
///
/// Ownership never escapes the orchestrating call. Destruction is explicit
/// via [`Workspace::cleanup`]; a cleanup failure leaks the directory until
/// an operator removes it, which is reported as critical but never masks
/// the pipeline outcome.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Allocate a uniquely-named temporary directory.
    pub fn create() -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("project-build-")
            .tempdir()?;
        debug!(path = %dir.path().display(), "created build workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the workspace tree.
    ///
    /// Consumes the workspace, so exactly one removal attempt is made per
    /// build. Failure is logged and swallowed.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "removed build workspace"),
            Err(err) => error!(
                path = %path.display(),
                %err,
                "CRITICAL: failed to remove build workspace, manual cleanup required"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_exists_until_cleanup() {
        let workspace = Workspace::create().unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.is_dir());

        std::fs::write(path.join("leftover.txt"), "partial download").unwrap();

        workspace.cleanup();
        assert!(!path.exists());
    }

    #[test]
    fn workspaces_are_uniquely_named() {
        let a = Workspace::create().unwrap();
        let b = Workspace::create().unwrap();
        assert_ne!(a.path(), b.path());
        a.cleanup();
        b.cleanup();
    }
}
