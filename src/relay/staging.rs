//! Per-invocation staging directory for the downloaded file.
//!
//! Each run gets its own `drime-relay-*` temp directory, so two runs that
//! resolve the same filename never touch the same path. The directory and
//! everything in it are removed when the guard is dropped, including on
//! early returns and panic unwinding.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

const STAGING_PREFIX: &str = "drime-relay-";

/// Scoped staging location for one relay run.
#[derive(Debug)]
pub struct StagedFile {
    dir: TempDir,
    path: PathBuf,
}

impl StagedFile {
    /// Creates a fresh staging directory under `root` (or the system temp
    /// dir) and reserves `filename` inside it. The file itself is not created.
    ///
    /// # Errors
    ///
    /// Returns the IO error from creating `root` or the temp directory.
    pub fn create(root: Option<&Path>, filename: &str) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        let path = dir.path().join(filename);
        debug!(path = %path.display(), "staging file reserved");
        Ok(Self { dir, path })
    }

    /// Path of the staged file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Staging directory holding the file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the staging directory now, logging a failure instead of
    /// silently ignoring it as `Drop` would.
    pub fn close(self) {
        let dir = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(dir = %dir.display(), "staging removed"),
            Err(error) => warn!(dir = %dir.display(), error = %error, "failed to remove staging"),
        }
    }
}
