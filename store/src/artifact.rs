//! Artifact storage with path containment
//!
//! Artifacts are flat text files under a single output directory. Reads
//! accept a relative path (so history records can reference artifacts by
//! name) but must never escape the root: traversal attempts are rejected as
//! access-denied before any existence check.

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::StoreError;

/// A directory of persisted invocation outputs and ephemeral temp files
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open or create an artifact store rooted at the given directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "Opened artifact store");
        Ok(Self { root })
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an artifact under the root, returning its absolute path
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf, StoreError> {
        let path = self.contained(name)?;
        fs::write(&path, content)?;
        debug!(path = %path.display(), bytes = content.len(), "Wrote artifact");
        Ok(path)
    }

    /// Read an artifact by its path relative to the root
    ///
    /// A path that resolves outside the root is an access violation, reported
    /// as such even when no file exists at the target.
    pub fn read(&self, relative: &str) -> Result<String, StoreError> {
        let path = self.contained(relative).inspect_err(|_| {
            warn!(%relative, "Path traversal attempt rejected");
        })?;
        if !path.exists() {
            return Err(StoreError::NotFound { path });
        }
        let bytes = fs::read(&path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Generate a unique path for an ephemeral temp file under the root
    ///
    /// The random suffix keeps concurrent invocations from colliding.
    pub fn temp_path(&self, prefix: &str, extension: &str) -> PathBuf {
        let token = Uuid::new_v4().simple().to_string();
        self.root.join(format!("{}_{}.{}", prefix, &token[..8], extension))
    }

    /// Remove a file if it exists; missing files are not an error
    pub fn remove(&self, path: &Path) -> Result<(), StoreError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a relative path and require it to stay inside the root
    fn contained(&self, relative: &str) -> Result<PathBuf, StoreError> {
        let joined = self.root.join(relative);
        let normalized = normalize(&joined);
        if normalized.starts_with(&self.root) {
            Ok(normalized)
        } else {
            Err(StoreError::AccessDenied {
                path: PathBuf::from(relative),
            })
        }
    }
}

/// Resolve `.` and `..` components lexically, without touching the filesystem
///
/// Lexical resolution means the containment check works for paths that do not
/// exist yet, and a `..` that climbs out of the root is caught even when the
/// target would resolve back inside via a symlink.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other),
        }
    }
    result
}
