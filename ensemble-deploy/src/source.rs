//! Source tree acquisition.
//!
//! [`SourceTree`] is the explicit handle threaded through manifest and
//! deploy calls. A local directory origin is used in place; anything else is
//! shallow-cloned into a temporary directory owned by the handle, so the
//! scratch space is released on every exit path when the handle drops.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use crate::error::{io_err, DeployError};
use crate::manifest::Manifest;

/// An acquired source tree, local or cloned.
#[derive(Debug)]
pub struct SourceTree {
    origin: String,
    branch: String,
    root: PathBuf,
    /// Present when the tree was cloned; dropping it deletes the clone.
    _temp: Option<TempDir>,
    manifest: OnceCell<Manifest>,
}

impl SourceTree {
    /// Acquire the source tree for `origin`.
    ///
    /// A local directory path is passed through without copying. Any other
    /// origin is cloned with `git clone --depth 1 --branch <branch>` into a
    /// temporary directory.
    pub fn acquire(origin: &str, branch: &str) -> Result<Self, DeployError> {
        let local = Path::new(origin);
        if local.is_dir() {
            tracing::debug!("using local source tree at {}", local.display());
            return Ok(Self {
                origin: origin.to_string(),
                branch: branch.to_string(),
                root: local.to_path_buf(),
                _temp: None,
                manifest: OnceCell::new(),
            });
        }

        let temp = tempfile::Builder::new()
            .prefix("ensemble-")
            .tempdir()
            .map_err(|e| io_err(std::env::temp_dir(), e))?;

        tracing::info!("cloning {origin} ({branch}) into {}", temp.path().display());
        let clone_err = |detail: String| DeployError::Clone {
            origin: origin.to_string(),
            branch: branch.to_string(),
            detail,
        };
        let output = Command::new("git")
            .args(["clone", "--depth", "1", "--branch", branch, origin])
            .arg(temp.path())
            .output()
            .map_err(|e| clone_err(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(clone_err(stderr));
        }

        Ok(Self {
            origin: origin.to_string(),
            branch: branch.to_string(),
            root: temp.path().to_path_buf(),
            _temp: Some(temp),
            manifest: OnceCell::new(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Root directory of the acquired tree. Components live directly under it.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolved commit identifier, for audit only.
    ///
    /// `"unknown"` when the tree is not a git checkout or git is unavailable.
    pub fn commit(&self) -> String {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(&self.root)
            .output();
        match output {
            Ok(out) if out.status.success() => {
                String::from_utf8_lossy(&out.stdout).trim().to_string()
            }
            _ => "unknown".to_string(),
        }
    }

    /// Shallow manifest of this tree, scanned once per acquisition.
    pub fn manifest(&self) -> Result<&Manifest, DeployError> {
        if let Some(cached) = self.manifest.get() {
            return Ok(cached);
        }
        let scanned = Manifest::scan(&self.root, &ensemble_core::config::components())?;
        Ok(self.manifest.get_or_init(|| scanned))
    }
}
