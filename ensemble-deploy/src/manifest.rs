//! Shallow manifest of a source tree's components.
//!
//! The manifest is a one-level preview used by `--dry-run` and by the update
//! comparison: it lists each component's immediate children without reading
//! contents or recursing, so preview cost stays proportional to the child
//! count regardless of deployment size.

use std::collections::BTreeMap;
use std::path::Path;

use ensemble_core::types::{Component, ComponentKind};

use crate::error::{io_err, DeployError};

/// Component name → sorted immediate child names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    entries: BTreeMap<String, Vec<String>>,
}

impl Manifest {
    /// Scan `source_root` for each component's immediate children.
    ///
    /// A `FileSet` component lists its files, a `DirectorySet` component its
    /// subdirectories. An absent component subtree yields an empty list.
    pub fn scan(source_root: &Path, components: &[Component]) -> Result<Self, DeployError> {
        let mut entries = BTreeMap::new();
        for component in components {
            let dir = source_root.join(&component.name.0);
            let children = match component.kind {
                ComponentKind::FileSet => list_children(&dir, |is_dir| !is_dir)?,
                ComponentKind::DirectorySet => list_children(&dir, |is_dir| is_dir)?,
            };
            entries.insert(component.name.0.clone(), children);
        }
        Ok(Self { entries })
    }

    /// Immediate children recorded for `component` (empty when absent).
    pub fn children(&self, component: &str) -> Vec<String> {
        self.entries.get(component).cloned().unwrap_or_default()
    }

    /// Number of immediate children recorded for `component`.
    pub fn count(&self, component: &str) -> usize {
        self.entries.get(component).map(Vec::len).unwrap_or(0)
    }
}

fn list_children(dir: &Path, keep: impl Fn(bool) -> bool) -> Result<Vec<String>, DeployError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| {
            let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
            keep(is_dir)
        })
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}
