//! Three-way reconciliation engine.
//!
//! Two entry points, both operating on one component subtree:
//!
//! - [`overwrite_component`] — fresh-deploy semantics: delete the existing
//!   destination wholesale, copy the source. Intentionally destructive, no
//!   content comparison, no stats.
//! - [`merge_component`] — partition the top-level child names of both
//!   sides: destination-only entries are never touched (*preserved*),
//!   source-only entries are copied in (*added*), shared entries are taken
//!   from source (*updated*), recursing into shared directories. Nested
//!   entries never contribute to the top-level partition.
//!
//! Shared names with mismatched kinds (file on one side, directory on the
//! other) resolve in favour of the source: the destination entry is removed
//! wholesale and replaced. Recursion is unbounded; source trees are
//! repository-controlled and assumed acyclic.

use std::collections::BTreeSet;
use std::path::Path;

use ensemble_core::types::MergeStats;

use crate::error::{io_err, DeployError};

// ---------------------------------------------------------------------------
// Overwrite
// ---------------------------------------------------------------------------

/// Replace `dst` with an exact copy of `src`; returns the recursive file count.
pub fn overwrite_component(src: &Path, dst: &Path) -> Result<usize, DeployError> {
    if dst.exists() {
        tracing::debug!("removing existing {}", dst.display());
        std::fs::remove_dir_all(dst).map_err(|e| io_err(dst, e))?;
    }
    copy_recursive(src, dst)?;
    let count = count_files(dst)?;
    tracing::info!("deployed {} ({count} files)", dst.display());
    Ok(count)
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Merge `src` into an existing `dst`, preserving destination-only entries.
///
/// `updated ∪ added ∪ preserved` exactly partitions the union of both sides'
/// top-level child names. `total_files` is measured by a full recursive walk
/// after the merge completes, so it reflects actual on-disk state.
pub fn merge_component(src: &Path, dst: &Path) -> Result<MergeStats, DeployError> {
    let mut stats = MergeStats::default();
    let src_names = child_names(src)?;
    let dst_names = child_names(dst)?;

    // Destination-only entries are user additions: never deleted or altered.
    stats.preserved = dst_names.difference(&src_names).cloned().collect();
    for name in &stats.preserved {
        tracing::debug!("preserved: {}", dst.join(name).display());
    }

    for name in src_names.intersection(&dst_names) {
        merge_entry(&src.join(name), &dst.join(name))?;
        stats.updated.push(name.clone());
    }

    for name in src_names.difference(&dst_names) {
        copy_recursive(&src.join(name), &dst.join(name))?;
        stats.added.push(name.clone());
    }

    stats.total_files = count_files(dst)?;
    tracing::info!(
        "merged {} ({} updated, {} added, {} preserved, {} files)",
        dst.display(),
        stats.updated.len(),
        stats.added.len(),
        stats.preserved.len(),
        stats.total_files,
    );
    Ok(stats)
}

/// Resolve one shared name, at any depth. Source kind wins on mismatch.
fn merge_entry(src: &Path, dst: &Path) -> Result<(), DeployError> {
    if src.is_dir() && dst.is_dir() {
        return merge_directory(src, dst);
    }
    if src.is_dir() || dst.is_dir() {
        // Mismatched kind: replace the destination entry wholesale.
        if dst.is_dir() {
            std::fs::remove_dir_all(dst).map_err(|e| io_err(dst, e))?;
        } else {
            std::fs::remove_file(dst).map_err(|e| io_err(dst, e))?;
        }
        return copy_recursive(src, dst);
    }
    std::fs::copy(src, dst).map_err(|e| io_err(dst, e))?;
    Ok(())
}

/// Recursive merge below the component's top level. No stats: nested entries
/// are carried by their ancestor's single top-level partition entry.
fn merge_directory(src: &Path, dst: &Path) -> Result<(), DeployError> {
    let src_names = child_names(src)?;
    let dst_names = child_names(dst)?;

    for name in src_names.intersection(&dst_names) {
        merge_entry(&src.join(name), &dst.join(name))?;
    }
    for name in src_names.difference(&dst_names) {
        copy_recursive(&src.join(name), &dst.join(name))?;
    }
    // Destination-only names are preserved by omission.
    Ok(())
}

// ---------------------------------------------------------------------------
// Filesystem primitives
// ---------------------------------------------------------------------------

fn child_names(dir: &Path) -> Result<BTreeSet<String>, DeployError> {
    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        names.insert(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Copy a file, or a directory tree recursively, to `dst`.
pub(crate) fn copy_recursive(src: &Path, dst: &Path) -> Result<(), DeployError> {
    if src.is_dir() {
        std::fs::create_dir_all(dst).map_err(|e| io_err(dst, e))?;
        for name in child_names(src)? {
            copy_recursive(&src.join(&name), &dst.join(&name))?;
        }
    } else {
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::copy(src, dst).map_err(|e| io_err(dst, e))?;
    }
    Ok(())
}

/// Recursive count of files under `root` (0 when absent).
pub fn count_files(root: &Path) -> Result<usize, DeployError> {
    if !root.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    for name in child_names(root)? {
        let path = root.join(name);
        if path.is_dir() {
            count += count_files(&path)?;
        } else {
            count += 1;
        }
    }
    Ok(count)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
