//! Deployment orchestrator.
//!
//! Sequences one deployment invocation: for each requested component,
//! dispatch to the reconciliation engine (merge) or the full-replace path
//! (overwrite / fresh deploy), then persist the metadata record. A component
//! missing from the source is recorded as a per-component failure and never
//! aborts the batch; filesystem failures propagate as fatal with whatever
//! partial state exists left as-is.

use std::collections::BTreeMap;
use std::path::Path;

use ensemble_core::{
    config,
    types::{Component, ComponentOutcome, DeployMode, DeployOutcome},
};

use crate::error::{io_err, DeployError};
use crate::metadata;
use crate::reconcile;
use crate::source::SourceTree;

/// Deploy `components` from an acquired source tree into `target_root`.
///
/// Merge mode only engages for a component whose destination subtree already
/// exists; otherwise that component takes the overwrite path and is recorded
/// as a plain deploy, not a merge. The metadata record is written
/// unconditionally after all components are processed, so partial
/// deployments stay auditable.
pub fn deploy(
    tree: &SourceTree,
    target_root: &Path,
    components: &[Component],
    mode: DeployMode,
) -> Result<DeployOutcome, DeployError> {
    let claude_dir = config::claude_dir(target_root);
    std::fs::create_dir_all(&claude_dir).map_err(|e| io_err(&claude_dir, e))?;

    let mut outcome = DeployOutcome {
        version: ensemble_core::VERSION.to_string(),
        source: tree.origin().to_string(),
        branch: tree.branch().to_string(),
        commit: tree.commit(),
        mode,
        components: BTreeMap::new(),
        merge_stats: BTreeMap::new(),
    };

    for component in components {
        let name = component.name.0.clone();
        let src = tree.root().join(&name);
        let dst = claude_dir.join(&name);

        if !src.is_dir() {
            tracing::warn!("component '{name}' has no subtree in the source");
            outcome
                .components
                .insert(name, ComponentOutcome::failed("source not found"));
            continue;
        }

        if mode == DeployMode::Merge && dst.is_dir() {
            let stats = reconcile::merge_component(&src, &dst)?;
            outcome
                .components
                .insert(name.clone(), ComponentOutcome::ok(stats.total_files));
            outcome.merge_stats.insert(name, stats);
        } else {
            let count = reconcile::overwrite_component(&src, &dst)?;
            outcome.components.insert(name, ComponentOutcome::ok(count));
        }
    }

    metadata::write(&claude_dir, &outcome, components)?;
    Ok(outcome)
}
