//! Domain types for Ensemble deployments.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Persisted types serialize via serde + serde_json.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a deployable component (e.g. "agents").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentName(pub String);

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ComponentName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ComponentName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a component's immediate children are structured in the source tree.
///
/// The reconciliation engine walks both kinds identically; the kind only
/// affects what the shallow manifest lists and how previews are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// A flat set of individual files (agents, commands).
    FileSet,
    /// A set of named subdirectories treated as units (skills).
    DirectorySet,
}

/// How existing destination content is handled during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    /// Remove existing content and replace completely.
    #[default]
    Overwrite,
    /// Merge with existing content, preserving user additions.
    Merge,
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployMode::Overwrite => write!(f, "overwrite"),
            DeployMode::Merge => write!(f, "merge"),
        }
    }
}

impl FromStr for DeployMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(DeployMode::Overwrite),
            "merge" => Ok(DeployMode::Merge),
            other => Err(format!(
                "unknown deploy mode '{other}'; expected: overwrite, merge"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A named top-level deployable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: ComponentName,
    pub kind: ComponentKind,
}

impl Component {
    pub fn new(name: impl Into<ComponentName>, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Per-component statistics produced by a merge-mode reconciliation.
///
/// `updated`, `added` and `preserved` partition the union of the top-level
/// child names seen on both sides; nested merges inside a shared directory
/// never contribute entries of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MergeStats {
    /// Existed on both sides; content replaced from source.
    pub updated: Vec<String>,
    /// Existed only in source; copied in.
    pub added: Vec<String>,
    /// Existed only in destination; left untouched.
    pub preserved: Vec<String>,
    /// Recursive file count of the merged subtree, measured after the merge.
    pub total_files: usize,
}

/// Outcome of deploying one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentOutcome {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentOutcome {
    pub fn ok(count: usize) -> Self {
        Self {
            success: true,
            count,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            error: Some(error.into()),
        }
    }
}

/// The result of one deployment invocation. Immutable after return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployOutcome {
    pub version: String,
    pub source: String,
    pub branch: String,
    pub commit: String,
    pub mode: DeployMode,
    pub components: BTreeMap<String, ComponentOutcome>,
    /// Present only for components reconciled in merge mode.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub merge_stats: BTreeMap<String, MergeStats>,
}

impl DeployOutcome {
    /// True when every requested component deployed successfully.
    pub fn all_succeeded(&self) -> bool {
        self.components.values().all(|c| c.success)
    }
}

/// Persisted per-component record inside [`Metadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub installed: bool,
    /// Relative paths (from the deployment root) of every deployed file.
    pub files: Vec<String>,
}

/// The persisted audit record of the most recent deployment.
///
/// Fully overwritten on every successful deployment; every path listed in a
/// component's `files` has a matching entry in `checksums`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub source: String,
    pub branch: String,
    pub commit: String,
    pub installed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub components: BTreeMap<String, ComponentRecord>,
    pub checksums: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
