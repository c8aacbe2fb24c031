//! Deployment constants and path helpers.
//!
//! # Target layout
//!
//! ```text
//! <project>/
//!   .claude/
//!     agents/                 (FileSet component)
//!     commands/               (FileSet component)
//!     skills/                 (DirectorySet component)
//!     .ensemble/
//!       metadata.json         (audit record of the last deployment)
//! ```

use std::path::{Path, PathBuf};

use crate::types::{Component, ComponentKind};

/// Default source repository for agent configuration bundles.
pub const DEFAULT_SOURCE: &str = "https://github.com/ensemble-kit/starter-bundle";
pub const DEFAULT_BRANCH: &str = "main";

/// Directory deployed into the target project.
pub const CLAUDE_DIR: &str = ".claude";

/// Hidden metadata subtree inside [`CLAUDE_DIR`].
pub const METADATA_DIR: &str = ".ensemble";
pub const METADATA_FILE: &str = "metadata.json";

/// The fixed set of deployable components, in display order.
pub fn components() -> Vec<Component> {
    vec![
        Component::new("agents", ComponentKind::FileSet),
        Component::new("commands", ComponentKind::FileSet),
        Component::new("skills", ComponentKind::DirectorySet),
    ]
}

/// Look up a component definition by name.
pub fn component(name: &str) -> Option<Component> {
    components().into_iter().find(|c| c.name.0 == name)
}

/// `<project>/.claude/`
pub fn claude_dir(project: &Path) -> PathBuf {
    project.join(CLAUDE_DIR)
}

/// `<project>/.claude/.ensemble/metadata.json` — pure, no I/O.
pub fn metadata_path(project: &Path) -> PathBuf {
    claude_dir(project).join(METADATA_DIR).join(METADATA_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_set_is_fixed() {
        let all = components();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name.0, "agents");
        assert_eq!(all[0].kind, ComponentKind::FileSet);
        assert_eq!(all[2].name.0, "skills");
        assert_eq!(all[2].kind, ComponentKind::DirectorySet);
    }

    #[test]
    fn component_lookup() {
        assert!(component("commands").is_some());
        assert!(component("plugins").is_none());
    }

    #[test]
    fn metadata_path_is_under_hidden_subtree() {
        let path = metadata_path(Path::new("/work/app"));
        assert!(path.ends_with(".claude/.ensemble/metadata.json"));
    }
}
