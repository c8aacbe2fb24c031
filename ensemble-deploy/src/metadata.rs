//! Metadata store — persisted audit record of the most recent deployment.
//!
//! A single JSON document at `<target>/.claude/.ensemble/metadata.json`,
//! fully overwritten on every deployment. File lists and checksums are
//! computed freshly from the post-deployment on-disk state, so the record
//! always reflects what is actually installed. Writes use the same atomic
//! `.tmp` + rename pattern as the rest of the tool's persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;

use ensemble_core::{
    config,
    types::{Component, ComponentRecord, DeployOutcome, Metadata},
    CoreError,
};

use crate::checksum;
use crate::error::{io_err, DeployError};

/// `<claude_dir>/.ensemble/metadata.json` — pure, no I/O.
pub fn metadata_path(claude_dir: &Path) -> PathBuf {
    claude_dir
        .join(config::METADATA_DIR)
        .join(config::METADATA_FILE)
}

/// Load the persisted record, `None` when the project has no deployment.
pub fn load(claude_dir: &Path) -> Result<Option<Metadata>, DeployError> {
    let path = metadata_path(claude_dir);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let meta = serde_json::from_str(&contents)
        .map_err(|e| DeployError::Core(CoreError::Parse { path, source: e }))?;
    Ok(Some(meta))
}

/// Write the metadata record for a completed deployment.
///
/// Components whose destination subtree does not exist are skipped.
/// `installed_at` is carried over from a prior readable record; only
/// `updated_at` is refreshed on updates.
pub fn write(
    claude_dir: &Path,
    outcome: &DeployOutcome,
    components: &[Component],
) -> Result<Metadata, DeployError> {
    let now = Utc::now();
    // A corrupt prior record is overwritten rather than aborting the write.
    let installed_at = match load(claude_dir) {
        Ok(Some(prior)) => prior.installed_at,
        _ => now,
    };

    let mut records = BTreeMap::new();
    let mut checksums = BTreeMap::new();
    for component in components {
        let dir = claude_dir.join(&component.name.0);
        if !dir.is_dir() {
            continue;
        }
        let mut files = Vec::new();
        collect_files(&dir, &mut files)?;
        files.sort();

        let mut rel_paths = Vec::new();
        for file in files {
            let rel = file
                .strip_prefix(claude_dir)
                .unwrap_or(&file)
                .to_string_lossy()
                .into_owned();
            checksums.insert(rel.clone(), checksum::file_digest(&file)?);
            rel_paths.push(rel);
        }
        records.insert(
            component.name.0.clone(),
            ComponentRecord {
                installed: true,
                files: rel_paths,
            },
        );
    }

    let meta = Metadata {
        version: outcome.version.clone(),
        source: outcome.source.clone(),
        branch: outcome.branch.clone(),
        commit: outcome.commit.clone(),
        installed_at,
        updated_at: now,
        components: records,
        checksums,
    };
    save(claude_dir, &meta)?;
    Ok(meta)
}

/// Save the record atomically: serialize → `.json.tmp` sibling → rename.
fn save(claude_dir: &Path, meta: &Metadata) -> Result<(), DeployError> {
    let path = metadata_path(claude_dir);
    let Some(dir) = path.parent() else {
        return Err(io_err(
            path,
            std::io::Error::other("invalid metadata path"),
        ));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(meta)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DeployError> {
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ensemble_core::types::DeployMode;
    use tempfile::TempDir;

    use super::*;

    fn outcome() -> DeployOutcome {
        DeployOutcome {
            version: "0.1.0".to_string(),
            source: "/tmp/kit".to_string(),
            branch: "main".to_string(),
            commit: "abc123".to_string(),
            mode: DeployMode::Overwrite,
            components: BTreeMap::new(),
            merge_stats: BTreeMap::new(),
        }
    }

    fn seed(claude_dir: &Path) {
        fs::create_dir_all(claude_dir.join("agents")).unwrap();
        fs::write(claude_dir.join("agents/reviewer.md"), "r").unwrap();
        fs::create_dir_all(claude_dir.join("skills/tts/assets")).unwrap();
        fs::write(claude_dir.join("skills/tts/SKILL.md"), "s").unwrap();
        fs::write(claude_dir.join("skills/tts/assets/helper.py"), "h").unwrap();
    }

    #[test]
    fn load_is_none_when_not_deployed() {
        let tmp = TempDir::new().unwrap();
        assert!(load(tmp.path()).unwrap().is_none());
    }

    #[test]
    fn write_records_files_and_checksums_per_component() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path());

        let meta = write(tmp.path(), &outcome(), &config::components()).unwrap();

        let agents = meta.components.get("agents").unwrap();
        assert!(agents.installed);
        assert_eq!(agents.files, vec!["agents/reviewer.md"]);
        let skills = meta.components.get("skills").unwrap();
        assert_eq!(
            skills.files,
            vec!["skills/tts/SKILL.md", "skills/tts/assets/helper.py"]
        );
        // Every listed path has a checksum entry.
        for record in meta.components.values() {
            for file in &record.files {
                let digest = meta.checksums.get(file).expect("checksum for listed file");
                assert!(digest.starts_with("sha256:"));
            }
        }
    }

    #[test]
    fn write_skips_components_without_a_subtree() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path());

        let meta = write(tmp.path(), &outcome(), &config::components()).unwrap();
        assert!(!meta.components.contains_key("commands"));
    }

    #[test]
    fn write_is_atomic_and_roundtrips() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path());

        let written = write(tmp.path(), &outcome(), &config::components()).unwrap();
        let tmp_file = metadata_path(tmp.path()).with_extension("json.tmp");
        assert!(!tmp_file.exists(), "tmp file should be gone after rename");

        let loaded = load(tmp.path()).unwrap().expect("record present");
        assert_eq!(loaded, written);
    }

    #[test]
    fn installed_at_survives_a_second_write() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path());

        let first = write(tmp.path(), &outcome(), &config::components()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = write(tmp.path(), &outcome(), &config::components()).unwrap();

        assert_eq!(second.installed_at, first.installed_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn corrupt_record_fails_load_but_not_write() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path());
        let path = metadata_path(tmp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json{").unwrap();

        let err = load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("metadata"));

        // A deployment over a corrupt record still produces a fresh one.
        let meta = write(tmp.path(), &outcome(), &config::components()).unwrap();
        assert!(meta.components.contains_key("agents"));
        assert!(load(tmp.path()).unwrap().is_some());
    }
}
