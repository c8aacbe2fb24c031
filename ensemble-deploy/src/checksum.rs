//! Streaming SHA-256 content fingerprints for deployed files.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{io_err, DeployError};

/// Prefix length used when abbreviating a digest for display.
pub const SHORT_LEN: usize = 16;

/// Compute `"sha256:<hex>"` over the file's bytes.
///
/// Reads in fixed-size chunks; the full-length digest is returned — callers
/// that want a human-scannable form should use [`short`] for display only.
pub fn file_digest(path: &Path) -> Result<String, DeployError> {
    let mut file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| io_err(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

/// Abbreviate a stored digest for display (`sha256:` prefix kept).
pub fn short(digest: &str) -> String {
    match digest.split_once(':') {
        Some((family, hex)) if hex.len() > SHORT_LEN => {
            format!("{family}:{}", &hex[..SHORT_LEN])
        }
        _ => digest.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn digest_is_stable_for_same_content() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.md");
        let b = tmp.path().join("b.md");
        std::fs::write(&a, "same content").unwrap();
        std::fs::write(&b, "same content").unwrap();
        assert_eq!(file_digest(&a).unwrap(), file_digest(&b).unwrap());
    }

    #[test]
    fn digest_differs_for_different_content() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.md");
        let b = tmp.path().join("b.md");
        std::fs::write(&a, "v1").unwrap();
        std::fs::write(&b, "v2").unwrap();
        assert_ne!(file_digest(&a).unwrap(), file_digest(&b).unwrap());
    }

    #[test]
    fn digest_carries_family_prefix_and_full_length() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f.md");
        std::fs::write(&path, "payload").unwrap();
        let digest = file_digest(&path).unwrap();
        assert!(digest.starts_with("sha256:"));
        // 64 hex chars for a full SHA-256.
        assert_eq!(digest.len(), "sha256:".len() + 64);
    }

    #[test]
    fn short_abbreviates_but_keeps_family() {
        let digest = format!("sha256:{}", "ab".repeat(32));
        let s = short(&digest);
        assert_eq!(s.len(), "sha256:".len() + SHORT_LEN);
        assert!(s.starts_with("sha256:"));
        assert_eq!(short("sha256:abcd"), "sha256:abcd");
    }

    #[test]
    fn missing_file_is_an_io_error_with_path() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.md");
        let err = file_digest(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.md"));
    }
}
