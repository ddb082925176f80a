//! SHA-256 checksums in the canonical `sha256:<hex>` form
//!
//! Used to skip rewriting files whose content is already current, which keeps
//! modification times stable for the version-control status that follows a push.

use sha2::{Digest, Sha256};
use std::path::Path;

const PREFIX: &str = "sha256:";

/// Compute the checksum of string content.
pub fn content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the checksum of a file's contents.
pub fn file_checksum(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_checksum_known_value() {
        assert_eq!(
            content_checksum("hello world"),
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn file_checksum_matches_content_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connector.yaml");
        std::fs::write(&path, "transportType: TCP Listener\n").unwrap();

        assert_eq!(
            file_checksum(&path).unwrap(),
            content_checksum("transportType: TCP Listener\n")
        );
    }
}
