//! SHA-256 digests for cached installer packages.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::CHUNK_SIZE;
use crate::error::{ProvisionError, ProvisionResult};

/// Calculate the SHA-256 digest of a file as lowercase hex.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn calculate_file_checksum(path: &Path) -> ProvisionResult<String> {
    let mut file = File::open(path).map_err(|e| ProvisionError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ProvisionError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare a computed digest against a pinned one.
///
/// Pinned values are often pasted from release pages, so surrounding
/// whitespace and hex case are ignored.
pub fn checksums_match(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}

/// Check whether the file at `path` has the expected digest.
///
/// A mismatch is `Ok(false)`, not an error: to the fetcher a stale cache
/// entry is just a cache miss.
pub fn file_matches(path: &Path, expected: &str) -> ProvisionResult<bool> {
    let actual = calculate_file_checksum(path)?;
    Ok(checksums_match(&actual, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_calculate_file_checksum() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"hello world").unwrap();

        let checksum = calculate_file_checksum(&file_path).unwrap();
        assert_eq!(checksum, HELLO_WORLD_SHA256);
    }

    #[test]
    fn test_calculate_empty_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("empty.txt");
        File::create(&file_path).unwrap();

        let checksum = calculate_file_checksum(&file_path).unwrap();
        assert_eq!(
            checksum,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_calculate_nonexistent_file() {
        let result = calculate_file_checksum(Path::new("/nonexistent/file.pkg"));
        assert!(matches!(result, Err(ProvisionError::ReadFailed { .. })));
    }

    #[test]
    fn test_multi_chunk_file_is_stable() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("large.bin");
        std::fs::write(&file_path, vec![0xABu8; CHUNK_SIZE * 2 + 17]).unwrap();

        let first = calculate_file_checksum(&file_path).unwrap();
        let second = calculate_file_checksum(&file_path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_checksums_match_ignores_case_and_whitespace() {
        assert!(checksums_match(
            HELLO_WORLD_SHA256,
            &format!("  {}\n", HELLO_WORLD_SHA256.to_uppercase())
        ));
        assert!(!checksums_match(HELLO_WORLD_SHA256, "b94d27"));
    }

    #[test]
    fn test_file_matches() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");
        std::fs::write(&file_path, b"hello world").unwrap();

        assert!(file_matches(&file_path, HELLO_WORLD_SHA256).unwrap());
        assert!(!file_matches(&file_path, "wrong_checksum").unwrap());
    }
}
