//! Error types for provisioning runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors that can occur while provisioning runtimes.
///
/// Every variant is fatal to the run that raised it; nothing in the library
/// catches and continues past one of these.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The URL could not be parsed or has no file name to cache under.
    #[error("invalid download URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Network or HTTP failure while downloading.
    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// A freshly downloaded file did not match its pinned checksum.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// Failed to read a file or directory.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to remove a file or directory tree.
    #[error("failed to remove {}: {source}", path.display())]
    RemoveFailed { path: PathBuf, source: io::Error },

    /// An external program could not be started.
    #[error("failed to run {program}: {source}")]
    SpawnFailed { program: String, source: io::Error },

    /// An external program ran but exited unsuccessfully.
    #[error("{command} exited with {}: {stderr}", describe_code(*code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The installer's choice document could not be parsed or serialized.
    #[error("malformed installer choice document: {0}")]
    ChoiceDocument(String),

    /// No `MAJOR.MINOR` version could be derived for a runtime.
    #[error("cannot determine runtime version from {0}")]
    UnknownVersion(String),

    /// The installer finished but the expected version tree is absent.
    #[error("installer reported success but {} does not exist", path.display())]
    VersionDirMissing { path: PathBuf },

    /// A bare version tree already exists where the installer would write.
    #[error("{} already exists; list each MAJOR.MINOR without a variant at most once", path.display())]
    VersionSlotOccupied { path: PathBuf },

    /// Renaming a version tree would overwrite another entry.
    #[error("cannot rename {} to {}: destination exists", from.display(), to.display())]
    RenameCollision { from: PathBuf, to: PathBuf },

    /// Renaming a version tree failed.
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Symlink operation failed.
    #[error("symlink operation failed ({} -> {}): {reason}", link.display(), target.display())]
    SymlinkFailed {
        link: PathBuf,
        target: PathBuf,
        reason: String,
    },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}
