//! Streaming SHA-256 fingerprint of finished recordings.

use crate::{CoreResult, RecorderError};

use std::{io::ErrorKind, panic::Location, path::Path};

use error_location::ErrorLocation;
use sha2::{Digest, Sha256};
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{debug, info, instrument};

/// Read size for each digest update. Recordings can reach several gigabytes,
/// so the file is never held in memory as a whole.
pub(crate) const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Outcome of hashing a finalized recording.
///
/// A failure is reported as data so the caller can show it next to the
/// recording instead of treating the session as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashResult {
    /// Lowercase hex SHA-256 digest.
    Digest(String),
    /// Human-readable reason the digest could not be computed.
    Failed(String),
}

impl HashResult {
    /// Returns the digest if hashing succeeded.
    pub fn digest(&self) -> Option<&str> {
        match self {
            HashResult::Digest(hex) => Some(hex.as_str()),
            HashResult::Failed(_) => None,
        }
    }
}

/// Streams the file at `path` through SHA-256 and returns the hex digest.
///
/// Must only be called after the write sink for `path` has been closed.
///
/// # Errors
///
/// Returns `FileNotFound` if the file is missing and `Io` on any read error.
#[instrument]
pub async fn hash_file(path: &Path) -> CoreResult<String> {
    let location = Location::caller();

    let mut file = File::open(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => RecorderError::FileNotFound {
            path: path.to_path_buf(),
            location: ErrorLocation::from(location),
        },
        _ => RecorderError::Io {
            path: path.to_path_buf(),
            source: e,
            location: ErrorLocation::from(location),
        },
    })?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let read = file.read(&mut buf).await.map_err(|e| RecorderError::Io {
            path: path.to_path_buf(),
            source: e,
            location: ErrorLocation::from(location),
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
        total += read as u64;
    }

    let digest = format!("{:x}", hasher.finalize());

    debug!(bytes_hashed = total, "File streamed through SHA-256");
    info!(digest = %digest, "Recording hash computed");

    Ok(digest)
}

/// Hashes `path`, folding any error into [`HashResult::Failed`].
pub async fn hash_result(path: &Path) -> HashResult {
    match hash_file(path).await {
        Ok(hex) => HashResult::Digest(hex),
        Err(e) => HashResult::Failed(e.to_string()),
    }
}
