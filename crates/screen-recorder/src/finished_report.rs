use std::{path::Path, time::Duration};

use screen_recorder_core::{HashResult, format_duration, format_file_size};

/// Characters of the digest kept in the tray tooltip.
const TOOLTIP_DIGEST_LEN: usize = 12;

/// User-facing text for a finalized recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedReport {
    /// Notification title.
    pub title: String,
    /// Notification body: path, size, duration and the full digest or the
    /// hashing error.
    pub body: String,
    /// Short form for the tray tooltip.
    pub summary: String,
}

impl FinishedReport {
    /// Describe a recording that went through the stop sequence.
    pub fn new(path: &Path, bytes_written: u64, duration: Duration, hash: &HashResult) -> Self {
        let (title, hash_line, summary) = match hash {
            HashResult::Digest(digest) => (
                "Recording saved",
                format!("SHA-256: {}", digest),
                format!(
                    "sha256 {}",
                    digest.get(..TOOLTIP_DIGEST_LEN).unwrap_or(digest)
                ),
            ),
            HashResult::Failed(reason) => (
                "Recording saved, hash failed",
                format!("Hash failed: {}", reason),
                "hash failed".to_string(),
            ),
        };

        let body = format!(
            "{}\n{} in {}\n{}",
            path.display(),
            format_file_size(bytes_written),
            format_duration(duration.as_secs()),
            hash_line
        );

        Self {
            title: title.to_string(),
            body,
            summary,
        }
    }
}

/// Tray tooltip naming the finished file.
pub fn finished_tooltip(path: &Path, summary: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("Saved {} ({})", name, summary)
}
