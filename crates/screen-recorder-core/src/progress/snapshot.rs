use crate::progress::{format_duration, format_file_size};

/// Point-in-time view of an active recording. Recomputed on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    /// Whole seconds since the session started.
    pub duration_seconds: u64,
    /// Size of the target file on disk.
    pub file_size_bytes: u64,
}

impl ProgressSnapshot {
    /// Renders the snapshot for display.
    pub fn to_update(&self) -> ProgressUpdate {
        ProgressUpdate {
            duration_text: format_duration(self.duration_seconds),
            size_text: format_file_size(self.file_size_bytes),
        }
    }
}

/// Display strings pushed to the progress surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Elapsed time as `HH:MM:SS`.
    pub duration_text: String,
    /// File size with binary units.
    pub size_text: String,
}
