use std::path::{Path, PathBuf};

use directories::{BaseDirs, UserDirs};
use screen_recorder_core::{Container, default_file_name_now};
use tracing::{info, warn};

/// Chooses where a new recording is written.
///
/// Non-interactive counterpart of a save dialog: the configured directory,
/// else the user's Videos folder, else the home directory. `None` means the
/// user cancelled, i.e. no usable directory exists.
#[derive(Debug, Clone, Default)]
pub struct SavePathPolicy {
    directory: Option<PathBuf>,
}

impl SavePathPolicy {
    /// Use `directory` when set.
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self { directory }
    }

    /// Directory recordings go to, without creating it.
    pub fn recordings_dir(&self) -> Option<PathBuf> {
        self.directory
            .clone()
            .or_else(|| UserDirs::new().and_then(|d| d.video_dir().map(Path::to_path_buf)))
            .or_else(|| BaseDirs::new().map(|d| d.home_dir().to_path_buf()))
    }

    /// Full path for a new recording in `container`, directory created.
    pub fn choose(&self, container: Container) -> Option<PathBuf> {
        let Some(dir) = self.recordings_dir() else {
            warn!("No recordings directory available");
            return None;
        };

        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!(dir = ?dir, error = %e, "Cannot create recordings directory");
            return None;
        }

        let path = dir.join(default_file_name_now(container));
        info!(path = ?path, "Save path chosen");
        Some(path)
    }
}
