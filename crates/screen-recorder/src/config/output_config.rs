use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where recordings are saved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Recordings directory (None = the user's Videos folder).
    #[serde(default)]
    pub directory: Option<PathBuf>,
}
