use crate::config::default_stop_hotkey;

use serde::{Deserialize, Serialize};

/// Global shortcut configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Accelerator that stops the active recording. Empty disables it.
    #[serde(default = "default_stop_hotkey")]
    pub stop: Option<String>,
}
