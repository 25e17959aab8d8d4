use crate::config::default_ffmpeg_binary;

use serde::{Deserialize, Serialize};

/// External encoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// Name or path of the ffmpeg executable.
    #[serde(default = "default_ffmpeg_binary")]
    pub binary: String,

    /// Platform audio input passed to ffmpeg (None = platform default).
    #[serde(default)]
    pub audio_input: Option<String>,
}
