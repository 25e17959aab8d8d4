use crate::config::{default_audio, default_codec, default_container, default_frame_rate};

use serde::{Deserialize, Serialize};

/// What to capture and how to encode it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Target frames per second.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Record system audio alongside video.
    #[serde(default = "default_audio")]
    pub audio: bool,

    /// Index into the enumerated screens (0 = first reported).
    #[serde(default)]
    pub source_index: usize,

    /// Preferred container (`mp4` or `webm`).
    #[serde(default = "default_container")]
    pub container: String,

    /// Preferred video codec (`h264`, `vp9` or `vp8`).
    #[serde(default = "default_codec")]
    pub codec: String,
}
