mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod ffmpeg_config;
mod hotkey_config;
mod output_config;

pub(crate) use {
    capture_config::CaptureConfig, config::Config, ffmpeg_config::FfmpegConfig,
    hotkey_config::HotkeyConfig, output_config::OutputConfig,
};

pub(crate) const DEFAULT_FRAME_RATE: u32 = 30;
pub(crate) const DEFAULT_AUDIO: bool = true;
pub(crate) const DEFAULT_CONTAINER: &str = "mp4";
pub(crate) const DEFAULT_CODEC: &str = "h264";
pub(crate) const DEFAULT_STOP_HOTKEY: &str = "CmdOrCtrl+Shift+F10";
pub(crate) const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";

pub(crate) fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

pub(crate) fn default_audio() -> bool {
    DEFAULT_AUDIO
}

pub(crate) fn default_container() -> String {
    DEFAULT_CONTAINER.to_string()
}

pub(crate) fn default_codec() -> String {
    DEFAULT_CODEC.to_string()
}

pub(crate) fn default_stop_hotkey() -> Option<String> {
    Some(DEFAULT_STOP_HOTKEY.to_string())
}

pub(crate) fn default_ffmpeg_binary() -> String {
    DEFAULT_FFMPEG_BINARY.to_string()
}
