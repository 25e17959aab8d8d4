use crate::sources::ScreenGeometry;

use screen_recorder_core::{Container, MediaFormat};

const VIDEO_BITRATE: &str = "2500k";
const AUDIO_BITRATE: &str = "128k";
const FRAGMENTED_MP4_FLAGS: &str = "frag_keyframe+empty_moov+default_base_moof";

/// ffmpeg input device used to grab the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureBackend {
    /// Windows GDI.
    GdiGrab,
    /// macOS AVFoundation.
    AvFoundation,
    /// X11.
    X11Grab,
}

impl CaptureBackend {
    /// Backend for the platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            CaptureBackend::GdiGrab
        } else if cfg!(target_os = "macos") {
            CaptureBackend::AvFoundation
        } else {
            CaptureBackend::X11Grab
        }
    }
}

/// Audio device to pass to ffmpeg, or `None` to record video only.
///
/// X11 systems fall back to the PulseAudio default source. Other platforms
/// have no device that exists everywhere, so audio needs `configured`.
pub fn resolve_audio_input(
    backend: CaptureBackend,
    configured: Option<&str>,
    enabled: bool,
) -> Option<String> {
    if !enabled {
        return None;
    }
    match (configured.map(str::trim), backend) {
        (Some(device), _) if !device.is_empty() => Some(device.to_string()),
        (_, CaptureBackend::X11Grab) => Some("default".to_string()),
        _ => None,
    }
}

/// Builds the argument list for one recording.
///
/// The output is always `pipe:1`; MP4 is fragmented so it can be written
/// without seeking back.
#[derive(Debug, Clone)]
pub struct FfmpegCommandBuilder {
    backend: CaptureBackend,
    screen: ScreenGeometry,
    format: MediaFormat,
    video_encoder: String,
    frame_rate: u32,
    audio_input: Option<String>,
    display: String,
}

impl FfmpegCommandBuilder {
    /// Start from the required pieces; 30 fps, no audio, display `:0.0`.
    pub fn new(
        backend: CaptureBackend,
        screen: ScreenGeometry,
        format: MediaFormat,
        video_encoder: &str,
    ) -> Self {
        Self {
            backend,
            screen,
            format,
            video_encoder: video_encoder.to_string(),
            frame_rate: 30,
            audio_input: None,
            display: ":0.0".to_string(),
        }
    }

    /// Target frame rate.
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate.max(1);
        self
    }

    /// Audio device to mix in.
    pub fn with_audio_input(mut self, audio_input: Option<String>) -> Self {
        self.audio_input = audio_input;
        self
    }

    /// X11 display name (usually `$DISPLAY`).
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    /// The complete argument list, program name excluded.
    pub fn build(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error"]
            .map(String::from)
            .to_vec();

        self.push_inputs(&mut args);
        self.push_video_codec(&mut args);
        if self.audio_input.is_some() {
            self.push_audio_codec(&mut args);
        }
        self.push_muxer(&mut args);

        args.push("pipe:1".to_string());
        args
    }

    fn push_inputs(&self, args: &mut Vec<String>) {
        let fps = self.frame_rate.to_string();
        let size = format!("{}x{}", self.screen.width, self.screen.height);

        match self.backend {
            CaptureBackend::X11Grab => {
                extend(args, &["-f", "x11grab", "-framerate", &fps, "-video_size", &size]);
                let input = format!("{}+{},{}", self.display, self.screen.x, self.screen.y);
                extend(args, &["-i", &input]);
                if let Some(device) = &self.audio_input {
                    extend(args, &["-f", "pulse", "-i", device]);
                }
            }
            CaptureBackend::GdiGrab => {
                let (x, y) = (self.screen.x.to_string(), self.screen.y.to_string());
                extend(args, &["-f", "gdigrab", "-framerate", &fps]);
                extend(args, &["-offset_x", &x, "-offset_y", &y, "-video_size", &size]);
                extend(args, &["-i", "desktop"]);
                if let Some(device) = &self.audio_input {
                    let input = format!("audio={}", device);
                    extend(args, &["-f", "dshow", "-i", &input]);
                }
            }
            CaptureBackend::AvFoundation => {
                // video and audio share one "<video>:<audio>" input
                let audio = self.audio_input.as_deref().unwrap_or("none");
                let input = format!("Capture screen {}:{}", self.screen.index, audio);
                extend(args, &["-f", "avfoundation", "-framerate", &fps]);
                extend(args, &["-capture_cursor", "1", "-i", &input]);
            }
        }
    }

    fn push_video_codec(&self, args: &mut Vec<String>) {
        extend(args, &["-c:v", &self.video_encoder]);

        match self.video_encoder.as_str() {
            "libx264" => extend(args, &["-preset", "veryfast", "-pix_fmt", "yuv420p"]),
            "libvpx" | "libvpx-vp9" => {
                extend(args, &["-deadline", "realtime", "-cpu-used", "8"])
            }
            _ => extend(args, &["-pix_fmt", "yuv420p"]),
        }

        extend(args, &["-b:v", VIDEO_BITRATE]);
    }

    fn push_audio_codec(&self, args: &mut Vec<String>) {
        let codec = match self.format.container {
            Container::Mp4 => "aac",
            Container::Webm => "libopus",
        };
        extend(args, &["-c:a", codec, "-b:a", AUDIO_BITRATE]);
    }

    fn push_muxer(&self, args: &mut Vec<String>) {
        match self.format.container {
            Container::Mp4 => extend(args, &["-f", "mp4", "-movflags", FRAGMENTED_MP4_FLAGS]),
            Container::Webm => extend(args, &["-f", "webm"]),
        }
    }
}

fn extend(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().map(|s| s.to_string()));
}
