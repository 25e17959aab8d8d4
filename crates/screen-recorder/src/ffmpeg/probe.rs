use std::collections::HashSet;

use screen_recorder_core::{Container, EncodingProbe, MediaFormat, VideoCodec};
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// Encoders tried per codec, best first. Hardware encoders appear in the
/// listing whenever ffmpeg was built with them, GPU or not.
const H264_ENCODERS: [&str; 6] = [
    "libx264",
    "h264_nvenc",
    "h264_qsv",
    "h264_amf",
    "h264_videotoolbox",
    "h264_mf",
];
const VP9_ENCODERS: [&str; 1] = ["libvpx-vp9"];
const VP8_ENCODERS: [&str; 1] = ["libvpx"];

/// What the installed ffmpeg can encode and mux, read from its listings.
#[derive(Debug, Clone, Default)]
pub struct FfmpegProbe {
    encoders: HashSet<String>,
    muxers: HashSet<String>,
}

impl FfmpegProbe {
    /// Run `ffmpeg -encoders` and `ffmpeg -muxers`.
    ///
    /// A missing or broken binary yields an empty probe, so every format is
    /// reported unsupported and starting a recording fails cleanly.
    #[instrument]
    pub async fn detect(binary: &str) -> Self {
        let encoders = Self::listing(binary, "-encoders").await;
        let muxers = Self::listing(binary, "-muxers").await;

        let probe = Self::from_listings(&encoders, &muxers);
        info!(
            encoders = probe.encoders.len(),
            muxers = probe.muxers.len(),
            "ffmpeg capabilities probed"
        );
        probe
    }

    /// Parse `-encoders` and `-muxers` output.
    pub fn from_listings(encoders: &str, muxers: &str) -> Self {
        Self {
            encoders: parse_listing(encoders),
            muxers: parse_listing(muxers),
        }
    }

    /// Preferred available encoder for `codec`.
    pub fn video_encoder(&self, codec: VideoCodec) -> Option<&'static str> {
        let candidates: &[&'static str] = match codec {
            VideoCodec::H264 => &H264_ENCODERS,
            VideoCodec::Vp9 => &VP9_ENCODERS,
            VideoCodec::Vp8 => &VP8_ENCODERS,
        };
        candidates
            .iter()
            .copied()
            .find(|name| self.encoders.contains(*name))
    }

    async fn listing(binary: &str, flag: &str) -> String {
        match Command::new(binary)
            .args(["-hide_banner", flag])
            .kill_on_drop(true)
            .output()
            .await
        {
            Ok(output) => String::from_utf8_lossy(&output.stdout).into_owned(),
            Err(e) => {
                warn!(binary, flag, error = %e, "Failed to run ffmpeg");
                String::new()
            }
        }
    }
}

impl EncodingProbe for FfmpegProbe {
    fn supports(&self, format: &MediaFormat) -> bool {
        // ffmpeg's webm muxer only takes VP8/VP9/AV1
        let muxable = match format.container {
            Container::Mp4 => format.codec == VideoCodec::H264,
            Container::Webm => format.codec != VideoCodec::H264,
        };

        muxable
            && self.muxers.contains(format.container.extension())
            && self.video_encoder(format.codec).is_some()
    }
}

/// Names from an ffmpeg capability table.
///
/// Rows follow a dashed separator line and look like
/// ` V....D libx264   description` or ` E  matroska,webm   description`.
fn parse_listing(output: &str) -> HashSet<String> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("--"))
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .flat_map(|names| names.split(','))
        .map(str::to_string)
        .collect()
}

