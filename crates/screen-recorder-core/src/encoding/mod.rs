//! Container/codec selection with an explicit fallback order.

use crate::{CoreResult, RecorderError};

use std::{fmt, panic::Location, str::FromStr};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// MPEG-4 Part 14.
    Mp4,
    /// Matroska-based WebM.
    Webm,
}

impl Container {
    /// Preference order when falling back across containers.
    pub const ALL: [Container; 2] = [Container::Mp4, Container::Webm];

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Webm => "webm",
        }
    }

    /// Whether this container can carry `codec`.
    pub fn carries(self, codec: VideoCodec) -> bool {
        match self {
            Container::Mp4 => codec == VideoCodec::H264,
            Container::Webm => true,
        }
    }
}

/// Video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    /// H.264 / AVC.
    H264,
    /// VP9.
    Vp9,
    /// VP8.
    Vp8,
}

impl VideoCodec {
    /// Preference order when falling back across codecs.
    pub const ALL: [VideoCodec; 3] = [VideoCodec::H264, VideoCodec::Vp9, VideoCodec::Vp8];

    /// Codec name as used in MIME `codecs=` parameters.
    pub fn name(self) -> &'static str {
        match self {
            VideoCodec::H264 => "h264",
            VideoCodec::Vp9 => "vp9",
            VideoCodec::Vp8 => "vp8",
        }
    }
}

impl FromStr for Container {
    type Err = RecorderError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(Container::Mp4),
            "webm" => Ok(Container::Webm),
            _ => Err(RecorderError::UnsupportedEncoding {
                requested: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl FromStr for VideoCodec {
    type Err = RecorderError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h264" | "avc" => Ok(VideoCodec::H264),
            "vp9" => Ok(VideoCodec::Vp9),
            "vp8" => Ok(VideoCodec::Vp8),
            _ => Err(RecorderError::UnsupportedEncoding {
                requested: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

/// A container/codec pair handed to the capture pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaFormat {
    /// Output container.
    pub container: Container,
    /// Video codec inside the container.
    pub codec: VideoCodec,
}

impl MediaFormat {
    /// Creates a format; does not check that the pair is valid.
    pub const fn new(container: Container, codec: VideoCodec) -> Self {
        Self { container, codec }
    }

    /// Whether the container can carry the codec.
    pub fn is_valid(&self) -> bool {
        self.container.carries(self.codec)
    }

    /// MIME type, e.g. `video/mp4;codecs=h264`.
    pub fn mime_type(&self) -> String {
        format!(
            "video/{};codecs={}",
            self.container.extension(),
            self.codec.name()
        )
    }
}

impl Default for MediaFormat {
    fn default() -> Self {
        Self::new(Container::Mp4, VideoCodec::H264)
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mime_type())
    }
}

/// Answers whether the encoder backend can produce a given format.
pub trait EncodingProbe: Send + Sync {
    /// Whether `format` can be produced.
    fn supports(&self, format: &MediaFormat) -> bool;
}

/// Ordered candidates tried for `requested`.
///
/// 1. the requested pair;
/// 2. the same codec in the other containers (`Container::ALL` order);
/// 3. every other codec (`VideoCodec::ALL` order), first in the requested
///    container, then in the rest.
///
/// Pairs the container cannot carry are dropped, and no pair appears twice.
pub fn fallback_chain(requested: MediaFormat) -> Vec<MediaFormat> {
    let containers: Vec<Container> = std::iter::once(requested.container)
        .chain(
            Container::ALL
                .into_iter()
                .filter(|c| *c != requested.container),
        )
        .collect();

    let mut chain: Vec<MediaFormat> = Vec::new();
    let mut push = |format: MediaFormat| {
        if format.is_valid() && !chain.contains(&format) {
            chain.push(format);
        }
    };

    push(requested);
    for container in Container::ALL {
        push(MediaFormat::new(container, requested.codec));
    }
    for codec in VideoCodec::ALL {
        for container in &containers {
            push(MediaFormat::new(*container, codec));
        }
    }

    chain
}

/// Picks the first candidate in [`fallback_chain`] that `probe` supports.
///
/// # Errors
///
/// Returns `UnsupportedEncoding` when no candidate is supported.
#[track_caller]
#[instrument(skip(probe))]
pub fn select_encoding<P: EncodingProbe + ?Sized>(
    probe: &P,
    requested: MediaFormat,
) -> CoreResult<MediaFormat> {
    for candidate in fallback_chain(requested) {
        if probe.supports(&candidate) {
            if candidate != requested {
                warn!(
                    requested = %requested,
                    selected = %candidate,
                    "Requested encoding unsupported, falling back"
                );
            } else {
                debug!(selected = %candidate, "Requested encoding supported");
            }
            info!(format = %candidate, "Encoding selected");
            return Ok(candidate);
        }
        debug!(candidate = %candidate, "Encoding not supported");
    }

    Err(RecorderError::UnsupportedEncoding {
        requested: requested.mime_type(),
        location: ErrorLocation::from(Location::caller()),
    })
}
