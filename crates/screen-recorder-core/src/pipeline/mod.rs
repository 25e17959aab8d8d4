//! Boundary to the external capture/encode backend.

use crate::{CoreResult, encoding::MediaFormat, source::SourceDescriptor};

use tokio::sync::mpsc;

/// How the source should be captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Target frames per second.
    pub frame_rate: u32,
    /// Whether system audio is recorded alongside video.
    pub audio: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            audio: true,
        }
    }
}

/// Everything a backend needs to begin producing chunks.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Source to capture.
    pub source: SourceDescriptor,
    /// Encoding already validated by the fallback chain.
    pub format: MediaFormat,
    /// Frame rate and audio settings.
    pub options: CaptureOptions,
}

/// Produces encoded media chunks from a source.
///
/// Implementations:
/// - ffmpeg subprocess writing the container to stdout (desktop binary)
/// - scripted chunk lists (tests)
#[async_trait::async_trait]
pub trait CapturePipeline: Send {
    /// Starts capturing.
    ///
    /// Returns a receiver yielding chunks in emission order. The channel
    /// closes once the backend has emitted its final chunk.
    async fn start(&mut self, request: &CaptureRequest) -> CoreResult<mpsc::Receiver<Vec<u8>>>;

    /// Asks the backend to flush its trailer and end the chunk stream.
    async fn finalize(&mut self) -> CoreResult<()>;

    /// Whether the backend is currently producing chunks.
    fn is_capturing(&self) -> bool;

    /// Backend name for logging.
    fn name(&self) -> &str;
}
