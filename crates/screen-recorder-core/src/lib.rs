//! Screen recorder core library.
//!
//! Recording session lifecycle: ordered chunk sink, 1 Hz progress
//! reporting, stop hotkey registration, encoding fallback and SHA-256
//! fingerprinting of the finished file. Platform concerns (capture backend,
//! windows, OS hotkeys) plug in through traits.
//!
//! # Example
//!
//! ```no_run
//! use screen_recorder_core::{CoreResult, SessionController, SessionRequest, StopOutcome};
//!
//! async fn record(mut controller: SessionController, request: SessionRequest) -> CoreResult<()> {
//!     controller.start_session(request).await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//!
//!     if let StopOutcome::Finalized(done) = controller.stop_session().await {
//!         println!("{:?}: {:?}", done.path, done.hash);
//!     }
//!     Ok(())
//! }
//! ```

mod encoding;
mod error;
mod hashing;
mod hotkey;
mod naming;
mod pipeline;
mod progress;
mod session;
mod sink;
mod source;

pub use {
    encoding::{
        Container, EncodingProbe, MediaFormat, VideoCodec, fallback_chain, select_encoding,
    },
    error::RecorderError,
    error::Result as CoreResult,
    hashing::{HashResult, hash_file, hash_result},
    hotkey::{HotkeyBinding, HotkeyRegistrar},
    naming::{FILE_NAME_PREFIX, default_file_name, default_file_name_now},
    pipeline::{CaptureOptions, CapturePipeline, CaptureRequest},
    progress::{
        PROGRESS_INTERVAL, ProgressReporter, ProgressSnapshot, ProgressSurface, ProgressUpdate,
        format_duration, format_file_size,
    },
    session::{
        FinalizedSession, SessionController, SessionInfo, SessionRequest, StopOutcome,
        WriterSummary,
    },
    sink::{SinkHandle, WriteSink},
    source::{SourceDescriptor, SourceProvider, Thumbnail},
};

#[cfg(test)]
mod tests;
