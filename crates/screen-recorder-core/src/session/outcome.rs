use crate::{
    encoding::MediaFormat, hashing::HashResult, hotkey::HotkeyBinding, pipeline::CaptureOptions,
    source::SourceDescriptor,
};

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use uuid::Uuid;

/// Parameters for a new recording.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// File the recording is written to.
    pub target_path: PathBuf,
    /// Optional global shortcut that stops the recording.
    pub hotkey: Option<HotkeyBinding>,
    /// Display to capture.
    pub source: SourceDescriptor,
    /// Preferred encoding; the first supported fallback is used.
    pub format: MediaFormat,
    /// Frame rate and audio settings.
    pub capture: CaptureOptions,
}

/// Public view of the active recording.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Unique ID for log correlation.
    pub session_id: Uuid,
    /// Target file.
    pub path: PathBuf,
    /// Encoding actually selected.
    pub format: MediaFormat,
    /// Captured source.
    pub source: SourceDescriptor,
    /// Stop shortcut, if registered.
    pub hotkey: Option<HotkeyBinding>,
    /// When recording started.
    pub started_at: Instant,
}

/// A recording that went through the full stop sequence.
#[derive(Debug, Clone)]
pub struct FinalizedSession {
    /// Session ID from start.
    pub session_id: Uuid,
    /// Finished file.
    pub path: PathBuf,
    /// Encoding used.
    pub format: MediaFormat,
    /// Wall time between start and stop.
    pub duration: Duration,
    /// Bytes accepted by the write sink.
    pub bytes_written: u64,
    /// Digest of the file, or why it could not be computed.
    pub hash: HashResult,
}

/// Result of a stop request. Stopping never fails.
#[derive(Debug, Clone)]
pub enum StopOutcome {
    /// No session was active.
    NotRecording,
    /// The session was torn down and the file finalized.
    Finalized(FinalizedSession),
}
