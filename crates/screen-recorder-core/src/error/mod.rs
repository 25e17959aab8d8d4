use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

/// Recording session errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// A recording session is already active.
    #[error("A recording session is already active {location}")]
    AlreadyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The path already has an open write sink.
    #[error("Write sink already open for {path:?} {location}")]
    AlreadyOpen {
        /// Path of the sink.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The handle does not refer to an open write sink.
    #[error("No open write sink for {path:?} {location}")]
    NotOpen {
        /// Path of the sink.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Filesystem operation failed.
    #[error("IO error on {path:?}: {source} {location}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// File did not exist when it was needed.
    #[error("File not found: {path:?} {location}")]
    FileNotFound {
        /// Missing path.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No candidate in the fallback chain is supported by the encoder.
    #[error("No supported encoding for {requested} {location}")]
    UnsupportedEncoding {
        /// MIME type that was requested.
        requested: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Hotkey accelerator string could not be understood.
    #[error("Invalid hotkey binding: {binding:?} {location}")]
    InvalidHotkey {
        /// The rejected accelerator.
        binding: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Global hotkey could not be registered or unregistered.
    #[error("Hotkey error: {reason} {location}")]
    Hotkey {
        /// Description of the hotkey failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture/encode pipeline failed.
    #[error("Capture pipeline error: {reason} {location}")]
    Pipeline {
        /// Description of the pipeline failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture sources could not be enumerated.
    #[error("Source enumeration failed: {reason} {location}")]
    Source {
        /// Description of the enumeration failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The progress surface could not be opened.
    #[error("Progress surface unavailable: {reason} {location}")]
    Surface {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
