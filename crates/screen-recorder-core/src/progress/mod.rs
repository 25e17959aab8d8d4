mod format;
mod reporter;
mod snapshot;
mod surface;

pub use {
    format::{format_duration, format_file_size},
    reporter::{PROGRESS_INTERVAL, ProgressReporter},
    snapshot::{ProgressSnapshot, ProgressUpdate},
    surface::ProgressSurface,
};
