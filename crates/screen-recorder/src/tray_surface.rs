use crate::{UiCommand, UiHandle};

use std::{
    panic::Location,
    sync::atomic::{AtomicBool, Ordering},
};

use error_location::ErrorLocation;
use screen_recorder_core::{CoreResult, ProgressSurface, ProgressUpdate, RecorderError};
use tracing::trace;

/// Progress surface backed by the tray icon's title and tooltip.
///
/// Lives on the async side; every call becomes a [`UiCommand`] for the
/// main thread, which owns the `TrayIcon`.
pub struct TraySurface {
    ui: UiHandle,
    open: AtomicBool,
}

impl TraySurface {
    /// Create a closed surface.
    pub fn new(ui: UiHandle) -> Self {
        Self {
            ui,
            open: AtomicBool::new(false),
        }
    }
}

impl ProgressSurface for TraySurface {
    #[track_caller]
    fn show(&self) -> CoreResult<()> {
        if !self.ui.send(UiCommand::ShowProgress) {
            return Err(RecorderError::Surface {
                reason: "tray is not running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.open.store(true, Ordering::Release);
        Ok(())
    }

    fn push(&self, update: &ProgressUpdate) -> bool {
        if !self.open.load(Ordering::Acquire) {
            trace!("Surface closed, progress not sent");
            return false;
        }
        self.ui.send(UiCommand::Progress(update.clone()))
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            self.ui.send(UiCommand::HideProgress);
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}
