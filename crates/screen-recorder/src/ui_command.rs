use crate::TrayIconState;

use std::path::PathBuf;

use screen_recorder_core::{CoreResult, HotkeyBinding, ProgressUpdate};
use tokio::sync::oneshot;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (`TrayIcon` is `!Send`) and the
/// `GlobalHotKeyManager` (hotkeys need the thread that pumps OS messages),
/// so every tray mutation and hotkey change flows through this enum.
#[derive(Debug)]
pub enum UiCommand {
    /// Update the tray icon to a new state.
    SetState(TrayIconState),
    /// Start showing progress text on the tray.
    ShowProgress,
    /// Replace the progress text.
    Progress(ProgressUpdate),
    /// Stop showing progress text.
    HideProgress,
    /// Register a global hotkey; replies with its id.
    RegisterHotkey {
        /// Accelerator to register.
        binding: HotkeyBinding,
        /// Result of the registration.
        reply: oneshot::Sender<CoreResult<u32>>,
    },
    /// Unregister a global hotkey; replies with the freed id.
    UnregisterHotkey {
        /// Accelerator to release.
        binding: HotkeyBinding,
        /// Result of the unregistration.
        reply: oneshot::Sender<CoreResult<u32>>,
    },
    /// A recording was written; show its path and fingerprint on the tray.
    SessionFinished {
        /// The finished file.
        path: PathBuf,
        /// Short fingerprint or failure note.
        summary: String,
    },
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
