use std::fmt;

/// What asked for a recording to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopTrigger {
    /// "Stop Recording" in the tray menu.
    User,
    /// The global stop hotkey.
    Hotkey,
}

impl fmt::Display for StopTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopTrigger::User => f.write_str("user"),
            StopTrigger::Hotkey => f.write_str("hotkey"),
        }
    }
}

/// Commands sent to the application loop on the async runtime.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Start a recording with the configured source and format.
    StartSession,
    /// Stop the current recording, if any.
    StopSession {
        /// Origin of the request, for logging.
        trigger: StopTrigger,
    },
    /// Stop any recording and exit.
    Shutdown,
}
