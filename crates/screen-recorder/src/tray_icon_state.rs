/// Tray icon states following the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// No recording.
    Idle,
    /// Capturing to disk.
    Recording,
    /// Stopping: draining chunks and hashing the file.
    Finalizing,
}

impl TrayIconState {
    /// Tooltip shown while no progress text overrides it.
    pub fn tooltip(self) -> &'static str {
        match self {
            TrayIconState::Idle => "Screen Recorder - Ready",
            TrayIconState::Recording => "Screen Recorder - Recording...",
            TrayIconState::Finalizing => "Screen Recorder - Saving...",
        }
    }

    /// Icon fill colour as RGB.
    pub(crate) fn colour(self) -> [u8; 3] {
        match self {
            TrayIconState::Idle => [0x8a, 0x8f, 0x98],
            TrayIconState::Recording => [0xd9, 0x30, 0x25],
            TrayIconState::Finalizing => [0xf0, 0xa2, 0x02],
        }
    }
}
