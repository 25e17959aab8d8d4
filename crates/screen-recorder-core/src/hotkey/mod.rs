//! Global stop-hotkey binding and the registry seam.

use crate::{CoreResult, RecorderError};

use std::{fmt, panic::Location};

use error_location::ErrorLocation;

const MODIFIERS: [&str; 13] = [
    "ctrl",
    "control",
    "shift",
    "alt",
    "option",
    "cmd",
    "command",
    "super",
    "meta",
    "cmdorctrl",
    "cmdorcontrol",
    "commandorctrl",
    "commandorcontrol",
];

/// A validated accelerator string such as `CmdOrCtrl+Shift+F10`.
///
/// Tokens are `+`-separated, none may be empty, and the last one must be a
/// key rather than a modifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HotkeyBinding(String);

impl HotkeyBinding {
    /// Validates and wraps an accelerator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHotkey` for empty accelerators, empty tokens, or a
    /// trailing modifier.
    #[track_caller]
    pub fn parse(accelerator: &str) -> CoreResult<Self> {
        let trimmed = accelerator.trim();
        let tokens: Vec<&str> = trimmed.split('+').map(str::trim).collect();

        let key = tokens.last().copied().unwrap_or_default();
        let valid = !trimmed.is_empty()
            && tokens.iter().all(|t| !t.is_empty())
            && !MODIFIERS.contains(&key.to_ascii_lowercase().as_str());

        if !valid {
            return Err(RecorderError::InvalidHotkey {
                binding: accelerator.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self(tokens.join("+")))
    }

    /// The normalized accelerator.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HotkeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-wide global hotkey registry.
///
/// Only the session controller calls this, once per start and once per
/// stop. The press itself is delivered out of band and must trigger the
/// same stop as a direct user action.
#[async_trait::async_trait]
pub trait HotkeyRegistrar: Send + Sync {
    /// Registers `binding` globally.
    async fn register(&self, binding: &HotkeyBinding) -> CoreResult<()>;

    /// Releases a binding previously registered.
    async fn unregister(&self, binding: &HotkeyBinding) -> CoreResult<()>;
}
