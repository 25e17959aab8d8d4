use crate::{UiCommand, UiHandle};

use std::{
    collections::HashSet,
    panic::Location,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use screen_recorder_core::{CoreResult, HotkeyBinding, HotkeyRegistrar, RecorderError};
use tokio::sync::oneshot;
use tracing::{debug, instrument};

/// Ids of the hotkeys currently registered for this process.
///
/// Written by [`UiHotkeyRegistrar`], read by the hotkey event forwarder.
#[derive(Debug, Clone, Default)]
pub struct ActiveHotkeys(Arc<RwLock<HashSet<u32>>>);

impl ActiveHotkeys {
    /// Whether `id` belongs to a registered stop hotkey.
    pub fn contains(&self, id: u32) -> bool {
        self.0
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&id)
    }

    pub(crate) fn insert(&self, id: u32) {
        self.0.write().unwrap_or_else(|e| e.into_inner()).insert(id);
    }

    pub(crate) fn remove(&self, id: u32) {
        self.0.write().unwrap_or_else(|e| e.into_inner()).remove(&id);
    }
}

/// Registers hotkeys by asking the main thread, which owns the
/// `GlobalHotKeyManager`, and waiting for its answer.
pub struct UiHotkeyRegistrar {
    ui: UiHandle,
    active: ActiveHotkeys,
}

impl UiHotkeyRegistrar {
    /// Create a registrar that records live ids in `active`.
    pub fn new(ui: UiHandle, active: ActiveHotkeys) -> Self {
        Self { ui, active }
    }

    async fn request(
        &self,
        command: UiCommand,
        reply: oneshot::Receiver<CoreResult<u32>>,
    ) -> CoreResult<u32> {
        let location = ErrorLocation::from(Location::caller());

        if !self.ui.send(command) {
            return Err(RecorderError::Hotkey {
                reason: "UI event loop is not running".to_string(),
                location,
            });
        }

        reply.await.map_err(|_| RecorderError::Hotkey {
            reason: "UI thread dropped the hotkey request".to_string(),
            location,
        })?
    }
}

#[async_trait]
impl HotkeyRegistrar for UiHotkeyRegistrar {
    #[instrument(skip(self))]
    async fn register(&self, binding: &HotkeyBinding) -> CoreResult<()> {
        let (reply, rx) = oneshot::channel();
        let command = UiCommand::RegisterHotkey {
            binding: binding.clone(),
            reply,
        };

        let id = self.request(command, rx).await?;
        self.active.insert(id);
        debug!(hotkey = %binding, id, "Stop hotkey active");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn unregister(&self, binding: &HotkeyBinding) -> CoreResult<()> {
        let (reply, rx) = oneshot::channel();
        let command = UiCommand::UnregisterHotkey {
            binding: binding.clone(),
            reply,
        };

        let id = self.request(command, rx).await?;
        self.active.remove(id);
        debug!(hotkey = %binding, id, "Stop hotkey released");

        Ok(())
    }
}
