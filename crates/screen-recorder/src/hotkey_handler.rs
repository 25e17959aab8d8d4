//! Global stop hotkey: main-thread registration and press forwarding.
//!
//! `HotkeyRegistry` lives on the main thread next to the event loop, which
//! pumps the OS messages hotkeys are delivered through. `HotkeyHandler`
//! runs on the async runtime and turns presses of a registered stop hotkey
//! into `AppCommand::StopSession`.

use crate::{ActiveHotkeys, AppCommand, AppError, AppResult, StopTrigger};

use std::{collections::HashMap, panic::Location, str::FromStr, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState, hotkey::HotKey};
use screen_recorder_core::HotkeyBinding;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Owns the platform hotkey manager and the currently bound accelerators.
///
/// Must be created and used on a thread with a message pump (the thread
/// running the `tao` event loop) so that `WM_HOTKEY` is dispatched on
/// Windows. Dropping it releases every binding.
pub struct HotkeyRegistry {
    manager: GlobalHotKeyManager,
    bound: HashMap<HotkeyBinding, HotKey>,
}

impl HotkeyRegistry {
    /// Create the platform manager.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            manager,
            bound: HashMap::new(),
        })
    }

    /// Bind `binding` globally and return the id its presses carry.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn register(&mut self, binding: &HotkeyBinding) -> AppResult<u32> {
        if let Some(existing) = self.bound.get(binding) {
            debug!(hotkey = %binding, "Hotkey already bound");
            return Ok(existing.id());
        }

        let hotkey = parse_accelerator(binding)?;

        self.manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register {}: {}", binding, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.bound.insert(binding.clone(), hotkey);
        info!(hotkey = %binding, id = hotkey.id(), "Global hotkey registered");

        Ok(hotkey.id())
    }

    /// Release `binding` and return the id it had.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn unregister(&mut self, binding: &HotkeyBinding) -> AppResult<u32> {
        let Some(hotkey) = self.bound.remove(binding) else {
            return Err(AppError::HotkeyRegistrationFailed {
                reason: format!("{} is not registered", binding),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        self.manager
            .unregister(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to unregister {}: {}", binding, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = %binding, "Global hotkey unregistered");

        Ok(hotkey.id())
    }
}

/// Translate a validated binding into the platform hotkey type.
#[track_caller]
pub fn parse_accelerator(binding: &HotkeyBinding) -> AppResult<HotKey> {
    HotKey::from_str(binding.as_str()).map_err(|e| AppError::HotkeyRegistrationFailed {
        reason: format!("Unrecognised accelerator {}: {}", binding, e),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Forwards presses of registered stop hotkeys to the app loop.
pub struct HotkeyHandler {
    active: ActiveHotkeys,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Create a forwarder for ids tracked in `active`.
    pub fn new(active: ActiveHotkeys, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { active, command_tx }
    }

    /// Run until a shutdown signal is received.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Blocking recv on the crossbeam receiver; ends when event_rx drops.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    self.handle_event(event).await?;
                }
            }
        }

        drop(event_rx);

        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    /// Send a stop for a press of an active stop hotkey; ignore the rest.
    pub(crate) async fn handle_event(&self, event: GlobalHotKeyEvent) -> AppResult<()> {
        if event.state != HotKeyState::Pressed || !self.active.contains(event.id) {
            return Ok(());
        }

        self.command_tx
            .send(AppCommand::StopSession {
                trigger: StopTrigger::Hotkey,
            })
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send StopSession: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(id = event.id, "Stop hotkey pressed");

        Ok(())
    }
}
