//! Screen Recorder: tray-driven screen capture to disk with a global stop
//! hotkey, live progress and a SHA-256 fingerprint of every recording.

mod app;
mod app_command;
mod config;
mod error;
mod ffmpeg;
mod finished_report;
mod hotkey_handler;
mod hotkey_registrar;
mod notifier;
mod save_path;
mod sources;
#[cfg(test)]
mod tests;
mod tray_icon_state;
mod tray_manager;
mod tray_surface;
mod ui_command;
mod ui_handle;

pub(crate) use {
    app::App,
    app_command::{AppCommand, StopTrigger},
    error::{AppError, Result as AppResult},
    finished_report::{FinishedReport, finished_tooltip},
    hotkey_handler::{HotkeyHandler, HotkeyRegistry},
    hotkey_registrar::{ActiveHotkeys, UiHotkeyRegistrar},
    save_path::SavePathPolicy,
    sources::MonitorSources,
    tray_icon_state::TrayIconState,
    tray_manager::{TrayManager, TrayMenuIds},
    tray_surface::TraySurface,
    ui_command::UiCommand,
    ui_handle::UiHandle,
};

use crate::{
    config::Config,
    ffmpeg::{FfmpegPipeline, FfmpegProbe},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use screen_recorder_core::{CoreResult, HotkeyBinding, RecorderError, SessionController};
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "screen_recorder=debug,screen_recorder_core=debug";

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let event_loop = EventLoopBuilder::<UiCommand>::with_user_event().build();
    let ui = UiHandle::new(event_loop.create_proxy());

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Dropping the registry releases every global hotkey.
    let mut hotkeys: Option<HotkeyRegistry> = None;

    event_loop.run(move |event, target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => match cmd {
                UiCommand::SetState(state) => {
                    if let Err(e) = tray_manager.update_state(state) {
                        error!(error = ?e, "Failed to update tray icon");
                    }
                }
                UiCommand::ShowProgress => tray_manager.show_progress(),
                UiCommand::Progress(update) => {
                    if let Err(e) = tray_manager.update_progress(&update) {
                        error!(error = ?e, "Failed to show progress");
                    }
                }
                UiCommand::HideProgress => {
                    if let Err(e) = tray_manager.hide_progress() {
                        error!(error = ?e, "Failed to hide progress");
                    }
                }
                UiCommand::RegisterHotkey { binding, reply } => {
                    let result = with_registry(&mut hotkeys, &binding, HotkeyRegistry::register);
                    let _ = reply.send(result);
                }
                UiCommand::UnregisterHotkey { binding, reply } => {
                    let result = with_registry(&mut hotkeys, &binding, HotkeyRegistry::unregister);
                    let _ = reply.send(result);
                }
                UiCommand::SessionFinished { path, summary } => {
                    if let Err(e) = tray_manager.show_finished(&path, &summary) {
                        error!(error = ?e, "Failed to show finished recording");
                    }
                }
                UiCommand::Shutdown => {
                    hotkeys = None;
                    *control_flow = ControlFlow::ExitWithCode(0);
                }
            },
            Event::NewEvents(StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                // Registered on the main thread: tao's event loop pumps the
                // messages needed for WM_HOTKEY delivery.
                hotkeys = match HotkeyRegistry::new() {
                    Ok(registry) => Some(registry),
                    Err(e) => {
                        error!(error = ?e, "Global hotkeys unavailable, stop from the tray");
                        None
                    }
                };

                let screens = Arc::new(MonitorSources::from_monitors(target.available_monitors()));

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let ui = ui.clone();
                let menu = tray_manager.menu_ids().clone();

                // Spawn tokio runtime on separate thread.
                // TrayManager and the hotkey registry stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(run_app(config, screens, ui, menu));
                });
            }
            _ => {}
        }
    });
}

/// Build the session stack and run the app and hotkey loops to completion.
async fn run_app(config: Config, screens: Arc<MonitorSources>, ui: UiHandle, menu: TrayMenuIds) {
    let probe = Arc::new(FfmpegProbe::detect(&config.ffmpeg.binary).await);
    let active_hotkeys = ActiveHotkeys::default();

    let pipeline = FfmpegPipeline::new(
        config.ffmpeg.binary.clone(),
        config.ffmpeg.audio_input.clone(),
        Arc::clone(&probe),
        Arc::clone(&screens),
    );
    let controller = SessionController::new(
        Box::new(pipeline),
        probe.clone(),
        Arc::new(UiHotkeyRegistrar::new(ui.clone(), active_hotkeys.clone())),
        Arc::new(TraySurface::new(ui.clone())),
    );

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let hotkey_handler = HotkeyHandler::new(active_hotkeys, command_tx.clone());

    let app = App {
        controller,
        probe,
        sources: screens,
        save_paths: SavePathPolicy::new(config.output.directory.clone()),
        ui,
        config,
        command_tx,
        command_rx,
        shutdown_tx,
        menu,
    };

    tokio::join!(
        async {
            if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                error!(error = ?e, "Hotkey handler error");
            }
        },
        async {
            if let Err(e) = app.run().await {
                error!(error = ?e, "App error");
            }
        }
    );
}

/// Run a registry operation and convert the result for the async side.
#[track_caller]
fn with_registry(
    registry: &mut Option<HotkeyRegistry>,
    binding: &HotkeyBinding,
    op: fn(&mut HotkeyRegistry, &HotkeyBinding) -> AppResult<u32>,
) -> CoreResult<u32> {
    let Some(registry) = registry.as_mut() else {
        return Err(RecorderError::Hotkey {
            reason: "global hotkeys are unavailable on this system".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    };

    op(registry, binding).map_err(|e| RecorderError::Hotkey {
        reason: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}
