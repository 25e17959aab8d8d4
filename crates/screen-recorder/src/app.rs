use crate::{
    AppCommand, AppError, AppResult, FinishedReport, SavePathPolicy, StopTrigger, TrayIconState,
    TrayMenuIds, UiCommand, UiHandle, config::Config, notifier,
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use screen_recorder_core::{
    EncodingProbe, FinalizedSession, RecorderError, SessionController, SessionRequest,
    SourceProvider, StopOutcome, select_encoding,
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};
use tray_icon::menu::MenuEvent;

/// Main application state.
///
/// Runs on the async runtime thread and owns the session controller, so
/// start and stop requests from the tray and the hotkey are handled one at
/// a time. Tray updates go back to the main thread through `ui`.
pub struct App {
    pub(crate) controller: SessionController,
    pub(crate) probe: Arc<dyn EncodingProbe>,
    pub(crate) sources: Arc<dyn SourceProvider>,
    pub(crate) save_paths: SavePathPolicy,
    pub(crate) ui: UiHandle,
    pub(crate) config: Config,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) menu: TrayMenuIds,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Screen Recorder starting");

        // MenuEvent::receiver() is a crossbeam receiver with blocking recv();
        // the task ends once tray_event_rx is dropped.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    if let Err(e) = self.handle_tray_event(event).await {
                        error!(error = ?e, "Failed to handle tray event");
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::StartSession => self.start_session().await,
                        AppCommand::StopSession { trigger } => self.stop_session(trigger).await,
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(tray_event_rx);

        if let StopOutcome::Finalized(done) = self.controller.shutdown().await {
            self.report_finished(&done).await;
        }

        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.shutdown_tx.send(true);
        self.ui.send(UiCommand::Shutdown);
        info!("Screen Recorder shut down successfully");

        Ok(())
    }

    /// Start a recording; failures are logged and shown as a notification.
    async fn start_session(&mut self) {
        match self.try_start_session().await {
            Ok(()) => {}
            Err(AppError::Recorder {
                source: RecorderError::AlreadyRecording { .. },
                ..
            }) => info!("Already recording, start ignored"),
            Err(e) => {
                error!(error = ?e, "Failed to start recording");
                notifier::notify("Recording failed to start".to_string(), e.to_string()).await;
            }
        }
    }

    #[instrument(skip(self))]
    async fn try_start_session(&mut self) -> AppResult<()> {
        let requested = self.config.media_format()?;
        let format = select_encoding(self.probe.as_ref(), requested)?;
        let hotkey = self.config.stop_hotkey()?;

        let sources = self.sources.sources()?;
        let index = self.config.capture.source_index;
        let source = match sources.get(index) {
            Some(source) => source.clone(),
            None => {
                warn!(index, available = sources.len(), "Configured source missing, using first");
                sources
                    .first()
                    .cloned()
                    .ok_or_else(|| RecorderError::Source {
                        reason: "no capturable sources".to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    })?
            }
        };

        let Some(target_path) = self.save_paths.choose(format.container) else {
            info!("Save location cancelled, not recording");
            return Ok(());
        };

        let request = SessionRequest {
            target_path,
            hotkey,
            source,
            format,
            capture: self.config.capture_options(),
        };

        let info = self.controller.start_session(request).await?;
        self.ui.send(UiCommand::SetState(TrayIconState::Recording));

        info!(
            session_id = %info.session_id,
            path = ?info.path,
            "Session running"
        );

        Ok(())
    }

    /// Stop the active recording, if any, and report the result.
    #[instrument(skip(self))]
    async fn stop_session(&mut self, trigger: StopTrigger) {
        if !self.controller.is_recording() {
            info!(trigger = %trigger, "Nothing to stop");
            return;
        }

        self.ui.send(UiCommand::SetState(TrayIconState::Finalizing));
        let outcome = self.controller.stop_session().await;
        // Idle first: the finished tooltip must outlive the state change.
        self.ui.send(UiCommand::SetState(TrayIconState::Idle));

        match outcome {
            StopOutcome::NotRecording => info!(trigger = %trigger, "Nothing to stop"),
            StopOutcome::Finalized(done) => {
                info!(trigger = %trigger, session_id = %done.session_id, "Session stopped");
                self.report_finished(&done).await;
            }
        }
    }

    async fn report_finished(&self, done: &FinalizedSession) {
        let report = FinishedReport::new(&done.path, done.bytes_written, done.duration, &done.hash);

        self.ui.send(UiCommand::SessionFinished {
            path: done.path.clone(),
            summary: report.summary,
        });

        notifier::notify(report.title, report.body).await;
    }

    /// Handle tray menu events.
    #[instrument(skip(self))]
    async fn handle_tray_event(&self, event: MenuEvent) -> AppResult<()> {
        let event_id = &event.id;

        if *event_id == self.menu.start {
            self.enqueue(AppCommand::StartSession).await?;
        } else if *event_id == self.menu.stop {
            self.enqueue(AppCommand::StopSession {
                trigger: StopTrigger::User,
            })
            .await?;
        } else if *event_id == self.menu.open_folder {
            self.open_recordings_folder()?;
        } else if *event_id == self.menu.exit {
            info!("Exit requested from tray menu");
            self.enqueue(AppCommand::Shutdown).await?;
        }

        Ok(())
    }

    async fn enqueue(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to queue command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    #[track_caller]
    fn open_recordings_folder(&self) -> AppResult<()> {
        let dir = self
            .save_paths
            .recordings_dir()
            .ok_or_else(|| AppError::UiError {
                reason: "No recordings directory".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        std::fs::create_dir_all(&dir)?;
        open::that(&dir)?;
        info!(dir = ?dir, "Opened recordings folder");

        Ok(())
    }
}
