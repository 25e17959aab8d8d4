use crate::{
    CoreResult, RecorderError,
    encoding::{EncodingProbe, select_encoding},
    hashing::{self, HashResult},
    hotkey::HotkeyRegistrar,
    pipeline::{CapturePipeline, CaptureRequest},
    progress::{PROGRESS_INTERVAL, ProgressReporter, ProgressSnapshot, ProgressSurface},
    session::{FinalizedSession, SessionInfo, SessionRequest, StopOutcome, WriterSummary, writer},
    sink::{SinkHandle, WriteSink},
};

use std::{
    panic::Location,
    sync::Arc,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Upper bound on waiting for the writer to drain after the pipeline is
/// finalized. A backend that never closes its channel must not hang stop.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

struct ActiveSession {
    info: SessionInfo,
    handle: SinkHandle,
    writer: JoinHandle<WriterSummary>,
    reporter: ProgressReporter,
}

/// Owns the single recording session and everything tied to it.
///
/// While a session is active, exactly one sink is open, the progress
/// reporter is ticking, the surface is shown and the stop hotkey (if any)
/// is registered. `start_session` sets all of these up or none of them;
/// `stop_session` tears all of them down exactly once.
///
/// # Serialization
///
/// Both operations take `&mut self`, so callers that share the controller
/// put it behind one async mutex or drive it from a single command loop.
/// A stop issued while a start is in flight runs after the start has either
/// completed or rolled back.
pub struct SessionController {
    sink: Arc<Mutex<WriteSink>>,
    pipeline: Box<dyn CapturePipeline>,
    probe: Arc<dyn EncodingProbe>,
    hotkeys: Arc<dyn HotkeyRegistrar>,
    surface: Arc<dyn ProgressSurface>,
    progress_interval: Duration,
    session: Option<ActiveSession>,
}

impl SessionController {
    /// Creates an idle controller.
    pub fn new(
        pipeline: Box<dyn CapturePipeline>,
        probe: Arc<dyn EncodingProbe>,
        hotkeys: Arc<dyn HotkeyRegistrar>,
        surface: Arc<dyn ProgressSurface>,
    ) -> Self {
        Self {
            sink: Arc::new(Mutex::new(WriteSink::new())),
            pipeline,
            probe,
            hotkeys,
            surface,
            progress_interval: PROGRESS_INTERVAL,
            session: None,
        }
    }

    /// Overrides the progress cadence.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Whether a session is active.
    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// The active session, if any.
    pub fn active_session(&self) -> Option<&SessionInfo> {
        self.session.as_ref().map(|s| &s.info)
    }

    /// Current progress of the active session.
    pub async fn progress_snapshot(&self) -> Option<ProgressSnapshot> {
        match &self.session {
            Some(active) => {
                Some(
                    ProgressReporter::snapshot(&self.sink, &active.handle, active.info.started_at)
                        .await,
                )
            }
            None => None,
        }
    }

    /// Starts a recording session.
    ///
    /// In order: select encoding, open the sink, start the pipeline and the
    /// chunk writer, stamp the start time, register the hotkey, show the
    /// surface, start the reporter. A failing step rolls back the ones
    /// before it.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRecording` if a session is active (the active session
    /// is left untouched), `UnsupportedEncoding`, `AlreadyOpen`/`Io` from
    /// the sink, or errors from the pipeline, hotkey registry or surface.
    #[instrument(skip(self, request), fields(path = ?request.target_path))]
    pub async fn start_session(&mut self, request: SessionRequest) -> CoreResult<SessionInfo> {
        if let Some(active) = &self.session {
            warn!(
                session_id = %active.info.session_id,
                "Start rejected, a session is already active"
            );
            return Err(RecorderError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let format = select_encoding(self.probe.as_ref(), request.format)?;

        let handle = self.sink.lock().await.open(&request.target_path).await?;

        let capture = CaptureRequest {
            source: request.source.clone(),
            format,
            options: request.capture,
        };
        let chunks = match self.pipeline.start(&capture).await {
            Ok(rx) => rx,
            Err(e) => {
                error!(error = ?e, "Capture pipeline failed to start");
                self.close_sink_quietly(&handle).await;
                return Err(e);
            }
        };
        let writer = writer::spawn(Arc::clone(&self.sink), handle.clone(), chunks);

        let started_at = Instant::now();

        if let Some(binding) = &request.hotkey {
            if let Err(e) = self.hotkeys.register(binding).await {
                error!(hotkey = %binding, error = ?e, "Stop hotkey registration failed");
                self.abort_capture(&handle, writer).await;
                return Err(e);
            }
        }

        if let Err(e) = self.surface.show() {
            error!(error = ?e, "Progress surface failed to open");
            if let Some(binding) = &request.hotkey {
                if let Err(e) = self.hotkeys.unregister(binding).await {
                    warn!(hotkey = %binding, error = ?e, "Hotkey rollback failed");
                }
            }
            self.abort_capture(&handle, writer).await;
            return Err(e);
        }

        let reporter = ProgressReporter::start(
            Arc::clone(&self.surface),
            Arc::clone(&self.sink),
            handle.clone(),
            started_at,
            self.progress_interval,
        );

        let info = SessionInfo {
            session_id: Uuid::new_v4(),
            path: request.target_path,
            format,
            source: request.source,
            hotkey: request.hotkey,
            started_at,
        };

        info!(
            session_id = %info.session_id,
            path = ?info.path,
            format = %info.format,
            source = %info.source,
            backend = self.pipeline.name(),
            "Recording started"
        );

        self.session = Some(ActiveSession {
            info: info.clone(),
            handle,
            writer,
            reporter,
        });

        Ok(info)
    }

    /// Stops the active session and finalizes the file.
    ///
    /// Unregisters the hotkey, stops the reporter, closes the surface,
    /// finalizes the pipeline, drains the writer, closes the sink and only
    /// then hashes the file. Hash and close failures are reported in
    /// [`FinalizedSession::hash`]; the session counts as stopped either way.
    /// Calling this with no active session returns
    /// [`StopOutcome::NotRecording`].
    #[instrument(skip(self))]
    pub async fn stop_session(&mut self) -> StopOutcome {
        let Some(active) = self.session.take() else {
            info!("Stop requested but no session is active");
            return StopOutcome::NotRecording;
        };

        let ActiveSession {
            info,
            handle,
            mut writer,
            reporter,
        } = active;
        let session_id = info.session_id;

        if let Some(binding) = &info.hotkey {
            if let Err(e) = self.hotkeys.unregister(binding).await {
                warn!(session_id = %session_id, hotkey = %binding, error = ?e, "Failed to unregister stop hotkey");
            }
        }

        let ticks = reporter.stop().await;
        self.surface.close();
        debug!(session_id = %session_id, ticks, "Progress reporting stopped");

        if let Err(e) = self.pipeline.finalize().await {
            error!(session_id = %session_id, error = ?e, "Capture pipeline did not finalize cleanly");
        }

        match tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await {
            Ok(Ok(summary)) => {
                if let Some(reason) = &summary.error {
                    warn!(session_id = %session_id, reason = %reason, "Recording has dropped chunks");
                }
            }
            Ok(Err(e)) => error!(session_id = %session_id, error = ?e, "Chunk writer task panicked"),
            Err(_) => {
                writer.abort();
                error!(session_id = %session_id, "Chunk writer did not drain in time, aborted");
            }
        }

        let (accepted, closed) = {
            let mut sink = self.sink.lock().await;
            let accepted = sink.bytes_written(&handle).unwrap_or(0);
            (accepted, sink.close(&handle).await)
        };
        let (bytes_written, hash) = match closed {
            Ok(bytes) => (bytes, hashing::hash_result(&info.path).await),
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to close write sink");
                (accepted, HashResult::Failed(e.to_string()))
            }
        };

        let duration = info.started_at.elapsed();

        match &hash {
            HashResult::Digest(digest) => info!(
                session_id = %session_id,
                path = ?info.path,
                duration_ms = duration.as_millis(),
                bytes_written,
                digest = %digest,
                "Recording finalized"
            ),
            HashResult::Failed(reason) => warn!(
                session_id = %session_id,
                path = ?info.path,
                duration_ms = duration.as_millis(),
                bytes_written,
                reason = %reason,
                "Recording finalized without hash"
            ),
        }

        StopOutcome::Finalized(FinalizedSession {
            session_id,
            path: info.path,
            format: info.format,
            duration,
            bytes_written,
            hash,
        })
    }

    /// Stops any active session and flushes every sink. Used on exit.
    #[instrument(skip(self))]
    pub async fn shutdown(&mut self) -> StopOutcome {
        let outcome = self.stop_session().await;
        self.sink.lock().await.close_all().await;
        outcome
    }

    async fn abort_capture(&mut self, handle: &SinkHandle, mut writer: JoinHandle<WriterSummary>) {
        if let Err(e) = self.pipeline.finalize().await {
            warn!(error = ?e, "Pipeline finalize failed during rollback");
        }
        if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer)
            .await
            .is_err()
        {
            writer.abort();
        }
        self.close_sink_quietly(handle).await;
    }

    async fn close_sink_quietly(&self, handle: &SinkHandle) {
        if let Err(e) = self.sink.lock().await.close(handle).await {
            warn!(path = ?handle.path(), error = ?e, "Sink close failed during rollback");
        }
    }
}
