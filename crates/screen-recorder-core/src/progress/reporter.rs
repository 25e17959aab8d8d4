use crate::{
    progress::{ProgressSnapshot, ProgressSurface},
    sink::{SinkHandle, WriteSink},
};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, instrument, trace, warn};

/// Cadence of progress pushes while recording.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on waiting for the tick task to wind down.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Periodic task that mirrors elapsed time and file size to a
/// [`ProgressSurface`].
///
/// The size is the byte count the sink has accepted, buffered bytes
/// included, so it moves with every chunk rather than with disk flushes.
///
/// The first push happens immediately on start. Stopping is observed at the
/// next loop iteration, never in the middle of a tick.
pub struct ProgressReporter {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl ProgressReporter {
    /// Spawns the tick task on the current tokio runtime.
    #[instrument(skip(surface, sink))]
    pub fn start(
        surface: Arc<dyn ProgressSurface>,
        sink: Arc<Mutex<WriteSink>>,
        sink_handle: SinkHandle,
        started_at: Instant,
        period: Duration,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u64 = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        Self::tick(surface.as_ref(), &sink, &sink_handle, started_at).await;
                        ticks += 1;
                    }
                }
            }

            debug!(ticks, "Progress ticker stopped");
            ticks
        });

        info!(period_ms = period.as_millis(), "Progress reporter started");

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signals the task to stop and waits for it to finish.
    ///
    /// Returns the number of ticks executed.
    #[instrument(skip(self))]
    pub async fn stop(self) -> u64 {
        if self.shutdown_tx.send(true).is_err() {
            debug!("Progress ticker already exited");
        }

        match tokio::time::timeout(STOP_TIMEOUT, self.handle).await {
            Ok(Ok(ticks)) => ticks,
            Ok(Err(e)) => {
                warn!(error = ?e, "Progress ticker task panicked");
                0
            }
            Err(_) => {
                warn!("Progress ticker did not stop within timeout");
                0
            }
        }
    }

    /// Builds a snapshot for the file behind `handle` as of now.
    ///
    /// Falls back to the on-disk size once the handle is no longer open.
    pub async fn snapshot(
        sink: &Mutex<WriteSink>,
        handle: &SinkHandle,
        started_at: Instant,
    ) -> ProgressSnapshot {
        let accepted = sink.lock().await.bytes_written(handle);
        let file_size_bytes = match accepted {
            Some(bytes) => bytes,
            None => WriteSink::current_size(handle.path()).await,
        };

        ProgressSnapshot {
            duration_seconds: started_at.elapsed().as_secs(),
            file_size_bytes,
        }
    }

    async fn tick(
        surface: &dyn ProgressSurface,
        sink: &Mutex<WriteSink>,
        handle: &SinkHandle,
        started_at: Instant,
    ) {
        let snapshot = Self::snapshot(sink, handle, started_at).await;
        let update = snapshot.to_update();

        if surface.push(&update) {
            trace!(
                duration = %update.duration_text,
                size = %update.size_text,
                "Progress pushed"
            );
        } else {
            trace!("Progress surface closed, skipping push");
        }
    }
}
