use crate::{
    ffmpeg::{CaptureBackend, FfmpegCommandBuilder, FfmpegProbe, resolve_audio_input},
    sources::MonitorSources,
};

use std::{panic::Location, process::Stdio, sync::Arc, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use screen_recorder_core::{CapturePipeline, CaptureRequest, CoreResult, RecorderError};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    process::{Child, ChildStderr, ChildStdout, Command},
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

const READ_CHUNK_SIZE: usize = 64 * 1024;
const CHUNK_CHANNEL_CAPACITY: usize = 64;
const FINALIZE_TIMEOUT: Duration = Duration::from_secs(5);

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Capture pipeline that runs ffmpeg and streams its stdout as chunks.
///
/// Finalizing sends `q` on stdin so ffmpeg writes the trailer and exits;
/// the chunk channel closes when stdout reaches EOF.
pub struct FfmpegPipeline {
    binary: String,
    audio_input: Option<String>,
    backend: CaptureBackend,
    probe: Arc<FfmpegProbe>,
    screens: Arc<MonitorSources>,
    child: Option<Child>,
    pumps: Vec<JoinHandle<()>>,
}

impl FfmpegPipeline {
    /// Create an idle pipeline.
    pub fn new(
        binary: impl Into<String>,
        audio_input: Option<String>,
        probe: Arc<FfmpegProbe>,
        screens: Arc<MonitorSources>,
    ) -> Self {
        Self {
            binary: binary.into(),
            audio_input,
            backend: CaptureBackend::current(),
            probe,
            screens,
            child: None,
            pumps: Vec::new(),
        }
    }

    #[track_caller]
    fn command_args(&self, request: &CaptureRequest) -> CoreResult<Vec<String>> {
        let screen = self.screens.geometry(&request.source.id).ok_or_else(|| {
            RecorderError::Source {
                reason: format!("unknown source {}", request.source.id),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let encoder = self.probe.video_encoder(request.format.codec).ok_or_else(|| {
            RecorderError::UnsupportedEncoding {
                requested: request.format.mime_type(),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let audio = resolve_audio_input(
            self.backend,
            self.audio_input.as_deref(),
            request.options.audio,
        );
        if request.options.audio && audio.is_none() {
            warn!("No audio input configured for this platform, recording video only");
        }

        let mut builder = FfmpegCommandBuilder::new(self.backend, screen, request.format, encoder)
            .with_frame_rate(request.options.frame_rate)
            .with_audio_input(audio);
        if let Ok(display) = std::env::var("DISPLAY") {
            builder = builder.with_display(display);
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl CapturePipeline for FfmpegPipeline {
    #[instrument(skip(self, request), fields(source = %request.source, format = %request.format))]
    async fn start(&mut self, request: &CaptureRequest) -> CoreResult<mpsc::Receiver<Vec<u8>>> {
        if self.child.is_some() {
            return Err(RecorderError::Pipeline {
                reason: "ffmpeg is already running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let args = self.command_args(request)?;
        debug!(binary = %self.binary, args = ?args, "Spawning ffmpeg");

        let mut command = Command::new(&self.binary);
        command
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let mut child = command.spawn().map_err(|e| RecorderError::Pipeline {
            reason: format!("failed to spawn {}: {}", self.binary, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill().await;
            return Err(RecorderError::Pipeline {
                reason: "ffmpeg stdout was not captured".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
        self.pumps.push(tokio::spawn(pump_stdout(stdout, chunk_tx)));
        if let Some(stderr) = child.stderr.take() {
            self.pumps.push(tokio::spawn(log_stderr(stderr)));
        }

        info!(pid = child.id(), "ffmpeg started");
        self.child = Some(child);

        Ok(chunk_rx)
    }

    #[instrument(skip(self))]
    async fn finalize(&mut self) -> CoreResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(b"q").await {
                debug!(error = %e, "ffmpeg stdin already closed");
            }
            let _ = stdin.flush().await;
        }

        let result = match tokio::time::timeout(FINALIZE_TIMEOUT, child.wait()).await {
            Ok(Ok(status)) if status.success() => {
                info!("ffmpeg exited cleanly");
                Ok(())
            }
            Ok(Ok(status)) => Err(RecorderError::Pipeline {
                reason: format!("ffmpeg exited with {}", status),
                location: ErrorLocation::from(Location::caller()),
            }),
            Ok(Err(e)) => Err(RecorderError::Pipeline {
                reason: format!("failed to wait for ffmpeg: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(_) => {
                warn!("ffmpeg did not exit in time, killing");
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill ffmpeg");
                }
                Err(RecorderError::Pipeline {
                    reason: format!("ffmpeg did not exit within {:?}", FINALIZE_TIMEOUT),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        };

        for pump in self.pumps.drain(..) {
            if let Err(e) = pump.await {
                warn!(error = ?e, "ffmpeg output task panicked");
            }
        }

        result
    }

    fn is_capturing(&self) -> bool {
        self.child.is_some()
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

async fn pump_stdout(mut stdout: ChildStdout, chunk_tx: mpsc::Sender<Vec<u8>>) {
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                total += n as u64;
                if chunk_tx.send(buf[..n].to_vec()).await.is_err() {
                    warn!("Chunk receiver dropped, discarding remaining ffmpeg output");
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read ffmpeg stdout");
                break;
            }
        }
    }

    debug!(bytes = total, "ffmpeg stdout closed");
}

async fn log_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        warn!(line = %line, "ffmpeg");
    }
}
