use crate::sink::{SinkHandle, WriteSink};

use std::sync::Arc;

use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};
use tracing::{debug, error, info};

/// What the chunk writer did over a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterSummary {
    /// Chunks received from the pipeline.
    pub chunks: u64,
    /// Bytes successfully handed to the sink.
    pub bytes: u64,
    /// First write failure, if any.
    pub error: Option<String>,
}

/// Spawns the single writer for a session.
///
/// Chunks are written one at a time in receive order. After the first
/// failure the remaining chunks are drained and dropped so the backend
/// never blocks on a full channel.
pub(crate) fn spawn(
    sink: Arc<Mutex<WriteSink>>,
    handle: SinkHandle,
    mut chunks: mpsc::Receiver<Vec<u8>>,
) -> JoinHandle<WriterSummary> {
    tokio::spawn(async move {
        let mut summary = WriterSummary::default();

        while let Some(chunk) = chunks.recv().await {
            summary.chunks += 1;
            if chunk.is_empty() || summary.error.is_some() {
                continue;
            }

            let result = sink.lock().await.write(&handle, &chunk).await;
            match result {
                Ok(()) => summary.bytes += chunk.len() as u64,
                Err(e) => {
                    error!(path = ?handle.path(), error = ?e, "Chunk write failed, dropping the rest");
                    summary.error = Some(e.to_string());
                }
            }

            if summary.chunks.is_multiple_of(100) {
                debug!(chunks = summary.chunks, bytes = summary.bytes, "Writer progress");
            }
        }

        info!(
            chunks = summary.chunks,
            bytes = summary.bytes,
            "Chunk stream ended"
        );

        summary
    })
}
