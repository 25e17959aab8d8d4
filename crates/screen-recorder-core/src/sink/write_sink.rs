use crate::{CoreResult, RecorderError};

use std::{
    collections::HashMap,
    io::ErrorKind,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tokio::{
    fs::{self, File},
    io::{AsyncWriteExt, BufWriter},
};
use tracing::{debug, error, info, instrument};

/// Buffer in front of each open file. Encoder chunks arrive every few
/// hundred milliseconds and are typically tens of kilobytes.
const SINK_BUFFER_CAPACITY: usize = 1024 * 1024;

/// Identifies one opening of a path.
///
/// Every open draws a fresh generation, so a handle kept from an earlier
/// recording of the same path can never write into the newer file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SinkHandle {
    path: PathBuf,
    generation: u64,
}

impl SinkHandle {
    /// Path this handle writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

struct OpenSink {
    generation: u64,
    writer: BufWriter<File>,
    bytes_written: u64,
}

/// Registry of append-only destinations for encoded chunks, keyed by path.
///
/// At most one handle per path is open at a time. Closing removes the path,
/// so the registry only ever holds live files. Closing twice, or writing
/// through a closed or stale handle, fails with `NotOpen`.
#[derive(Default)]
pub struct WriteSink {
    open: HashMap<PathBuf, OpenSink>,
    next_generation: u64,
}

impl WriteSink {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates (or truncates) the file at `path` and opens it for appending.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyOpen` if `path` already has an open handle, or `Io`
    /// if the file cannot be created.
    #[instrument(skip(self))]
    pub async fn open(&mut self, path: &Path) -> CoreResult<SinkHandle> {
        let location = Location::caller();

        if self.open.contains_key(path) {
            return Err(RecorderError::AlreadyOpen {
                path: path.to_path_buf(),
                location: ErrorLocation::from(location),
            });
        }

        let file = File::create(path).await.map_err(|e| RecorderError::Io {
            path: path.to_path_buf(),
            source: e,
            location: ErrorLocation::from(location),
        })?;

        self.next_generation += 1;
        let generation = self.next_generation;
        self.open.insert(
            path.to_path_buf(),
            OpenSink {
                generation,
                writer: BufWriter::with_capacity(SINK_BUFFER_CAPACITY, file),
                bytes_written: 0,
            },
        );

        info!(path = ?path, generation, "Write sink opened");

        Ok(SinkHandle {
            path: path.to_path_buf(),
            generation,
        })
    }

    /// Appends `bytes` to the sink behind `handle`.
    ///
    /// Chunks land in the file in call order.
    ///
    /// # Errors
    ///
    /// Returns `NotOpen` for unknown, closed or stale handles and `Io` if
    /// the write fails.
    pub async fn write(&mut self, handle: &SinkHandle, bytes: &[u8]) -> CoreResult<()> {
        let location = Location::caller();

        match self.open.get_mut(&handle.path) {
            Some(OpenSink {
                generation,
                writer,
                bytes_written,
            }) if *generation == handle.generation => {
                writer
                    .write_all(bytes)
                    .await
                    .map_err(|e| RecorderError::Io {
                        path: handle.path.clone(),
                        source: e,
                        location: ErrorLocation::from(location),
                    })?;
                *bytes_written += bytes.len() as u64;
                Ok(())
            }
            _ => Err(RecorderError::NotOpen {
                path: handle.path.clone(),
                location: ErrorLocation::from(location),
            }),
        }
    }

    /// Flushes and syncs the file, then releases it.
    ///
    /// Resolves only once the data is on disk, so the final size and hash
    /// can be read right after. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `NotOpen` if the handle is not open (including a second
    /// close), or `Io` if flushing fails. The path is released either way.
    #[instrument(skip(self))]
    pub async fn close(&mut self, handle: &SinkHandle) -> CoreResult<u64> {
        let location = Location::caller();

        let OpenSink {
            writer,
            bytes_written,
            ..
        } = match self.open.remove(&handle.path) {
            Some(slot) if slot.generation == handle.generation => slot,
            other => {
                if let Some(slot) = other {
                    self.open.insert(handle.path.clone(), slot);
                }
                return Err(RecorderError::NotOpen {
                    path: handle.path.clone(),
                    location: ErrorLocation::from(location),
                });
            }
        };

        Self::finish(&handle.path, writer)
            .await
            .map_err(|e| RecorderError::Io {
                path: handle.path.clone(),
                source: e,
                location: ErrorLocation::from(location),
            })?;

        info!(path = ?handle.path, bytes_written, "Write sink closed");

        Ok(bytes_written)
    }

    /// Flushes every open sink. Used on process teardown; failures are
    /// logged, not returned.
    #[instrument(skip(self))]
    pub async fn close_all(&mut self) {
        let open: Vec<SinkHandle> = self
            .open
            .iter()
            .map(|(path, slot)| SinkHandle {
                path: path.clone(),
                generation: slot.generation,
            })
            .collect();
        debug!(count = open.len(), "Closing open sinks");

        for handle in open {
            if let Err(e) = self.close(&handle).await {
                error!(path = ?handle.path, error = ?e, "Failed to close sink on teardown");
            }
        }
    }

    /// Whether `path` currently has an open handle.
    pub fn is_open(&self, path: &Path) -> bool {
        self.open.contains_key(path)
    }

    /// Number of paths currently open.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Bytes accepted through `handle` so far, including buffered bytes.
    ///
    /// `None` once the handle is closed or stale.
    pub fn bytes_written(&self, handle: &SinkHandle) -> Option<u64> {
        self.open
            .get(&handle.path)
            .filter(|slot| slot.generation == handle.generation)
            .map(|slot| slot.bytes_written)
    }

    /// Best-effort size of the file on disk.
    ///
    /// Returns 0 when the file cannot be read yet (not created, mid-close,
    /// permission hiccup). Progress display must never fail on this.
    pub async fn current_size(path: &Path) -> u64 {
        match fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    debug!(path = ?path, error = %e, "File size unavailable");
                }
                0
            }
        }
    }

    async fn finish(path: &Path, mut writer: BufWriter<File>) -> std::io::Result<()> {
        writer.flush().await?;
        let mut file = writer.into_inner();
        file.flush().await?;
        file.sync_all().await?;
        debug!(path = ?path, "Sink flushed to disk");
        Ok(())
    }
}
