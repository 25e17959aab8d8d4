//! In-memory stand-ins for the platform collaborators.

use crate::{
    CaptureRequest, CapturePipeline, CoreResult, EncodingProbe, HotkeyBinding, HotkeyRegistrar,
    MediaFormat, ProgressSurface, ProgressUpdate, RecorderError, SourceDescriptor,
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use error_location::ErrorLocation;
use tokio::sync::mpsc;

/// Pipeline that emits a fixed list of chunks and closes on finalize.
pub(crate) struct ScriptedPipeline {
    pub(crate) chunks: Vec<Vec<u8>>,
    pub(crate) fail_start: bool,
    pub(crate) starts: Arc<AtomicUsize>,
    pub(crate) finalizes: Arc<AtomicUsize>,
    pub(crate) last_format: Arc<Mutex<Option<MediaFormat>>>,
    tx: Option<mpsc::Sender<Vec<u8>>>,
}

impl ScriptedPipeline {
    pub(crate) fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks,
            fail_start: false,
            starts: Arc::new(AtomicUsize::new(0)),
            finalizes: Arc::new(AtomicUsize::new(0)),
            last_format: Arc::new(Mutex::new(None)),
            tx: None,
        }
    }
}

#[async_trait::async_trait]
impl CapturePipeline for ScriptedPipeline {
    async fn start(&mut self, request: &CaptureRequest) -> CoreResult<mpsc::Receiver<Vec<u8>>> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(RecorderError::Pipeline {
                reason: "scripted start failure".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Ok(mut last) = self.last_format.lock() {
            *last = Some(request.format);
        }

        let (tx, rx) = mpsc::channel(self.chunks.len().max(1) + 1);
        for chunk in &self.chunks {
            let _ = tx.try_send(chunk.clone());
        }
        self.tx = Some(tx);
        Ok(rx)
    }

    async fn finalize(&mut self) -> CoreResult<()> {
        self.finalizes.fetch_add(1, Ordering::SeqCst);
        self.tx = None;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.tx.is_some()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Probe backed by an allow-list.
pub(crate) struct ListProbe(pub(crate) Vec<MediaFormat>);

impl EncodingProbe for ListProbe {
    fn supports(&self, format: &MediaFormat) -> bool {
        self.0.contains(format)
    }
}

/// Probe that accepts everything.
pub(crate) struct AnyProbe;

impl EncodingProbe for AnyProbe {
    fn supports(&self, _format: &MediaFormat) -> bool {
        true
    }
}

/// Registrar that records calls and can be told to fail.
#[derive(Default)]
pub(crate) struct CountingRegistrar {
    pub(crate) registered: AtomicUsize,
    pub(crate) unregistered: AtomicUsize,
    pub(crate) fail_register: AtomicBool,
}

#[async_trait::async_trait]
impl HotkeyRegistrar for CountingRegistrar {
    async fn register(&self, binding: &HotkeyBinding) -> CoreResult<()> {
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(RecorderError::Hotkey {
                reason: format!("{} is taken", binding),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.registered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unregister(&self, _binding: &HotkeyBinding) -> CoreResult<()> {
        self.unregistered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Surface that keeps every delivered update.
#[derive(Default)]
pub(crate) struct MemorySurface {
    pub(crate) open: AtomicBool,
    pub(crate) shows: AtomicUsize,
    pub(crate) updates: Mutex<Vec<ProgressUpdate>>,
    pub(crate) fail_show: AtomicBool,
}

impl MemorySurface {
    pub(crate) fn update_count(&self) -> usize {
        self.updates.lock().map(|u| u.len()).unwrap_or(0)
    }
}

impl ProgressSurface for MemorySurface {
    fn show(&self) -> CoreResult<()> {
        if self.fail_show.load(Ordering::SeqCst) {
            return Err(RecorderError::Surface {
                reason: "surface unavailable".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.shows.fetch_add(1, Ordering::SeqCst);
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn push(&self, update: &ProgressUpdate) -> bool {
        if !self.open.load(Ordering::SeqCst) {
            return false;
        }
        match self.updates.lock() {
            Ok(mut updates) => {
                updates.push(update.clone());
                true
            }
            Err(_) => false,
        }
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

pub(crate) fn screen_source() -> SourceDescriptor {
    SourceDescriptor {
        id: "screen:0".to_string(),
        name: "Primary Display".to_string(),
        thumbnail: None,
    }
}
