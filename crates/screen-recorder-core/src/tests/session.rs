use crate::{
    CaptureOptions, Container, HashResult, HotkeyBinding, MediaFormat, ProgressSurface,
    RecorderError, SessionController, SessionRequest, StopOutcome, VideoCodec,
    tests::support::{
        AnyProbe, CountingRegistrar, ListProbe, MemorySurface, ScriptedPipeline, screen_source,
    },
};

use std::{
    path::{Path, PathBuf},
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

use sha2::{Digest, Sha256};

struct Harness {
    controller: SessionController,
    hotkeys: Arc<CountingRegistrar>,
    surface: Arc<MemorySurface>,
}

fn harness(pipeline: ScriptedPipeline) -> Harness {
    harness_with_probe(pipeline, Arc::new(AnyProbe))
}

fn harness_with_probe(
    pipeline: ScriptedPipeline,
    probe: Arc<dyn crate::EncodingProbe>,
) -> Harness {
    let hotkeys = Arc::new(CountingRegistrar::default());
    let surface = Arc::new(MemorySurface::default());
    let controller = SessionController::new(
        Box::new(pipeline),
        probe,
        hotkeys.clone(),
        surface.clone(),
    )
    .with_progress_interval(Duration::from_millis(20));

    Harness {
        controller,
        hotkeys,
        surface,
    }
}

#[allow(clippy::unwrap_used)]
fn request(path: &Path, hotkey: Option<&str>) -> SessionRequest {
    SessionRequest {
        target_path: path.to_path_buf(),
        hotkey: hotkey.map(|h| HotkeyBinding::parse(h).unwrap()),
        source: screen_source(),
        format: MediaFormat::default(),
        capture: CaptureOptions::default(),
    }
}

fn temp_target(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

/// WHAT: Full lifecycle writes every chunk and hashes the finished file
/// WHY: Core scenario: start -> 1000 bytes -> stop -> size and SHA-256 match
#[tokio::test]
#[allow(clippy::unwrap_used, clippy::panic)]
async fn given_thousand_byte_chunk_when_stopping_then_size_and_hash_match() {
    // Given: A pipeline that emits one 1000-byte chunk
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "a.mp4");
    let payload: Vec<u8> = (0..1000u32).map(|i| (i * 7 % 256) as u8).collect();
    let mut h = harness(ScriptedPipeline::new(vec![payload.clone()]));

    // When: Starting without a hotkey and stopping
    h.controller.start_session(request(&path, None)).await.unwrap();
    assert!(h.controller.is_recording());
    let outcome = h.controller.stop_session().await;

    // Then: The file holds exactly the chunk and the digest matches it
    let StopOutcome::Finalized(done) = outcome else {
        panic!("expected a finalized session");
    };
    assert_eq!(done.bytes_written, 1000);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 1000);
    assert_eq!(
        done.hash,
        HashResult::Digest(format!("{:x}", Sha256::digest(&payload)))
    );
    assert!(!h.controller.is_recording());
}

/// WHAT: Chunks from the pipeline land on disk in emission order
/// WHY: The writer task is the only writer per path
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_many_chunks_when_recording_then_file_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "ordered.webm");
    let chunks: Vec<Vec<u8>> = (0..50u8).map(|i| vec![i; (i as usize % 7) + 1]).collect();
    let expected: Vec<u8> = chunks.concat();
    let mut h = harness(ScriptedPipeline::new(chunks));

    h.controller.start_session(request(&path, None)).await.unwrap();
    let _ = h.controller.stop_session().await;

    assert_eq!(std::fs::read(&path).unwrap(), expected);
}

/// WHAT: Stop with no active session reports NotRecording
/// WHY: Stop must be safe to call at any time
#[tokio::test]
async fn given_idle_controller_when_stopping_then_not_recording() {
    let mut h = harness(ScriptedPipeline::new(vec![]));

    let outcome = h.controller.stop_session().await;

    assert!(matches!(outcome, StopOutcome::NotRecording));
    assert_eq!(h.hotkeys.unregistered.load(Ordering::SeqCst), 0);
}

/// WHAT: Second start fails and leaves the active session untouched
/// WHY: Only one session may exist process-wide
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_active_session_when_starting_again_then_already_recording() {
    // Given: An active session with a hotkey
    let dir = tempfile::tempdir().unwrap();
    let first = temp_target(&dir, "first.mp4");
    let second = temp_target(&dir, "second.mp4");
    let mut h = harness(ScriptedPipeline::new(vec![b"data".to_vec()]));
    let info = h
        .controller
        .start_session(request(&first, Some("CmdOrCtrl+Shift+F10")))
        .await
        .unwrap();

    // When: Starting a second session
    let result = h
        .controller
        .start_session(request(&second, Some("CmdOrCtrl+Shift+F11")))
        .await;

    // Then: It fails and the first session, timer and hotkey are unchanged
    assert!(matches!(result, Err(RecorderError::AlreadyRecording { .. })));
    let active = h.controller.active_session().unwrap();
    assert_eq!(active.session_id, info.session_id);
    assert_eq!(active.path, first);
    assert_eq!(h.hotkeys.registered.load(Ordering::SeqCst), 1);
    assert_eq!(h.hotkeys.unregistered.load(Ordering::SeqCst), 0);
    assert!(h.surface.is_open());
    assert!(!second.exists());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.surface.update_count() >= 2);

    let _ = h.controller.stop_session().await;
}

/// WHAT: Hotkey is registered on start and released exactly once on stop
/// WHY: Double stop must not double-unregister
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_hotkey_session_when_stopping_twice_then_unregistered_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "hk.mp4");
    let mut h = harness(ScriptedPipeline::new(vec![b"x".to_vec()]));
    h.controller
        .start_session(request(&path, Some("Alt+F9")))
        .await
        .unwrap();

    let first = h.controller.stop_session().await;
    let second = h.controller.stop_session().await;

    assert!(matches!(first, StopOutcome::Finalized(_)));
    assert!(matches!(second, StopOutcome::NotRecording));
    assert_eq!(h.hotkeys.registered.load(Ordering::SeqCst), 1);
    assert_eq!(h.hotkeys.unregistered.load(Ordering::SeqCst), 1);
    assert!(!h.surface.is_open());
}

/// WHAT: Surface is shown on start, gets an initial update, and closes on stop
/// WHY: Overlay lifetime is tied to the session
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_session_when_started_then_surface_receives_initial_update() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "overlay.mp4");
    let mut h = harness(ScriptedPipeline::new(vec![]));

    h.controller.start_session(request(&path, None)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(15)).await;

    assert_eq!(h.surface.shows.load(Ordering::SeqCst), 1);
    {
        let updates = h.surface.updates.lock().unwrap();
        assert_eq!(updates[0].duration_text, "00:00:00");
    }
    assert!(h.controller.progress_snapshot().await.is_some());

    let _ = h.controller.stop_session().await;
    let after_stop = h.surface.update_count();
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(!h.surface.is_open());
    assert_eq!(h.surface.update_count(), after_stop);
    assert!(h.controller.progress_snapshot().await.is_none());
}

/// WHAT: Sink open failure aborts start with no global state left behind
/// WHY: Failed start must not register a hotkey or show the overlay
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unwritable_path_when_starting_then_no_partial_state() {
    // Given: A target inside a directory that does not exist
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("rec.mp4");
    let pipeline = ScriptedPipeline::new(vec![]);
    let starts = pipeline.starts.clone();
    let mut h = harness(pipeline);

    // When: Starting a session with a hotkey
    let result = h
        .controller
        .start_session(request(&path, Some("Ctrl+Shift+S")))
        .await;

    // Then: Io error and nothing was set up
    assert!(matches!(result, Err(RecorderError::Io { .. })));
    assert!(!h.controller.is_recording());
    assert_eq!(starts.load(Ordering::SeqCst), 0);
    assert_eq!(h.hotkeys.registered.load(Ordering::SeqCst), 0);
    assert_eq!(h.surface.shows.load(Ordering::SeqCst), 0);
    assert!(matches!(
        h.controller.stop_session().await,
        StopOutcome::NotRecording
    ));
}

/// WHAT: Hotkey registration failure rolls back pipeline and sink
/// WHY: Each start step completes or everything before it is undone
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_taken_hotkey_when_starting_then_sink_closed_and_idle() {
    // Given: A registry that rejects the binding
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "rollback.mp4");
    let pipeline = ScriptedPipeline::new(vec![b"abc".to_vec()]);
    let finalizes = pipeline.finalizes.clone();
    let mut h = harness(pipeline);
    h.hotkeys.fail_register.store(true, Ordering::SeqCst);

    // When: Starting with that binding
    let result = h
        .controller
        .start_session(request(&path, Some("Ctrl+Shift+S")))
        .await;

    // Then: Start fails, pipeline was finalized, sink released, overlay never shown
    assert!(matches!(result, Err(RecorderError::Hotkey { .. })));
    assert!(!h.controller.is_recording());
    assert_eq!(finalizes.load(Ordering::SeqCst), 1);
    assert_eq!(h.surface.shows.load(Ordering::SeqCst), 0);

    // And: The path can be recorded to again
    h.hotkeys.fail_register.store(false, Ordering::SeqCst);
    h.controller
        .start_session(request(&path, Some("Ctrl+Shift+S")))
        .await
        .unwrap();
    assert!(matches!(
        h.controller.stop_session().await,
        StopOutcome::Finalized(_)
    ));
}

/// WHAT: Surface failure unregisters the hotkey it just registered
/// WHY: Rollback covers every completed step
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_surface_when_starting_then_hotkey_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "nosurface.mp4");
    let mut h = harness(ScriptedPipeline::new(vec![]));
    h.surface.fail_show.store(true, Ordering::SeqCst);

    let result = h
        .controller
        .start_session(request(&path, Some("Ctrl+F12")))
        .await;

    assert!(result.is_err());
    assert!(!h.controller.is_recording());
    assert_eq!(h.hotkeys.registered.load(Ordering::SeqCst), 1);
    assert_eq!(h.hotkeys.unregistered.load(Ordering::SeqCst), 1);
}

/// WHAT: Pipeline start failure leaves the controller idle
/// WHY: Backend errors surface to the user without partial state
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_pipeline_when_starting_then_pipeline_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "broken.mp4");
    let mut pipeline = ScriptedPipeline::new(vec![]);
    pipeline.fail_start = true;
    let mut h = harness(pipeline);

    let result = h.controller.start_session(request(&path, None)).await;

    assert!(matches!(result, Err(RecorderError::Pipeline { .. })));
    assert!(!h.controller.is_recording());
    assert_eq!(h.surface.shows.load(Ordering::SeqCst), 0);
}

/// WHAT: Unsupported encoding fails before touching the filesystem
/// WHY: Encoding is validated first so no empty file is left behind
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_supported_encoding_when_starting_then_no_file_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "codec.mp4");
    let mut h = harness_with_probe(ScriptedPipeline::new(vec![]), Arc::new(ListProbe(vec![])));

    let result = h.controller.start_session(request(&path, None)).await;

    assert!(matches!(
        result,
        Err(RecorderError::UnsupportedEncoding { .. })
    ));
    assert!(!path.exists());
}

/// WHAT: Fallback encoding is handed to the pipeline and reported
/// WHY: The session records in whatever format was actually selected
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_mp4_unsupported_when_starting_then_webm_selected() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "fallback.webm");
    let webm_h264 = MediaFormat::new(Container::Webm, VideoCodec::H264);
    let pipeline = ScriptedPipeline::new(vec![]);
    let last_format = pipeline.last_format.clone();
    let mut h = harness_with_probe(pipeline, Arc::new(ListProbe(vec![webm_h264])));

    let info = h.controller.start_session(request(&path, None)).await.unwrap();

    assert_eq!(info.format, webm_h264);
    assert_eq!(*last_format.lock().unwrap(), Some(webm_h264));
    let _ = h.controller.stop_session().await;
}

/// WHAT: A recording whose file vanished reports the hash failure as data
/// WHY: Hash errors never crash stop; the session is still finalized
#[tokio::test]
#[allow(clippy::unwrap_used, clippy::panic)]
async fn given_deleted_file_when_stopping_then_hash_failed_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "vanish.mp4");
    let mut h = harness(ScriptedPipeline::new(vec![b"abc".to_vec()]));
    h.controller.start_session(request(&path, None)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    std::fs::remove_file(&path).unwrap();

    let outcome = h.controller.stop_session().await;

    let StopOutcome::Finalized(done) = outcome else {
        panic!("expected a finalized session");
    };
    assert!(matches!(done.hash, HashResult::Failed(_)));
    assert!(!h.controller.is_recording());
}

/// WHAT: Shutdown stops the active session
/// WHY: Exiting mid-recording must still flush the file
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_active_session_when_shutting_down_then_finalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_target(&dir, "exit.mp4");
    let mut h = harness(ScriptedPipeline::new(vec![vec![1u8; 64]]));
    h.controller.start_session(request(&path, None)).await.unwrap();

    let outcome = h.controller.shutdown().await;

    assert!(matches!(outcome, StopOutcome::Finalized(_)));
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 64);
}
