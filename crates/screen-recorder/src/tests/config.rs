use crate::{AppError, config::Config};

use screen_recorder_core::{Container, MediaFormat, RecorderError, VideoCodec};

/// WHAT: Missing sections and keys take their defaults
/// WHY: Older or hand-written config files must keep loading
#[test]
#[allow(clippy::unwrap_used)]
fn given_partial_file_when_loaded_then_defaults_filled() {
    // Given
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[capture]\nframe_rate = 60\n").unwrap();

    // When
    let config = Config::load_from(&path).unwrap();

    // Then
    assert_eq!(config.capture.frame_rate, 60);
    assert!(config.capture.audio);
    assert_eq!(config.capture.container, "mp4");
    assert_eq!(config.ffmpeg.binary, "ffmpeg");
    assert_eq!(config.hotkey.stop.as_deref(), Some("CmdOrCtrl+Shift+F10"));
    assert!(config.output.directory.is_none());
}

/// WHAT: Saved config reloads with the same values and leaves no temp file
/// WHY: Atomic save must not corrupt or litter the config directory
#[test]
#[allow(clippy::unwrap_used)]
fn given_modified_config_when_saved_then_reload_matches() {
    // Given
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = Config::default();
    config.capture.codec = "vp9".to_string();
    config.capture.container = "webm".to_string();
    config.output.directory = Some(dir.path().join("videos"));

    // When
    config.save_to(&path).unwrap();
    let reloaded = Config::load_from(&path).unwrap();

    // Then
    assert_eq!(reloaded.capture.codec, "vp9");
    assert_eq!(reloaded.output.directory, Some(dir.path().join("videos")));
    assert!(!path.with_extension("toml.tmp").exists());
}

/// WHAT: Malformed TOML is a ConfigError
/// WHY: The user needs a readable reason, not a panic
#[test]
#[allow(clippy::unwrap_used)]
fn given_malformed_file_when_loaded_then_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[capture\nframe_rate = ").unwrap();

    let result = Config::load_from(&path);

    assert!(matches!(result, Err(AppError::ConfigError { .. })));
}

/// WHAT: Container/codec strings resolve to a MediaFormat
/// WHY: The session request is built from these values
#[test]
#[allow(clippy::unwrap_used)]
fn given_default_config_when_reading_format_then_mp4_h264() {
    let config = Config::default();

    assert_eq!(
        config.media_format().unwrap(),
        MediaFormat::new(Container::Mp4, VideoCodec::H264)
    );
}

/// WHAT: mp4 with vp8 and unknown codecs are rejected
/// WHY: Invalid pairs must fail before any file is created
#[test]
fn given_invalid_format_when_reading_then_error() {
    // Given
    let mut config = Config::default();
    config.capture.codec = "vp8".to_string();

    // Then: mp4 cannot carry vp8
    assert!(matches!(
        config.media_format(),
        Err(AppError::ConfigError { .. })
    ));

    // Given: unknown codec
    config.capture.codec = "theora".to_string();

    // Then
    assert!(matches!(
        config.media_format(),
        Err(AppError::Recorder {
            source: RecorderError::UnsupportedEncoding { .. },
            ..
        })
    ));
}

/// WHAT: Blank hotkey disables it, malformed hotkey is InvalidHotkey
/// WHY: Users turn the stop hotkey off by clearing it
#[test]
#[allow(clippy::unwrap_used)]
fn given_hotkey_settings_when_resolved_then_optional_binding() {
    // Given
    let mut config = Config::default();

    // Then: default is set
    assert_eq!(
        config.stop_hotkey().unwrap().unwrap().as_str(),
        "CmdOrCtrl+Shift+F10"
    );

    // When: blank
    config.hotkey.stop = Some("   ".to_string());
    assert!(config.stop_hotkey().unwrap().is_none());

    // When: malformed
    config.hotkey.stop = Some("Ctrl+".to_string());
    assert!(matches!(
        config.stop_hotkey(),
        Err(AppError::Recorder {
            source: RecorderError::InvalidHotkey { .. },
            ..
        })
    ));
}

/// WHAT: A zero frame rate is raised to one
/// WHY: ffmpeg rejects a zero framerate
#[test]
fn given_zero_frame_rate_when_building_options_then_clamped() {
    let mut config = Config::default();
    config.capture.frame_rate = 0;
    config.capture.audio = false;

    let options = config.capture_options();

    assert_eq!(options.frame_rate, 1);
    assert!(!options.audio);
}
