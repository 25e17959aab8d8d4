//! Configuration management for screen-recorder.
//!
//! TOML file in the platform config directory, written atomically. Values
//! that need parsing (format, hotkey) are validated when a recording starts,
//! not at load time, so a bad entry never keeps the tray from coming up.

use crate::{
    AppError, AppResult,
    config::{
        CaptureConfig, FfmpegConfig, HotkeyConfig, OutputConfig, default_codec, default_container,
        default_ffmpeg_binary, default_stop_hotkey,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use crate::config::{DEFAULT_AUDIO, DEFAULT_FRAME_RATE};
use directories::ProjectDirs;
use error_location::ErrorLocation;
use screen_recorder_core::{CaptureOptions, Container, HotkeyBinding, MediaFormat, VideoCodec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture source and encoding preferences.
    pub capture: CaptureConfig,
    /// Recordings directory.
    pub output: OutputConfig,
    /// Stop hotkey.
    pub hotkey: HotkeyConfig,
    /// ffmpeg backend.
    pub ffmpeg: FfmpegConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture: CaptureConfig {
                frame_rate: DEFAULT_FRAME_RATE,
                audio: DEFAULT_AUDIO,
                source_index: 0,
                container: default_container(),
                codec: default_codec(),
            },
            output: OutputConfig::default(),
            hotkey: HotkeyConfig {
                stop: default_stop_hotkey(),
            },
            ffmpeg: FfmpegConfig {
                binary: default_ffmpeg_binary(),
                audio_input: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and parse a specific config file.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Save configuration using a temp file and rename.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .and_then(|()| temp_file.sync_all())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// The configured container/codec pair.
    ///
    /// # Errors
    ///
    /// `UnsupportedEncoding` when either name is unknown, `ConfigError` when
    /// the container cannot carry the codec.
    #[track_caller]
    pub fn media_format(&self) -> AppResult<MediaFormat> {
        let container: Container = self.capture.container.parse()?;
        let codec: VideoCodec = self.capture.codec.parse()?;
        let format = MediaFormat::new(container, codec);

        if !format.is_valid() {
            return Err(AppError::ConfigError {
                reason: format!("{} cannot carry {}", container.extension(), codec.name()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(format)
    }

    /// The stop hotkey, `None` when unset or blank.
    #[track_caller]
    pub fn stop_hotkey(&self) -> AppResult<Option<HotkeyBinding>> {
        match self.hotkey.stop.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Ok(Some(HotkeyBinding::parse(raw)?)),
        }
    }

    /// Capture options for the pipeline.
    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            frame_rate: self.capture.frame_rate.max(1),
            audio: self.capture.audio,
        }
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "screen-recorder", "Screen-Recorder").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get config directory".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}
