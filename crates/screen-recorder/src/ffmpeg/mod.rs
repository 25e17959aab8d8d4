//! ffmpeg subprocess backend: encoder probing, argument building and the
//! capture pipeline that streams the muxed container from stdout.

mod commands;
mod pipeline;
mod probe;

pub use {
    commands::{CaptureBackend, FfmpegCommandBuilder, resolve_audio_input},
    pipeline::FfmpegPipeline,
    probe::FfmpegProbe,
};
