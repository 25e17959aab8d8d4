//! Capturable displays.

use crate::CoreResult;

use std::fmt;

/// Preview image attached to a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixels.
    pub rgba: Vec<u8>,
}

/// A capturable display as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Stable identifier understood by the capture pipeline.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional preview.
    pub thumbnail: Option<Thumbnail>,
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Enumerates capturable sources in platform order.
pub trait SourceProvider: Send + Sync {
    /// Lists the sources currently available.
    ///
    /// # Errors
    ///
    /// Returns `Source` if the platform cannot enumerate.
    fn sources(&self) -> CoreResult<Vec<SourceDescriptor>>;
}
