use std::panic::Location;

use error_location::ErrorLocation;
use screen_recorder_core::{CoreResult, RecorderError, SourceDescriptor, SourceProvider};
use tao::monitor::MonitorHandle;
use tracing::debug;

/// Position and size of a display in the virtual desktop, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    /// Position in platform enumeration order.
    pub index: usize,
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Source id for the display at `index`.
pub fn screen_source_id(index: usize) -> String {
    format!("screen:{}", index)
}

/// Displays reported by the windowing system when the tray started.
#[derive(Debug, Clone, Default)]
pub struct MonitorSources {
    screens: Vec<(SourceDescriptor, ScreenGeometry)>,
}

impl MonitorSources {
    /// Snapshot the event loop's monitors.
    pub fn from_monitors(monitors: impl IntoIterator<Item = MonitorHandle>) -> Self {
        Self::from_geometries(monitors.into_iter().enumerate().map(|(index, m)| {
            let size = m.size();
            let position = m.position();
            (
                m.name(),
                ScreenGeometry {
                    index,
                    x: position.x,
                    y: position.y,
                    width: size.width,
                    height: size.height,
                },
            )
        }))
    }

    /// Build from names and geometries in enumeration order.
    pub fn from_geometries(
        screens: impl IntoIterator<Item = (Option<String>, ScreenGeometry)>,
    ) -> Self {
        let screens: Vec<_> = screens
            .into_iter()
            .map(|(name, geometry)| {
                let name = name.unwrap_or_else(|| format!("Screen {}", geometry.index + 1));
                let descriptor = SourceDescriptor {
                    id: screen_source_id(geometry.index),
                    name: format!("{} ({}x{})", name, geometry.width, geometry.height),
                    thumbnail: None,
                };
                (descriptor, geometry)
            })
            .collect();

        debug!(count = screens.len(), "Displays enumerated");

        Self { screens }
    }

    /// Geometry of the display with source id `id`.
    pub fn geometry(&self, id: &str) -> Option<ScreenGeometry> {
        self.screens
            .iter()
            .find(|(descriptor, _)| descriptor.id == id)
            .map(|(_, geometry)| *geometry)
    }
}

impl SourceProvider for MonitorSources {
    #[track_caller]
    fn sources(&self) -> CoreResult<Vec<SourceDescriptor>> {
        if self.screens.is_empty() {
            return Err(RecorderError::Source {
                reason: "no displays reported by the windowing system".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(self.screens.iter().map(|(d, _)| d.clone()).collect())
    }
}
