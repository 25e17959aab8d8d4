use crate::{CoreResult, progress::ProgressUpdate};

/// Always-on-top display that mirrors recording progress.
///
/// The surface can be torn down from outside at any moment, so `push`
/// reports delivery instead of failing.
pub trait ProgressSurface: Send + Sync {
    /// Opens or reveals the surface.
    fn show(&self) -> CoreResult<()>;

    /// Delivers an update. Returns `false` if the surface is gone.
    fn push(&self, update: &ProgressUpdate) -> bool;

    /// Hides or destroys the surface. Safe to call when already closed.
    fn close(&self);

    /// Whether the surface is currently shown.
    fn is_open(&self) -> bool;
}
