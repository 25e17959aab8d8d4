//! Default names for new recordings.

use crate::encoding::Container;

use chrono::{DateTime, TimeZone};

/// Prefix shared by every generated recording name.
pub const FILE_NAME_PREFIX: &str = "screen-recording";

/// `screen-recording_YYYYMMDD_HHMMSS.<ext>` for the given moment.
pub fn default_file_name<Tz>(timestamp: &DateTime<Tz>, container: Container) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}.{}",
        FILE_NAME_PREFIX,
        timestamp.format("%Y%m%d_%H%M%S"),
        container.extension()
    )
}

/// Same as [`default_file_name`] using the local wall clock.
pub fn default_file_name_now(container: Container) -> String {
    default_file_name(&chrono::Local::now(), container)
}
