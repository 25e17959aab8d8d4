const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats whole seconds as `HH:MM:SS`. Hours are not capped at 24.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Formats a byte count with binary units (B, KB, MB, GB).
///
/// Zero is exactly `0 B`, sub-kilobyte values are shown as integers and
/// everything else with two decimals. Sizes past 1024 GB stay in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut unit = 0;
    let mut divisor: u64 = 1;
    while unit < UNITS.len() - 1 && bytes / divisor >= 1024 {
        divisor *= 1024;
        unit += 1;
    }

    format!("{:.2} {}", bytes as f64 / divisor as f64, UNITS[unit])
}
