//! Utility functions for formatting and path handling.
//!
//! General-purpose helpers used throughout the scenescribe-core library:
//! timestamp formatting, cost formatting, and safe filename extraction.

use std::path::Path;

/// Formats a millisecond timestamp as HH:MM:SS (e.g., 3725000 -> "01:02:05").
#[must_use]
pub fn format_timestamp_ms(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns
/// "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }
    format_timestamp_ms((seconds * 1000.0) as u64)
}

/// Formats an estimated dollar cost with four decimal places (model-service
/// unit prices are fractions of a cent).
#[must_use]
pub fn format_cost(cost: f64) -> String {
    format!("${cost:.4}")
}

/// Safely extracts the filename from a path with consistent error handling.
pub fn get_filename_safe(path: &Path) -> crate::CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            crate::CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

/// Extracts the file stem (filename without extension) from a path.
pub fn get_file_stem_safe(path: &Path) -> crate::CoreResult<String> {
    Ok(path
        .file_stem()
        .ok_or_else(|| {
            crate::CoreError::PathError(format!("Failed to get file stem for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_timestamp_ms() {
        assert_eq!(format_timestamp_ms(0), "00:00:00");
        assert_eq!(format_timestamp_ms(3_725_000), "01:02:05");
        assert_eq!(format_timestamp_ms(59_999), "00:00:59");
    }

    #[test]
    fn test_format_duration_invalid() {
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
        assert_eq!(format_duration(3725.0), "01:02:05");
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(0.0246), "$0.0246");
        assert_eq!(format_cost(0.0), "$0.0000");
    }

    #[test]
    fn test_get_filename_safe() {
        let path = PathBuf::from("/videos/meridian.mp4");
        assert_eq!(get_filename_safe(&path).unwrap(), "meridian.mp4");
        assert_eq!(get_file_stem_safe(&path).unwrap(), "meridian");
        assert!(get_filename_safe(&PathBuf::from("/")).is_err());
    }
}
