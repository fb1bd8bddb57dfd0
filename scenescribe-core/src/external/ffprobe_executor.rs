//! FFprobe integration for stream metadata extraction.
//!
//! The stream prober reads container/stream metadata (duration, frame rate,
//! resolution) needed to interpret every downstream timestamp. Probing is
//! abstracted behind the [`StreamProber`] trait so the pipeline can be tested
//! with substitute implementations.

use crate::error::{CoreError, CoreResult};
use ffprobe::{ffprobe, FfProbeError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container/stream metadata for one video asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Total duration in milliseconds.
    pub duration_ms: u64,
    /// Average frame rate in frames per second.
    pub frame_rate: f64,
    /// Width of the primary video stream in pixels.
    pub width: u32,
    /// Height of the primary video stream in pixels.
    pub height: u32,
}

/// Trait for probing stream metadata from a video file.
pub trait StreamProber {
    fn probe(&self, input_path: &Path) -> CoreResult<StreamInfo>;
}

/// Implementation of `StreamProber` using the `ffprobe` crate.
#[derive(Debug, Default, Clone)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StreamProber for CrateFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<StreamInfo> {
        log::debug!("Running ffprobe on: {}", input_path.display());

        let metadata = ffprobe(input_path).map_err(|err| map_ffprobe_error(err, input_path))?;

        let duration_secs = metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "Failed to parse duration from format for {}",
                    input_path.display()
                ))
            })?;

        let video_stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "No video stream found in {}",
                    input_path.display()
                ))
            })?;

        let width = video_stream.width.unwrap_or(0).max(0) as u32;
        let height = video_stream.height.unwrap_or(0).max(0) as u32;
        if width == 0 || height == 0 {
            return Err(CoreError::FfprobeParse(format!(
                "Missing video dimensions for {}",
                input_path.display()
            )));
        }

        let frame_rate = parse_frame_rate(&video_stream.avg_frame_rate)
            .or_else(|| parse_frame_rate(&video_stream.r_frame_rate))
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "Failed to parse frame rate for {}",
                    input_path.display()
                ))
            })?;

        Ok(StreamInfo {
            duration_ms: (duration_secs * 1000.0).round() as u64,
            frame_rate,
            width,
            height,
        })
    }
}

/// Parses an ffprobe rational frame rate (e.g. "30000/1001" or "25").
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "0/0" {
        return None;
    }
    match raw.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f64>().ok()?;
            let den = den.parse::<f64>().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => raw.parse::<f64>().ok(),
    }
}

fn map_ffprobe_error(err: FfProbeError, input_path: &Path) -> CoreError {
    CoreError::FfprobeParse(format!("ffprobe failed for {}: {err:?}", input_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rational_and_plain_frame_rates() {
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("30000/1001").map(|r| (r * 1000.0).round()), Some(29970.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate(""), None);
        assert_eq!(parse_frame_rate("24/0"), None);
    }
}
