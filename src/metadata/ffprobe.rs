// FFprobe wrapper for duration

use std::path::{Path, PathBuf};
use std::process::Command;
use serde::Deserialize;
use crate::error::{Result, ShotDeckError};
use super::{DurationProbe, MediaInfo};

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    streams: Option<Vec<FFprobeStream>>,
    format: Option<FFprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    codec_type: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FFprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Ffprobe {
    binary: PathBuf,
}

impl Ffprobe {
    pub fn new() -> Self {
        Self { binary: crate::tools::ffprobe_path() }
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    /// Run ffprobe on a file and extract stream info
    pub fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let output = Command::new(&self.binary)
            .args([
                "-v", "quiet",
                "-print_format", "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|e| ShotDeckError::FFprobe(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ShotDeckError::FFprobe(format!("ffprobe failed: {}", stderr.trim())));
        }

        parse_probe_output(&output.stdout)
    }
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new()
    }
}

impl DurationProbe for Ffprobe {
    fn duration_secs(&self, path: &Path) -> Result<f64> {
        self.probe(path)?
            .duration_secs
            .ok_or_else(|| ShotDeckError::FFprobe(format!("No duration reported for {}", path.display())))
    }
}

/// Format duration wins over the video stream's own duration.
fn parse_probe_output(stdout: &[u8]) -> Result<MediaInfo> {
    let probe_output: FFprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ShotDeckError::FFprobe(format!("Failed to parse ffprobe output: {}", e)))?;

    let mut info = MediaInfo::default();

    if let Some(ref format) = probe_output.format {
        info.duration_secs = parse_duration(format.duration.as_deref());
    }

    if let Some(ref streams) = probe_output.streams {
        if let Some(video) = streams.iter().find(|s| s.codec_type.as_deref() == Some("video")) {
            if info.duration_secs.is_none() {
                info.duration_secs = parse_duration(video.duration.as_deref());
            }
        }
    }

    Ok(info)
}

/// Parse a seconds string, rejecting negatives and NaN
fn parse_duration(duration_str: Option<&str>) -> Option<f64> {
    let seconds: f64 = duration_str?.trim().parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(seconds)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_duration() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio", "codec_name": "aac"},
                {"codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080, "duration": "11.000"}
            ],
            "format": {"duration": "10.010000"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.duration_secs, Some(10.01));
    }

    #[test]
    fn test_stream_duration_fallback() {
        let json = br#"{"streams": [{"codec_type": "video", "duration": "42.5"}], "format": {}}"#;
        assert_eq!(parse_probe_output(json).unwrap().duration_secs, Some(42.5));
    }

    #[test]
    fn test_garbage_is_ffprobe_error() {
        assert!(matches!(parse_probe_output(b"not json"), Err(ShotDeckError::FFprobe(_))));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(Some("N/A")), None);
        assert_eq!(parse_duration(Some("-1")), None);
        assert_eq!(parse_duration(Some(" 3.5\n")), Some(3.5));
        assert_eq!(parse_duration(None), None);
    }

    #[test]
    fn test_missing_binary() {
        let probe = Ffprobe::with_binary("/nonexistent/ffprobe");
        assert!(probe.duration_secs(Path::new("video.mp4")).is_err());
    }
}
