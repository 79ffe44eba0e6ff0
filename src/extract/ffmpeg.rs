// FFmpeg still capture
//
// One ffmpeg process per frame, seeking before the input. Output goes to a
// temp sibling and is renamed into place only once it is non-empty.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{FrameCapture, Quality};
use crate::constants::JPEG_QSCALE;
use crate::error::{Result, ShotDeckError};
use crate::timegrid::SampleTimestamp;

#[derive(Debug, Clone)]
pub struct FfmpegCapture {
    ffmpeg: PathBuf,
}

impl FfmpegCapture {
    pub fn new() -> Self {
        Self { ffmpeg: crate::tools::ffmpeg_path() }
    }

    pub fn with_binary(ffmpeg: impl Into<PathBuf>) -> Self {
        Self { ffmpeg: ffmpeg.into() }
    }
}

impl Default for FfmpegCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Codec arguments for each quality level.
fn quality_args(quality: Quality) -> Vec<String> {
    match quality {
        Quality::Highest => vec!["-vf".into(), "scale=iw:ih".into()],
        Quality::Standard => vec!["-q:v".into(), JPEG_QSCALE.to_string()],
    }
}

/// `clip.png` -> `clip.tmp.png`, so ffmpeg still infers the format from the extension.
fn temp_path_for(output: &Path) -> PathBuf {
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    output.with_extension(format!("tmp.{}", ext))
}

/// Format seconds as HH:MM:SS.mmm for ffmpeg.
fn format_seek(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u32;
    let minutes = ((seconds % 3600.0) / 60.0) as u32;
    let secs = seconds % 60.0;
    format!("{:02}:{:02}:{:06.3}", hours, minutes, secs)
}

impl FrameCapture for FfmpegCapture {
    fn capture(&self, source: &Path, at: SampleTimestamp, quality: Quality, output: &Path) -> Result<()> {
        let capture_err = |reason: String| ShotDeckError::Capture { at: at.secs(), reason };

        let tmp_path = temp_path_for(output);

        let output_result = Command::new(&self.ffmpeg)
            .args(["-y", "-ss", &format_seek(at.as_secs_f64()), "-i"])
            .arg(source)
            .args(["-vframes", "1"])
            .args(quality_args(quality))
            .arg(&tmp_path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| capture_err(format!("failed to run ffmpeg: {}", e)))?;

        if !output_result.status.success() {
            let _ = std::fs::remove_file(&tmp_path);
            let stderr = String::from_utf8_lossy(&output_result.stderr);
            return Err(capture_err(format!("ffmpeg failed: {}", stderr.trim())));
        }

        // Seeking past the end exits 0 but encodes nothing
        let size = std::fs::metadata(&tmp_path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(capture_err("ffmpeg produced no frame".to_string()));
        }

        std::fs::rename(&tmp_path, output).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            capture_err(format!("failed to move frame into place: {}", e))
        })?;

        log::debug!("Captured {} -> {}", at, output.display());
        Ok(())
    }
}
