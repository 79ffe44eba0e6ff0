// Frame extraction
//
// Captures one still per sample timestamp. A failed capture is skipped;
// only an extraction that produces nothing at all is an error.

pub mod ffmpeg;

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;

use crate::constants::{HIGHEST_EXTENSION, STANDARD_EXTENSION};
use crate::error::{Result, ShotDeckError};
use crate::hash::Fingerprint;
use crate::paths::frame_file_name;
use crate::progress::{emit_progress_opt, JobProgress, ProgressSink};
use crate::timegrid::SampleTimestamp;

pub use ffmpeg::FfmpegCapture;

/// Output codec for captured frames. Sampling is the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Lossy JPEG.
    #[value(alias = "high")]
    Standard,
    /// Lossless PNG at native resolution.
    #[default]
    Highest,
}

impl Quality {
    pub fn extension(&self) -> &'static str {
        match self {
            Quality::Standard => STANDARD_EXTENSION,
            Quality::Highest => HIGHEST_EXTENSION,
        }
    }
}

/// One captured frame on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameArtifact {
    pub timestamp: SampleTimestamp,
    pub path: PathBuf,
    /// Filled in by the deduplicator.
    pub fingerprint: Option<Fingerprint>,
}

impl FrameArtifact {
    pub fn new(timestamp: SampleTimestamp, path: PathBuf) -> Self {
        Self { timestamp, path, fingerprint: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Timestamp order.
    pub artifacts: Vec<FrameArtifact>,
    pub count: usize,
    /// Timestamps whose capture failed and were skipped.
    pub failed: Vec<SampleTimestamp>,
}

/// Grabs a single still from a video.
pub trait FrameCapture {
    /// Write the frame at `at` to `output`. On error nothing may be left at `output`.
    fn capture(&self, source: &Path, at: SampleTimestamp, quality: Quality, output: &Path) -> Result<()>;
}

/// Where and how to write frames.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub images_dir: PathBuf,
    pub title_prefix: String,
    pub quality: Quality,
    /// Video length in seconds, for progress only.
    pub duration: f64,
}

/// Capture a frame at every timestamp, in order.
pub fn extract<I>(
    capture: &dyn FrameCapture,
    source: &Path,
    timestamps: I,
    options: &ExtractOptions,
    progress: Option<&dyn ProgressSink>,
) -> Result<ExtractionResult>
where
    I: IntoIterator<Item = SampleTimestamp>,
{
    std::fs::create_dir_all(&options.images_dir)?;

    let mut artifacts = Vec::new();
    let mut failed = Vec::new();

    for at in timestamps {
        let output = options
            .images_dir
            .join(frame_file_name(&options.title_prefix, at, options.quality));

        match capture.capture(source, at, options.quality, &output) {
            Ok(()) => {
                artifacts.push(FrameArtifact::new(at, output));
                emit_progress_opt(
                    progress,
                    &JobProgress::new("extract", at.as_secs_f64(), options.duration)
                        .with_message(format!("Screenshot at {}", at.clock())),
                );
            }
            Err(e) => {
                log::warn!("Skipping frame at {}: {}", at.clock(), e);
                // A capture implementation may still have left something behind
                if output.exists() {
                    if let Err(rm) = std::fs::remove_file(&output) {
                        log::warn!("Could not remove partial frame {}: {}", output.display(), rm);
                    }
                }
                failed.push(at);
            }
        }
    }

    if artifacts.is_empty() {
        return Err(ShotDeckError::NoFramesExtracted { attempted: failed.len() });
    }

    if !failed.is_empty() {
        log::warn!("{} of {} captures failed", failed.len(), failed.len() + artifacts.len());
    }

    Ok(ExtractionResult {
        count: artifacts.len(),
        artifacts,
        failed,
    })
}
