// Pipeline orchestration
//
// Idle -> Extracting -> Deduplicating -> (DocumentBuilding) -> Done | Failed
//
// Acquisition and extraction failures are fatal. Capture, fingerprint,
// transcript and document failures are logged and reported, never fatal.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::acquire::{AcquiredMedia, VideoSource};
use crate::constants::{DEFAULT_PDF_DPI, SCRATCH_VIDEO_NAME};
use crate::dedup::deduplicate;
use crate::document::DocumentBuilder;
use crate::error::{Result, ShotDeckError};
use crate::extract::{extract, ExtractOptions, FrameCapture, Quality};
use crate::metadata::DurationProbe;
use crate::paths::{sanitize_filename, OutputLayout};
use crate::progress::ProgressSink;
use crate::report::PipelineReport;
use crate::timegrid::{check_interval, generate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Extracting,
    Deduplicating,
    DocumentBuilding,
    Done,
    Failed,
}

impl PipelineState {
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Extracting)
                | (Idle, Failed)
                | (Extracting, Deduplicating)
                | (Extracting, Failed)
                | (Deduplicating, DocumentBuilding)
                | (Deduplicating, Done)
                | (DocumentBuilding, Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

/// Options for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRequest {
    pub locator: String,
    /// Seconds between samples. Validated before any work starts.
    pub interval: i64,
    pub output_dir: PathBuf,
    pub quality: Quality,
    pub pdf_dpi: u32,
    pub keep_video: bool,
    pub transcript: bool,
    pub build_document: bool,
}

impl PipelineRequest {
    pub fn new(locator: impl Into<String>, interval: i64, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            locator: locator.into(),
            interval,
            output_dir: output_dir.into(),
            quality: Quality::default(),
            pdf_dpi: DEFAULT_PDF_DPI,
            keep_video: false,
            transcript: true,
            build_document: true,
        }
    }
}

/// External capabilities the pipeline drives.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub source: &'a dyn VideoSource,
    pub capture: &'a dyn FrameCapture,
    pub probe: &'a dyn DurationProbe,
    pub documents: &'a dyn DocumentBuilder,
    pub progress: Option<&'a dyn ProgressSink>,
}

pub struct Pipeline<'a> {
    tools: Collaborators<'a>,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl<'a> Pipeline<'a> {
    pub fn new(tools: Collaborators<'a>) -> Self {
        Self {
            tools,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state entered so far, starting with Idle.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    fn transition(&mut self, next: PipelineState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ShotDeckError::Other(format!(
                "illegal pipeline transition {:?} -> {:?}",
                self.state, next
            )));
        }
        log::debug!("Pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Run the whole pipeline once. A pipeline cannot be rerun.
    pub fn run(&mut self, request: &PipelineRequest) -> Result<PipelineReport> {
        if self.state != PipelineState::Idle {
            return Err(ShotDeckError::Other("pipeline has already run".to_string()));
        }

        match self.run_stages(request) {
            Ok(report) => Ok(report),
            Err(e) => {
                if !self.state.is_terminal() {
                    let _ = self.transition(PipelineState::Failed);
                }
                Err(e)
            }
        }
    }

    fn run_stages(&mut self, request: &PipelineRequest) -> Result<PipelineReport> {
        let tools = self.tools;

        check_interval(request.interval)?;

        log::info!("Fetching video information...");
        let info = tools.source.fetch_info(&request.locator)?;
        log::info!(
            "Video: {} | Duration: {} | Uploader: {}",
            info.title,
            format_clock(info.duration),
            info.uploader
        );

        let layout = OutputLayout::new(&request.output_dir, &sanitize_filename(&info.title));
        layout.create_dirs()?;

        // Dropped on every return path, taking the download with it
        let scratch = tempfile::Builder::new().prefix("shotdeck-").tempdir()?;
        let scratch_video = scratch.path().join(SCRATCH_VIDEO_NAME);

        let want_captions = request.transcript && info.has_captions;
        if request.transcript && !info.has_captions {
            log::info!("No captions available, skipping transcript");
        }

        let media = tools
            .source
            .materialize(&request.locator, &scratch_video, want_captions)?;
        log::info!("Video downloaded");

        let transcript_path = if want_captions {
            write_transcript(&media, &layout.transcript_path)
        } else {
            None
        };

        let duration = match tools.probe.duration_secs(&media.video_path) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Using reported duration {:.1}s: {}", info.duration, e);
                info.duration
            }
        };

        self.transition(PipelineState::Extracting)?;
        log::info!(
            "Video duration: {:.1} seconds, extracting screenshots every {} seconds...",
            duration,
            request.interval
        );

        let grid = generate(duration, request.interval)?;
        let options = ExtractOptions {
            images_dir: layout.images_dir.clone(),
            title_prefix: layout.safe_title.clone(),
            quality: request.quality,
            duration,
        };
        let extraction = extract(tools.capture, &media.video_path, grid, &options, tools.progress)?;
        let extracted_count = extraction.count;
        log::info!("Extracted {} screenshots", extracted_count);

        self.transition(PipelineState::Deduplicating)?;
        let dedup = deduplicate(extraction.artifacts);
        if dedup.removed_count > 0 {
            log::info!(
                "Removed {} duplicates, {} unique screenshots remain",
                dedup.removed_count,
                dedup.survivors.len()
            );
        }

        let mut document_path = None;
        let mut document_error = None;
        if request.build_document {
            self.transition(PipelineState::DocumentBuilding)?;
            let images: Vec<PathBuf> = dedup.survivors.iter().map(|a| a.path.clone()).collect();
            match tools.documents.build(&images, &layout.pdf_path, request.pdf_dpi) {
                Ok(()) => {
                    log::info!("PDF created: {}", layout.pdf_path.display());
                    document_path = Some(layout.pdf_path.clone());
                }
                Err(e) => {
                    log::warn!("PDF not created: {}", e);
                    document_error = Some(e.to_string());
                }
            }
        }

        let video_path = if request.keep_video {
            match copy_preserving_mtime(&media.video_path, &layout.kept_video_path) {
                Ok(()) => Some(layout.kept_video_path.clone()),
                Err(e) => {
                    log::warn!("Could not keep video: {}", e);
                    None
                }
            }
        } else {
            None
        };

        self.transition(PipelineState::Done)?;

        Ok(PipelineReport {
            title: info.title,
            output_dir: layout.video_dir,
            extracted_count,
            survivor_count: dedup.survivors.len(),
            removed_count: dedup.removed_count,
            failed_captures: extraction.failed,
            document_path,
            document_error,
            transcript_path,
            video_path,
            finished_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        })
    }
}

/// Convert the caption track if there is one. Failures are logged only.
fn write_transcript(media: &AcquiredMedia, transcript_path: &Path) -> Option<PathBuf> {
    let captions = media.captions_path.as_ref()?;
    match crate::transcript::convert_file(captions, transcript_path) {
        Ok(()) => Some(transcript_path.to_path_buf()),
        Err(e) => {
            log::warn!("Transcript skipped: {}", e);
            None
        }
    }
}

/// Copy a file and carry its modification time over.
fn copy_preserving_mtime(source: &Path, dest: &Path) -> Result<()> {
    std::fs::copy(source, dest)?;

    let modified = std::fs::metadata(source).and_then(|m| m.modified());
    let stamped = modified
        .and_then(|t| filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(t)));
    if let Err(e) = stamped {
        log::warn!("Could not preserve modification time on {}: {}", dest.display(), e);
    }

    Ok(())
}

/// H:MM:SS for whole seconds.
fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds as u64 } else { 0 };
    crate::timegrid::SampleTimestamp::from_secs(total).clock()
}
