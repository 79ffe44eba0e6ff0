// Video acquisition
//
// Metadata lookup and download of the source video (plus an optional
// caption track) behind a trait, so the pipeline can run against fakes.

pub mod ytdlp;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use ytdlp::YtDlp;

/// Metadata for a source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    /// Seconds, as reported by the source.
    pub duration: f64,
    pub uploader: String,
    pub view_count: u64,
    pub has_captions: bool,
}

/// Files produced by [`VideoSource::materialize`].
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredMedia {
    pub video_path: PathBuf,
    pub captions_path: Option<PathBuf>,
}

pub trait VideoSource {
    fn fetch_info(&self, locator: &str) -> Result<VideoInfo>;

    /// Download the video to `video_path`, and captions alongside it when asked.
    fn materialize(&self, locator: &str, video_path: &Path, want_captions: bool) -> Result<AcquiredMedia>;
}
