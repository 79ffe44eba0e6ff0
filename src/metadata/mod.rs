// Media probing for the materialized video

pub mod ffprobe;

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::Result;

pub use ffprobe::Ffprobe;

/// What the pipeline needs to know about a local video file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub duration_secs: Option<f64>,
}

/// Measures the length of a local video file.
pub trait DurationProbe {
    fn duration_secs(&self, path: &Path) -> Result<f64>;
}
