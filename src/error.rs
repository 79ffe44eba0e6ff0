// ShotDeck Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShotDeckError {
    #[error("Invalid interval: {0} (must be a positive number of seconds)")]
    InvalidInterval(i64),

    #[error("Invalid duration: {0}")]
    InvalidDuration(f64),

    #[error("Acquisition error: {0}")]
    Acquisition(String),

    #[error("Capture error at {at}s: {reason}")]
    Capture { at: u64, reason: String },

    #[error("No frames extracted ({attempted} capture attempts, none succeeded)")]
    NoFramesExtracted { attempted: usize },

    #[error("Document build error: {0}")]
    DocumentBuild(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("FFprobe error: {0}")]
    FFprobe(String),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ShotDeckError>;
