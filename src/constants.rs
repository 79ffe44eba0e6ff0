// ShotDeck Constants
// Defaults for a run. CLI flags override the ones marked as such.

// Output layout
pub const IMAGES_FOLDER: &str = "images";
pub const TRANSCRIPT_SUFFIX: &str = "_transcript.txt";
pub const PDF_SUFFIX: &str = "_HD.pdf";
pub const KEPT_VIDEO_EXTENSION: &str = "mp4";
pub const SCRATCH_VIDEO_NAME: &str = "video.mp4";
pub const UNTITLED: &str = "untitled";
pub const MAX_FILENAME_CHARS: usize = 100;
pub const FILENAME_INVALID_CHARS: &str = "<>:\"/\\|?*";

// Frame naming: {prefix}_{SSSS}s.{ext}
pub const TIMESTAMP_WIDTH: usize = 4;

// Frame capture
pub const HIGHEST_EXTENSION: &str = "png";
pub const STANDARD_EXTENSION: &str = "jpg";
pub const JPEG_QSCALE: u32 = 1; // ffmpeg -q:v, 1 is best

// Hashing
pub const HASH_ALGORITHM: &str = "blake3";
pub const HASH_CHUNK_SIZE: usize = 1_048_576; // 1MB

// PDF (overridable with --pdf-dpi)
pub const DEFAULT_PDF_DPI: u32 = 600;

// Acquisition
pub const SUBTITLE_LANG: &str = "en";
pub const YTDLP_FORMAT_CHAIN: [&str; 3] = [
    "bestvideo[height>=1080][ext=mp4]+bestaudio[ext=m4a]/best[height>=1080][ext=mp4]",
    "bestvideo[height>=720][ext=mp4]+bestaudio[ext=m4a]/best[height>=720][ext=mp4]",
    "best[ext=mp4]/best",
];
// Tried in order next to the downloaded video
pub const SUBTITLE_SUFFIXES: [&str; 4] = [".en.srt", ".en.vtt", ".srt", ".vtt"];

// Transcript
pub const TRANSCRIPT_HEADER: &str = "VIDEO TRANSCRIPT";
pub const TRANSCRIPT_RULE_WIDTH: usize = 50;
pub const TRANSCRIPT_WRAP_WIDTH: usize = 80;

// Image extensions accepted when collecting frames for a PDF
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
