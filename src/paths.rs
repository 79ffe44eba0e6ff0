// Output layout and filename helpers

use std::path::{Path, PathBuf};

use crate::constants::{
    FILENAME_INVALID_CHARS, IMAGES_FOLDER, KEPT_VIDEO_EXTENSION, MAX_FILENAME_CHARS,
    PDF_SUFFIX, TRANSCRIPT_SUFFIX, UNTITLED,
};
use crate::extract::Quality;
use crate::timegrid::SampleTimestamp;

/// Make a video title safe to use as a directory and file prefix.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !FILENAME_INVALID_CHARS.contains(*c))
        .collect();

    let trimmed = cleaned
        .trim_matches(|c| c == '.' || c == ' ')
        .replace(' ', "_");

    let truncated: String = trimmed.chars().take(MAX_FILENAME_CHARS).collect();

    if truncated.is_empty() {
        UNTITLED.to_string()
    } else {
        truncated
    }
}

/// `{prefix}_{SSSS}s.{ext}`. Lexical order equals temporal order.
pub fn frame_file_name(prefix: &str, at: SampleTimestamp, quality: Quality) -> String {
    format!("{}_{}.{}", prefix, at.file_label(), quality.extension())
}

/// Recover the sample time from a name written by [`frame_file_name`].
pub fn parse_frame_timestamp(file_name: &str) -> Option<SampleTimestamp> {
    let stem = file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name);
    let label = stem.rsplit_once('_')?.1.strip_suffix('s')?;
    if label.is_empty() || !label.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    label.parse().ok().map(SampleTimestamp::from_secs)
}

/// Every path a run writes, derived from the output root and the safe title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub safe_title: String,
    pub video_dir: PathBuf,
    pub images_dir: PathBuf,
    pub transcript_path: PathBuf,
    pub pdf_path: PathBuf,
    pub kept_video_path: PathBuf,
}

impl OutputLayout {
    pub fn new(output_root: &Path, safe_title: &str) -> Self {
        let video_dir = output_root.join(safe_title);
        Self {
            safe_title: safe_title.to_string(),
            images_dir: video_dir.join(IMAGES_FOLDER),
            transcript_path: video_dir.join(format!("{}{}", safe_title, TRANSCRIPT_SUFFIX)),
            pdf_path: video_dir.join(format!("{}{}", safe_title, PDF_SUFFIX)),
            kept_video_path: video_dir.join(format!("{}.{}", safe_title, KEPT_VIDEO_EXTENSION)),
            video_dir,
        }
    }

    /// Create the video and images directories.
    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.images_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_invalid_chars() {
        assert_eq!(sanitize_filename("What? A <Title>: \"Part 1/2\""), "What_A_Title_Part_12");
    }

    #[test]
    fn test_sanitize_trims_dots_and_spaces() {
        assert_eq!(sanitize_filename("  ..My Video.. "), "My_Video");
    }

    #[test]
    fn test_sanitize_truncates_by_chars() {
        let long = "é".repeat(150);
        let safe = sanitize_filename(&long);
        assert_eq!(safe.chars().count(), MAX_FILENAME_CHARS);
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename("???"), UNTITLED);
        assert_eq!(sanitize_filename(""), UNTITLED);
    }

    #[test]
    fn test_frame_file_name() {
        let at = SampleTimestamp::from_secs(8);
        assert_eq!(frame_file_name("Talk", at, Quality::Highest), "Talk_0008s.png");
        assert_eq!(frame_file_name("Talk", at, Quality::Standard), "Talk_0008s.jpg");
    }

    #[test]
    fn test_frame_names_sort_temporally() {
        let mut names: Vec<String> = [120u64, 5, 60, 0, 1000]
            .iter()
            .map(|s| frame_file_name("v", SampleTimestamp::from_secs(*s), Quality::Highest))
            .collect();
        names.sort();
        assert_eq!(names, vec!["v_0000s.png", "v_0005s.png", "v_0060s.png", "v_0120s.png", "v_1000s.png"]);
    }

    #[test]
    fn test_parse_frame_timestamp() {
        assert_eq!(parse_frame_timestamp("My_Talk_0065s.png"), Some(SampleTimestamp::from_secs(65)));
        assert_eq!(parse_frame_timestamp("v_12345s.jpg"), Some(SampleTimestamp::from_secs(12345)));
        assert_eq!(parse_frame_timestamp("holiday.png"), None);
        assert_eq!(parse_frame_timestamp("v_s.png"), None);
        assert_eq!(parse_frame_timestamp("v_12xs.png"), None);
    }

    #[test]
    fn test_layout() {
        let layout = OutputLayout::new(Path::new("/out"), "Talk");
        assert_eq!(layout.video_dir, PathBuf::from("/out/Talk"));
        assert_eq!(layout.images_dir, PathBuf::from("/out/Talk/images"));
        assert_eq!(layout.transcript_path, PathBuf::from("/out/Talk/Talk_transcript.txt"));
        assert_eq!(layout.pdf_path, PathBuf::from("/out/Talk/Talk_HD.pdf"));
        assert_eq!(layout.kept_video_path, PathBuf::from("/out/Talk/Talk.mp4"));
    }
}
