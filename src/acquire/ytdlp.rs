// yt-dlp backed acquisition

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;

use super::{AcquiredMedia, VideoInfo, VideoSource};
use crate::constants::{SUBTITLE_LANG, SUBTITLE_SUFFIXES, UNTITLED, YTDLP_FORMAT_CHAIN};
use crate::error::{Result, ShotDeckError};

/// Subset of `yt-dlp --dump-json`.
#[derive(Debug, Deserialize)]
struct DumpJson {
    title: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    view_count: Option<u64>,
    #[serde(default)]
    subtitles: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    automatic_captions: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new() -> Self {
        Self { binary: crate::tools::ytdlp_path() }
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_dump_json(stdout: &[u8]) -> Result<VideoInfo> {
    let dump: DumpJson = serde_json::from_slice(stdout)
        .map_err(|e| ShotDeckError::Acquisition(format!("Failed to parse yt-dlp metadata: {}", e)))?;

    let non_empty = |m: &Option<HashMap<String, serde_json::Value>>| m.as_ref().map_or(false, |m| !m.is_empty());

    Ok(VideoInfo {
        title: dump.title.unwrap_or_else(|| UNTITLED.to_string()),
        duration: dump.duration.filter(|d| d.is_finite() && *d >= 0.0).unwrap_or(0.0),
        uploader: dump.uploader.unwrap_or_else(|| "Unknown".to_string()),
        view_count: dump.view_count.unwrap_or(0),
        has_captions: non_empty(&dump.subtitles) || non_empty(&dump.automatic_captions),
    })
}

/// Arguments for the download invocation.
fn download_args(video_path: &Path, want_captions: bool) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-f".into(),
        YTDLP_FORMAT_CHAIN.join("/"),
        "--no-playlist".into(),
        "--merge-output-format".into(),
        "mp4".into(),
        "-o".into(),
        video_path.to_string_lossy().to_string(),
    ];

    if want_captions {
        args.extend(
            [
                "--write-auto-subs",
                "--write-subs",
                "--sub-lang",
                SUBTITLE_LANG,
                "--convert-subs",
                "srt",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
    }

    args
}

/// Look for a caption file next to the downloaded video.
pub fn find_captions(video_path: &Path) -> Option<PathBuf> {
    let dir = video_path.parent()?;
    let stem = video_path.file_stem()?.to_string_lossy();

    SUBTITLE_SUFFIXES
        .iter()
        .map(|suffix| dir.join(format!("{}{}", stem, suffix)))
        .find(|candidate| candidate.is_file())
}

impl VideoSource for YtDlp {
    fn fetch_info(&self, locator: &str) -> Result<VideoInfo> {
        let output = Command::new(&self.binary)
            .args(["--dump-json", "--no-playlist", locator])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ShotDeckError::Acquisition(format!("Failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ShotDeckError::Acquisition(format!("yt-dlp metadata lookup failed: {}", stderr.trim())));
        }

        parse_dump_json(&output.stdout)
    }

    fn materialize(&self, locator: &str, video_path: &Path, want_captions: bool) -> Result<AcquiredMedia> {
        log::info!("Downloading video...");

        // Progress output goes straight to the terminal
        let status = Command::new(&self.binary)
            .args(download_args(video_path, want_captions))
            .arg(locator)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| ShotDeckError::Acquisition(format!("Failed to run yt-dlp: {}", e)))?;

        if !status.success() {
            return Err(ShotDeckError::Acquisition(format!("yt-dlp download failed ({})", status)));
        }

        let size = std::fs::metadata(video_path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(ShotDeckError::Acquisition(format!(
                "yt-dlp reported success but {} is missing or empty",
                video_path.display()
            )));
        }

        let captions_path = if want_captions { find_captions(video_path) } else { None };
        if want_captions && captions_path.is_none() {
            log::info!("No caption track found for {}", locator);
        }

        Ok(AcquiredMedia {
            video_path: video_path.to_path_buf(),
            captions_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_dump_json() {
        let json = br#"{
            "title": "A Talk",
            "duration": 754,
            "uploader": "Someone",
            "view_count": 12,
            "subtitles": {},
            "automatic_captions": {"en": [{"ext": "vtt"}]}
        }"#;
        let info = parse_dump_json(json).unwrap();
        assert_eq!(info.title, "A Talk");
        assert_eq!(info.duration, 754.0);
        assert_eq!(info.uploader, "Someone");
        assert_eq!(info.view_count, 12);
        assert!(info.has_captions);
    }

    #[test]
    fn test_parse_dump_json_defaults() {
        let info = parse_dump_json(br#"{"subtitles": null}"#).unwrap();
        assert_eq!(info.title, "untitled");
        assert_eq!(info.duration, 0.0);
        assert_eq!(info.uploader, "Unknown");
        assert!(!info.has_captions);
    }

    #[test]
    fn test_parse_dump_json_garbage() {
        assert!(matches!(parse_dump_json(b"<html>"), Err(ShotDeckError::Acquisition(_))));
    }

    #[test]
    fn test_download_args() {
        let args = download_args(Path::new("/tmp/x/video.mp4"), false);
        assert_eq!(args[0], "-f");
        assert!(args[1].starts_with("bestvideo[height>=1080]"));
        assert!(args[1].ends_with("best[ext=mp4]/best"));
        assert!(args.contains(&"/tmp/x/video.mp4".to_string()));
        assert!(!args.contains(&"--write-subs".to_string()));

        let with_subs = download_args(Path::new("/tmp/x/video.mp4"), true);
        assert!(with_subs.ends_with(&[
            "--write-auto-subs".to_string(),
            "--write-subs".to_string(),
            "--sub-lang".to_string(),
            "en".to_string(),
            "--convert-subs".to_string(),
            "srt".to_string(),
        ]));
    }

    #[test]
    fn test_find_captions_preference() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("video.mp4");
        assert_eq!(find_captions(&video), None);

        std::fs::write(dir.path().join("video.vtt"), "WEBVTT").unwrap();
        assert_eq!(find_captions(&video), Some(dir.path().join("video.vtt")));

        std::fs::write(dir.path().join("video.en.srt"), "1").unwrap();
        assert_eq!(find_captions(&video), Some(dir.path().join("video.en.srt")));
    }

    #[test]
    fn test_missing_binary_is_acquisition_error() {
        let source = YtDlp::with_binary("/nonexistent/yt-dlp");
        assert!(matches!(source.fetch_info("https://example.com/v"), Err(ShotDeckError::Acquisition(_))));
    }
}
