// External tool resolver for ffmpeg/ffprobe/yt-dlp/img2pdf/magick
//
// Resolution order:
// 1) Environment variable override (SHOTDECK_FFMPEG_PATH, etc.)
// 2) Sidecar next to the executable, or in a bin/ subdirectory
// 3) PATH fallback

use std::env;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Every tool the pipeline can shell out to, as (name, env override).
pub const KNOWN_TOOLS: [(&str, &str); 5] = [
    ("ffmpeg", "SHOTDECK_FFMPEG_PATH"),
    ("ffprobe", "SHOTDECK_FFPROBE_PATH"),
    ("yt-dlp", "SHOTDECK_YTDLP_PATH"),
    ("img2pdf", "SHOTDECK_IMG2PDF_PATH"),
    ("magick", "SHOTDECK_MAGICK_PATH"),
];

/// Get the directory containing the current executable
fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
}

/// Resolve a tool path.
fn resolve_tool(env_key: &str, default_name: &str) -> PathBuf {
    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
        log::warn!("{} points at {} which does not exist, ignoring", env_key, v);
    }

    let mut filename = default_name.to_string();
    if cfg!(windows) && !filename.to_lowercase().ends_with(".exe") {
        filename.push_str(".exe");
    }

    if let Some(dir) = exe_dir() {
        let candidate = dir.join(&filename);
        if candidate.exists() {
            return candidate;
        }

        let bin_candidate = dir.join("bin").join(&filename);
        if bin_candidate.exists() {
            return bin_candidate;
        }
    }

    PathBuf::from(default_name)
}

/// Resolve a tool by its short name. Unknown names resolve to themselves.
pub fn tool_path(tool: &str) -> PathBuf {
    KNOWN_TOOLS
        .iter()
        .find(|(name, _)| *name == tool)
        .map(|(name, key)| resolve_tool(key, name))
        .unwrap_or_else(|| PathBuf::from(tool))
}

pub fn ffprobe_path() -> PathBuf {
    tool_path("ffprobe")
}

pub fn ffmpeg_path() -> PathBuf {
    tool_path("ffmpeg")
}

pub fn ytdlp_path() -> PathBuf {
    tool_path("yt-dlp")
}

pub fn img2pdf_path() -> PathBuf {
    tool_path("img2pdf")
}

pub fn magick_path() -> PathBuf {
    tool_path("magick")
}

/// Check if a tool is available at the resolved path
pub fn is_tool_available(tool: &str) -> bool {
    if !KNOWN_TOOLS.iter().any(|(name, _)| *name == tool) {
        return false;
    }

    let path = tool_path(tool);
    if path.is_file() {
        return true;
    }

    // ffmpeg family wants -version, the python tools want --version
    let flag = match tool {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };

    Command::new(&path)
        .arg(flag)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
