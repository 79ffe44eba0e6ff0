// Caption track to plain-text transcript
//
// Accepts SRT and WebVTT. Cue numbers, timing lines and markup are dropped,
// the remaining text is joined and word-wrapped.

use std::path::Path;

use regex::Regex;

use crate::constants::{TRANSCRIPT_HEADER, TRANSCRIPT_RULE_WIDTH, TRANSCRIPT_WRAP_WIDTH};
use crate::error::{Result, ShotDeckError};

/// Convert caption text to a transcript document.
pub fn captions_to_text(captions: &str) -> String {
    let tag_re = Regex::new(r"<[^<]+?>").ok();

    let mut cues: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for raw in captions.lines() {
        let line = raw.trim().trim_start_matches('\u{feff}');

        if line.is_empty() {
            if !current.is_empty() {
                cues.push(current.join(" "));
                current.clear();
            }
            continue;
        }

        if is_cue_number(line) || line.contains("-->") || line.starts_with("WEBVTT") {
            continue;
        }

        let text = match &tag_re {
            Some(re) => re.replace_all(line, "").into_owned(),
            None => line.to_string(),
        };
        current.push(text);
    }

    if !current.is_empty() {
        cues.push(current.join(" "));
    }

    let joined = cues.join(" ");
    let full_text = joined.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = String::new();
    out.push_str(TRANSCRIPT_HEADER);
    out.push('\n');
    out.push_str(&"=".repeat(TRANSCRIPT_RULE_WIDTH));
    out.push_str("\n\n");
    out.push_str(&wrap(&full_text, TRANSCRIPT_WRAP_WIDTH));
    out
}

/// Read a caption file and write the transcript next to the other outputs.
pub fn convert_file(captions_path: &Path, transcript_path: &Path) -> Result<()> {
    let bytes = std::fs::read(captions_path).map_err(|e| {
        ShotDeckError::Transcript(format!("Failed to read {}: {}", captions_path.display(), e))
    })?;
    // Caption files in the wild are not always valid UTF-8
    let captions = String::from_utf8_lossy(&bytes);

    std::fs::write(transcript_path, captions_to_text(&captions)).map_err(|e| {
        ShotDeckError::Transcript(format!("Failed to write {}: {}", transcript_path.display(), e))
    })?;

    Ok(())
}

fn is_cue_number(line: &str) -> bool {
    line.chars().all(|c| c.is_ascii_digit())
}

/// Greedy word wrap. Words longer than `width` are split across lines.
fn wrap(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        loop {
            let needed = if line_len == 0 { chars.len() } else { line_len + 1 + chars.len() };
            if needed <= width {
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.extend(chars.iter());
                line_len += chars.len();
                break;
            }

            if chars.len() <= width {
                // Fits on a fresh line
                lines.push(std::mem::take(&mut line));
                line_len = 0;
                continue;
            }

            // Too long for any line: fill what is left of this one
            let room = if line_len == 0 { width } else { width.saturating_sub(line_len + 1) };
            if room == 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
                continue;
            }
            if line_len > 0 {
                line.push(' ');
            }
            let rest = chars.split_off(room);
            line.extend(chars.iter());
            lines.push(std::mem::take(&mut line));
            line_len = 0;
            chars = rest;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}
