// Run report and its output adapters

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::timegrid::SampleTimestamp;

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub title: String,
    pub output_dir: PathBuf,
    pub extracted_count: usize,
    pub survivor_count: usize,
    pub removed_count: usize,
    pub failed_captures: Vec<SampleTimestamp>,
    pub document_path: Option<PathBuf>,
    /// Set when the document build was attempted and failed.
    pub document_error: Option<String>,
    pub transcript_path: Option<PathBuf>,
    pub video_path: Option<PathBuf>,
    pub finished_at: String,
}

fn display_opt(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

/// `key=value` lines in the format CI runners read from `$GITHUB_OUTPUT`.
pub fn github_output_lines(report: &PipelineReport) -> String {
    format!(
        "output_dir={}\npdf_file={}\ntranscript_file={}\nscreenshot_count={}\n",
        report.output_dir.display(),
        display_opt(&report.document_path),
        display_opt(&report.transcript_path),
        report.survivor_count,
    )
}

/// Append the report to a GitHub Actions output file.
pub fn write_github_output(path: &Path, report: &PipelineReport) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(github_output_lines(report).as_bytes())?;
    Ok(())
}

/// Human-readable summary printed at the end of a run.
pub fn summary(report: &PipelineReport) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();
    out.push_str(&format!("{}\n", rule));
    out.push_str("COMPLETED SUCCESSFULLY\n");
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!("Output:      {}\n", report.output_dir.display()));
    out.push_str(&format!(
        "Screenshots: {} ({} extracted, {} duplicates removed)\n",
        report.survivor_count, report.extracted_count, report.removed_count
    ));
    if !report.failed_captures.is_empty() {
        let skipped: Vec<String> = report.failed_captures.iter().map(|t| t.clock()).collect();
        out.push_str(&format!("Skipped:     {}\n", skipped.join(", ")));
    }
    if let Some(ref pdf) = report.document_path {
        out.push_str(&format!("PDF:         {}\n", file_name(pdf)));
    }
    if let Some(ref err) = report.document_error {
        out.push_str(&format!("PDF failed:  {}\n", err));
    }
    if let Some(ref transcript) = report.transcript_path {
        out.push_str(&format!("Transcript:  {}\n", file_name(transcript)));
    }
    if let Some(ref video) = report.video_path {
        out.push_str(&format!("Video:       {}\n", file_name(video)));
    }
    out.push_str(&rule);
    out
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
