// PDF assembly from the surviving frames
//
// img2pdf is preferred because it embeds PNG/JPEG data without re-encoding.
// ImageMagick is the fallback when img2pdf is missing or fails.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use walkdir::WalkDir;

use crate::constants::IMAGE_EXTENSIONS;
use crate::error::{Result, ShotDeckError};
use crate::paths::parse_frame_timestamp;

/// Builds one paginated document from an ordered list of images.
pub trait DocumentBuilder {
    fn build(&self, images: &[PathBuf], output: &Path, dpi: u32) -> Result<()>;
}

/// List the frame images directly inside `dir` in capture order.
///
/// Frame files sort by title then sample time, so `v_10000s` follows `v_9995s`.
/// Anything else sorts by filename.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ShotDeckError::InvalidPath(format!("{} is not a directory", dir.display())));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_image(p))
        .collect();

    images.sort_by_cached_key(|p| frame_order(p));
    Ok(images)
}

fn frame_order(path: &Path) -> (String, u64, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let (group, secs) = match (parse_frame_timestamp(&name), name.rsplit_once('_')) {
        (Some(at), Some((prefix, _))) => (prefix.to_string(), at.secs()),
        _ => (name.clone(), 0),
    };
    (group, secs, name)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// PDF via external tools: img2pdf, then ImageMagick.
#[derive(Debug, Clone)]
pub struct ExternalPdfBuilder {
    img2pdf: PathBuf,
    magick: PathBuf,
}

impl ExternalPdfBuilder {
    pub fn new() -> Self {
        Self {
            img2pdf: crate::tools::img2pdf_path(),
            magick: crate::tools::magick_path(),
        }
    }

    pub fn with_binaries(img2pdf: impl Into<PathBuf>, magick: impl Into<PathBuf>) -> Self {
        Self {
            img2pdf: img2pdf.into(),
            magick: magick.into(),
        }
    }

    fn run(&self, program: &Path, args: Vec<String>, output: &Path) -> Result<()> {
        let result = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ShotDeckError::DocumentBuild(format!("Failed to run {}: {}", program.display(), e)))?;

        if !result.status.success() {
            let _ = std::fs::remove_file(output);
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ShotDeckError::DocumentBuild(format!(
                "{} failed: {}",
                program.display(),
                stderr.trim()
            )));
        }

        let size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            let _ = std::fs::remove_file(output);
            return Err(ShotDeckError::DocumentBuild(format!("{} wrote no document", program.display())));
        }

        Ok(())
    }
}

impl Default for ExternalPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Each image is placed at `dpi`, so pixel size maps to page size.
fn img2pdf_args(images: &[PathBuf], output: &Path, dpi: u32) -> Vec<String> {
    let mut args = vec![
        "--imgsize".to_string(),
        format!("{}dpi", dpi),
        "-o".to_string(),
        output.to_string_lossy().to_string(),
    ];
    args.extend(images.iter().map(|p| p.to_string_lossy().to_string()));
    args
}

fn magick_args(images: &[PathBuf], output: &Path, dpi: u32) -> Vec<String> {
    let mut args = vec!["-density".to_string(), dpi.to_string()];
    args.extend(images.iter().map(|p| p.to_string_lossy().to_string()));
    args.push(output.to_string_lossy().to_string());
    args
}

impl DocumentBuilder for ExternalPdfBuilder {
    fn build(&self, images: &[PathBuf], output: &Path, dpi: u32) -> Result<()> {
        if images.is_empty() {
            return Err(ShotDeckError::DocumentBuild("No images to put in the document".to_string()));
        }

        log::info!("Creating PDF with {} images at {} DPI...", images.len(), dpi);

        match self.run(&self.img2pdf, img2pdf_args(images, output, dpi), output) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("{}, trying ImageMagick", e);
                self.run(&self.magick, magick_args(images, output, dpi), output)
                    .map_err(|fallback| ShotDeckError::DocumentBuild(format!("{}; fallback: {}", e, fallback)))
            }
        }
    }
}
