// ShotDeck CLI binary

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use shotdeck::acquire::YtDlp;
use shotdeck::constants::DEFAULT_PDF_DPI;
use shotdeck::dedup::{collect_frames, deduplicate};
use shotdeck::document::{collect_images, DocumentBuilder, ExternalPdfBuilder};
use shotdeck::extract::{FfmpegCapture, Quality};
use shotdeck::metadata::Ffprobe;
use shotdeck::progress::LogProgress;
use shotdeck::report::{summary, write_github_output};
use shotdeck::tools::{is_tool_available, tool_path, KNOWN_TOOLS};
use shotdeck::{Collaborators, Pipeline, PipelineRequest};

#[derive(Parser)]
#[command(name = "shotdeck")]
#[command(about = "ShotDeck - Screenshots and a PDF deck from an online video", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a video, sample frames, drop duplicates and build a PDF
    Process {
        /// Video URL
        url: String,
        /// Seconds between screenshots
        #[arg(allow_negative_numbers = true)]
        interval: i64,
        /// Output root directory
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,
        /// Screenshot quality
        #[arg(short, long, value_enum, default_value_t = Quality::Highest)]
        quality: Quality,
        /// PDF resolution
        #[arg(long, default_value_t = DEFAULT_PDF_DPI)]
        pdf_dpi: u32,
        /// Keep the downloaded video next to the screenshots
        #[arg(long)]
        keep_video: bool,
        /// Skip the transcript
        #[arg(long)]
        no_transcript: bool,
        /// Skip the PDF
        #[arg(long)]
        no_pdf: bool,
        /// Print the run report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Remove exact duplicate frames from an existing folder
    Dedup {
        /// Folder of screenshots
        images_dir: PathBuf,
    },

    /// Build a PDF from a folder of screenshots
    Pdf {
        /// Folder of screenshots
        images_dir: PathBuf,
        /// Output PDF path
        output: PathBuf,
        /// PDF resolution
        #[arg(long, default_value_t = DEFAULT_PDF_DPI)]
        dpi: u32,
    },

    /// Show which external tools resolve
    Tools,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();

    match cli.command {
        Commands::Process {
            url,
            interval,
            output_dir,
            quality,
            pdf_dpi,
            keep_video,
            no_transcript,
            no_pdf,
            json,
        } => {
            let request = PipelineRequest {
                locator: url,
                interval,
                output_dir,
                quality,
                pdf_dpi,
                keep_video,
                transcript: !no_transcript,
                build_document: !no_pdf,
            };
            cmd_process(request, json)
        }
        Commands::Dedup { images_dir } => cmd_dedup(images_dir),
        Commands::Pdf { images_dir, output, dpi } => cmd_pdf(images_dir, output, dpi),
        Commands::Tools => cmd_tools(),
    }
}

fn cmd_process(request: PipelineRequest, json: bool) -> Result<()> {
    if request.pdf_dpi == 0 {
        anyhow::bail!("--pdf-dpi must be greater than zero");
    }

    let source = YtDlp::new();
    let capture = FfmpegCapture::new();
    let probe = Ffprobe::new();
    let documents = ExternalPdfBuilder::new();
    let progress = LogProgress;

    let mut pipeline = Pipeline::new(Collaborators {
        source: &source,
        capture: &capture,
        probe: &probe,
        documents: &documents,
        progress: Some(&progress),
    });

    let report = pipeline.run(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("{}", summary(&report));
    }

    if let Ok(gh_output) = std::env::var("GITHUB_OUTPUT") {
        if !gh_output.is_empty() {
            write_github_output(&PathBuf::from(gh_output), &report)?;
        }
    }

    Ok(())
}

fn cmd_dedup(images_dir: PathBuf) -> Result<()> {
    let artifacts = collect_frames(&images_dir)?;
    if artifacts.is_empty() {
        println!("No screenshots found in {}", images_dir.display());
        return Ok(());
    }

    let total = artifacts.len();
    let result = deduplicate(artifacts);

    println!("Deduplicated {}:", images_dir.display());
    println!("  Screenshots:  {}", total);
    println!("  Removed:      {}", result.removed_count);
    println!("  Remaining:    {}", result.survivors.len());

    Ok(())
}

fn cmd_pdf(images_dir: PathBuf, output: PathBuf, dpi: u32) -> Result<()> {
    if dpi == 0 {
        anyhow::bail!("--dpi must be greater than zero");
    }

    let images = collect_images(&images_dir)?;
    if images.is_empty() {
        anyhow::bail!("No screenshots found in {}", images_dir.display());
    }

    ExternalPdfBuilder::new().build(&images, &output, dpi)?;
    println!("PDF created: {} ({} pages)", output.display(), images.len());

    Ok(())
}

fn cmd_tools() -> Result<()> {
    println!("{:<10}  {:<9}  {}", "Tool", "Status", "Path");
    println!("{}", "-".repeat(60));

    for (name, env_key) in KNOWN_TOOLS.iter() {
        let status = if is_tool_available(name) { "ok" } else { "missing" };
        println!("{:<10}  {:<9}  {}", name, status, tool_path(name).display());
        log::debug!("{} can be overridden with {}", name, env_key);
    }

    Ok(())
}
