use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{Level, info};

use astroguard::detection::{self, yolo::YoloDetector};
use astroguard::{Annotator, DetectorConfig};

#[derive(Parser)]
#[command(name = "astroguard")]
#[command(about = "Detect fire extinguishers, toolboxes and oxygen tanks in space station images")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    detector: DetectorConfig,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run detection on one image and print what was found
    Detect {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Print detections as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the upload form over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8501")]
        bind: String,
    },
    /// Open the desktop window
    #[cfg(feature = "gui")]
    Gui,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    match args.command {
        Command::Detect { image_path, json } => detect(&args.detector, &image_path, json),
        Command::Serve { bind } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(astroguard::web::serve(args.detector, &bind))
        }
        #[cfg(feature = "gui")]
        Command::Gui => astroguard::gui::run(args.detector)
            .map_err(|e| anyhow::anyhow!("Failed to start AstroGuard: {}", e)),
    }
}

fn detect(config: &DetectorConfig, image_path: &Path, json: bool) -> anyhow::Result<()> {
    info!("Loading image: {}", image_path.display());
    let img = detection::open_image(image_path)
        .with_context(|| format!("Failed to load image {}", image_path.display()))?;

    let detector = YoloDetector::load(config).context("Failed to load detection model")?;
    let annotator = Annotator::from_config(config)?;
    let report = detection::run_detection(&detector, &annotator, &img)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.detections)?);
        return Ok(());
    }

    println!("\n=== {} ===", report.summary.headline());
    for det in &report.detections {
        println!(
            "  {} at ({:.0}, {:.0}) - ({:.0}, {:.0})",
            det.label(),
            det.bbox.x1,
            det.bbox.y1,
            det.bbox.x2,
            det.bbox.y2
        );
    }

    Ok(())
}
