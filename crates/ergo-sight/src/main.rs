//! ErgoSight - Main Entry Point

use std::path::PathBuf;
use std::time::Instant;

use alerting::Notifier;
use anyhow::Context;
use camera_capture::ImageDirSource;
use clap::{Parser, Subcommand};
use detection::JsonlDetections;
use ergo_sight::session::{DynEmotionModel, DynHeatmapModel};
use ergo_sight::{init_logging, AppConfig, EyeSession, EyeStrainMonitor, Monitor, PostureWatch};
use inference_engine::{OnnxEmotionModel, OnnxHeatmapModel};
use storage::{ProgressLog, EMOTION_CATEGORY, POSTURE_CATEGORY};
use tracing::info;

/// ErgoSight - webcam ergonomics monitor
#[derive(Parser)]
#[command(name = "ergo-sight")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor eye strain, blink rate and posture
    Monitor {
        /// Directory of captured frames, replayed in file-name order
        #[arg(long)]
        frames: PathBuf,

        /// Detection records, one JSON object per frame
        #[arg(long)]
        detections: PathBuf,

        /// Capture the posture baseline from the first visible pose
        #[arg(long)]
        capture_baseline: bool,
    },
    /// Summarize today's progress log
    Progress {
        /// Progress log to read; defaults to the configured log for the category
        #[arg(long)]
        log: Option<PathBuf>,

        /// Entry category to tally
        #[arg(long, default_value = EMOTION_CATEGORY)]
        category: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    info!("=== ErgoSight v{} ===", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Monitor {
            frames,
            detections,
            capture_baseline,
        } => monitor(&config, frames, detections, capture_baseline).await,
        Commands::Progress { log, category } => progress(&config, log, &category),
    }
}

async fn monitor(
    config: &AppConfig,
    frames: PathBuf,
    detections: PathBuf,
    capture_baseline: bool,
) -> anyhow::Result<()> {
    let eye_log = ProgressLog::open(&config.storage.eye_log)?;
    let posture_log = ProgressLog::open(&config.storage.posture_log)?;
    eye_log.retain_today()?;
    posture_log.retain_today()?;

    let heatmap = match &config.models.heatmap {
        Some(path) => {
            let model = OnnxHeatmapModel::load(
                path,
                config.gaze.crop_height as usize,
                config.gaze.crop_width as usize,
            )
            .with_context(|| format!("Failed to load heatmap model {}", path.display()))?;
            Some(Box::new(model) as DynHeatmapModel)
        }
        None => None,
    };
    let emotion = match &config.models.emotion {
        Some(path) => {
            let model = OnnxEmotionModel::load(path)
                .with_context(|| format!("Failed to load emotion model {}", path.display()))?;
            Some(Box::new(model) as DynEmotionModel)
        }
        None => None,
    };

    let frames = ImageDirSource::open(&frames)?;
    let detections = JsonlDetections::open(&detections)?;

    let now = Instant::now();
    let session = EyeSession::new(config, heatmap, emotion);
    let eye = EyeStrainMonitor::new(
        &config.fatigue,
        &config.blink,
        Notifier::new(
            config.notifications.alerts.clone(),
            config.notifications.eye.stdout_sink(),
            now,
        ),
        eye_log,
        now,
    );
    let posture = PostureWatch::new(
        &config.posture,
        Notifier::new(
            config.notifications.alerts.clone(),
            config.notifications.posture.stdout_sink(),
            now,
        ),
        posture_log,
    );

    let mut monitor = Monitor::new(config, frames, detections, session, eye, posture);
    if capture_baseline {
        monitor.request_baseline();
    }

    let summary = monitor
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    println!(
        "Processed {} frames ({} skipped), {} blinks, {} alerts, {} posture checks",
        summary.frames, summary.skipped, summary.blinks, summary.alerts, summary.posture_checks
    );
    Ok(())
}

fn progress(config: &AppConfig, log: Option<PathBuf>, category: &str) -> anyhow::Result<()> {
    let path = log.unwrap_or_else(|| {
        if category == POSTURE_CATEGORY {
            config.storage.posture_log.clone()
        } else {
            config.storage.eye_log.clone()
        }
    });

    let log = ProgressLog::open(&path)?;
    log.retain_today()?;
    let tally = log.tally(category)?;
    let total: usize = tally.iter().map(|(_, n)| n).sum();

    if total == 0 {
        println!("No {} entries recorded today", category);
        return Ok(());
    }

    println!("{} ({} entries)", category, total);
    for (value, count) in tally {
        println!("  {:<16} {:>5.1}%", value, 100.0 * count as f64 / total as f64);
    }
    Ok(())
}
