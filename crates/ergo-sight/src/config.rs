//! Application configuration
//!
//! Layered with the `config` crate, lowest priority first:
//! - Built-in defaults
//! - An optional TOML file (`--config`)
//! - Environment variables prefixed `ERGO_SIGHT__`, sections separated by
//!   `__` (e.g. `ERGO_SIGHT__POSTURE__THRESHOLD=30`)

use std::path::{Path, PathBuf};

use alerting::{AlertConfig, DeliveryMode};
use anyhow::{ensure, Context};
use camera_capture::CameraConfig;
use config::{Config, Environment, File};
use fatigue::{BlinkConfig, FatigueConfig};
use gaze::GazeConfig;
use posture::PostureConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub capture: CameraConfig,
    pub gaze: GazeConfig,
    pub fatigue: FatigueConfig,
    pub blink: BlinkConfig,
    pub posture: PostureConfig,
    pub notifications: NotificationsConfig,
    pub storage: StorageConfig,
    pub models: ModelsConfig,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

/// Alert delivery per monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Delivery for fatigue and blink alerts
    pub eye: DeliveryMode,
    /// Delivery for posture alerts
    pub posture: DeliveryMode,
    /// Cooldown and hourly cap, applied per monitor
    pub alerts: AlertConfig,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            eye: DeliveryMode::Textual,
            posture: DeliveryMode::Audible,
            alerts: AlertConfig::default(),
        }
    }
}

/// Progress log locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Dominant eye-state log
    pub eye_log: PathBuf,
    /// Posture grade log
    pub posture_log: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            eye_log: PathBuf::from("FILES/ergo-sight-progress.txt"),
            posture_log: PathBuf::from("FILES/posture_data.txt"),
        }
    }
}

/// ONNX model files; unset models fall back to detection-supplied data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Eye landmark heatmap model
    pub heatmap: Option<PathBuf>,
    /// Face emotion classifier
    pub emotion: Option<PathBuf>,
}

impl AppConfig {
    /// Load defaults, then the optional file, then the environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = Config::builder()
            .add_source(
                Config::try_from(&AppConfig::default())
                    .context("Failed to encode default configuration")?,
            );

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("ERGO_SIGHT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let config: Self = config.try_deserialize().context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject window sizes and rates the pipeline cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.capture.fps > 0, "capture.fps must be > 0");
        ensure!(self.fatigue.label_window > 0, "fatigue.label_window must be > 0");
        ensure!(self.fatigue.smoothing_window > 0, "fatigue.smoothing_window must be > 0");
        ensure!(self.gaze.history_capacity > 0, "gaze.history_capacity must be > 0");
        ensure!(
            self.gaze.crop_width > 0 && self.gaze.crop_height > 0,
            "gaze crop size must be non-zero"
        );
        ensure!(self.posture.max_buffer > 0, "posture.max_buffer must be > 0");
        ensure!(self.posture.interval_secs > 0, "posture.interval_secs must be > 0");
        Ok(())
    }
}
