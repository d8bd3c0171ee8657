//! ErgoSight Monitor
//!
//! Wires the per-frame eye pipeline, the posture watch, alert delivery and
//! the progress logs into a single-task monitoring loop.

pub mod config;
pub mod eye_monitor;
pub mod posture_watch;
pub mod runner;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use eye_monitor::{EyeEvents, EyeStrainMonitor};
pub use posture_watch::PostureWatch;
pub use runner::{Monitor, RunSummary};
pub use session::{EyeSession, FrameOutcome};

use config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }
    Ok(())
}
