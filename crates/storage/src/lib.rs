//! Storage Layer
//!
//! Provides the append-only progress log behind the progress charts.

mod progress;

pub use progress::{ProgressEntry, ProgressLog, EMOTION_CATEGORY, POSTURE_CATEGORY};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Progress log I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed progress line: {0}")]
    Parse(String),
}
