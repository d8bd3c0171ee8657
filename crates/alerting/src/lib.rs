//! Alerting System
//!
//! Provides the ergonomic alert vocabulary, audible and textual delivery
//! sinks, and per-category cooldown with an hourly cap.

mod manager;
mod notification;
mod notifier;
mod sink;

pub use manager::{AlertConfig, AlertManager, AlertState};
pub use notification::{AlertKind, Notification};
pub use notifier::Notifier;
pub use sink::{AudibleSink, DeliveryMode, NotificationSink, TextualSink};

use thiserror::Error;

/// Alert delivery errors
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Notification delivery failed: {0}")]
    Delivery(#[from] std::io::Error),

    #[error("Notification sink unavailable: {0}")]
    Unavailable(String),
}
