//! Alert Manager Implementation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::AlertKind;

const HOUR: Duration = Duration::from_secs(3600);

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Cooldown period between alerts of the same kind (seconds)
    pub cooldown_seconds: u64,
    /// Maximum alerts per hour before throttling
    pub max_alerts_per_hour: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 60,
            max_alerts_per_hour: 30,
        }
    }
}

/// State of an alert
#[derive(Debug, Clone)]
pub struct AlertState {
    /// Last time this alert was fired
    pub last_fired: Instant,
    /// Number of times fired
    pub fire_count: usize,
}

/// Alert manager for per-kind cooldown and hourly throttling
#[derive(Debug)]
pub struct AlertManager {
    /// Configuration
    config: AlertConfig,
    /// Alert states by kind
    states: HashMap<AlertKind, AlertState>,
    /// Alerts fired in current hour
    hourly_count: usize,
    /// Hour start time
    hour_start: Instant,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig, now: Instant) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self {
            config,
            states: HashMap::new(),
            hourly_count: 0,
            hour_start: now,
        }
    }

    /// Check if an alert may fire now
    pub fn should_fire(&mut self, kind: AlertKind, now: Instant) -> bool {
        // Reset hourly counter if needed
        if now.duration_since(self.hour_start) >= HOUR {
            self.hourly_count = 0;
            self.hour_start = now;
        }

        if self.hourly_count >= self.config.max_alerts_per_hour {
            warn!("Alert throttled: max alerts per hour reached");
            return false;
        }

        if let Some(state) = self.states.get(&kind) {
            let cooldown = Duration::from_secs(self.config.cooldown_seconds);
            if now.duration_since(state.last_fired) < cooldown {
                debug!("Alert {} suppressed: in cooldown period", kind.as_str());
                return false;
            }
        }

        true
    }

    /// Record that an alert was fired
    pub fn record_fire(&mut self, kind: AlertKind, now: Instant) {
        self.hourly_count += 1;

        let state = self.states.entry(kind).or_insert(AlertState {
            last_fired: now,
            fire_count: 0,
        });
        state.last_fired = now;
        state.fire_count += 1;

        info!("Alert recorded: {} (count: {})", kind.as_str(), state.fire_count);
    }

    pub fn state(&self, kind: AlertKind) -> Option<&AlertState> {
        self.states.get(&kind)
    }

    /// Get hourly alert count
    pub fn hourly_count(&self) -> usize {
        self.hourly_count
    }

    /// Clear all alert states
    pub fn clear(&mut self) {
        self.states.clear();
        self.hourly_count = 0;
    }
}
