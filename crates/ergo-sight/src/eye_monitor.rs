//! Eye strain reporting
//!
//! Folds per-frame outcomes into the 10 second dominant-state and
//! blink-rate windows, logs dominant states and raises eye alerts.

use std::time::Instant;

use alerting::{AlertKind, Notifier};
use fatigue::{
    BlinkConfig, BlinkRate, BlinkRateWindow, BlinkSummary, DominantStateWindow, FatigueConfig,
    OverallState,
};
use storage::{ProgressLog, EMOTION_CATEGORY};
use tracing::{debug, info, warn};

use crate::FrameOutcome;

/// What one observation produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EyeEvents {
    /// Dominant state of a window that just elapsed
    pub dominant: Option<OverallState>,
    /// Blink count of a window that just elapsed
    pub blink_summary: Option<BlinkSummary>,
    /// Alerts actually delivered
    pub alerts: Vec<AlertKind>,
}

pub struct EyeStrainMonitor {
    dominant: DominantStateWindow,
    blinks: BlinkRateWindow,
    notifier: Notifier,
    log: ProgressLog,
}

impl EyeStrainMonitor {
    pub fn new(
        fatigue: &FatigueConfig,
        blink: &BlinkConfig,
        notifier: Notifier,
        log: ProgressLog,
        now: Instant,
    ) -> Self {
        Self {
            dominant: DominantStateWindow::new(fatigue.report_window(), now),
            blinks: BlinkRateWindow::new(blink, now),
            notifier,
            log,
        }
    }

    /// Frames without a decided state leave both windows untouched.
    pub fn observe(&mut self, outcome: &FrameOutcome, now: Instant) -> EyeEvents {
        let mut events = EyeEvents::default();
        let (Some(verdict), Some(state)) = (outcome.verdict, outcome.state()) else {
            return events;
        };

        self.dominant.record(state);
        if outcome.blink {
            self.blinks.record_blink();
        }

        if let Some(dominant) = self.dominant.poll(now) {
            info!("Dominant eye state: {}", dominant.as_str());
            if let Err(e) = self.log.append(EMOTION_CATEGORY, dominant.as_str()) {
                warn!("Failed to log eye state: {}", e);
            }
            if dominant == OverallState::Fatigue {
                self.raise(AlertKind::Fatigue, now, &mut events);
            }
            events.dominant = Some(dominant);
        }

        if verdict.blink {
            if let Some(summary) = self.blinks.poll(now) {
                debug!("Blink window closed with {} blinks ({:?})", summary.blinks, summary.rate);
                match summary.rate {
                    BlinkRate::TooFew => self.raise(AlertKind::LowBlinkRate, now, &mut events),
                    BlinkRate::TooMany => self.raise(AlertKind::HighBlinkRate, now, &mut events),
                    BlinkRate::Normal => {}
                }
                events.blink_summary = Some(summary);
            }
        }

        events
    }

    pub fn blinks_in_window(&self) -> u32 {
        self.blinks.blinks()
    }

    fn raise(&mut self, kind: AlertKind, now: Instant, events: &mut EyeEvents) {
        if self.notifier.notify(kind, now) {
            events.alerts.push(kind);
        }
    }
}
