//! Rolling report windows
//!
//! Both windows are wall-clock based: samples accumulate until the window
//! duration has elapsed, then the next poll reports a summary and restarts
//! the window. `Instant`s are passed in so tests can drive time.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{BlinkConfig, OverallState};

/// Most frequent overall state per window
#[derive(Debug)]
pub struct DominantStateWindow {
    duration: Duration,
    started: Instant,
    counts: Vec<(OverallState, usize)>,
}

impl DominantStateWindow {
    pub fn new(duration: Duration, now: Instant) -> Self {
        Self {
            duration,
            started: now,
            counts: Vec::new(),
        }
    }

    pub fn record(&mut self, state: OverallState) {
        match self.counts.iter_mut().find(|(s, _)| *s == state) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((state, 1)),
        }
    }

    /// Dominant state once the window has elapsed; ties go to the first seen.
    ///
    /// An elapsed window with no samples restarts and reports nothing.
    pub fn poll(&mut self, now: Instant) -> Option<OverallState> {
        if now.duration_since(self.started) < self.duration {
            return None;
        }

        let mut best: Option<(OverallState, usize)> = None;
        for (state, n) in &self.counts {
            if best.map_or(true, |(_, top)| *n > top) {
                best = Some((*state, *n));
            }
        }

        self.counts.clear();
        self.started = now;
        best.map(|(state, _)| state)
    }
}

/// Blink frequency relative to the configured band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlinkRate {
    TooFew,
    Normal,
    TooMany,
}

/// Blink count for one elapsed window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkSummary {
    pub blinks: u32,
    pub rate: BlinkRate,
}

/// Blink instances per window
#[derive(Debug)]
pub struct BlinkRateWindow {
    duration: Duration,
    started: Instant,
    blinks: u32,
    min_blinks: u32,
    max_blinks: u32,
}

impl BlinkRateWindow {
    pub fn new(config: &BlinkConfig, now: Instant) -> Self {
        Self {
            duration: config.window(),
            started: now,
            blinks: 0,
            min_blinks: config.min_blinks,
            max_blinks: config.max_blinks,
        }
    }

    pub fn record_blink(&mut self) {
        self.blinks = self.blinks.saturating_add(1);
    }

    pub fn blinks(&self) -> u32 {
        self.blinks
    }

    /// Classify and restart once the window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<BlinkSummary> {
        if now.duration_since(self.started) < self.duration {
            return None;
        }

        let rate = if self.blinks < self.min_blinks {
            BlinkRate::TooFew
        } else if self.blinks > self.max_blinks {
            BlinkRate::TooMany
        } else {
            BlinkRate::Normal
        };
        let summary = BlinkSummary {
            blinks: self.blinks,
            rate,
        };

        self.blinks = 0;
        self.started = now;
        Some(summary)
    }
}
