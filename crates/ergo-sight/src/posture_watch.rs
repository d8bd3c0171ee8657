//! Periodic posture checks with alerting and grade logging

use std::time::Instant;

use alerting::{AlertKind, Notifier};
use detection::PoseLandmarks;
use posture::{PostureConfig, PostureReport, PostureState, PostureTracker};
use storage::{ProgressLog, POSTURE_CATEGORY};
use tracing::{info, warn};

pub struct PostureWatch {
    tracker: PostureTracker,
    notifier: Notifier,
    log: ProgressLog,
}

impl PostureWatch {
    pub fn new(config: &PostureConfig, notifier: Notifier, log: ProgressLog) -> Self {
        Self {
            tracker: PostureTracker::new(config),
            notifier,
            log,
        }
    }

    /// Capture the baseline; returns false when no pose is visible
    pub fn capture_baseline(&mut self, pose: Option<&PoseLandmarks>) -> bool {
        self.tracker.set_baseline(pose).is_some()
    }

    pub fn clear_baseline(&mut self) {
        info!("Posture baseline cleared");
        self.tracker.clear_baseline();
    }

    pub fn state(&self) -> PostureState {
        self.tracker.state()
    }

    /// Posture alerts delivered so far
    pub fn alerts_sent(&self) -> usize {
        self.notifier
            .manager()
            .state(AlertKind::Posture)
            .map_or(0, |s| s.fire_count)
    }

    /// One periodic check.
    ///
    /// A sustained deviation raises a posture alert; otherwise the grade is
    /// logged. Without a baseline nothing happens.
    pub fn check(&mut self, pose: Option<&PoseLandmarks>, now: Instant) -> Option<PostureReport> {
        let report = self.tracker.check(pose)?;

        if report.deviated {
            self.notifier.notify(AlertKind::Posture, now);
        } else if let Err(e) = self.log.append(POSTURE_CATEGORY, report.grade.as_str()) {
            warn!("Failed to log posture grade: {}", e);
        }
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use alerting::AlertConfig;
    use geometry::Point3;
    use tempfile::tempdir;

    fn pose(nose_y: f64) -> PoseLandmarks {
        let mut points = vec![Point3::default(); 33];
        points[0] = Point3::new(0.5, nose_y, 0.0);
        points[11] = Point3::new(0.4, 0.6, 0.0);
        points[12] = Point3::new(0.6, 0.6, 0.0);
        PoseLandmarks::new(points).unwrap()
    }

    fn watch(dir: &std::path::Path, recorder: &Recorder) -> PostureWatch {
        let notifier = Notifier::new(
            AlertConfig::default(),
            Box::new(recorder.clone()),
            Instant::now(),
        );
        let log = ProgressLog::open(dir.join("posture.txt")).unwrap();
        PostureWatch::new(&PostureConfig::default(), notifier, log)
    }

    #[test]
    fn test_no_baseline_does_nothing() {
        let dir = tempdir().unwrap();
        let recorder = Recorder::default();
        let mut w = watch(dir.path(), &recorder);

        assert!(w.check(Some(&pose(0.5)), Instant::now()).is_none());
        assert!(!w.capture_baseline(None));
        assert_eq!(w.state(), PostureState::NoBaseline);
        assert!(!dir.path().join("posture.txt").exists());
    }

    #[test]
    fn test_good_posture_is_logged() {
        let dir = tempdir().unwrap();
        let recorder = Recorder::default();
        let mut w = watch(dir.path(), &recorder);
        assert!(w.capture_baseline(Some(&pose(0.5))));

        let report = w.check(Some(&pose(0.5)), Instant::now()).unwrap();
        assert_eq!(report.deviation, 0);

        let log = ProgressLog::open(dir.path().join("posture.txt")).unwrap();
        assert_eq!(log.tally(POSTURE_CATEGORY).unwrap(), vec![("Good-Posture".to_string(), 1)]);
        assert!(recorder.titles().is_empty());
    }

    #[test]
    fn test_sustained_slouch_alerts_instead_of_logging() {
        let dir = tempdir().unwrap();
        let recorder = Recorder::default();
        let mut w = watch(dir.path(), &recorder);
        w.capture_baseline(Some(&pose(0.5)));

        let now = Instant::now();
        let slouch = pose(1.1);
        for _ in 0..2 {
            assert!(!w.check(Some(&slouch), now).unwrap().deviated);
        }
        let report = w.check(Some(&slouch), now).unwrap();
        assert!(report.deviated);
        assert_eq!(w.state(), PostureState::Deviated);
        assert_eq!(recorder.titles(), vec!["Posture Alert!"]);
        assert_eq!(w.alerts_sent(), 1);

        let log = ProgressLog::open(dir.path().join("posture.txt")).unwrap();
        assert_eq!(log.tally(POSTURE_CATEGORY).unwrap(), vec![("Poor-Posture".to_string(), 2)]);
    }

    #[test]
    fn test_clear_baseline() {
        let dir = tempdir().unwrap();
        let recorder = Recorder::default();
        let mut w = watch(dir.path(), &recorder);
        w.capture_baseline(Some(&pose(0.5)));
        w.clear_baseline();
        assert_eq!(w.state(), PostureState::NoBaseline);
        assert!(w.check(None, Instant::now()).is_none());
    }
}
