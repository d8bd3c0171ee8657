//! Monitoring loop
//!
//! A single task drives both cadences: frames at the capture rate and
//! posture checks every posture interval. Frame and detection failures skip
//! the cycle; end of stream or the shutdown future stops the loop.

use std::future::Future;
use std::time::Duration;

use camera_capture::FrameSource;
use detection::{DetectionSource, PoseLandmarks};
use posture::PostureState;
use serde::Serialize;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{AppConfig, EyeSession, EyeStrainMonitor, PostureWatch};

/// Totals for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub skipped: u64,
    pub blinks: u64,
    pub alerts: u64,
    pub posture_checks: u64,
}

pub struct Monitor<F, D> {
    frames: F,
    detections: D,
    session: EyeSession,
    eye: EyeStrainMonitor,
    posture: PostureWatch,
    frame_interval: Duration,
    posture_interval: Duration,
    baseline_requested: bool,
    latest_pose: Option<PoseLandmarks>,
}

impl<F: FrameSource, D: DetectionSource> Monitor<F, D> {
    pub fn new(
        config: &AppConfig,
        frames: F,
        detections: D,
        session: EyeSession,
        eye: EyeStrainMonitor,
        posture: PostureWatch,
    ) -> Self {
        Self {
            frames,
            detections,
            session,
            eye,
            posture,
            frame_interval: config.capture.frame_interval(),
            posture_interval: config.posture.interval(),
            baseline_requested: false,
            latest_pose: None,
        }
    }

    /// Capture the posture baseline from the next frame that shows a pose.
    ///
    /// Any existing baseline is cleared first, so posture checks pause until
    /// the new one is captured.
    pub fn request_baseline(&mut self) {
        if self.posture.state() != PostureState::NoBaseline {
            self.posture.clear_baseline();
        }
        self.baseline_requested = true;
    }

    pub fn posture(&self) -> &PostureWatch {
        &self.posture
    }

    /// Run until the frame source ends or `shutdown` resolves
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) -> anyhow::Result<RunSummary> {
        tokio::pin!(shutdown);

        let mut frame_tick = time::interval(self.frame_interval);
        frame_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut posture_tick =
            time::interval_at(Instant::now() + self.posture_interval, self.posture_interval);
        posture_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Monitoring started (frame every {:?}, posture every {:?})",
            self.frame_interval, self.posture_interval
        );

        let mut summary = RunSummary::default();
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = posture_tick.tick() => self.posture_cycle(&mut summary),
                _ = frame_tick.tick() => {
                    if !self.frame_cycle(&mut summary) {
                        info!("Frame source exhausted");
                        break;
                    }
                }
            }
        }

        summary.alerts += self.posture.alerts_sent() as u64;
        info!(
            "Monitoring stopped: {} frames, {} skipped, {} blinks, {} alerts",
            summary.frames, summary.skipped, summary.blinks, summary.alerts
        );
        Ok(summary)
    }

    /// One frame; returns false at end of stream
    fn frame_cycle(&mut self, summary: &mut RunSummary) -> bool {
        let frame = match self.frames.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => return false,
            Err(e) => {
                warn!("Frame read failed: {}", e);
                self.latest_pose = None;
                summary.skipped += 1;
                metrics::counter!("ergo_sight_frames_skipped_total").increment(1);
                return true;
            }
        };

        let refresh = self.session.needs_face_refresh(u64::from(frame.sequence));
        let detections = match self.detections.next(&frame, refresh) {
            Ok(detections) => detections,
            Err(e) => {
                warn!("Detection failed for frame {}: {}", frame.sequence, e);
                self.latest_pose = None;
                summary.skipped += 1;
                metrics::counter!("ergo_sight_frames_skipped_total").increment(1);
                return true;
            }
        };

        self.latest_pose = detections.pose.clone();
        if self.baseline_requested {
            if self.posture.capture_baseline(self.latest_pose.as_ref()) {
                self.baseline_requested = false;
            } else {
                debug!("Waiting for a visible pose to capture the baseline");
            }
        }

        let outcome = self.session.process(&frame, &detections);
        let events = self.eye.observe(&outcome, Instant::now().into_std());

        summary.frames += 1;
        metrics::counter!("ergo_sight_frames_processed_total").increment(1);
        if outcome.blink && outcome.state().is_some() {
            summary.blinks += 1;
            metrics::counter!("ergo_sight_blinks_total").increment(1);
        }
        if !events.alerts.is_empty() {
            summary.alerts += events.alerts.len() as u64;
            metrics::counter!("ergo_sight_alerts_total").increment(events.alerts.len() as u64);
        }
        true
    }

    fn posture_cycle(&mut self, summary: &mut RunSummary) {
        let now = Instant::now().into_std();
        let Some(report) = self.posture.check(self.latest_pose.as_ref(), now) else {
            return;
        };
        summary.posture_checks += 1;
        metrics::counter!("ergo_sight_posture_checks_total").increment(1);
        debug!("Posture check: {:?}", report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{detections, frame, NORMAL};
    use crate::testing::Recorder;
    use alerting::Notifier;
    use camera_capture::{CameraError, VecSource, VideoFrame};
    use detection::{DetectionError, FrameDetections};
    use geometry::Point3;
    use image::RgbImage;
    use std::collections::VecDeque;
    use storage::ProgressLog;

    /// Replays a fixed list of detection records, then empty ones
    #[derive(Default)]
    struct Scripted {
        records: VecDeque<Result<FrameDetections, DetectionError>>,
        refresh_hints: Vec<bool>,
    }

    impl DetectionSource for Scripted {
        fn next(
            &mut self,
            _frame: &VideoFrame,
            refresh_faces: bool,
        ) -> Result<FrameDetections, DetectionError> {
            self.refresh_hints.push(refresh_faces);
            self.records.pop_front().unwrap_or_else(|| Ok(FrameDetections::default()))
        }
    }

    fn pose(nose_y: f64) -> PoseLandmarks {
        let mut points = vec![Point3::default(); 33];
        points[0] = Point3::new(0.5, nose_y, 0.0);
        points[11] = Point3::new(0.4, 0.6, 0.0);
        points[12] = Point3::new(0.6, 0.6, 0.0);
        PoseLandmarks::new(points).unwrap()
    }

    fn small_frames(n: u32) -> VecSource {
        VecSource::new(
            (0..n)
                .map(|i| VideoFrame::from_rgb(RgbImage::new(32, 24), 0, i))
                .collect(),
        )
    }

    fn monitor<F: FrameSource>(
        config: &AppConfig,
        frames: F,
        detections: Scripted,
        dir: &std::path::Path,
        recorder: &Recorder,
    ) -> Monitor<F, Scripted> {
        let now = Instant::now().into_std();
        let session = EyeSession::new(config, None, None);
        let eye = EyeStrainMonitor::new(
            &config.fatigue,
            &config.blink,
            Notifier::new(config.notifications.alerts.clone(), Box::new(recorder.clone()), now),
            ProgressLog::open(dir.join("eye.txt")).unwrap(),
            now,
        );
        let posture = PostureWatch::new(
            &config.posture,
            Notifier::new(config.notifications.alerts.clone(), Box::new(recorder.clone()), now),
            ProgressLog::open(dir.join("posture.txt")).unwrap(),
        );
        Monitor::new(config, frames, detections, session, eye, posture)
    }

    fn slow_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.capture.fps = 2;
        config
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_until_stream_ends() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let mut source = small_frames(3);
        source.push_failure(CameraError::Timeout);
        source.push(VideoFrame::from_rgb(RgbImage::new(32, 24), 0, 3));

        let mut m = monitor(&slow_config(), source, Scripted::default(), dir.path(), &recorder);
        let summary = m.run(std::future::pending()).await.unwrap();

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.posture_checks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_loop() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let mut m = monitor(
            &slow_config(),
            small_frames(1000),
            Scripted::default(),
            dir.path(),
            &recorder,
        );

        let summary = m.run(time::sleep(Duration::from_secs(3))).await.unwrap();
        assert!(summary.frames >= 5 && summary.frames <= 7, "{:?}", summary);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detection_error_skips_frame() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let mut scripted = Scripted::default();
        scripted.records.push_back(Err(DetectionError::Parse {
            line: 1,
            reason: "bad record".into(),
        }));

        let mut m = monitor(&slow_config(), small_frames(2), scripted, dir.path(), &recorder);
        let summary = m.run(std::future::pending()).await.unwrap();
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sustained_slouch_raises_posture_alert() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let mut scripted = Scripted::default();
        scripted.records.push_back(Ok(FrameDetections {
            pose: Some(pose(0.5)),
            ..Default::default()
        }));
        for _ in 0..39 {
            scripted.records.push_back(Ok(FrameDetections {
                pose: Some(pose(1.1)),
                ..Default::default()
            }));
        }

        let mut m = monitor(&slow_config(), small_frames(40), scripted, dir.path(), &recorder);
        m.request_baseline();
        let summary = m.run(std::future::pending()).await.unwrap();

        assert_eq!(summary.frames, 40);
        assert!(summary.posture_checks >= 3);
        assert_eq!(m.posture().state(), PostureState::Deviated);
        assert_eq!(summary.alerts, 1);
        assert_eq!(recorder.titles(), vec!["Posture Alert!"]);

        m.request_baseline();
        assert_eq!(m.posture().state(), PostureState::NoBaseline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reads_count_as_missing_pose() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let mut scripted = Scripted::default();
        scripted.records.push_back(Ok(FrameDetections {
            pose: Some(pose(0.5)),
            ..Default::default()
        }));

        let mut source = small_frames(1);
        for _ in 0..40 {
            source.push_failure(CameraError::Timeout);
        }

        let mut m = monitor(&slow_config(), source, scripted, dir.path(), &recorder);
        m.request_baseline();
        let summary = m.run(std::future::pending()).await.unwrap();

        assert_eq!(summary.frames, 1);
        assert_eq!(summary.skipped, 40);
        assert!(summary.posture_checks >= 3);
        assert_eq!(m.posture().state(), PostureState::Deviated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_face_refresh_hint_follows_tracker() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let mut scripted = Scripted::default();
        scripted.records.push_back(Ok(detections(Some(NORMAL.to_vec()), 8.0)));
        let mut cached = detections(Some(NORMAL.to_vec()), 8.0);
        cached.faces = None;
        scripted.records.push_back(Ok(cached));

        let frames = VecSource::new(vec![frame(0), frame(1)]);
        let mut m = monitor(&slow_config(), frames, scripted, dir.path(), &recorder);
        m.run(std::future::pending()).await.unwrap();

        assert_eq!(m.detections.refresh_hints, vec![true, false]);
    }
}
