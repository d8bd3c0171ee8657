//! Throttled notification delivery

use std::time::Instant;

use tracing::{info, warn};

use crate::{AlertConfig, AlertKind, AlertManager, NotificationSink};

/// Sends alerts through a sink, subject to cooldown and the hourly cap.
///
/// Delivery failures are logged and reported as "not sent"; they never
/// propagate to the caller.
pub struct Notifier {
    manager: AlertManager,
    sink: Box<dyn NotificationSink + Send>,
}

impl Notifier {
    pub fn new(config: AlertConfig, sink: Box<dyn NotificationSink + Send>, now: Instant) -> Self {
        Self {
            manager: AlertManager::new(config, now),
            sink,
        }
    }

    /// Deliver `kind` unless throttled; returns whether it was sent
    pub fn notify(&mut self, kind: AlertKind, now: Instant) -> bool {
        if !self.manager.should_fire(kind, now) {
            return false;
        }

        let notification = kind.notification();
        match self.sink.deliver(&notification) {
            Ok(()) => {
                info!("{}: {}", notification.title, notification.message);
                self.manager.record_fire(kind, now);
                true
            }
            Err(e) => {
                warn!("Failed to deliver {} alert: {}", kind.as_str(), e);
                false
            }
        }
    }

    pub fn manager(&self) -> &AlertManager {
        &self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlertError, Notification};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Notification>>>);

    impl NotificationSink for Recorder {
        fn deliver(&mut self, notification: &Notification) -> Result<(), AlertError> {
            self.0.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct Broken;

    impl NotificationSink for Broken {
        fn deliver(&mut self, _notification: &Notification) -> Result<(), AlertError> {
            Err(AlertError::Unavailable("no display".into()))
        }
    }

    #[test]
    fn test_cooldown_suppresses_repeat() {
        let t0 = Instant::now();
        let recorder = Recorder::default();
        let mut notifier = Notifier::new(AlertConfig::default(), Box::new(recorder.clone()), t0);

        assert!(notifier.notify(AlertKind::Posture, t0));
        assert!(!notifier.notify(AlertKind::Posture, t0 + Duration::from_secs(5)));

        let sent = recorder.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Posture Alert!");
    }

    #[test]
    fn test_failing_sink_does_not_propagate() {
        let t0 = Instant::now();
        let mut notifier = Notifier::new(AlertConfig::default(), Box::new(Broken), t0);

        assert!(!notifier.notify(AlertKind::Fatigue, t0));
        // Failed deliveries do not start a cooldown
        assert!(notifier.manager().state(AlertKind::Fatigue).is_none());
        assert!(!notifier.notify(AlertKind::Fatigue, t0 + Duration::from_secs(1)));
    }
}
