//! Shared test doubles

use std::sync::{Arc, Mutex};

use alerting::{AlertError, Notification, NotificationSink};

/// Sink that keeps every delivered notification
#[derive(Clone, Default)]
pub(crate) struct Recorder(Arc<Mutex<Vec<Notification>>>);

impl Recorder {
    pub(crate) fn titles(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|n| n.title.clone()).collect()
    }
}

impl NotificationSink for Recorder {
    fn deliver(&mut self, notification: &Notification) -> Result<(), AlertError> {
        self.0.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
