//! Notification delivery sinks

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::{AlertError, Notification};

/// How notifications reach the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Terminal bell
    Audible,
    /// Written message line
    #[default]
    Textual,
}

impl DeliveryMode {
    /// Sink writing to standard output
    pub fn stdout_sink(&self) -> Box<dyn NotificationSink + Send> {
        match self {
            DeliveryMode::Audible => Box::new(AudibleSink::new(io::stdout())),
            DeliveryMode::Textual => Box::new(TextualSink::new(io::stdout())),
        }
    }
}

/// Destination for notifications
pub trait NotificationSink {
    fn deliver(&mut self, notification: &Notification) -> Result<(), AlertError>;
}

/// Rings the terminal bell
pub struct AudibleSink<W> {
    out: W,
}

impl<W: Write> AudibleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> NotificationSink for AudibleSink<W> {
    fn deliver(&mut self, _notification: &Notification) -> Result<(), AlertError> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes a timestamped message line
pub struct TextualSink<W> {
    out: W,
}

impl<W: Write> TextualSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> NotificationSink for TextualSink<W> {
    fn deliver(&mut self, n: &Notification) -> Result<(), AlertError> {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        writeln!(self.out, "[{}] {} | {}: {}", stamp, n.title, n.category, n.message)?;
        self.out.flush()?;
        Ok(())
    }
}
