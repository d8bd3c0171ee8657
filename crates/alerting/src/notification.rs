//! Alert vocabulary

use serde::{Deserialize, Serialize};

/// A user-facing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub category: String,
    pub message: String,
}

/// Alerts raised by the monitors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// Dominant eye state over a report window was fatigue
    Fatigue,
    /// Too few blinks in a blink window
    LowBlinkRate,
    /// Too many blinks in a blink window
    HighBlinkRate,
    /// Sustained posture deviation
    Posture,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Fatigue => "fatigue",
            AlertKind::LowBlinkRate => "low_blink_rate",
            AlertKind::HighBlinkRate => "high_blink_rate",
            AlertKind::Posture => "posture",
        }
    }

    pub fn notification(&self) -> Notification {
        let (title, category, message) = match self {
            AlertKind::Fatigue => ("Feeling Tired?", "Take a Break", "You seem tired!"),
            AlertKind::LowBlinkRate => (
                "Blink Reminder",
                "Keep Blinking",
                "Don't forget to blink regularly for healthy eyes!",
            ),
            AlertKind::HighBlinkRate => (
                "Blink Alert!",
                "Take a Break!",
                "You've been blinking more frequently than usual.",
            ),
            AlertKind::Posture => (
                "Posture Alert!",
                "Fix your posture",
                "Remember to sit up straight to maintain a healthy posture",
            ),
        };

        Notification {
            title: title.into(),
            category: category.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_alert_text() {
        let low = AlertKind::LowBlinkRate.notification();
        assert_eq!(low.title, "Blink Reminder");
        assert_eq!(low.category, "Keep Blinking");

        let high = AlertKind::HighBlinkRate.notification();
        assert_eq!(high.message, "You've been blinking more frequently than usual.");
    }
}
