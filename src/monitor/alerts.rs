//! Threshold alerting with a cooldown gate.
//!
//! Each incoming record is checked against independent conditions; when
//! any trigger, one notification carrying all of them goes out - at most
//! once per cooldown window. Delivery is best-effort: a failed send is
//! logged and forgotten, and does not advance the cooldown clock.

use crate::ingest::record::ProcessedRecord;
use crate::ingest::risk::RiskLevel;
use std::time::{Duration, Instant};

/// Filtered temperature above which a reading alone triggers an alert.
pub const DEFAULT_CRITICAL_TEMP: f64 = 30.0;

/// Minimum spacing between two sent notifications.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Delivery failure reported by a notifier.
#[derive(Debug)]
pub struct NotifyError(pub String);

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification failed: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Outbound notification delivery.
///
/// Fire-and-forget from the dispatcher's perspective; which transport
/// (SMTP, webhook, nothing at all) sits behind this is decided once at
/// startup.
pub trait Notifier: Send {
    fn send(&self, subject: &str, body_html: &str) -> Result<(), NotifyError>;
}

/// Notifier used when alerting is disabled or unconfigured.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send(&self, _subject: &str, _body_html: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Notifier that records the alert in the process log only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, subject: &str, _body_html: &str) -> Result<(), NotifyError> {
        tracing::info!(%subject, "alert raised");
        Ok(())
    }
}

/// Evaluates each record against the alert rules and sends at most one
/// notification per cooldown window.
pub struct AlertDispatcher {
    notifier: Box<dyn Notifier>,
    critical_temp: f64,
    cooldown: Duration,
    last_sent: Option<Instant>,
}

impl AlertDispatcher {
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self::with_settings(notifier, DEFAULT_CRITICAL_TEMP, DEFAULT_COOLDOWN)
    }

    pub fn with_settings(
        notifier: Box<dyn Notifier>,
        critical_temp: f64,
        cooldown: Duration,
    ) -> Self {
        Self {
            notifier,
            critical_temp,
            cooldown,
            last_sent: None,
        }
    }

    /// Evaluate one record. Returns true when a notification went out.
    pub fn evaluate(&mut self, record: &ProcessedRecord) -> bool {
        let conditions = self.triggered_conditions(record);
        if conditions.is_empty() {
            return false;
        }

        if let Some(last) = self.last_sent {
            if last.elapsed() < self.cooldown {
                tracing::debug!("alert suppressed by cooldown");
                return false;
            }
        }

        let subject = format!("Cold-Chain ALERT - {}", record.risk);
        let body = alert_body(record, &conditions);
        match self.notifier.send(&subject, &body) {
            Ok(()) => {
                // The cooldown clock only advances on success.
                self.last_sent = Some(Instant::now());
                tracing::info!(%subject, "alert sent");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "alert delivery failed");
                false
            }
        }
    }

    fn triggered_conditions(&self, record: &ProcessedRecord) -> Vec<String> {
        let mut conditions = Vec::new();
        if record.temp_filtered > self.critical_temp {
            conditions.push(format!(
                "Temperature CRITICAL: {}C (threshold: {}C)",
                record.temp_filtered, self.critical_temp
            ));
        }
        if record.door {
            conditions.push(format!("Door is OPEN (light level: {})", record.light));
        }
        if record.risk != RiskLevel::Low {
            conditions.push(format!("Risk Level: {}", record.risk));
        }
        conditions
    }
}

/// HTML notification body: every triggered condition plus the full record.
fn alert_body(record: &ProcessedRecord, conditions: &[String]) -> String {
    let items: String = conditions
        .iter()
        .map(|c| format!("<li>{c}</li>"))
        .collect();
    let door = if record.door { "OPEN" } else { "CLOSED" };

    format!(
        "<html><body style=\"font-family:Arial;padding:20px;\">\n\
         <h2 style=\"color:#e74c3c;\">Cold-Chain Monitoring Alert</h2>\n\
         <p><strong>Time:</strong> {}</p><hr>\n\
         <ul>{}</ul><hr>\n\
         <h3>Current Readings:</h3>\n\
         <table style=\"border-collapse:collapse;\">\n\
         <tr><td><strong>Temperature</strong></td><td>{}C</td></tr>\n\
         <tr><td><strong>Light</strong></td><td>{}</td></tr>\n\
         <tr><td><strong>Door</strong></td><td>{}</td></tr>\n\
         <tr><td><strong>Risk</strong></td><td>{}</td></tr>\n\
         </table>\n\
         </body></html>",
        record.timestamp, items, record.temp_filtered, record.light, door, record.risk
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    /// Test notifier with scripted outcomes and a call log.
    struct MockNotifier {
        sent: Arc<Mutex<Vec<(String, String)>>>,
        fail_first: Arc<Mutex<usize>>,
    }

    impl MockNotifier {
        fn new() -> (Self, Arc<Mutex<Vec<(String, String)>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    sent: sent.clone(),
                    fail_first: Arc::new(Mutex::new(0)),
                },
                sent,
            )
        }

        fn failing_first(n: usize) -> (Self, Arc<Mutex<Vec<(String, String)>>>) {
            let (notifier, sent) = Self::new();
            *notifier.fail_first.lock().unwrap() = n;
            (notifier, sent)
        }
    }

    impl Notifier for MockNotifier {
        fn send(&self, subject: &str, body_html: &str) -> Result<(), NotifyError> {
            let mut remaining = self.fail_first.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(NotifyError("smtp unreachable".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), body_html.to_string()));
            Ok(())
        }
    }

    fn record(temp: f64, door: bool, risk: RiskLevel) -> ProcessedRecord {
        ProcessedRecord {
            temp_raw: temp,
            temp_filtered: temp,
            light: 150,
            door,
            risk,
            timestamp: "2026-01-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn test_no_conditions_no_send() {
        let (notifier, sent) = MockNotifier::new();
        let mut dispatcher = AlertDispatcher::new(Box::new(notifier));
        assert!(!dispatcher.evaluate(&record(20.0, false, RiskLevel::Low)));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_all_conditions_in_one_body() {
        let (notifier, sent) = MockNotifier::new();
        let mut dispatcher = AlertDispatcher::new(Box::new(notifier));
        assert!(dispatcher.evaluate(&record(31.5, true, RiskLevel::High)));

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (subject, body) = &sent[0];
        assert_eq!(subject, "Cold-Chain ALERT - HIGH");
        assert!(body.contains("Temperature CRITICAL: 31.5C"));
        assert!(body.contains("Door is OPEN (light level: 150)"));
        assert!(body.contains("Risk Level: HIGH"));
        assert!(body.contains("2026-01-01 12:00:00"));
    }

    #[test]
    fn test_cooldown_suppresses_second_send() {
        let (notifier, sent) = MockNotifier::new();
        let mut dispatcher = AlertDispatcher::with_settings(
            Box::new(notifier),
            DEFAULT_CRITICAL_TEMP,
            Duration::from_millis(80),
        );

        let trigger = record(31.0, false, RiskLevel::High);
        assert!(dispatcher.evaluate(&trigger));
        assert!(!dispatcher.evaluate(&trigger));
        assert_eq!(sent.lock().unwrap().len(), 1);

        thread::sleep(Duration::from_millis(100));
        assert!(dispatcher.evaluate(&trigger));
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_send_does_not_advance_cooldown() {
        let (notifier, sent) = MockNotifier::failing_first(1);
        let mut dispatcher = AlertDispatcher::new(Box::new(notifier));

        let trigger = record(31.0, false, RiskLevel::High);
        // First attempt fails; the immediate retry is not cooldown-gated.
        assert!(!dispatcher.evaluate(&trigger));
        assert!(dispatcher.evaluate(&trigger));
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_door_alone_triggers() {
        let (notifier, sent) = MockNotifier::new();
        let mut dispatcher = AlertDispatcher::new(Box::new(notifier));
        assert!(dispatcher.evaluate(&record(20.0, true, RiskLevel::Low)));
        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].0, "Cold-Chain ALERT - LOW");
        assert!(!sent[0].1.contains("Temperature CRITICAL"));
    }
}
