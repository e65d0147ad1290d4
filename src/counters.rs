//! Session counters for the pipeline.
//!
//! Tracks how many readings were accepted, rejected, and fanned out during
//! the current process. Everything here is in-memory only; nothing
//! survives a restart.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current session.
#[derive(Debug, Default)]
pub struct PipelineCounters {
    readings_accepted: AtomicU64,
    readings_rejected: AtomicU64,
    device_errors: AtomicU64,
    records_consumed: AtomicU64,
    alerts_sent: AtomicU64,
}

impl PipelineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a line that became a processed record.
    pub fn record_accepted(&self) {
        self.readings_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a malformed or incomplete line.
    pub fn record_rejected(&self) {
        self.readings_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an explicit error reported by the device.
    pub fn record_device_error(&self) {
        self.device_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a record picked up by the consumer.
    pub fn record_consumed(&self) {
        self.records_consumed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a notification that went out.
    pub fn record_alert_sent(&self) {
        self.alerts_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> CounterStats {
        CounterStats {
            readings_accepted: self.readings_accepted.load(Ordering::Relaxed),
            readings_rejected: self.readings_rejected.load(Ordering::Relaxed),
            device_errors: self.device_errors.load(Ordering::Relaxed),
            records_consumed: self.records_consumed.load(Ordering::Relaxed),
            alerts_sent: self.alerts_sent.load(Ordering::Relaxed),
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session statistics:\n\
             - Readings accepted: {}\n\
             - Readings rejected: {}\n\
             - Device errors: {}\n\
             - Records consumed: {}\n\
             - Alerts sent: {}",
            stats.readings_accepted,
            stats.readings_rejected,
            stats.device_errors,
            stats.records_consumed,
            stats.alerts_sent
        )
    }
}

/// Snapshot of the session counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CounterStats {
    pub readings_accepted: u64,
    pub readings_rejected: u64,
    pub device_errors: u64,
    pub records_consumed: u64,
    pub alerts_sent: u64,
}

/// Thread-safe shared counters.
pub type SharedCounters = Arc<PipelineCounters>;

/// Create a new shared counter set.
pub fn create_shared_counters() -> SharedCounters {
    Arc::new(PipelineCounters::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting() {
        let counters = PipelineCounters::new();
        counters.record_accepted();
        counters.record_accepted();
        counters.record_rejected();
        counters.record_device_error();

        let stats = counters.stats();
        assert_eq!(stats.readings_accepted, 2);
        assert_eq!(stats.readings_rejected, 1);
        assert_eq!(stats.device_errors, 1);
        assert_eq!(stats.records_consumed, 0);
    }

    #[test]
    fn test_summary_format() {
        let counters = PipelineCounters::new();
        counters.record_alert_sent();
        let summary = counters.summary();
        assert!(summary.contains("Readings accepted"));
        assert!(summary.contains("Alerts sent: 1"));
    }
}
