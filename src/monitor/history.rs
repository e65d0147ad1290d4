//! Bounded rolling history of processed records.

use crate::ingest::record::ProcessedRecord;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// Default number of records retained (about 10 minutes at the 2 s cadence).
pub const DEFAULT_CAPACITY: usize = 300;

/// Ordered, bounded record buffer.
///
/// Insertion order is arrival order; the single oldest entry is evicted
/// per insert once the capacity is reached.
#[derive(Debug)]
pub struct RollingHistory {
    records: VecDeque<ProcessedRecord>,
    capacity: usize,
}

impl RollingHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, record: ProcessedRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Read-only copy of the buffer, oldest first. Safe to iterate while
    /// further appends happen to the original.
    pub fn snapshot(&self) -> Vec<ProcessedRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<ProcessedRecord> {
        self.records.back().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Cloneable handle sharing one history between the record consumer (sole
/// writer) and any number of dashboard readers.
#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<RwLock<RollingHistory>>,
}

impl SharedHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RollingHistory::new(capacity))),
        }
    }

    pub fn append(&self, record: ProcessedRecord) {
        self.inner
            .write()
            .expect("history lock poisoned")
            .append(record);
    }

    pub fn snapshot(&self) -> Vec<ProcessedRecord> {
        self.inner
            .read()
            .expect("history lock poisoned")
            .snapshot()
    }

    pub fn latest(&self) -> Option<ProcessedRecord> {
        self.inner.read().expect("history lock poisoned").latest()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("history lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("history lock poisoned").is_empty()
    }
}

impl Default for SharedHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::risk::RiskLevel;

    fn record(tag: usize) -> ProcessedRecord {
        ProcessedRecord {
            temp_raw: tag as f64,
            temp_filtered: tag as f64,
            light: 0,
            door: false,
            risk: RiskLevel::Low,
            timestamp: format!("2026-01-01 00:00:{:02}", tag % 60),
        }
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = RollingHistory::default();
        for i in 0..301 {
            history.append(record(i));
        }
        assert_eq!(history.len(), 300);

        let snapshot = history.snapshot();
        // The very first record is gone; the 301st is present.
        assert_eq!(snapshot[0].temp_raw, 1.0);
        assert_eq!(snapshot[299].temp_raw, 300.0);
    }

    #[test]
    fn test_latest_is_last_appended() {
        let mut history = RollingHistory::new(10);
        assert!(history.latest().is_none());
        history.append(record(1));
        history.append(record(2));
        assert_eq!(history.latest().unwrap().temp_raw, 2.0);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut history = RollingHistory::new(10);
        history.append(record(1));
        let snapshot = history.snapshot();
        history.append(record(2));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_shared_handle_clones_see_appends() {
        let shared = SharedHistory::new(10);
        let reader = shared.clone();
        shared.append(record(7));
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.latest().unwrap().temp_raw, 7.0);
    }
}
