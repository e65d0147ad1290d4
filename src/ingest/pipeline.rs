//! The reading-side pipeline: parse, smooth, classify, assemble.

use crate::counters::SharedCounters;
use crate::ingest::filter::SmoothingFilter;
use crate::ingest::parser::{self, ReadingRejection};
use crate::ingest::record::{build_record, ProcessedRecord};
use crate::ingest::risk::RiskThresholds;

/// Reading-side pipeline state: one filter window plus the classifier
/// thresholds. Single writer, driven one line at a time.
pub struct IngestPipeline {
    filter: SmoothingFilter,
    thresholds: RiskThresholds,
    counters: SharedCounters,
}

impl IngestPipeline {
    pub fn new(filter_window: usize, thresholds: RiskThresholds, counters: SharedCounters) -> Self {
        Self {
            filter: SmoothingFilter::new(filter_window),
            thresholds,
            counters,
        }
    }

    /// Run one raw line through parse → smooth → classify → assemble.
    ///
    /// Rejections are absorbed here: malformed and incomplete lines at
    /// debug, device errors at warn. `None` means no record was produced
    /// this cycle.
    pub fn process_line(&mut self, line: &str) -> Option<ProcessedRecord> {
        if line.trim().is_empty() {
            return None;
        }

        let reading = match parser::parse_line(line) {
            Ok(reading) => reading,
            Err(ReadingRejection::DeviceError(message)) => {
                tracing::warn!(%message, "sensor reported an error");
                self.counters.record_device_error();
                return None;
            }
            Err(rejection) => {
                tracing::debug!(%rejection, "skipping line");
                self.counters.record_rejected();
                return None;
            }
        };

        let filtered = self.filter.observe(reading.temp);
        let risk = self.thresholds.classify(filtered);
        self.counters.record_accepted();
        Some(build_record(&reading, filtered, risk))
    }
}
