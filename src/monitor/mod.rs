//! Record-consuming side of the pipeline.
//!
//! A single consumer thread owns the alert dispatcher and the uploader;
//! the rolling history is the only state it shares with readers.

pub mod alerts;
pub mod analysis;
pub mod history;
pub mod stats;
pub mod uploader;

// Re-export commonly used types
pub use alerts::{AlertDispatcher, LogNotifier, NoopNotifier, Notifier, NotifyError};
pub use analysis::AnalysisClient;
pub use history::{RollingHistory, SharedHistory};
pub use stats::{summarize, EmptyData, Report, Trend};
pub use uploader::{
    CloudUploader, HttpUploadTransport, TransportError, UploadPayload, UploadTransport,
};

use crate::counters::SharedCounters;
use crate::ingest::record::ProcessedRecord;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Consume records until the channel closes or `running` clears.
///
/// Each record is appended to the history, evaluated for alerts, and
/// offered to the uploader, in that order. The uploader is optional; a
/// deployment without a cloud sink simply passes `None`.
pub fn run_consumer(
    receiver: Receiver<ProcessedRecord>,
    history: SharedHistory,
    mut dispatcher: AlertDispatcher,
    mut uploader: Option<CloudUploader>,
    counters: SharedCounters,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(record) => {
                counters.record_consumed();
                history.append(record.clone());

                if dispatcher.evaluate(&record) {
                    counters.record_alert_sent();
                }

                if let Some(uploader) = uploader.as_mut() {
                    uploader.offer(record.temp_filtered, record.light, record.risk);
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if let Some(uploader) = uploader.as_ref() {
        let pending = uploader.pending_len();
        if pending > 0 {
            tracing::info!(pending, "exiting with unsent upload payloads");
        }
    }
}
