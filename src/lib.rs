//! Cold-chain telemetry processing pipeline.
//!
//! Ingests environmental sensor readings (temperature, light, door state)
//! one text line at a time, smooths and classifies them, and fans the
//! resulting records out to a rolling history, a cooldown-gated alert
//! dispatcher, and a rate-gated cloud uploader with offline replay. A
//! statistics engine derives trend, exceedance, and distribution reports
//! from the history on demand.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Cold-Chain Monitor                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌────────┐  ┌────────┐  ┌──────────┐  ┌─────────┐         │
//! │  │ Parser │─▶│ Filter │─▶│Classifier│─▶│ Builder │──┐      │
//! │  └────────┘  └────────┘  └──────────┘  └─────────┘  │      │
//! │                                                      ▼      │
//! │  ┌───────────┐  ┌─────────┐  ┌────────┐  ┌────────────┐   │
//! │  │ Dashboard │◀─│ Rolling │◀─│Consumer│─▶│  Alerts /  │   │
//! │  │  + Stats  │  │ History │  │        │  │  Uploads   │   │
//! │  └───────────┘  └─────────┘  └────────┘  └────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use coldchain_monitor::counters::create_shared_counters;
//! use coldchain_monitor::ingest::{IngestPipeline, RiskThresholds};
//!
//! let counters = create_shared_counters();
//! let mut pipeline = IngestPipeline::new(5, RiskThresholds::default(), counters);
//!
//! if let Some(record) = pipeline.process_line(r#"{"temp": 26.0, "light": 100, "door": 0}"#) {
//!     println!("{} -> {}", record.temp_filtered, record.risk);
//! }
//! ```

pub mod config;
pub mod counters;
pub mod ingest;
pub mod monitor;
pub mod server;

// Re-export key types at crate root for convenience
pub use config::Config;
pub use counters::{create_shared_counters, CounterStats, PipelineCounters, SharedCounters};
pub use ingest::{
    parse_line, IngestPipeline, LineSource, ProcessedRecord, RawReading, ReaderLineSource,
    ReadingRejection, RiskLevel, RiskThresholds, SmoothingFilter, MISSING_TEMP,
};
pub use monitor::{
    run_consumer, AlertDispatcher, AnalysisClient, CloudUploader, EmptyData, HttpUploadTransport,
    LogNotifier, NoopNotifier, Notifier, Report, RollingHistory, SharedHistory, Trend,
    UploadTransport,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
