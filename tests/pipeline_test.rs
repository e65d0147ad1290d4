//! End-to-end pipeline scenarios

use coldchain_monitor::counters::create_shared_counters;
use coldchain_monitor::ingest::{IngestPipeline, ProcessedRecord, RiskLevel, RiskThresholds};
use coldchain_monitor::monitor::{run_consumer, AlertDispatcher, NoopNotifier, SharedHistory};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn pipeline() -> IngestPipeline {
    IngestPipeline::new(5, RiskThresholds::default(), create_shared_counters())
}

#[test]
fn test_single_reading_through_empty_filter() {
    let mut pipeline = pipeline();
    let record = pipeline
        .process_line(r#"{"temp": 26.0, "light": 100, "door": 0}"#)
        .expect("record expected");

    assert_eq!(record.temp_raw, 26.0);
    assert_eq!(record.temp_filtered, 26.0);
    assert_eq!(record.light, 100);
    assert!(!record.door);
    // With both thresholds at 25.0 anything above 25 classifies HIGH.
    assert_eq!(record.risk, RiskLevel::High);
}

#[test]
fn test_sentinel_temperature_rejected() {
    let mut pipeline = pipeline();
    assert!(pipeline.process_line(r#"{"temp": -999}"#).is_none());
    assert!(pipeline.process_line(r#"{"light": 42}"#).is_none());
}

#[test]
fn test_device_error_line_produces_nothing() {
    let mut pipeline = pipeline();
    assert!(pipeline
        .process_line(r#"{"error": "sensor disconnected"}"#)
        .is_none());
}

#[test]
fn test_warming_sequence_filters_and_classifies() {
    let mut pipeline = pipeline();
    let inputs = [20.0, 22.0, 24.0, 26.0, 28.0];
    let expected = [20.0, 21.0, 22.0, 23.0, 24.0];

    for (input, want) in inputs.iter().zip(expected.iter()) {
        let line = format!(r#"{{"temp": {input}, "light": 0, "door": 0}}"#);
        let record = pipeline.process_line(&line).expect("record expected");
        assert_eq!(record.temp_filtered, *want);
        assert_eq!(record.risk, RiskLevel::Low);
    }
}

#[test]
fn test_distinct_thresholds_reach_medium() {
    let counters = create_shared_counters();
    let thresholds = RiskThresholds {
        high: 30.0,
        medium: 25.0,
    };
    let mut pipeline = IngestPipeline::new(5, thresholds, counters);

    let record = pipeline
        .process_line(r#"{"temp": 26.0, "light": 100, "door": 0}"#)
        .expect("record expected");
    assert_eq!(record.risk, RiskLevel::Medium);
}

#[test]
fn test_record_wire_format() {
    let mut pipeline = pipeline();
    let record = pipeline
        .process_line(r#"{"temp": 26.0, "light": 100, "door": 1}"#)
        .expect("record expected");

    let value = serde_json::to_value(&record).unwrap();
    let map = value.as_object().unwrap();
    assert_eq!(map.len(), 6);
    assert_eq!(map["temp_raw"], 26.0);
    assert_eq!(map["temp_filtered"], 26.0);
    assert_eq!(map["light"], 100);
    assert_eq!(map["door"], 1);
    assert_eq!(map["risk"], "HIGH");
    assert!(map["timestamp"].is_string());

    let roundtrip: ProcessedRecord = serde_json::from_value(value).unwrap();
    assert_eq!(roundtrip, record);
}

#[test]
fn test_consumer_feeds_history_and_counters() {
    let (sender, receiver) = crossbeam_channel::unbounded();
    let history = SharedHistory::new(10);
    let counters = create_shared_counters();
    let dispatcher = AlertDispatcher::new(Box::new(NoopNotifier));
    let running = Arc::new(AtomicBool::new(true));

    let handle = {
        let history = history.clone();
        let counters = counters.clone();
        let running = running.clone();
        thread::spawn(move || run_consumer(receiver, history, dispatcher, None, counters, running))
    };

    let mut pipeline = pipeline();
    let lines = [
        r#"{"temp": 20.0, "light": 10, "door": 0}"#,
        r#"{"temp": 22.0, "light": 10, "door": 0}"#,
        r#"{"temp": 24.0, "light": 10, "door": 1}"#,
    ];
    for line in lines {
        let record = pipeline.process_line(line).expect("record expected");
        sender.send(record).expect("consumer alive");
    }

    // Dropping the sender lets the consumer drain and exit.
    drop(sender);
    handle.join().expect("consumer thread panicked");

    assert_eq!(history.len(), 3);
    let stats = counters.stats();
    assert_eq!(stats.records_consumed, 3);
    // Only the third record has a trigger condition (door open).
    assert_eq!(stats.alerts_sent, 1);
    assert_eq!(history.latest().unwrap().temp_filtered, 22.0);
}
