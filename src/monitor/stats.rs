//! Statistics and report generation over a history snapshot.
//!
//! Everything in this module is a pure function of the snapshot it is
//! given: no hidden state, deterministic, safe to recompute on demand
//! from any thread.

use crate::ingest::parser::MISSING_TEMP;
use crate::ingest::record::ProcessedRecord;
use crate::ingest::risk::RiskLevel;
use statrs::statistics::Statistics;

/// Nominal spacing between consecutive readings, used to convert reading
/// counts into durations.
pub const SAMPLING_INTERVAL_SECS: u64 = 2;

/// Temperature above which a reading counts as dangerous.
pub const DANGER_TEMP: f64 = 30.0;

/// Temperature above which a reading counts as cautionary.
pub const CAUTION_TEMP: f64 = 25.0;

/// Returned when a summary is requested over a snapshot with no usable
/// data. Callers render this as a placeholder, not as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyData {
    /// The snapshot held no records at all.
    NoRecords,
    /// Records were present but none carried a usable temperature.
    NoTemperatures,
}

impl std::fmt::Display for EmptyData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyData::NoRecords => write!(f, "No data available yet."),
            EmptyData::NoTemperatures => write!(f, "No temperature data available."),
        }
    }
}

/// Direction of the temperature series, mean of the first third compared
/// with the mean of the last third.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    RisingSignificantly,
    RisingSlightly,
    Stable,
    FallingSlightly,
    FallingSignificantly,
    InsufficientData,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Trend::RisingSignificantly => "rising significantly",
            Trend::RisingSlightly => "rising slightly",
            Trend::Stable => "stable",
            Trend::FallingSlightly => "falling slightly",
            Trend::FallingSignificantly => "falling significantly",
            Trend::InsufficientData => "insufficient data",
        };
        write!(f, "{text}")
    }
}

/// Count and share of readings above a temperature bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exceedance {
    pub readings: usize,
    pub seconds: u64,
    pub percent: f64,
}

/// Door-open activity over the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorActivity {
    /// Closed-to-open transitions; an initially open door counts as one.
    pub open_events: usize,
    pub open_readings: usize,
    pub open_seconds: u64,
    pub open_percent: f64,
    pub currently_open: bool,
}

/// Risk level distribution over the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub low_percent: f64,
    pub medium_percent: f64,
    pub high_percent: f64,
}

/// Latest state echoed into the report.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentState {
    pub temp: f64,
    pub door_open: bool,
    pub risk: RiskLevel,
    pub light: i64,
}

/// Full statistical report over one history snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub first_timestamp: String,
    pub last_timestamp: String,
    pub total_readings: usize,
    pub span_seconds: u64,
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub trend: Trend,
    pub danger: Exceedance,
    pub caution: Exceedance,
    pub door: DoorActivity,
    pub risks: RiskDistribution,
    pub current: CurrentState,
}

/// Derive the full report from a history snapshot.
pub fn summarize(snapshot: &[ProcessedRecord]) -> Result<Report, EmptyData> {
    if snapshot.is_empty() {
        return Err(EmptyData::NoRecords);
    }

    let temps: Vec<f64> = snapshot
        .iter()
        .map(|r| r.temp_filtered)
        .filter(|t| *t != MISSING_TEMP)
        .collect();
    if temps.is_empty() {
        return Err(EmptyData::NoTemperatures);
    }

    let total = snapshot.len();
    let first = &snapshot[0];
    let last = &snapshot[total - 1];

    Ok(Report {
        first_timestamp: first.timestamp.clone(),
        last_timestamp: last.timestamp.clone(),
        total_readings: total,
        span_seconds: total as u64 * SAMPLING_INTERVAL_SECS,
        avg_temp: Statistics::mean(temps.iter()),
        min_temp: Statistics::min(temps.iter()),
        max_temp: Statistics::max(temps.iter()),
        trend: compute_trend(&temps),
        danger: exceedance(&temps, DANGER_TEMP),
        caution: exceedance(&temps, CAUTION_TEMP),
        door: door_activity(snapshot),
        risks: risk_distribution(snapshot),
        current: CurrentState {
            temp: temps[temps.len() - 1],
            door_open: last.door,
            risk: last.risk,
            light: last.light,
        },
    })
}

/// First third vs last third of the series; needs at least one element
/// per third.
fn compute_trend(temps: &[f64]) -> Trend {
    let third = temps.len() / 3;
    if third == 0 {
        return Trend::InsufficientData;
    }

    let first_avg = Statistics::mean(temps[..third].iter());
    let last_avg = Statistics::mean(temps[temps.len() - third..].iter());
    let diff = last_avg - first_avg;

    if diff > 1.5 {
        Trend::RisingSignificantly
    } else if diff > 0.5 {
        Trend::RisingSlightly
    } else if diff < -1.5 {
        Trend::FallingSignificantly
    } else if diff < -0.5 {
        Trend::FallingSlightly
    } else {
        Trend::Stable
    }
}

fn exceedance(temps: &[f64], bound: f64) -> Exceedance {
    let readings = temps.iter().filter(|t| **t > bound).count();
    Exceedance {
        readings,
        seconds: readings as u64 * SAMPLING_INTERVAL_SECS,
        percent: readings as f64 / temps.len() as f64 * 100.0,
    }
}

fn door_activity(snapshot: &[ProcessedRecord]) -> DoorActivity {
    let open_readings = snapshot.iter().filter(|r| r.door).count();

    let mut open_events = snapshot
        .windows(2)
        .filter(|pair| pair[1].door && !pair[0].door)
        .count();
    if snapshot[0].door {
        open_events += 1;
    }

    DoorActivity {
        open_events,
        open_readings,
        open_seconds: open_readings as u64 * SAMPLING_INTERVAL_SECS,
        open_percent: open_readings as f64 / snapshot.len() as f64 * 100.0,
        currently_open: snapshot[snapshot.len() - 1].door,
    }
}

fn risk_distribution(snapshot: &[ProcessedRecord]) -> RiskDistribution {
    let total = snapshot.len() as f64;
    let count = |level: RiskLevel| snapshot.iter().filter(|r| r.risk == level).count();

    let low = count(RiskLevel::Low);
    let medium = count(RiskLevel::Medium);
    let high = count(RiskLevel::High);

    RiskDistribution {
        low,
        medium,
        high,
        low_percent: low as f64 / total * 100.0,
        medium_percent: medium as f64 / total * 100.0,
        high_percent: high as f64 / total * 100.0,
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cold-Chain Monitoring System - Detailed Data Report")?;
        writeln!(f, "=== DATA COLLECTION ===")?;
        writeln!(
            f,
            "Time range: {} to {}",
            self.first_timestamp, self.last_timestamp
        )?;
        writeln!(
            f,
            "Duration: {:.1} minutes ({} seconds)",
            self.span_seconds as f64 / 60.0,
            self.span_seconds
        )?;
        writeln!(
            f,
            "Total readings: {} (every {} seconds)",
            self.total_readings, SAMPLING_INTERVAL_SECS
        )?;
        writeln!(f)?;
        writeln!(f, "=== TEMPERATURE ANALYSIS ===")?;
        writeln!(f, "Current: {:.1}C", self.current.temp)?;
        writeln!(
            f,
            "Average: {:.1}C | Min: {:.1}C | Max: {:.1}C",
            self.avg_temp, self.min_temp, self.max_temp
        )?;
        writeln!(f, "Trend: {}", self.trend)?;
        writeln!(
            f,
            "Time above {DANGER_TEMP}C (DANGER): {} readings = {} seconds ({:.1}% of monitoring period)",
            self.danger.readings, self.danger.seconds, self.danger.percent
        )?;
        writeln!(
            f,
            "Time above {CAUTION_TEMP}C (CAUTION): {} readings = {} seconds ({:.1}% of monitoring period)",
            self.caution.readings, self.caution.seconds, self.caution.percent
        )?;
        writeln!(f)?;
        writeln!(f, "=== DOOR STATUS ===")?;
        writeln!(f, "Door open events: {} times", self.door.open_events)?;
        writeln!(
            f,
            "Total door-open duration: {} seconds ({:.1}% of monitoring period)",
            self.door.open_seconds, self.door.open_percent
        )?;
        writeln!(
            f,
            "Current door status: {}",
            if self.door.currently_open { "OPEN" } else { "CLOSED" }
        )?;
        writeln!(f)?;
        writeln!(f, "=== RISK LEVEL DISTRIBUTION ===")?;
        writeln!(
            f,
            "LOW (safe): {} readings ({:.1}%)",
            self.risks.low, self.risks.low_percent
        )?;
        writeln!(
            f,
            "MEDIUM (caution): {} readings ({:.1}%)",
            self.risks.medium, self.risks.medium_percent
        )?;
        writeln!(
            f,
            "HIGH (critical): {} readings ({:.1}%)",
            self.risks.high, self.risks.high_percent
        )?;
        writeln!(f)?;
        writeln!(f, "=== CURRENT STATUS ===")?;
        write!(
            f,
            "Temperature: {:.1}C | Door: {} | Risk: {} | Light: {}",
            self.current.temp,
            if self.current.door_open { "OPEN" } else { "CLOSED" },
            self.current.risk,
            self.current.light
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(temp: f64, door: bool, risk: RiskLevel) -> ProcessedRecord {
        ProcessedRecord {
            temp_raw: temp,
            temp_filtered: temp,
            light: 80,
            door,
            risk,
            timestamp: "2026-01-01 12:00:00".to_string(),
        }
    }

    fn flat(temps: &[f64]) -> Vec<ProcessedRecord> {
        temps
            .iter()
            .map(|t| record(*t, false, RiskLevel::Low))
            .collect()
    }

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(summarize(&[]), Err(EmptyData::NoRecords));
    }

    #[test]
    fn test_no_usable_temperatures() {
        let snapshot = vec![record(MISSING_TEMP, false, RiskLevel::Low)];
        assert_eq!(summarize(&snapshot), Err(EmptyData::NoTemperatures));
    }

    #[test]
    fn test_basic_aggregates() {
        let report = summarize(&flat(&[20.0, 22.0, 24.0])).unwrap();
        assert_eq!(report.total_readings, 3);
        assert_eq!(report.span_seconds, 6);
        assert_eq!(report.avg_temp, 22.0);
        assert_eq!(report.min_temp, 20.0);
        assert_eq!(report.max_temp, 24.0);
        assert_eq!(report.current.temp, 24.0);
    }

    #[test]
    fn test_trend_insufficient_below_three() {
        let report = summarize(&flat(&[20.0, 21.0])).unwrap();
        assert_eq!(report.trend, Trend::InsufficientData);
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(
            summarize(&flat(&[20.0, 21.0, 22.0])).unwrap().trend,
            Trend::RisingSignificantly
        );
        assert_eq!(
            summarize(&flat(&[20.0, 20.4, 20.8])).unwrap().trend,
            Trend::RisingSlightly
        );
        assert_eq!(
            summarize(&flat(&[22.0, 21.0, 20.0])).unwrap().trend,
            Trend::FallingSignificantly
        );
        assert_eq!(
            summarize(&flat(&[20.8, 20.4, 20.0])).unwrap().trend,
            Trend::FallingSlightly
        );
        assert_eq!(
            summarize(&flat(&[20.0, 25.0, 20.1])).unwrap().trend,
            Trend::Stable
        );
    }

    #[test]
    fn test_exceedance_counts() {
        let report = summarize(&flat(&[24.0, 26.0, 31.0, 33.0])).unwrap();
        assert_eq!(report.danger.readings, 2);
        assert_eq!(report.danger.seconds, 4);
        assert_eq!(report.danger.percent, 50.0);
        assert_eq!(report.caution.readings, 3);
        assert_eq!(report.caution.percent, 75.0);
    }

    #[test]
    fn test_door_transitions() {
        let snapshot = vec![
            record(20.0, false, RiskLevel::Low),
            record(20.0, true, RiskLevel::Low),
            record(20.0, true, RiskLevel::Low),
            record(20.0, false, RiskLevel::Low),
            record(20.0, true, RiskLevel::Low),
        ];
        let report = summarize(&snapshot).unwrap();
        assert_eq!(report.door.open_events, 2);
        assert_eq!(report.door.open_readings, 3);
        assert_eq!(report.door.open_seconds, 6);
        assert!(report.door.currently_open);
    }

    #[test]
    fn test_initially_open_door_counts_as_event() {
        let snapshot = vec![
            record(20.0, true, RiskLevel::Low),
            record(20.0, false, RiskLevel::Low),
        ];
        let report = summarize(&snapshot).unwrap();
        assert_eq!(report.door.open_events, 1);
        assert!(!report.door.currently_open);
    }

    #[test]
    fn test_risk_distribution() {
        let snapshot = vec![
            record(20.0, false, RiskLevel::Low),
            record(26.0, false, RiskLevel::Medium),
            record(31.0, false, RiskLevel::High),
            record(31.0, false, RiskLevel::High),
        ];
        let report = summarize(&snapshot).unwrap();
        assert_eq!(report.risks.low, 1);
        assert_eq!(report.risks.medium, 1);
        assert_eq!(report.risks.high, 2);
        assert_eq!(report.risks.high_percent, 50.0);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let snapshot = flat(&[20.0, 24.0, 28.0, 32.0]);
        let first = summarize(&snapshot).unwrap();
        let second = summarize(&snapshot).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_text_sections() {
        let report = summarize(&flat(&[20.0, 24.0, 28.0])).unwrap();
        let text = report.to_string();
        assert!(text.contains("=== DATA COLLECTION ==="));
        assert!(text.contains("=== TEMPERATURE ANALYSIS ==="));
        assert!(text.contains("=== DOOR STATUS ==="));
        assert!(text.contains("=== RISK LEVEL DISTRIBUTION ==="));
        assert!(text.contains("=== CURRENT STATUS ==="));
        assert!(text.contains("Trend: rising significantly"));
    }
}
