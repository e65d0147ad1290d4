//! Processed record assembly and wire format.

use crate::ingest::parser::RawReading;
use crate::ingest::risk::RiskLevel;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp format on the record channel: local wall clock, second
/// resolution.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One fully processed sensor reading.
///
/// Immutable once built; this is the sole unit exchanged with every
/// downstream consumer. On the wire it is a flat JSON object with the
/// door state encoded as 0/1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub temp_raw: f64,
    pub temp_filtered: f64,
    pub light: i64,
    #[serde(with = "door_serde")]
    pub door: bool,
    pub risk: RiskLevel,
    pub timestamp: String,
}

/// Assemble a record from the pipeline stages and a fresh timestamp.
///
/// No validation happens here; upstream stages already rejected anything
/// unusable.
pub fn build_record(reading: &RawReading, filtered_temp: f64, risk: RiskLevel) -> ProcessedRecord {
    ProcessedRecord {
        temp_raw: reading.temp,
        temp_filtered: filtered_temp,
        light: reading.light,
        door: reading.door,
        risk,
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    }
}

/// Serde support for the 0/1 door encoding used on the wire.
mod door_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(door: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*door))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Ok(value != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> RawReading {
        RawReading {
            temp: 26.4,
            light: 120,
            door: true,
        }
    }

    #[test]
    fn test_build_record_passthrough() {
        let record = build_record(&reading(), 25.9, RiskLevel::High);
        assert_eq!(record.temp_raw, 26.4);
        assert_eq!(record.temp_filtered, 25.9);
        assert_eq!(record.light, 120);
        assert!(record.door);
        assert_eq!(record.risk, RiskLevel::High);
    }

    #[test]
    fn test_timestamp_second_resolution() {
        let record = build_record(&reading(), 25.9, RiskLevel::High);
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(record.timestamp.len(), 19);
        assert_eq!(&record.timestamp[10..11], " ");
    }

    #[test]
    fn test_wire_format_fields() {
        let record = build_record(&reading(), 25.9, RiskLevel::High);
        let value = serde_json::to_value(&record).unwrap();
        let map = value.as_object().unwrap();

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        for key in ["temp_raw", "temp_filtered", "light", "door", "risk", "timestamp"] {
            assert!(keys.contains(&key), "missing wire field {key}");
        }
        assert_eq!(map.len(), 6);
        assert_eq!(map["door"], 1);
        assert_eq!(map["risk"], "HIGH");
    }

    #[test]
    fn test_wire_roundtrip() {
        let record = build_record(&reading(), 25.9, RiskLevel::Medium);
        let json = serde_json::to_string(&record).unwrap();
        let parsed: ProcessedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_door_closed_encodes_zero() {
        let record = build_record(
            &RawReading {
                temp: 20.0,
                light: 0,
                door: false,
            },
            20.0,
            RiskLevel::Low,
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["door"], 0);
    }
}
