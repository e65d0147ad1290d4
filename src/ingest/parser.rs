//! Parsing of raw sensor lines.
//!
//! Each line from the sensor transport is expected to decode as a flat
//! JSON object with keys among `temp`, `light`, `door`, and `error`.
//! Every failure path is a typed rejection, never a panic - malformed
//! input is a normal operating condition on a serial link.

use serde_json::Value;

/// Temperature the edge device sends when no reading is present.
pub const MISSING_TEMP: f64 = -999.0;

/// A validated raw sensor reading.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub temp: f64,
    pub light: i64,
    pub door: bool,
}

/// Why a line did not become a reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingRejection {
    /// The line did not decode as a JSON object. Silently skippable.
    MalformedLine,
    /// The required `temp` field was absent or the missing sentinel.
    IncompleteReading,
    /// The device reported an explicit error message.
    DeviceError(String),
}

impl std::fmt::Display for ReadingRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadingRejection::MalformedLine => write!(f, "malformed line"),
            ReadingRejection::IncompleteReading => write!(f, "incomplete reading"),
            ReadingRejection::DeviceError(msg) => write!(f, "device error: {msg}"),
        }
    }
}

/// Parse one raw line into a reading or a rejection.
pub fn parse_line(line: &str) -> Result<RawReading, ReadingRejection> {
    let value: Value =
        serde_json::from_str(line.trim()).map_err(|_| ReadingRejection::MalformedLine)?;
    let map = value.as_object().ok_or(ReadingRejection::MalformedLine)?;

    if let Some(err) = map.get("error") {
        let message = err
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| err.to_string());
        return Err(ReadingRejection::DeviceError(message));
    }

    let temp = map.get("temp").and_then(Value::as_f64).unwrap_or(MISSING_TEMP);
    if temp == MISSING_TEMP {
        return Err(ReadingRejection::IncompleteReading);
    }

    let light = map.get("light").and_then(Value::as_i64).unwrap_or(0);
    let door = map.get("door").map(truthy).unwrap_or(false);

    Ok(RawReading { temp, light, door })
}

/// The device sends door state as 0/1, but JSON booleans are tolerated.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        _ => false,
    }
}
