//! Risk classification for smoothed temperatures.

use serde::{Deserialize, Serialize};

/// Risk level for a reading, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Numeric encoding used by the cloud sink (LOW=0, MEDIUM=1, HIGH=2).
    pub fn ordinal(self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Classification thresholds, strictly exclusive on both bounds.
///
/// The deployed defaults set both bounds to 25.0, which leaves the MEDIUM
/// branch unreachable; that is the configured behavior and is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Filtered temperature above which a reading is HIGH risk.
    pub high: f64,
    /// Filtered temperature above which a reading is MEDIUM risk.
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 25.0,
            medium: 25.0,
        }
    }
}

impl RiskThresholds {
    /// Classify a filtered temperature. Memoryless per call.
    pub fn classify(&self, filtered_temp: f64) -> RiskLevel {
        if filtered_temp > self.high {
            RiskLevel::High
        } else if filtered_temp > self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}
