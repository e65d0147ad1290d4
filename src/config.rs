//! Configuration for the cold-chain monitor.

use crate::ingest::risk::RiskThresholds;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Nominal spacing between consecutive sensor readings
    #[serde(with = "duration_serde")]
    pub sampling_interval: Duration,

    /// Number of samples in the moving-average window
    pub filter_window: usize,

    /// Number of records retained in the rolling history
    pub history_capacity: usize,

    /// Risk classification thresholds
    pub thresholds: RiskThresholds,

    /// Alerting settings
    pub alerts: AlertSettings,

    /// Cloud upload settings
    pub upload: UploadSettings,

    /// Analysis service settings
    pub analysis: AnalysisSettings,

    /// Dashboard settings
    pub dashboard: DashboardSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sampling_interval: Duration::from_secs(2),
            filter_window: 5,
            history_capacity: 300,
            thresholds: RiskThresholds::default(),
            alerts: AlertSettings::default(),
            upload: UploadSettings::default(),
            analysis: AnalysisSettings::default(),
            dashboard: DashboardSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coldchain-monitor")
            .join("config.json")
    }
}

/// Alerting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSettings {
    pub enabled: bool,

    /// Filtered temperature above which a reading alone is critical
    pub critical_temp: f64,

    /// Minimum spacing between two sent notifications
    #[serde(with = "duration_serde")]
    pub cooldown: Duration,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            critical_temp: 30.0,
            cooldown: Duration::from_secs(60),
        }
    }
}

/// Cloud upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    pub enabled: bool,

    /// Endpoint accepting ThingSpeak-style field updates
    pub url: String,

    /// API key; uploads stay disabled while this is empty
    pub api_key: String,

    /// Minimum spacing between upload attempts
    #[serde(with = "duration_serde")]
    pub interval: Duration,

    /// Maximum payloads buffered while the sink is unreachable
    pub buffer_capacity: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://api.thingspeak.com/update".to_string(),
            api_key: String::new(),
            interval: Duration::from_secs(15),
            buffer_capacity: 256,
        }
    }
}

impl UploadSettings {
    /// Check whether uploads can actually run.
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }
}

/// Analysis service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Chat-completions style endpoint
    pub endpoint: String,

    /// API key; analysis stays disabled while this is empty
    pub api_key: String,

    /// Model identifier passed through to the service
    pub model: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl AnalysisSettings {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 5000,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
