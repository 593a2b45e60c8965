use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so a missing config file still yields a
/// usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Parameters of the analytics core.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// The account value the equity curve starts from.
    #[serde(default = "default_initial_equity")]
    pub initial_equity: Decimal,
    /// How many days before today the default analysis window reaches back.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

/// Where the deal/order snapshot is read from.
///
/// When `url` is set the snapshot is fetched from that terminal bridge
/// endpoint; otherwise it is read from `deals_path`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    #[serde(default = "default_deals_path")]
    pub deals_path: PathBuf,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Settings for the HTTP job dispatcher.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Shared secret expected in the `x-api-key` header.
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, overridden by `RUST_LOG` when set.
    #[serde(default = "default_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_initial_equity() -> Decimal {
    dec!(10000)
}

fn default_lookback_days() -> u32 {
    30
}

fn default_deals_path() -> PathBuf {
    PathBuf::from("snapshot.json")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            initial_equity: default_initial_equity(),
            lookback_days: default_lookback_days(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            deals_path: default_deals_path(),
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            api_key: String::new(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
        }
    }
}
