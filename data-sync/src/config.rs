//! Configuration for data synchronization

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Data-sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Telemetry configuration
    pub telemetry: TelemetryConfig,

    /// Provider configuration
    pub provider: ProviderConfig,

    /// Loader configuration
    pub loader: LoaderConfig,

    /// Dashboard binary configuration
    pub dashboard: DashboardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "books-sync".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            telemetry: TelemetryConfig::default(),
            provider: ProviderConfig::default(),
            loader: LoaderConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Events retained in the ring buffer
    pub capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            capacity: telemetry::DEFAULT_CAPACITY,
        }
    }
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Per-call deadline (milliseconds); None disables it
    pub deadline_ms: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            deadline_ms: Some(10_000), // 10s
        }
    }
}

impl ProviderConfig {
    /// Deadline as a duration
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

/// Loader configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Abort the in-flight call when the key changes
    pub abort_superseded: bool,
}

/// Dashboard binary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Organization to load categories for
    pub organization_id: String,

    /// Delegation to load accounts and transactions for
    pub delegation_id: String,

    /// JSON fixture file seeding the in-memory provider
    pub fixtures_path: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            organization_id: "org-demo".to_string(),
            delegation_id: "del-demo".to_string(),
            fixtures_path: None,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(ms) = std::env::var("BOOKS_SYNC_DEADLINE_MS") {
            let ms: u64 = parse_var("BOOKS_SYNC_DEADLINE_MS", &ms)?;
            config.provider.deadline_ms = (ms > 0).then_some(ms);
        }

        if let Ok(capacity) = std::env::var("BOOKS_SYNC_TELEMETRY_CAPACITY") {
            config.telemetry.capacity = parse_var("BOOKS_SYNC_TELEMETRY_CAPACITY", &capacity)?;
        }

        if let Ok(abort) = std::env::var("BOOKS_SYNC_ABORT_SUPERSEDED") {
            config.loader.abort_superseded = parse_var("BOOKS_SYNC_ABORT_SUPERSEDED", &abort)?;
        }

        if let Ok(org) = std::env::var("BOOKS_SYNC_ORGANIZATION") {
            config.dashboard.organization_id = org;
        }

        if let Ok(delegation) = std::env::var("BOOKS_SYNC_DELEGATION") {
            config.dashboard.delegation_id = delegation;
        }

        if let Ok(path) = std::env::var("BOOKS_SYNC_FIXTURES") {
            config.dashboard.fixtures_path = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime cannot honour
    pub fn validate(&self) -> crate::Result<()> {
        if self.telemetry.capacity == 0 {
            return Err(crate::Error::Config(
                "telemetry.capacity must be at least 1".to_string(),
            ));
        }
        if self.provider.deadline_ms == Some(0) {
            return Err(crate::Error::Config(
                "provider.deadline_ms must be positive (omit it to disable)".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> crate::Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| crate::Error::Config(format!("Invalid {}={:?}: {}", name, value, e)))
}
