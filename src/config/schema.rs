//! Configuration schema definitions.
//!
//! Describes a demo run: logging and metrics settings, the deadlines placed
//! in start/stop contexts, and the simulated components with their
//! dependencies. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

/// Root configuration for a lifecycle run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Logging settings.
    pub logging: LoggingConfig,

    /// Prometheus exporter settings.
    pub metrics: MetricsConfig,

    /// Deadlines for the start and stop phases.
    pub timeouts: TimeoutConfig,

    /// Run-phase settings.
    pub run: RunConfig,

    /// Components, in top-level start order.
    pub components: Vec<ComponentConfig>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive (e.g., "info" or "lifecycle_orchestrator=debug").
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Exporter bind address (e.g., "127.0.0.1:9100").
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:9100".to_string(),
        }
    }
}

/// Deadlines handed to components through the context.
///
/// The orchestrator does not enforce them; components are expected to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub start_secs: u64,
    pub stop_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            start_secs: 30,
            stop_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RunConfig {
    /// Seconds to stay running between start and stop (0 = until signalled).
    pub hold_secs: u64,
}

/// A simulated component.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComponentConfig {
    /// Unique component name.
    pub name: String,

    #[serde(default)]
    pub start_delay_ms: u64,

    #[serde(default)]
    pub stop_delay_ms: u64,

    #[serde(default)]
    pub fail_on_start: bool,

    #[serde(default)]
    pub fail_on_stop: bool,

    /// Names of components that must start first, in order.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl ComponentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_delay_ms: 0,
            stop_delay_ms: 0,
            fail_on_start: false,
            fail_on_stop: false,
            depends_on: Vec::new(),
        }
    }
}
