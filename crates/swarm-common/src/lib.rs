use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MIN_PORT: u16 = 20000;
pub const DEFAULT_MAX_PORT: u16 = 24999;
pub const DEFAULT_NEW_FLOWS_PER_SEC: u32 = 800;
pub const DEFAULT_REQUESTS_PER_FLOW: u32 = 60;
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// What each flow writes on the wire.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolMode {
    /// `#<port>-<index>\n` per request, one reply line expected.
    #[default]
    Raw,
    /// Canned HTTP/1.1 GET terminated by `EOF\n`, reply read up to an `EOF\n` line.
    Http,
}

/// Spawn-side tunables: target rate and the destination port sweep.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoadConfig {
    pub new_flows_per_sec: u32,
    pub min_port: u16,
    pub max_port: u16,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            new_flows_per_sec: DEFAULT_NEW_FLOWS_PER_SEC,
            min_port: DEFAULT_MIN_PORT,
            max_port: DEFAULT_MAX_PORT,
        }
    }
}

/// Per-connection tunables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FlowConfig {
    pub requests_per_flow: u32,
    pub request_interval_ms: u64,
    pub protocol: ProtocolMode,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            requests_per_flow: DEFAULT_REQUESTS_PER_FLOW,
            request_interval_ms: DEFAULT_REQUEST_INTERVAL_MS,
            protocol: ProtocolMode::Raw,
        }
    }
}

impl FlowConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

/// Optional YAML tuning file. Every section may be omitted.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Tuning {
    pub load: LoadConfig,
    pub flow: FlowConfig,
}

impl Tuning {
    pub fn from_yaml(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&data)
    }
}

/// Run configuration, built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub max_concurrent: usize,
    pub server_addresses: Vec<String>,
    pub client_addresses: Vec<IpAddr>,
    pub load: LoadConfig,
    pub flow: FlowConfig,
}

impl Config {
    pub fn new(
        max_concurrent: usize,
        server_addresses: Vec<String>,
        client_addresses: Vec<IpAddr>,
        tuning: Tuning,
    ) -> Self {
        Self {
            max_concurrent,
            server_addresses,
            client_addresses,
            load: tuning.load,
            flow: tuning.flow,
        }
    }

    /// Number of ports in one full sweep.
    pub fn port_range_len(&self) -> u32 {
        u32::from(self.load.max_port) - u32::from(self.load.min_port) + 1
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "max concurrent connections must be at least 1".to_string(),
            ));
        }
        if self.server_addresses.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one server address is required".to_string(),
            ));
        }
        if self.server_addresses.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "server address list contains an empty entry".to_string(),
            ));
        }
        if self.load.min_port == 0 {
            return Err(ConfigError::Invalid("min_port must be non-zero".to_string()));
        }
        if self.load.min_port > self.load.max_port {
            return Err(ConfigError::Invalid(format!(
                "port range {}-{} is empty",
                self.load.min_port, self.load.max_port
            )));
        }
        if self.load.new_flows_per_sec == 0 {
            return Err(ConfigError::Invalid(
                "new_flows_per_sec must be at least 1".to_string(),
            ));
        }
        if self.flow.requests_per_flow == 0 {
            return Err(ConfigError::Invalid(
                "requests_per_flow must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
