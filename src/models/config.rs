//! Configuration data models and validation

use crate::defaults;
use crate::types::{AppError, ProcessingMode, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Mapping from target port to the number of concurrent create calls.
///
/// Backed by a `BTreeMap` so iteration is always in ascending port order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortPlan(BTreeMap<u16, u32>);

impl PortPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency count for a port, replacing any previous value
    pub fn insert(&mut self, port: u16, count: u32) -> Option<u32> {
        self.0.insert(port, count)
    }

    pub fn get(&self, port: u16) -> Option<u32> {
        self.0.get(&port).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(port, count)` pairs in ascending port order
    pub fn iter(&self) -> impl Iterator<Item = (u16, u32)> + '_ {
        self.0.iter().map(|(port, count)| (*port, *count))
    }

    /// Total number of units a run will dispatch
    pub fn total_units(&self) -> u64 {
        self.0.values().map(|&count| count as u64).sum()
    }

    /// Parse a single `PORT:COUNT` pair
    pub fn parse_entry(entry: &str) -> Result<(u16, u32)> {
        let (port, count) = entry
            .trim()
            .split_once(':')
            .ok_or_else(|| AppError::parse(format!("Expected PORT:COUNT, got '{}'", entry.trim())))?;

        let port: u16 = port
            .trim()
            .parse()
            .map_err(|e| AppError::parse(format!("Invalid port '{}': {}", port.trim(), e)))?;
        let count: u32 = count
            .trim()
            .parse()
            .map_err(|e| AppError::parse(format!("Invalid count '{}': {}", count.trim(), e)))?;

        Ok((port, count))
    }
}

impl FromStr for PortPlan {
    type Err = AppError;

    /// Parse a comma-separated list such as `10001:80,10002:40`
    fn from_str(s: &str) -> Result<Self> {
        let mut plan = PortPlan::new();
        for entry in s.split(',').filter(|e| !e.trim().is_empty()) {
            let (port, count) = Self::parse_entry(entry)?;
            plan.insert(port, count);
        }
        Ok(plan)
    }
}

impl FromIterator<(u16, u32)> for PortPlan {
    fn from_iter<I: IntoIterator<Item = (u16, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for PortPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(port, count)| format!("{}:{}", port, count)).collect();
        f.write_str(&pairs.join(","))
    }
}

/// Console output settings shared by both tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl OutputSettings {
    fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }
        Ok(())
    }
}

/// Configuration of the concurrent duplicate-ID checker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DupCheckConfig {
    /// Host of the server under test (name or IP, no scheme)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to concurrency count mapping
    #[serde(default = "default_port_plan")]
    pub ports: PortPlan,

    /// Per-request timeout for create calls
    #[serde(default = "default_create_timeout_secs")]
    pub timeout_seconds: u64,

    /// Optional cap on simultaneously in-flight requests
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    #[serde(default)]
    pub output: OutputSettings,
}

impl Default for DupCheckConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            ports: default_port_plan(),
            timeout_seconds: default_create_timeout_secs(),
            max_in_flight: None,
            output: OutputSettings::default(),
        }
    }
}

impl DupCheckConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// `http://<host>:<port>/api/users`
    pub fn create_url(&self, port: u16) -> String {
        format!("http://{}:{}/api/users", self.host, port)
    }

    /// Validate the configuration and return the first error found
    pub fn validate(&self) -> Result<()> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(AppError::config("Target host cannot be empty"));
        }
        if host.contains("://") || host.contains('/') {
            return Err(AppError::config(format!("Target host must not include a scheme or path: {}", host)));
        }
        match url::Url::parse(&format!("http://{}:1/", host)) {
            Ok(parsed) if parsed.host_str().is_some() => {}
            Ok(_) => return Err(AppError::config(format!("Invalid target host: {}", host))),
            Err(e) => return Err(AppError::config(format!("Invalid target host '{}': {}", host, e))),
        }

        if self.ports.is_empty() {
            return Err(AppError::config("At least one PORT:COUNT pair is required"));
        }
        if self.ports.iter().any(|(port, _)| port == 0) {
            return Err(AppError::config("Port 0 is not a valid target port"));
        }
        if self.ports.total_units() > defaults::MAX_TOTAL_UNITS {
            return Err(AppError::config(format!(
                "Total concurrent requests cannot exceed {}, got: {}",
                defaults::MAX_TOTAL_UNITS,
                self.ports.total_units()
            )));
        }

        validate_timeout("Timeout", self.timeout_seconds)?;

        if self.max_in_flight == Some(0) {
            return Err(AppError::config("Max in-flight requests must be greater than 0"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("PROBE_HOST") {
            self.host = host.trim().to_string();
        }

        if let Ok(ports) = std::env::var("PROBE_PORTS") {
            self.ports = ports.parse()
                .map_err(|e| AppError::config(format!("Invalid PROBE_PORTS value '{}': {}", ports, e)))?;
        }

        if let Ok(timeout) = std::env::var("CREATE_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.parse()
                .map_err(|e| AppError::config(format!("Invalid CREATE_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(limit) = std::env::var("MAX_IN_FLIGHT") {
            self.max_in_flight = Some(limit.parse()
                .map_err(|e| AppError::config(format!("Invalid MAX_IN_FLIGHT value '{}': {}", limit, e)))?);
        }

        self.output.merge_from_env()
    }
}

/// Configuration of the serial-vs-parallel latency comparator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyConfig {
    /// Base URL of the performance API, e.g. `http://localhost:8080/api/performance`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sequential calls per processing mode
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,

    /// Per-request timeout for processing calls
    #[serde(default = "default_latency_timeout_secs")]
    pub timeout_seconds: u64,

    /// Timeout for the liveness probe
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_seconds: u64,

    /// Wait for Enter before exiting (only when stdin is a terminal)
    #[serde(default = "default_pause_on_exit")]
    pub pause_on_exit: bool,

    #[serde(default)]
    pub output: OutputSettings,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sample_count: default_sample_count(),
            timeout_seconds: default_latency_timeout_secs(),
            health_timeout_seconds: default_health_timeout_secs(),
            pause_on_exit: default_pause_on_exit(),
            output: OutputSettings::default(),
        }
    }
}

impl LatencyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_seconds)
    }

    fn trimmed_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Liveness probe URL
    pub fn health_url(&self) -> String {
        format!("{}/test-data", self.trimmed_base())
    }

    /// Processing endpoint URL for a mode
    pub fn process_url(&self, mode: ProcessingMode) -> String {
        format!("{}/process/{}", self.trimmed_base(), mode.path_segment())
    }

    /// Total number of processing calls a run makes
    pub fn total_calls(&self) -> u32 {
        self.sample_count * ProcessingMode::ALL.len() as u32
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(AppError::config("Base URL cannot be empty"));
        }

        match url::Url::parse(&self.base_url) {
            Ok(parsed) => {
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!("Base URL must use http or https: {}", self.base_url)));
                }
            }
            Err(e) => {
                return Err(AppError::config(format!("Invalid base URL '{}': {}", self.base_url, e)));
            }
        }

        if self.sample_count == 0 {
            return Err(AppError::config("Sample count must be greater than 0"));
        }

        if self.sample_count > defaults::MAX_SAMPLE_COUNT {
            return Err(AppError::config(format!("Sample count cannot exceed {}", defaults::MAX_SAMPLE_COUNT)));
        }

        validate_timeout("Timeout", self.timeout_seconds)?;
        validate_timeout("Health timeout", self.health_timeout_seconds)?;

        Ok(())
    }

    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(base_url) = std::env::var("LATENCY_BASE_URL") {
            self.base_url = base_url.trim().to_string();
        }

        if let Ok(samples) = std::env::var("SAMPLE_COUNT") {
            self.sample_count = samples.parse()
                .map_err(|e| AppError::config(format!("Invalid SAMPLE_COUNT value '{}': {}", samples, e)))?;
        }

        if let Ok(timeout) = std::env::var("LATENCY_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.parse()
                .map_err(|e| AppError::config(format!("Invalid LATENCY_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(timeout) = std::env::var("HEALTH_TIMEOUT_SECONDS") {
            self.health_timeout_seconds = timeout.parse()
                .map_err(|e| AppError::config(format!("Invalid HEALTH_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        self.output.merge_from_env()
    }
}

fn validate_timeout(name: &str, seconds: u64) -> Result<()> {
    if seconds == 0 {
        return Err(AppError::config(format!("{} must be greater than 0", name)));
    }
    if seconds > defaults::MAX_TIMEOUT_SECS {
        return Err(AppError::config(format!("{} cannot exceed {} seconds", name, defaults::MAX_TIMEOUT_SECS)));
    }
    Ok(())
}

// Default value functions for serde
fn default_host() -> String {
    defaults::DEFAULT_HOST.to_string()
}

fn default_port_plan() -> PortPlan {
    defaults::DEFAULT_PORT_PLAN.iter().copied().collect()
}

fn default_create_timeout_secs() -> u64 {
    defaults::DEFAULT_CREATE_TIMEOUT.as_secs()
}

fn default_base_url() -> String {
    defaults::DEFAULT_BASE_URL.to_string()
}

fn default_sample_count() -> u32 {
    defaults::DEFAULT_SAMPLE_COUNT
}

fn default_latency_timeout_secs() -> u64 {
    defaults::DEFAULT_LATENCY_TIMEOUT.as_secs()
}

fn default_health_timeout_secs() -> u64 {
    defaults::DEFAULT_HEALTH_TIMEOUT.as_secs()
}

fn default_pause_on_exit() -> bool {
    true
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}
