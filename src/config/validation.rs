//! Advisory checks on top of the hard validation in the config models

use crate::{
    error::Result,
    models::{DupCheckConfig, LatencyConfig},
};
use colored::{Color, Colorize};
use std::net::IpAddr;

/// Above this many create calls a run is likely to overwhelm a dev server
const LARGE_RUN_UNITS: u64 = 1000;

/// Configuration validator producing warnings that never block a run
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a duplicate-check configuration and collect advisory warnings
    pub fn validate_dupcheck(config: &DupCheckConfig) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::check_host(&config.host));

        let total = config.ports.total_units();
        if total > LARGE_RUN_UNITS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Configuration will fire {} concurrent requests, which may overwhelm the server", total),
            ));
        }

        let idle: Vec<String> = config
            .ports
            .iter()
            .filter(|(_, count)| *count == 0)
            .map(|(port, _)| port.to_string())
            .collect();
        if !idle.is_empty() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Ports with a count of 0 will not be contacted: {}", idle.join(", ")),
            ));
        }

        if total > 0 && config.max_in_flight.is_none() && total > LARGE_RUN_UNITS / 2 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "No in-flight cap set; all requests start at once".to_string(),
            ));
        }

        warnings.extend(Self::check_timeout("Request", config.timeout_seconds));

        Ok(warnings)
    }

    /// Validate a latency comparison configuration and collect advisory warnings
    pub fn validate_latency(config: &LatencyConfig) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();

        if let Ok(parsed) = url::Url::parse(&config.base_url) {
            if parsed.query().is_some() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Base URL '{}' includes query parameters; they end up before the endpoint path", config.base_url),
                ));
            }
            let local = parsed
                .host_str()
                .and_then(|host| Self::check_host(host.trim_start_matches('[').trim_end_matches(']')));
            match local {
                Some(warning) => warnings.push(warning),
                None if parsed.scheme() == "http" => warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Base URL '{}' uses plain HTTP across the network", config.base_url),
                )),
                None => {}
            }
        }

        if config.sample_count < 3 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Sample count of {} may not provide reliable averages (recommended: >= 3)", config.sample_count),
            ));
        } else if config.sample_count > 50 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("High sample count of {} will increase execution time", config.sample_count),
            ));
        }

        warnings.extend(Self::check_timeout("Request", config.timeout_seconds));

        if config.health_timeout_seconds > config.timeout_seconds {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Health timeout ({}s) is longer than the request timeout ({}s)",
                    config.health_timeout_seconds, config.timeout_seconds
                ),
            ));
        }

        Ok(warnings)
    }

    fn check_host(host: &str) -> Option<ValidationWarning> {
        let local = match host.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => ip.is_private() || ip.is_loopback(),
            Ok(IpAddr::V6(ip)) => ip.is_loopback(),
            Err(_) => host.eq_ignore_ascii_case("localhost"),
        };

        local.then(|| {
            ValidationWarning::new(ValidationLevel::Info, format!("Target '{}' is on a private/local network", host))
        })
    }

    fn check_timeout(label: &str, seconds: u64) -> Option<ValidationWarning> {
        if seconds < 3 {
            Some(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("{} timeout of {}s may be too short under load", label, seconds),
            ))
        } else if seconds > 60 {
            Some(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Long {} timeout of {}s will slow down failure detection", label.to_lowercase(), seconds),
            ))
        } else {
            None
        }
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}
