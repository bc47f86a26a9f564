//! Configuration parsing from CLI arguments and environment variables
//!
//! Both tools resolve their settings in the same order: built-in defaults,
//! then the `.env` file, then process environment, then command-line flags.
//! The result is validated before it is handed back.

use crate::{
    cli::{DupCheckCli, LatencyCli, OutputArgs},
    config::env::EnvManager,
    error::Result,
    models::{DupCheckConfig, LatencyConfig, OutputSettings},
};
use std::path::PathBuf;

/// Builds a [`DupCheckConfig`] from CLI arguments layered over the environment
pub struct DupCheckConfigParser {
    cli: DupCheckCli,
    env_file: PathBuf,
}

impl DupCheckConfigParser {
    pub fn new(cli: DupCheckCli) -> Self {
        Self {
            cli,
            env_file: PathBuf::from(".env"),
        }
    }

    /// Read a different env file instead of `./.env`
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    pub fn parse(&self) -> Result<DupCheckConfig> {
        let mut config = DupCheckConfig::default();

        EnvManager::load_env_file_from(&self.env_file, self.cli.output.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut DupCheckConfig) {
        if let Some(ref host) = self.cli.host {
            config.host = host.trim().to_string();
        }

        if let Some(plan) = self.cli.port_plan() {
            config.ports = plan;
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = timeout;
        }

        if let Some(limit) = self.cli.max_in_flight {
            config.max_in_flight = Some(limit);
        }

        apply_output_overrides(&self.cli.output, &mut config.output);

        if config.output.debug {
            println!("Applied CLI overrides to configuration");
            println!(
                "Final config: host={}, ports={}, timeout={}s, enable_color={}",
                config.host, config.ports, config.timeout_seconds, config.output.enable_color
            );
        }
    }
}

/// Builds a [`LatencyConfig`] from CLI arguments layered over the environment
pub struct LatencyConfigParser {
    cli: LatencyCli,
    env_file: PathBuf,
}

impl LatencyConfigParser {
    pub fn new(cli: LatencyCli) -> Self {
        Self {
            cli,
            env_file: PathBuf::from(".env"),
        }
    }

    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    pub fn parse(&self) -> Result<LatencyConfig> {
        let mut config = LatencyConfig::default();

        EnvManager::load_env_file_from(&self.env_file, self.cli.output.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut LatencyConfig) {
        if let Some(ref base_url) = self.cli.base_url {
            config.base_url = base_url.trim().to_string();
        }

        if let Some(samples) = self.cli.samples {
            config.sample_count = samples;
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = timeout;
        }

        if let Some(timeout) = self.cli.health_timeout {
            config.health_timeout_seconds = timeout;
        }

        if self.cli.no_pause {
            config.pause_on_exit = false;
        }

        apply_output_overrides(&self.cli.output, &mut config.output);

        if config.output.debug {
            println!("Applied CLI overrides to configuration");
            println!(
                "Final config: base_url={}, samples={}, timeout={}s, enable_color={}",
                config.base_url, config.sample_count, config.timeout_seconds, config.output.enable_color
            );
        }
    }
}

/// `--color` forces color on, `--no-color` forces it off; otherwise the
/// configured value stands unless the terminal cannot show it
fn apply_output_overrides(args: &OutputArgs, output: &mut OutputSettings) {
    if args.color {
        output.enable_color = true;
    } else if args.no_color || !crate::cli::supports_color() {
        output.enable_color = false;
    }

    output.verbose = args.verbose;
    output.debug = args.debug;
}

pub fn load_dupcheck_config(cli: DupCheckCli) -> Result<DupCheckConfig> {
    DupCheckConfigParser::new(cli).parse()
}

pub fn load_latency_config(cli: LatencyCli) -> Result<LatencyConfig> {
    LatencyConfigParser::new(cli).parse()
}

/// Configuration summary for debug output
pub fn display_dupcheck_summary(config: &DupCheckConfig) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Host: {}", config.host));
    summary.push(format!("Ports: {}", config.ports));
    summary.push(format!("Total Requests: {}", config.ports.total_units()));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!(
        "Max In-Flight: {}",
        config.max_in_flight.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
    ));
    summary.push(format!("Color Output: {}", config.output.enable_color));
    summary.push(format!("Verbose: {}", config.output.verbose));
    summary.push(format!("Debug: {}", config.output.debug));

    summary.join("\n")
}

pub fn display_latency_summary(config: &LatencyConfig) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Base URL: {}", config.base_url));
    summary.push(format!("Samples Per Mode: {}", config.sample_count));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Health Timeout: {}s", config.health_timeout_seconds));
    summary.push(format!("Pause On Exit: {}", config.pause_on_exit));
    summary.push(format!("Color Output: {}", config.output.enable_color));
    summary.push(format!("Verbose: {}", config.output.verbose));
    summary.push(format!("Debug: {}", config.output.debug));

    summary.join("\n")
}
