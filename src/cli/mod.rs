//! Command-line interfaces of the two tools
//!
//! Every option is optional here; anything not given on the command line
//! falls through to the environment, then to the built-in defaults.

use crate::models::PortPlan;
use clap::{ArgAction, Args, Parser};
use std::path::PathBuf;

/// Color, verbosity and debug flags shared by both tools
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output (JSON logs with source locations)
    #[arg(long)]
    pub debug: bool,
}

impl OutputArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }
        Ok(())
    }

    /// Explicit flag wins; otherwise ask the terminal
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// `.env` helpers; either one exits without contacting a server
#[derive(Args, Debug, Clone, Default)]
pub struct EnvFileArgs {
    /// List the supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,

    /// Write an example .env file to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with = "env_help")]
    pub init_env: Option<PathBuf>,
}

impl EnvFileArgs {
    pub fn requested(&self) -> bool {
        self.env_help || self.init_env.is_some()
    }
}

/// Concurrent duplicate-ID checker: floods `POST /api/users` on several
/// ports at once and reports identifiers handed out more than once
#[derive(Parser, Debug, Clone)]
#[command(name = "dupcheck")]
#[command(version, about, long_about = None)]
pub struct DupCheckCli {
    /// Host of the server under test (no scheme)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port and number of concurrent create calls, e.g. 10001:80 (repeatable)
    #[arg(long = "port", value_name = "PORT:COUNT", action = ArgAction::Append, value_parser = parse_port_entry)]
    pub ports: Vec<(u16, u32)>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Cap on simultaneously in-flight requests (unbounded when omitted)
    #[arg(long, value_name = "N")]
    pub max_in_flight: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub env: EnvFileArgs,
}

impl DupCheckCli {
    pub fn validate(&self) -> Result<(), String> {
        self.output.validate()?;

        if self.max_in_flight == Some(0) {
            return Err("--max-in-flight must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Port plan given on the command line, if any
    pub fn port_plan(&self) -> Option<PortPlan> {
        if self.ports.is_empty() {
            None
        } else {
            Some(self.ports.iter().copied().collect())
        }
    }

    pub fn use_colors(&self) -> bool {
        self.output.use_colors()
    }
}

/// Serial-vs-parallel latency comparator: samples both processing
/// endpoints sequentially and compares their server-reported averages
#[derive(Parser, Debug, Clone)]
#[command(name = "latcmp")]
#[command(version, about, long_about = None)]
pub struct LatencyCli {
    /// Base URL of the performance API
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Sequential calls per processing mode
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=crate::defaults::MAX_SAMPLE_COUNT as i64))]
    pub samples: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Liveness probe timeout in seconds
    #[arg(long, value_parser = parse_duration)]
    pub health_timeout: Option<u64>,

    /// Exit immediately instead of waiting for Enter
    #[arg(long)]
    pub no_pause: bool,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub env: EnvFileArgs,
}

impl LatencyCli {
    pub fn validate(&self) -> Result<(), String> {
        self.output.validate()
    }

    /// Wait for Enter before exiting, on success and on failure alike.
    /// Only an interactive stdin can answer the prompt.
    pub fn pause_on_exit(&self, stdin_is_terminal: bool) -> bool {
        stdin_is_terminal && !self.no_pause && !self.env.requested()
    }

    pub fn use_colors(&self) -> bool {
        self.output.use_colors()
    }
}

/// Parse duration from seconds string
pub fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > crate::defaults::MAX_TIMEOUT_SECS {
                Err(format!("Duration cannot exceed {} seconds", crate::defaults::MAX_TIMEOUT_SECS))
            } else {
                Ok(secs)
            }
        })
}

/// Parse a `PORT:COUNT` argument
pub fn parse_port_entry(s: &str) -> Result<(u16, u32), String> {
    let (port, count) = PortPlan::parse_entry(s).map_err(|e| e.to_string())?;
    if port == 0 {
        return Err("Port must be between 1 and 65535".to_string());
    }
    Ok((port, count))
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dupcheck_defaults_are_unset() {
        let cli = DupCheckCli::parse_from(["dupcheck"]);
        assert!(cli.host.is_none());
        assert!(cli.port_plan().is_none());
        assert!(cli.timeout.is_none());
        assert!(cli.max_in_flight.is_none());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_dupcheck_repeatable_ports() {
        let cli = DupCheckCli::parse_from([
            "dupcheck",
            "--host", "10.0.0.5",
            "--port", "10002:40",
            "--port", "10001:80",
            "--timeout", "15",
            "--max-in-flight", "50",
            "--no-color",
        ]);

        assert_eq!(cli.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(cli.port_plan().unwrap().to_string(), "10001:80,10002:40");
        assert_eq!(cli.timeout, Some(15));
        assert_eq!(cli.max_in_flight, Some(50));
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_dupcheck_rejects_bad_port_entries() {
        assert!(DupCheckCli::try_parse_from(["dupcheck", "--port", "10001"]).is_err());
        assert!(DupCheckCli::try_parse_from(["dupcheck", "--port", "0:5"]).is_err());
        assert!(DupCheckCli::try_parse_from(["dupcheck", "--port", "70000:5"]).is_err());
        assert!(DupCheckCli::try_parse_from(["dupcheck", "--port", "9001:-1"]).is_err());
    }

    #[test]
    fn test_conflicting_color_flags() {
        let cli = DupCheckCli::parse_from(["dupcheck", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = DupCheckCli::parse_from(["dupcheck", "--max-in-flight", "0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_latency_cli_options() {
        let cli = LatencyCli::parse_from([
            "latcmp",
            "--base-url", "http://svc:9000/api/performance",
            "--samples", "8",
            "--health-timeout", "2",
            "--no-pause",
            "--verbose",
        ]);

        assert_eq!(cli.base_url.as_deref(), Some("http://svc:9000/api/performance"));
        assert_eq!(cli.samples, Some(8));
        assert_eq!(cli.health_timeout, Some(2));
        assert!(cli.timeout.is_none());
        assert!(cli.no_pause);
        assert!(cli.output.verbose);
    }

    #[test]
    fn test_pause_on_exit() {
        let cli = LatencyCli::parse_from(["latcmp"]);
        assert!(cli.pause_on_exit(true));
        assert!(!cli.pause_on_exit(false));

        let cli = LatencyCli::parse_from(["latcmp", "--no-pause"]);
        assert!(!cli.pause_on_exit(true));

        let cli = LatencyCli::parse_from(["latcmp", "--env-help"]);
        assert!(!cli.pause_on_exit(true));
    }

    #[test]
    fn test_env_file_flags() {
        let cli = DupCheckCli::parse_from(["dupcheck", "--init-env", "probe.env"]);
        assert_eq!(cli.env.init_env, Some(PathBuf::from("probe.env")));
        assert!(cli.env.requested());

        assert!(!DupCheckCli::parse_from(["dupcheck"]).env.requested());
        assert!(DupCheckCli::try_parse_from(["dupcheck", "--env-help", "--init-env", "x"]).is_err());
    }

    #[test]
    fn test_latency_sample_bounds() {
        assert!(LatencyCli::try_parse_from(["latcmp", "--samples", "0"]).is_err());
        assert!(LatencyCli::try_parse_from(["latcmp", "--samples", "101"]).is_err());
        assert!(LatencyCli::try_parse_from(["latcmp", "-n", "100"]).is_ok());
    }

    #[test]
    fn test_explicit_color_flag_wins() {
        let cli = LatencyCli::parse_from(["latcmp", "--color"]);
        assert!(cli.use_colors());
        let cli = LatencyCli::parse_from(["latcmp", "--no-color"]);
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_duration("1").unwrap(), 1);
        assert_eq!(parse_duration("300").unwrap(), 300);

        assert!(parse_duration("0").is_err());
        assert!(parse_duration("301").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10.5").is_err());
        assert!(parse_duration("+10").is_err());
        assert!(parse_duration("0x10").is_err());
        assert!(parse_duration("-5").is_err());
    }

    #[test]
    fn test_port_entry_parsing() {
        assert_eq!(parse_port_entry("9001:10").unwrap(), (9001, 10));
        assert_eq!(parse_port_entry(" 9001 : 0 ").unwrap(), (9001, 0));
        assert!(parse_port_entry("9001").is_err());
        assert!(parse_port_entry("abc:1").is_err());
    }
}
