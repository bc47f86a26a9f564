//! Environment variable handling and .env file management

use super::validation::{ValidationLevel, ValidationWarning};
use crate::{
    cli::EnvFileArgs,
    defaults,
    error::{AppError, Result},
    models::PortPlan,
    output::OutputFormatterFactory,
};
use std::path::Path;

pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if present.
    ///
    /// Variables already set in the process environment are not overwritten.
    pub fn load_env_file(debug: bool) -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<bool> {
        if !path.exists() {
            if debug {
                println!("No {} file found, using defaults and CLI arguments", path.display());
            }
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

        if debug {
            println!("Loaded configuration from {}", path.display());
        }

        Ok(true)
    }

    pub fn create_example_env_content() -> String {
        r#"# Endpoint Probe Configuration
#
# Values here are defaults for both tools; command-line arguments win.

# --- dupcheck ---------------------------------------------------------

# Host of the server under test (no scheme)
# PROBE_HOST=127.0.0.1

# PORT:COUNT pairs, comma-separated
# PROBE_PORTS=10001:80,10002:80,10003:80,10004:80,10005:80

# Per-request timeout in seconds (1-300)
# CREATE_TIMEOUT_SECONDS=10

# Cap on simultaneously in-flight requests (unbounded when unset)
# MAX_IN_FLIGHT=100

# --- latcmp -----------------------------------------------------------

# Base URL of the performance API
# LATENCY_BASE_URL=http://localhost:8080/api/performance

# Sequential calls per processing mode (1-100)
# SAMPLE_COUNT=5

# Per-request timeout in seconds (1-300)
# LATENCY_TIMEOUT_SECONDS=30

# Liveness probe timeout in seconds (1-300)
# HEALTH_TIMEOUT_SECONDS=5

# --- shared -----------------------------------------------------------

# Enable colored output (true/false)
# ENABLE_COLOR=true
"#
        .to_string()
    }

    /// Write the example file; an existing file is never overwritten
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(AppError::config(format!("{} already exists, not overwriting it", path.display())));
        }
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))
    }

    /// Check a variable's format without applying it
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "PROBE_HOST" => {
                let host = value.trim();
                if host.is_empty() || host.contains("://") || host.contains('/') {
                    return Err(AppError::config(format!("PROBE_HOST must be a bare host name or IP, got: '{}'", value)));
                }
            }
            "PROBE_PORTS" => {
                let plan: PortPlan = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid PROBE_PORTS value '{}': {}", value, e)))?;
                if plan.is_empty() {
                    return Err(AppError::config("PROBE_PORTS must contain at least one PORT:COUNT pair"));
                }
            }
            "CREATE_TIMEOUT_SECONDS" | "LATENCY_TIMEOUT_SECONDS" | "HEALTH_TIMEOUT_SECONDS" => {
                let timeout: u64 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if timeout == 0 || timeout > defaults::MAX_TIMEOUT_SECS {
                    return Err(AppError::config(format!(
                        "{} must be between 1 and {}, got: {}",
                        key,
                        defaults::MAX_TIMEOUT_SECS,
                        timeout
                    )));
                }
            }
            "MAX_IN_FLIGHT" => {
                let limit: usize = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid MAX_IN_FLIGHT value '{}': {}", value, e)))?;
                if limit == 0 {
                    return Err(AppError::config("MAX_IN_FLIGHT must be greater than 0"));
                }
            }
            "LATENCY_BASE_URL" => {
                let parsed = url::Url::parse(value)
                    .map_err(|e| AppError::config(format!("Invalid LATENCY_BASE_URL '{}': {}", value, e)))?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!("LATENCY_BASE_URL must use http or https: {}", value)));
                }
            }
            "SAMPLE_COUNT" => {
                let count: u32 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid SAMPLE_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > defaults::MAX_SAMPLE_COUNT {
                    return Err(AppError::config(format!(
                        "SAMPLE_COUNT must be between 1 and {}, got: {}",
                        defaults::MAX_SAMPLE_COUNT,
                        count
                    )));
                }
            }
            "ENABLE_COLOR" => {
                value
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// `(name, description, example)` for every recognised variable
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("PROBE_HOST", "dupcheck: host of the server under test", "127.0.0.1"),
            ("PROBE_PORTS", "dupcheck: PORT:COUNT pairs", "10001:80,10002:80"),
            ("CREATE_TIMEOUT_SECONDS", "dupcheck: request timeout (1-300)", "10"),
            ("MAX_IN_FLIGHT", "dupcheck: in-flight request cap", "100"),
            ("LATENCY_BASE_URL", "latcmp: performance API base URL", "http://localhost:8080/api/performance"),
            ("SAMPLE_COUNT", "latcmp: calls per mode (1-100)", "5"),
            ("LATENCY_TIMEOUT_SECONDS", "latcmp: request timeout (1-300)", "30"),
            ("HEALTH_TIMEOUT_SECONDS", "latcmp: liveness probe timeout (1-300)", "5"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    pub fn display_env_help() -> String {
        let mut help = String::from("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<24} {}\n", var, description));
            help.push_str(&format!("  {:<24} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Warnings for every set variable that fails [`Self::validate_env_var`].
    ///
    /// A tool aborts on bad values of its own variables while loading its
    /// configuration, so in practice this reports the other tool's ones.
    pub fn validate_current_env() -> Vec<ValidationWarning> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(name, _, _)| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value)
                    .err()
                    .map(|e| ValidationWarning::new(ValidationLevel::Warning, e.to_string()))
            })
            .collect()
    }
}

/// Handle `--env-help` and `--init-env`. Returns `true` when one of them
/// ran and the tool should exit without probing anything.
pub fn run_env_command(args: &EnvFileArgs, use_color: bool) -> Result<bool> {
    if args.env_help {
        print!("{}", EnvManager::display_env_help());
        return Ok(true);
    }

    if let Some(path) = &args.init_env {
        EnvManager::save_example_env_file(path)?;
        let formatter = OutputFormatterFactory::create_formatter(use_color, false);
        println!("{}", formatter.format_success(&format!("Wrote example configuration to {}", path.display()))?);
        return Ok(true);
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();
        for (name, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", name)), "missing {}", name);
        }
    }

    #[test]
    fn test_save_example_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env.example");
        EnvManager::save_example_env_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Endpoint Probe Configuration"));

        assert!(EnvManager::save_example_env_file(&path).is_err());
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("PROBE_HOST", "10.147.17.199").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_PORTS", "10001:80, 10002:40").is_ok());
        assert!(EnvManager::validate_env_var("CREATE_TIMEOUT_SECONDS", "10").is_ok());
        assert!(EnvManager::validate_env_var("MAX_IN_FLIGHT", "64").is_ok());
        assert!(EnvManager::validate_env_var("LATENCY_BASE_URL", "https://svc/api/performance").is_ok());
        assert!(EnvManager::validate_env_var("SAMPLE_COUNT", "5").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("UNRELATED", "anything").is_ok());

        assert!(EnvManager::validate_env_var("PROBE_HOST", "http://host").is_err());
        assert!(EnvManager::validate_env_var("PROBE_PORTS", "10001").is_err());
        assert!(EnvManager::validate_env_var("PROBE_PORTS", "").is_err());
        assert!(EnvManager::validate_env_var("HEALTH_TIMEOUT_SECONDS", "0").is_err());
        assert!(EnvManager::validate_env_var("LATENCY_TIMEOUT_SECONDS", "301").is_err());
        assert!(EnvManager::validate_env_var("MAX_IN_FLIGHT", "0").is_err());
        assert!(EnvManager::validate_env_var("LATENCY_BASE_URL", "ftp://svc").is_err());
        assert!(EnvManager::validate_env_var("SAMPLE_COUNT", "101").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("PROBE_PORTS"));
        assert!(help.contains("LATENCY_BASE_URL"));
        assert!(help.contains("Configuration Priority"));
    }

    #[test]
    fn test_env_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.env");

        let none = EnvFileArgs::default();
        assert!(!run_env_command(&none, false).unwrap());
        assert!(!path.exists());

        let init = EnvFileArgs {
            env_help: false,
            init_env: Some(path.clone()),
        };
        assert!(run_env_command(&init, false).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("PROBE_PORTS="));

        let help = EnvFileArgs {
            env_help: true,
            init_env: None,
        };
        assert!(run_env_command(&help, false).unwrap());
    }

    #[test]
    fn test_missing_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        assert!(!EnvManager::load_env_file_from(&path, false).unwrap());
    }

    #[test]
    fn test_load_env_file_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "ENDPOINT_PROBE_ENV_FILE_MARKER=loaded").unwrap();

        assert!(EnvManager::load_env_file_from(file.path(), false).unwrap());
        assert_eq!(std::env::var("ENDPOINT_PROBE_ENV_FILE_MARKER").unwrap(), "loaded");
        std::env::remove_var("ENDPOINT_PROBE_ENV_FILE_MARKER");
    }
}
