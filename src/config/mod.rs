//! Configuration management module

pub mod env;
pub mod parser;
pub mod validation;

pub use env::{run_env_command, EnvManager};
pub use parser::{
    display_dupcheck_summary, display_latency_summary, load_dupcheck_config, load_latency_config,
    DupCheckConfigParser, LatencyConfigParser,
};
pub use validation::{ConfigValidator, ValidationLevel, ValidationWarning};

pub use crate::models::{DupCheckConfig, LatencyConfig};
