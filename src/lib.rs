//! Endpoint Probe
//!
//! Two small diagnostic tools for HTTP services under test: a concurrent
//! duplicate-ID checker that floods user-creation endpoints across several
//! ports, and a latency comparator that contrasts serial and parallel
//! processing endpoints on a single server.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod sampler;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{DupCheckConfig, LatencyConfig, PortPlan, RequestOutcome, RunSummary, UnitOutcome};
pub use stats::{Aggregate, DuplicateReport, LatencyComparison};
pub use executor::Dispatcher;
pub use sampler::LatencySampler;
pub use output::{OutputFormatter, ColoredFormatter, PlainFormatter, OutputFormatterFactory};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_HOST: &str = "127.0.0.1";
    pub const DEFAULT_PORT_PLAN: &[(u16, u32)] = &[
        (10001, 80),
        (10002, 80),
        (10003, 80),
        (10004, 80),
        (10005, 80),
    ];
    pub const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(10);

    pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/performance";
    pub const DEFAULT_SAMPLE_COUNT: u32 = 5;
    pub const DEFAULT_LATENCY_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Upper bound on the total number of units one dupcheck run may spawn
    pub const MAX_TOTAL_UNITS: u64 = 10_000;
    pub const MAX_TIMEOUT_SECS: u64 = 300;
    pub const MAX_SAMPLE_COUNT: u32 = 100;
}
