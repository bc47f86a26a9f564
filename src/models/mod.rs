//! Data models and structures for the probe tools

pub mod config;
pub mod latency;
pub mod outcome;

// Re-export main model types
pub use config::{DupCheckConfig, LatencyConfig, OutputSettings, PortPlan};
pub use latency::{LatencySample, ModeSamples, ProcessPayload, SampleFailure};
pub use outcome::{FailureKind, RequestOutcome, RunSummary, UnitFailure, UnitOutcome};
