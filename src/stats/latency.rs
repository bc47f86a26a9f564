//! Average-based serial vs parallel comparison

use serde::{Deserialize, Serialize};

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Outcome of a comparison as printed in the final verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    ParallelFaster,
    ParallelSlower,
    /// Both averages are identical
    NoDifference,
    /// Serial average of zero; no percentage can be derived from it
    Undetermined,
}

/// Comparison of server-reported averages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyComparison {
    pub serial_avg_ms: f64,
    pub parallel_avg_ms: f64,
    /// `serial_avg - parallel_avg`; negative when parallel is slower
    pub reduction_ms: f64,
    /// `(serial_avg - parallel_avg) / serial_avg * 100`
    pub improvement_pct: f64,
}

impl LatencyComparison {
    /// Compare two sample sets. Returns `None` unless both are non-empty.
    ///
    /// A zero serial average yields an improvement of 0%.
    pub fn compute(serial: &[f64], parallel: &[f64]) -> Option<Self> {
        let serial_avg_ms = mean(serial)?;
        let parallel_avg_ms = mean(parallel)?;
        let reduction_ms = serial_avg_ms - parallel_avg_ms;

        let improvement_pct = if serial_avg_ms > 0.0 {
            reduction_ms / serial_avg_ms * 100.0
        } else {
            0.0
        };

        Some(Self {
            serial_avg_ms,
            parallel_avg_ms,
            reduction_ms,
            improvement_pct,
        })
    }

    pub fn verdict(&self) -> Verdict {
        if self.serial_avg_ms <= 0.0 {
            Verdict::Undetermined
        } else if self.reduction_ms > 0.0 {
            Verdict::ParallelFaster
        } else if self.reduction_ms < 0.0 {
            Verdict::ParallelSlower
        } else {
            Verdict::NoDifference
        }
    }

    pub fn parallel_is_faster(&self) -> bool {
        self.verdict() == Verdict::ParallelFaster
    }
}
