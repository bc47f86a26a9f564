//! Per-unit outcomes of the duplicate-ID checker and their reduction

use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One successful creation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// Port the request was sent to
    pub port: u16,
    /// Identifier returned by the server
    pub user_id: UserId,
    /// Display name returned by the server
    pub name: String,
}

impl RequestOutcome {
    pub fn new(port: u16, user_id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            port,
            user_id: user_id.into(),
            name: name.into(),
        }
    }
}

/// Why a unit did not produce a [`RequestOutcome`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Server answered with a non-2xx status; the body is not parsed
    Status(u16),
    /// Request exceeded its timeout
    Timeout,
    /// Connection refused, reset, DNS failure and similar
    Transport(String),
    /// 2xx response without a usable `id`/`name`
    MalformedBody(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Status(code) => write!(f, "HTTP {}", code),
            FailureKind::Timeout => f.write_str("timed out"),
            FailureKind::Transport(msg) => write!(f, "transport error: {}", msg),
            FailureKind::MalformedBody(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

/// A failed unit together with what it attempted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFailure {
    pub port: u16,
    /// Per-port sequence index of the unit
    pub seq: u32,
    /// Name the unit tried to create
    pub requested_name: String,
    pub kind: FailureKind,
}

/// Typed result of one dispatched unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitOutcome {
    Created {
        seq: u32,
        requested_name: String,
        outcome: RequestOutcome,
    },
    Failed(UnitFailure),
}

impl UnitOutcome {
    pub fn port(&self) -> u16 {
        match self {
            UnitOutcome::Created { outcome, .. } => outcome.port,
            UnitOutcome::Failed(failure) => failure.port,
        }
    }

    pub fn seq(&self) -> u32 {
        match self {
            UnitOutcome::Created { seq, .. } => *seq,
            UnitOutcome::Failed(failure) => failure.seq,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UnitOutcome::Created { .. })
    }
}

/// Reduction of every unit outcome of one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub success_count: u64,
    pub error_count: u64,
    /// Successful outcomes, in completion order
    pub outcomes: Vec<RequestOutcome>,
    pub failures: Vec<UnitFailure>,
    /// Wall-clock time from first spawn to last join
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one unit outcome into the summary
    pub fn absorb(&mut self, unit: UnitOutcome) {
        match unit {
            UnitOutcome::Created { outcome, .. } => {
                self.success_count += 1;
                self.outcomes.push(outcome);
            }
            UnitOutcome::Failed(failure) => {
                self.error_count += 1;
                self.failures.push(failure);
            }
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Total number of units accounted for
    pub fn total_units(&self) -> u64 {
        self.success_count + self.error_count
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_units() == 0 {
            0.0
        } else {
            self.success_count as f64 / self.total_units() as f64 * 100.0
        }
    }
}

impl FromIterator<UnitOutcome> for RunSummary {
    fn from_iter<I: IntoIterator<Item = UnitOutcome>>(iter: I) -> Self {
        let mut summary = RunSummary::new();
        for unit in iter {
            summary.absorb(unit);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(port: u16, seq: u32, id: i64) -> UnitOutcome {
        UnitOutcome::Created {
            seq,
            requested_name: format!("{}_{}_0", port, seq),
            outcome: RequestOutcome::new(port, id, format!("{}_{}_0", port, seq)),
        }
    }

    fn failed(port: u16, seq: u32, kind: FailureKind) -> UnitOutcome {
        UnitOutcome::Failed(UnitFailure {
            port,
            seq,
            requested_name: format!("{}_{}_0", port, seq),
            kind,
        })
    }

    #[test]
    fn test_summary_reduction() {
        let summary: RunSummary = vec![
            created(9001, 0, 1),
            failed(9001, 1, FailureKind::Status(500)),
            created(9002, 0, 2),
            failed(9002, 1, FailureKind::Timeout),
        ]
        .into_iter()
        .collect();

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 2);
        assert_eq!(summary.outcomes.len() as u64, summary.success_count);
        assert_eq!(summary.failures.len() as u64, summary.error_count);
        assert_eq!(summary.total_units(), 4);
        assert!((summary.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::new();
        assert_eq!(summary.total_units(), 0);
        assert_eq!(summary.success_rate(), 0.0);
    }

    #[test]
    fn test_unit_outcome_accessors() {
        let ok = created(9001, 3, 7);
        assert!(ok.is_success());
        assert_eq!(ok.port(), 9001);
        assert_eq!(ok.seq(), 3);

        let err = failed(9002, 4, FailureKind::Transport("connection refused".into()));
        assert!(!err.is_success());
        assert_eq!(err.port(), 9002);
        assert_eq!(err.seq(), 4);
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(FailureKind::Status(503).to_string(), "HTTP 503");
        assert_eq!(FailureKind::Timeout.to_string(), "timed out");
        assert!(FailureKind::MalformedBody("missing field `id`".into())
            .to_string()
            .contains("missing field"));
    }
}
