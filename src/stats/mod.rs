//! Result aggregation: duplicate-ID detection and latency comparison

pub mod latency;

pub use latency::{mean, LatencyComparison, Verdict};

use crate::{models::RequestOutcome, types::UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Result of aggregating a run's successful outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Aggregate {
    /// Nothing to aggregate
    NoSuccessfulRequests,
    Report(DuplicateReport),
}

impl Aggregate {
    pub fn report(&self) -> Option<&DuplicateReport> {
        match self {
            Aggregate::Report(report) => Some(report),
            Aggregate::NoSuccessfulRequests => None,
        }
    }
}

/// Per-port record count and identifier range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSummary {
    pub port: u16,
    pub record_count: usize,
    pub min_id: UserId,
    pub max_id: UserId,
}

/// An identifier returned by more than one successful call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateId {
    pub id: UserId,
    pub occurrences: usize,
    /// Port → how many times that port returned `id`
    pub ports: BTreeMap<u16, usize>,
}

impl DuplicateId {
    /// Ports in ascending order, one entry per occurrence
    pub fn port_list(&self) -> Vec<u16> {
        self.ports
            .iter()
            .flat_map(|(&port, &count)| std::iter::repeat(port).take(count))
            .collect()
    }
}

/// Aggregated view of all successful outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Ascending by port
    pub per_port: Vec<PortSummary>,
    /// Ascending by id
    pub duplicates: Vec<DuplicateId>,
    pub total_ids: usize,
    pub unique_ids: usize,
}

impl DuplicateReport {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    pub fn port(&self, port: u16) -> Option<&PortSummary> {
        self.per_port.iter().find(|summary| summary.port == port)
    }
}

/// Partition outcomes by port and find identifiers issued more than once,
/// regardless of which port issued them.
pub fn analyze(outcomes: &[RequestOutcome]) -> Aggregate {
    if outcomes.is_empty() {
        return Aggregate::NoSuccessfulRequests;
    }

    let mut by_port: BTreeMap<u16, Vec<UserId>> = BTreeMap::new();
    let mut occurrences: HashMap<UserId, BTreeMap<u16, usize>> = HashMap::new();

    for outcome in outcomes {
        by_port.entry(outcome.port).or_default().push(outcome.user_id);
        *occurrences
            .entry(outcome.user_id)
            .or_default()
            .entry(outcome.port)
            .or_default() += 1;
    }

    let per_port = by_port
        .into_iter()
        .filter_map(|(port, ids)| {
            let min_id = *ids.iter().min()?;
            let max_id = *ids.iter().max()?;
            Some(PortSummary {
                port,
                record_count: ids.len(),
                min_id,
                max_id,
            })
        })
        .collect();

    let unique_ids = occurrences.len();

    let mut duplicates: Vec<DuplicateId> = occurrences
        .into_iter()
        .filter_map(|(id, ports)| {
            let count: usize = ports.values().sum();
            (count > 1).then_some(DuplicateId {
                id,
                occurrences: count,
                ports,
            })
        })
        .collect();
    duplicates.sort_by_key(|duplicate| duplicate.id);

    Aggregate::Report(DuplicateReport {
        per_port,
        duplicates,
        total_ids: outcomes.len(),
        unique_ids,
    })
}
