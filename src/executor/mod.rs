//! Concurrent request dispatcher for the duplicate-ID checker
//!
//! Every configured unit is spawned as its own tokio task before anything is
//! awaited. Units report a typed [`UnitOutcome`] over an mpsc channel; the
//! dispatcher folds them into a [`RunSummary`] and then joins every task, so
//! no partial summary is ever returned.

use crate::{
    client::ProbeClient,
    error::{AppError, Result},
    models::{DupCheckConfig, PortPlan, RequestOutcome, RunSummary, UnitFailure, UnitOutcome},
};
use chrono::Utc;
use futures::future::join_all;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, Semaphore};

/// Fan-out / join-all dispatcher
pub struct Dispatcher {
    client: Arc<dyn ProbeClient>,
    config: DupCheckConfig,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn ProbeClient>, config: &DupCheckConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    /// Run every unit of `plan` and return once all of them finished.
    ///
    /// `on_outcome` is called on the dispatcher's task for each unit as it
    /// completes, in completion order.
    pub async fn run<F>(&self, plan: &PortPlan, mut on_outcome: F) -> Result<RunSummary>
    where
        F: FnMut(&UnitOutcome),
    {
        let started = Instant::now();
        let total = plan.total_units() as usize;

        let (outcome_sender, mut outcome_receiver) = mpsc::channel(total.max(1));
        let limiter = self.config.max_in_flight.map(|limit| Arc::new(Semaphore::new(limit)));

        let mut tasks = Vec::with_capacity(total);

        for (port, count) in plan.iter() {
            let url = self.config.create_url(port);

            for seq in 0..count {
                let client = Arc::clone(&self.client);
                let url = url.clone();
                let sender = outcome_sender.clone();
                let limiter = limiter.clone();
                let timeout = self.config.timeout();

                let task = tokio::spawn(async move {
                    let _permit = match limiter {
                        Some(limiter) => limiter.acquire_owned().await.ok(),
                        None => None,
                    };

                    let outcome = run_unit(client.as_ref(), &url, port, seq, timeout).await;
                    let _ = sender.send(outcome).await;
                });

                tasks.push(task);
            }
        }

        // Receiver ends once every task has dropped its sender
        drop(outcome_sender);

        let mut summary = RunSummary::new();
        while let Some(outcome) = outcome_receiver.recv().await {
            on_outcome(&outcome);
            summary.absorb(outcome);
        }

        for joined in join_all(tasks).await {
            joined.map_err(|e| AppError::dispatch(format!("Request task failed: {}", e)))?;
        }

        Ok(summary.with_elapsed(started.elapsed()))
    }
}

/// Execute one create call and turn its result into an outcome
async fn run_unit(
    client: &dyn ProbeClient,
    url: &str,
    port: u16,
    seq: u32,
    timeout: Duration,
) -> UnitOutcome {
    let requested_name = unit_name(port, seq, Utc::now().timestamp_millis());

    match client.create_user(url, &requested_name, timeout).await {
        Ok(user) => UnitOutcome::Created {
            seq,
            requested_name,
            outcome: RequestOutcome {
                port,
                user_id: user.id,
                name: user.name,
            },
        },
        Err(kind) => UnitOutcome::Failed(UnitFailure {
            port,
            seq,
            requested_name,
            kind,
        }),
    }
}

/// `<port>_<seq>_<millis % 100000>`; narrows but does not rule out collisions
pub fn unit_name(port: u16, seq: u32, timestamp_millis: i64) -> String {
    format!("{}_{}_{}", port, seq, timestamp_millis.rem_euclid(100_000))
}
