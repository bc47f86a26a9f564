//! Sequential latency sampler for the serial/parallel comparator

use crate::{
    client::ProbeClient,
    error::{AppError, Result},
    models::{LatencyConfig, LatencySample, ModeSamples, ProcessPayload, SampleFailure},
    stats::LatencyComparison,
    types::ProcessingMode,
};
use std::{sync::Arc, time::Instant};

/// Progress notifications emitted while sampling
#[derive(Debug, Clone, Copy)]
pub enum SampleEvent<'a> {
    /// The liveness probe passed
    Live,
    ModeStarted(ProcessingMode),
    Sample(ProcessingMode, &'a LatencySample),
    Failure(ProcessingMode, &'a SampleFailure),
}

/// Samples collected for both modes
#[derive(Debug, Clone)]
pub struct LatencyRun {
    pub serial: ModeSamples,
    pub parallel: ModeSamples,
}

impl LatencyRun {
    /// Average comparison over server-reported latencies
    pub fn comparison(&self) -> Option<LatencyComparison> {
        LatencyComparison::compute(&self.serial.server_times(), &self.parallel.server_times())
    }

    /// Samples plus failures across both modes
    pub fn total_attempts(&self) -> usize {
        self.serial.attempts() + self.parallel.attempts()
    }
}

/// Issues strictly sequential processing calls; nothing here runs concurrently
pub struct LatencySampler {
    client: Arc<dyn ProbeClient>,
    config: LatencyConfig,
    payload: ProcessPayload,
}

impl LatencySampler {
    pub fn new(client: Arc<dyn ProbeClient>, config: &LatencyConfig) -> Self {
        Self {
            client,
            config: config.clone(),
            payload: ProcessPayload::default(),
        }
    }

    /// `GET <base_url>/test-data`; a failure here aborts the run
    pub async fn check_liveness(&self) -> Result<()> {
        let url = self.config.health_url();
        self.client
            .check_health(&url, self.config.health_timeout())
            .await
            .map_err(|e| match e {
                AppError::Network(msg) => AppError::network(format!("Cannot connect to {}: {}", url, msg)),
                AppError::Timeout(msg) => AppError::timeout(format!("Liveness probe {} timed out: {}", url, msg)),
                other => other,
            })
    }

    /// Run `sample_count` sequential calls against one mode
    pub async fn sample_mode<F>(&self, mode: ProcessingMode, mut on_event: F) -> ModeSamples
    where
        F: FnMut(SampleEvent<'_>),
    {
        let url = self.config.process_url(mode);
        let mut collected = ModeSamples::new(mode);

        on_event(SampleEvent::ModeStarted(mode));

        for attempt in 1..=self.config.sample_count {
            let started = Instant::now();
            let result = self.client.process(&url, &self.payload, self.config.timeout()).await;
            let client_ms = started.elapsed().as_secs_f64() * 1000.0;

            match result {
                Ok(server_ms) => {
                    let sample = LatencySample { attempt, client_ms, server_ms };
                    on_event(SampleEvent::Sample(mode, &sample));
                    collected.samples.push(sample);
                }
                Err(kind) => {
                    let failure = SampleFailure { attempt, reason: kind.to_string() };
                    on_event(SampleEvent::Failure(mode, &failure));
                    collected.failures.push(failure);
                }
            }
        }

        collected
    }

    /// Liveness probe, then serial samples, then parallel samples
    pub async fn run<F>(&self, mut on_event: F) -> Result<LatencyRun>
    where
        F: FnMut(SampleEvent<'_>),
    {
        self.check_liveness().await?;
        on_event(SampleEvent::Live);

        let serial = self.sample_mode(ProcessingMode::Serial, &mut on_event).await;
        let parallel = self.sample_mode(ProcessingMode::Parallel, &mut on_event).await;

        Ok(LatencyRun { serial, parallel })
    }
}
