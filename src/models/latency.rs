//! Latency comparator request payload and sample records

use crate::types::ProcessingMode;
use serde::{Deserialize, Serialize};

/// Fixed body sent to both processing endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessPayload {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub tags: Vec<String>,
    pub amount: f64,
}

impl Default for ProcessPayload {
    fn default() -> Self {
        Self {
            id: 1001,
            name: "性能测试".to_string(),
            category: "测试".to_string(),
            tags: vec!["test".to_string()],
            amount: 1000.0,
        }
    }
}

/// One successful processing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySample {
    /// 1-based attempt number within the mode
    pub attempt: u32,
    /// Wall-clock latency measured by this client
    pub client_ms: f64,
    /// `data.processingTimeMs` reported by the server
    pub server_ms: f64,
}

/// One failed processing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleFailure {
    pub attempt: u32,
    pub reason: String,
}

/// Everything collected for one processing mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeSamples {
    pub mode: ProcessingMode,
    pub samples: Vec<LatencySample>,
    pub failures: Vec<SampleFailure>,
}

impl ModeSamples {
    pub fn new(mode: ProcessingMode) -> Self {
        Self {
            mode,
            samples: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Server-reported latencies in call order
    pub fn server_times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.server_ms).collect()
    }

    pub fn client_times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.client_ms).collect()
    }

    /// Samples plus failures
    pub fn attempts(&self) -> usize {
        self.samples.len() + self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_payload_shape() {
        let json = serde_json::to_value(ProcessPayload::default()).unwrap();
        assert_eq!(json["id"], 1001);
        assert_eq!(json["tags"][0], "test");
        assert_eq!(json["amount"], 1000.0);
        assert_eq!(json["name"], "性能测试");
        assert_eq!(json["category"], "测试");
    }

    #[test]
    fn test_mode_samples_accounting() {
        let mut samples = ModeSamples::new(ProcessingMode::Serial);
        samples.samples.push(LatencySample { attempt: 1, client_ms: 760.0, server_ms: 752.0 });
        samples.failures.push(SampleFailure { attempt: 2, reason: "HTTP 500".into() });

        assert_eq!(samples.attempts(), 2);
        assert_eq!(samples.server_times(), vec![752.0]);
        assert_eq!(samples.client_times(), vec![760.0]);
    }
}
