//! Response latency budget
//!
//! Search responses must come back under 100 ms; under 30 ms is the target.
//! Used by the search endpoint to annotate each response and by
//! `aurora-cli bench` to grade repeated measurements.

use serde::Serialize;
use std::fmt;

/// Hard requirement for a search response
pub const REQUIRED_MS: f64 = 100.0;

/// Stretch target for a search response
pub const TARGET_MS: f64 = 30.0;

/// Where a measured latency falls against the budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyGrade {
    /// Under the 30 ms target
    Target,
    /// Under the 100 ms requirement
    Required,
    /// Over the requirement by `over_ms`
    Exceeded { over_ms: f64 },
}

impl LatencyGrade {
    pub fn from_millis(ms: f64) -> Self {
        if ms < TARGET_MS {
            LatencyGrade::Target
        } else if ms < REQUIRED_MS {
            LatencyGrade::Required
        } else {
            LatencyGrade::Exceeded {
                over_ms: ms - REQUIRED_MS,
            }
        }
    }

    pub fn meets_requirement(&self) -> bool {
        !matches!(self, LatencyGrade::Exceeded { .. })
    }

    pub fn meets_target(&self) -> bool {
        matches!(self, LatencyGrade::Target)
    }

    /// Human-readable note for responses and reports
    pub fn note(&self) -> String {
        match self {
            LatencyGrade::Target => "Excellent! Meets 30ms bonus target".to_string(),
            LatencyGrade::Required => "Good! Meets <100ms requirement".to_string(),
            LatencyGrade::Exceeded { over_ms } => {
                format!("Exceeds 100ms requirement by {:.2}ms", over_ms)
            }
        }
    }
}

impl fmt::Display for LatencyGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.note())
    }
}

/// Statistics over repeated latency measurements, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    pub samples: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation, 0 for a single sample
    pub stdev: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencySummary {
    /// Summarize samples; `None` when there are none.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let stdev = if n > 1 {
            let var = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Some(Self {
            samples: n,
            mean,
            median,
            min: sorted[0],
            max: sorted[n - 1],
            stdev,
            p95: percentile(&sorted, 0.95),
            p99: percentile(&sorted, 0.99),
        })
    }

    /// Grade of the mean latency
    pub fn grade(&self) -> LatencyGrade {
        LatencyGrade::from_millis(self.mean)
    }
}

/// Nearest-rank style percentile over sorted samples: element `floor(n × q)`
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let idx = ((sorted.len() as f64 * q) as usize).min(sorted.len() - 1);
    sorted[idx]
}
