// src/engines/metrics/fitness.rs
use serde::{Deserialize, Serialize};

/// Condensed description of one generation's fitness distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub best: f64,
    pub mean: f64,
    pub std_dev: f64,
}

pub struct FitnessMetrics;

impl FitnessMetrics {
    /// `None` for an empty set.
    pub fn summarize(values: &[f64]) -> Option<FitnessSummary> {
        if values.is_empty() {
            return None;
        }

        let best = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(FitnessSummary {
            best,
            mean: Self::mean(values),
            std_dev: Self::std_dev(values),
        })
    }

    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Population standard deviation (divides by n).
    pub fn std_dev(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }

        let mean = Self::mean(values);
        let variance = values.iter()
            .map(|&v| (v - mean).powi(2))
            .sum::<f64>() / values.len() as f64;

        variance.sqrt()
    }
}
