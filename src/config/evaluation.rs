use super::traits::{invalid, ConfigSection};
use crate::error::NeuroLanderError;
use serde::{Deserialize, Serialize};

/// Fitness evaluation and reward shaping parameters (`[evaluation]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Episodes averaged into one fitness value.
    pub trials: usize,
    /// Episodes are cut once the step counter exceeds this value.
    pub max_steps: usize,
    /// Subtracted from a step's reward when an engine fires after touchdown.
    pub landing_penalty: f64,
    /// Totals strictly above this earn `success_bonus`.
    pub success_threshold: f64,
    pub success_bonus: f64,
    /// Subtracted from totals strictly below zero.
    pub failure_penalty: f64,
    pub normalization_epsilon: f64,
    /// Evaluate candidates on the rayon thread pool.
    pub parallel: bool,
    pub demo_trials: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            trials: 2,
            max_steps: 1000,
            landing_penalty: 1.0,
            success_threshold: 200.0,
            success_bonus: 100.0,
            failure_penalty: 50.0,
            normalization_epsilon: 1e-8,
            parallel: false,
            demo_trials: 25,
        }
    }
}

impl ConfigSection for EvaluationConfig {
    fn section_name() -> &'static str {
        "evaluation"
    }

    fn validate(&self) -> Result<(), NeuroLanderError> {
        if self.trials == 0 {
            return Err(invalid::<Self>("trials must be at least 1"));
        }
        if self.max_steps == 0 {
            return Err(invalid::<Self>("max_steps must be at least 1"));
        }
        if self.normalization_epsilon <= 0.0 {
            return Err(invalid::<Self>("normalization_epsilon must be positive"));
        }
        if self.landing_penalty < 0.0 || self.failure_penalty < 0.0 {
            return Err(invalid::<Self>("penalties are magnitudes and must be non-negative"));
        }
        Ok(())
    }
}
