use super::traits::{invalid, ConfigSection};
use crate::error::NeuroLanderError;
use serde::{Deserialize, Serialize};

/// Top-level search parameters (`[neat]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub fitness_criterion: FitnessCriterion,
    pub fitness_threshold: f64,
    pub no_fitness_termination: bool,
    pub reset_on_extinction: bool,
    pub seed: Option<u64>,
}

/// Reduction applied to a set of fitness values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessCriterion {
    Max,
    Min,
    Mean,
}

impl FitnessCriterion {
    /// Reduce `values`. Returns `None` for an empty input.
    pub fn reduce<I: IntoIterator<Item = f64>>(&self, values: I) -> Option<f64> {
        let mut count = 0usize;
        let mut acc = match self {
            FitnessCriterion::Max => f64::NEG_INFINITY,
            FitnessCriterion::Min => f64::INFINITY,
            FitnessCriterion::Mean => 0.0,
        };

        for value in values {
            count += 1;
            acc = match self {
                FitnessCriterion::Max => acc.max(value),
                FitnessCriterion::Min => acc.min(value),
                FitnessCriterion::Mean => acc + value,
            };
        }

        match (count, self) {
            (0, _) => None,
            (n, FitnessCriterion::Mean) => Some(acc / n as f64),
            _ => Some(acc),
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 150,
            generations: 500,
            fitness_criterion: FitnessCriterion::Max,
            fitness_threshold: 350.0,
            no_fitness_termination: false,
            reset_on_extinction: false,
            seed: None,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "neat"
    }

    fn validate(&self) -> Result<(), NeuroLanderError> {
        if self.population_size < 2 {
            return Err(invalid::<Self>("population_size must be at least 2"));
        }
        if self.generations == 0 {
            return Err(invalid::<Self>("generations must be at least 1"));
        }
        if !self.fitness_threshold.is_finite() {
            return Err(invalid::<Self>("fitness_threshold must be finite"));
        }
        Ok(())
    }
}
