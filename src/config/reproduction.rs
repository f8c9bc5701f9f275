use super::evolution::FitnessCriterion;
use super::traits::{check_probability, invalid, ConfigSection};
use crate::error::NeuroLanderError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesConfig {
    pub compatibility_threshold: f64,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            compatibility_threshold: 3.0,
        }
    }
}

impl ConfigSection for SpeciesConfig {
    fn section_name() -> &'static str {
        "species"
    }

    fn validate(&self) -> Result<(), NeuroLanderError> {
        if self.compatibility_threshold <= 0.0 {
            return Err(invalid::<Self>("compatibility_threshold must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagnationConfig {
    pub species_fitness_func: FitnessCriterion,
    pub max_stagnation: usize,
    pub species_elitism: usize,
}

impl Default for StagnationConfig {
    fn default() -> Self {
        Self {
            species_fitness_func: FitnessCriterion::Max,
            max_stagnation: 20,
            species_elitism: 2,
        }
    }
}

impl ConfigSection for StagnationConfig {
    fn section_name() -> &'static str {
        "stagnation"
    }

    fn validate(&self) -> Result<(), NeuroLanderError> {
        if self.max_stagnation == 0 {
            return Err(invalid::<Self>("max_stagnation must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReproductionConfig {
    pub elitism: usize,
    pub survival_threshold: f64,
    pub min_species_size: usize,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            elitism: 2,
            survival_threshold: 0.2,
            min_species_size: 2,
        }
    }
}

impl ConfigSection for ReproductionConfig {
    fn section_name() -> &'static str {
        "reproduction"
    }

    fn validate(&self) -> Result<(), NeuroLanderError> {
        check_probability::<Self>("survival_threshold", self.survival_threshold)?;
        if self.survival_threshold == 0.0 {
            return Err(invalid::<Self>("survival_threshold must be above 0"));
        }
        if self.min_species_size == 0 {
            return Err(invalid::<Self>("min_species_size must be at least 1"));
        }
        Ok(())
    }
}
