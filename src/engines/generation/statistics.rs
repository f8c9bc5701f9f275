use crate::engines::generation::genome::Genome;
use crate::engines::generation::progress::{ProgressCallback, ProgressEvent};
use crate::engines::metrics::FitnessMetrics;
use crate::error::NeuroLanderError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub std_dev: f64,
    pub species_count: usize,
    pub population_size: usize,
}

/// Collects per-generation fitness statistics and the champion of every
/// generation.
#[derive(Debug, Default)]
pub struct StatisticsReporter {
    generation: usize,
    stats: Vec<GenerationStats>,
    most_fit_genomes: Vec<Genome>,
}

impl StatisticsReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generations(&self) -> &[GenerationStats] {
        &self.stats
    }

    pub fn most_fit_genomes(&self) -> &[Genome] {
        &self.most_fit_genomes
    }

    /// Fittest genome seen in any generation.
    pub fn best_genome(&self) -> Option<&Genome> {
        self.most_fit_genomes.iter().max_by(|a, b| {
            a.fitness
                .partial_cmp(&b.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), NeuroLanderError> {
        let json = serde_json::to_string_pretty(&self.stats)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl ProgressCallback for StatisticsReporter {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::GenerationStart { generation } => self.generation = *generation,
            ProgressEvent::PostEvaluate {
                population,
                species,
                best,
                ..
            } => {
                let fitnesses: Vec<f64> = population.values().filter_map(|g| g.fitness).collect();
                if let Some(summary) = FitnessMetrics::summarize(&fitnesses) {
                    self.stats.push(GenerationStats {
                        generation: self.generation,
                        best_fitness: summary.best,
                        mean_fitness: summary.mean,
                        std_dev: summary.std_dev,
                        species_count: species.len(),
                        population_size: population.len(),
                    });
                }
                self.most_fit_genomes.push((*best).clone());
            }
            _ => {}
        }
    }
}
