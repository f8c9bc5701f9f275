use crate::config::AppConfig;
use crate::engines::generation::genome::{Genome, GenomeKey};
use crate::engines::generation::progress::{ProgressCallback, ProgressEvent};
use crate::engines::generation::reproduction::Reproduction;
use crate::engines::generation::species::SpeciesSet;
use crate::error::{NeuroLanderError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// Assigns a fitness to every genome of a generation.
///
/// Implementations receive the whole population as an ordered slice and must
/// write `fitness` for each entry before returning `Ok`.
pub trait FitnessFunction {
    fn evaluate(&mut self, population: &mut [(GenomeKey, Genome)], config: &AppConfig) -> Result<()>;
}

impl<F> FitnessFunction for F
where
    F: FnMut(&mut [(GenomeKey, Genome)], &AppConfig) -> Result<()>,
{
    fn evaluate(&mut self, population: &mut [(GenomeKey, Genome)], config: &AppConfig) -> Result<()> {
        self(population, config)
    }
}

pub struct EvolutionEngine {
    config: AppConfig,
    population: BTreeMap<GenomeKey, Genome>,
    species: SpeciesSet,
    reproduction: Reproduction,
    generation: usize,
    best_genome: Option<Genome>,
    rng: StdRng,
}

impl EvolutionEngine {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.neat.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut reproduction = Reproduction::new();
        let population = reproduction.create_new(&config.genome, config.neat.population_size, &mut rng);

        let mut species = SpeciesSet::new();
        species.speciate(&config, &population, 0);

        Ok(Self {
            config,
            population,
            species,
            reproduction,
            generation: 0,
            best_genome: None,
            rng,
        })
    }

    /// Run up to `generations` generations and return the fittest genome
    /// seen in any of them.
    pub fn run<F: FitnessFunction, C: ProgressCallback>(
        &mut self,
        mut fitness_function: F,
        generations: usize,
        mut callback: C,
    ) -> Result<Genome> {
        for _ in 0..generations {
            callback.on_event(&ProgressEvent::GenerationStart {
                generation: self.generation,
            });

            self.evaluate(&mut fitness_function)?;
            let best = self.generation_best()?;

            callback.on_event(&ProgressEvent::PostEvaluate {
                config: &self.config,
                population: &self.population,
                species: &self.species,
                best: &best,
            });

            let improved = match &self.best_genome {
                Some(current) => best.fitness > current.fitness,
                None => true,
            };
            if improved {
                self.best_genome = Some(best.clone());
            }

            if !self.config.neat.no_fitness_termination {
                let criterion = self
                    .config
                    .neat
                    .fitness_criterion
                    .reduce(self.population.values().filter_map(|g| g.fitness));
                if criterion.is_some_and(|value| value >= self.config.neat.fitness_threshold) {
                    log::info!(
                        "Fitness threshold {} reached at generation {}",
                        self.config.neat.fitness_threshold,
                        self.generation
                    );
                    callback.on_event(&ProgressEvent::FoundSolution {
                        generation: self.generation,
                        best: &best,
                    });
                    break;
                }
            }

            self.population = self.reproduction.reproduce(
                &self.config,
                &mut self.species,
                &self.population,
                self.generation,
                &mut self.rng,
            )?;

            if self.species.is_empty() || self.population.is_empty() {
                callback.on_event(&ProgressEvent::CompleteExtinction);
                if !self.config.neat.reset_on_extinction {
                    return Err(NeuroLanderError::CompleteExtinction);
                }
                log::warn!("All species extinct, starting over with a fresh population");
                self.population = self.reproduction.create_new(
                    &self.config.genome,
                    self.config.neat.population_size,
                    &mut self.rng,
                );
            }

            self.species.speciate(&self.config, &self.population, self.generation);

            callback.on_event(&ProgressEvent::GenerationEnd {
                config: &self.config,
                population: &self.population,
                species: &self.species,
            });

            self.generation += 1;
        }

        let best = self
            .best_genome
            .clone()
            .ok_or_else(|| NeuroLanderError::Evolution("no generation was evaluated".to_string()))?;

        if self.config.neat.no_fitness_termination {
            callback.on_event(&ProgressEvent::FoundSolution {
                generation: self.generation,
                best: &best,
            });
        }

        Ok(best)
    }

    fn evaluate<F: FitnessFunction>(&mut self, fitness_function: &mut F) -> Result<()> {
        let mut members: Vec<(GenomeKey, Genome)> = std::mem::take(&mut self.population).into_iter().collect();
        for (_, genome) in members.iter_mut() {
            genome.fitness = None;
        }

        let result = fitness_function.evaluate(&mut members, &self.config);

        // Put the population back even when evaluation failed.
        self.population = members.into_iter().collect();
        result
    }

    /// Fittest genome of the current population. Every genome must have been
    /// assigned a fitness.
    fn generation_best(&self) -> Result<Genome> {
        let mut best: Option<&Genome> = None;
        for genome in self.population.values() {
            let fitness = genome.fitness.ok_or_else(|| {
                NeuroLanderError::Evolution(format!("genome {} was not assigned a fitness", genome.key))
            })?;
            if best.map_or(true, |b| b.fitness.is_some_and(|bf| fitness > bf)) {
                best = Some(genome);
            }
        }

        best.cloned()
            .ok_or_else(|| NeuroLanderError::Evolution("population is empty".to_string()))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn population(&self) -> &BTreeMap<GenomeKey, Genome> {
        &self.population
    }

    pub fn species(&self) -> &SpeciesSet {
        &self.species
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn best_genome(&self) -> Option<&Genome> {
        self.best_genome.as_ref()
    }
}
