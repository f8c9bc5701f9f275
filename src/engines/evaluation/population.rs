use crate::config::AppConfig;
use crate::engines::evaluation::controller::ControllerBuilder;
use crate::engines::evaluation::trials::TrialAggregator;
use crate::engines::generation::{FitnessFunction, Genome, GenomeKey};
use crate::env::EnvironmentFactory;
use crate::error::Result;
use rayon::prelude::*;

/// Fitness function handed to the evolution engine. Every genome is compiled
/// into a controller and scored by a [`TrialAggregator`].
///
/// With `evaluation.parallel` set, genomes are scored on the rayon pool. Each
/// worker makes its own environments and writes only its own genome.
pub struct PopulationEvaluator<F, B> {
    factory: F,
    builder: B,
}

impl<F, B> PopulationEvaluator<F, B>
where
    F: EnvironmentFactory,
    B: ControllerBuilder,
{
    pub fn new(factory: F, builder: B) -> Self {
        Self { factory, builder }
    }

    fn score(&self, aggregator: &TrialAggregator<'_, F>, genome: &mut Genome, config: &AppConfig) -> Result<()> {
        let mut controller = self.builder.build(genome, &config.genome)?;
        let fitness = aggregator.evaluate(&mut controller)?;
        log::trace!("Genome {} scored {:.4}", genome.key, fitness);
        genome.fitness = Some(fitness);
        Ok(())
    }
}

impl<F, B> FitnessFunction for PopulationEvaluator<F, B>
where
    F: EnvironmentFactory,
    B: ControllerBuilder,
{
    fn evaluate(&mut self, population: &mut [(GenomeKey, Genome)], config: &AppConfig) -> Result<()> {
        let aggregator = TrialAggregator::new(&self.factory, &config.evaluation);
        let this = &*self;

        if config.evaluation.parallel {
            population
                .par_iter_mut()
                .try_for_each(|(_, genome)| this.score(&aggregator, genome, config))
        } else {
            population
                .iter_mut()
                .try_for_each(|(_, genome)| this.score(&aggregator, genome, config))
        }
    }
}
