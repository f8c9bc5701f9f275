mod common;

use common::{ScriptedController, ScriptedEnv};
use neurolander::config::{AppConfig, GenomeConfig};
use neurolander::engines::evaluation::{ControllerBuilder, NetworkBuilder, PopulationEvaluator};
use neurolander::engines::generation::{FitnessFunction, Genome, GenomeKey};
use neurolander::env::LunarLanderFactory;
use neurolander::error::{NeuroLanderError, Result};
use neurolander::types::RenderMode;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Genome `k` always fires action `k % 3`.
struct KeyedBuilder;

impl ControllerBuilder for KeyedBuilder {
    type Output = ScriptedController;

    fn build(&self, genome: &Genome, _config: &GenomeConfig) -> Result<ScriptedController> {
        Ok(ScriptedController::always((genome.key % 3) as usize))
    }
}

struct FailingBuilder {
    fail_on: GenomeKey,
}

impl ControllerBuilder for FailingBuilder {
    type Output = ScriptedController;

    fn build(&self, genome: &Genome, _config: &GenomeConfig) -> Result<ScriptedController> {
        if genome.key == self.fail_on {
            return Err(NeuroLanderError::Network(format!("cannot build genome {}", genome.key)));
        }
        Ok(ScriptedController::always(0))
    }
}

fn scripted_factory() -> impl Fn() -> Result<ScriptedEnv> + Sync {
    || Ok(ScriptedEnv::new().ending_after(10).with_action_rewards(vec![0.0, 10.0, 20.0, 0.0]))
}

fn candidates() -> Vec<(GenomeKey, Genome)> {
    (0..3).map(|k| (k, Genome::new(k))).collect()
}

#[test]
fn test_every_candidate_gets_its_score() {
    let config = AppConfig::default();
    let mut evaluator = PopulationEvaluator::new(scripted_factory(), KeyedBuilder);
    let mut population = candidates();

    evaluator.evaluate(&mut population, &config).unwrap();

    let fitness: Vec<Option<f64>> = population.iter().map(|(_, g)| g.fitness).collect();
    assert_eq!(fitness, vec![Some(0.0), Some(100.0), Some(200.0)]);
}

#[test]
fn test_parallel_matches_sequential() {
    let mut config = AppConfig::default();
    config.evaluation.parallel = true;

    let mut evaluator = PopulationEvaluator::new(scripted_factory(), KeyedBuilder);
    let mut population: Vec<(GenomeKey, Genome)> = (0..30).map(|k| (k, Genome::new(k))).collect();
    evaluator.evaluate(&mut population, &config).unwrap();

    for (key, genome) in &population {
        let expected = [0.0, 100.0, 200.0][(*key % 3) as usize];
        assert_eq!(genome.fitness, Some(expected));
    }
}

#[test]
fn test_build_failure_propagates() {
    let config = AppConfig::default();
    let mut evaluator = PopulationEvaluator::new(scripted_factory(), FailingBuilder { fail_on: 1 });
    let mut population = candidates();

    let err = evaluator.evaluate(&mut population, &config).unwrap_err();
    assert!(matches!(err, NeuroLanderError::Network(_)));
}

#[test]
fn test_networks_on_lander_get_finite_fitness() {
    let mut config = AppConfig::default();
    config.evaluation.max_steps = 200;

    let mut rng = StdRng::seed_from_u64(9);
    let mut population: Vec<(GenomeKey, Genome)> = (0..4)
        .map(|k| (k, Genome::new_initial(k, &config.genome, &mut rng)))
        .collect();

    let mut evaluator = PopulationEvaluator::new(LunarLanderFactory::new(RenderMode::None, Some(3)), NetworkBuilder);
    evaluator.evaluate(&mut population, &config).unwrap();

    assert!(population
        .iter()
        .all(|(_, g)| g.fitness.is_some_and(|f| f.is_finite())));
}
