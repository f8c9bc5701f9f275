mod common;

use common::ScriptedEnv;
use neurolander::config::AppConfig;
use neurolander::engines::evaluation::{NetworkBuilder, PopulationEvaluator};
use neurolander::engines::generation::{
    EvolutionEngine, Genome, GenomeKey, HallOfFame, ProgressCallback, ProgressEvent, SilentProgressCallback,
    StatisticsReporter,
};
use neurolander::error::{NeuroLanderError, Result};

/// Records which events fired, in order.
#[derive(Default)]
struct EventLog {
    events: Vec<String>,
}

impl ProgressCallback for EventLog {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        let name = match event {
            ProgressEvent::GenerationStart { generation } => format!("start {}", generation),
            ProgressEvent::PostEvaluate { .. } => "evaluated".to_string(),
            ProgressEvent::GenerationEnd { .. } => "end".to_string(),
            ProgressEvent::CompleteExtinction => "extinct".to_string(),
            ProgressEvent::FoundSolution { generation, .. } => format!("solved {}", generation),
        };
        self.events.push(name);
    }
}

fn small_config(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.neat.population_size = 20;
    config.neat.fitness_threshold = 1e9;
    config.neat.seed = Some(seed);
    config.evaluation.trials = 1;
    config
}

/// Main engine pays, everything else costs nothing.
fn thrust_evaluator() -> PopulationEvaluator<impl Fn() -> Result<ScriptedEnv> + Sync, NetworkBuilder> {
    PopulationEvaluator::new(
        || Ok(ScriptedEnv::new().ending_after(20).with_action_rewards(vec![0.0, 0.0, 5.0, 0.0])),
        NetworkBuilder,
    )
}

#[test]
fn test_run_reports_every_generation() {
    let mut engine = EvolutionEngine::new(small_config(42)).unwrap();
    let mut log = EventLog::default();
    let mut statistics = StatisticsReporter::new();

    let best = engine
        .run(thrust_evaluator(), 3, (&mut log, &mut statistics))
        .unwrap();

    assert!(best.fitness.is_some());
    assert_eq!(engine.generation(), 3);
    assert_eq!(statistics.generations().len(), 3);
    assert_eq!(
        log.events,
        vec![
            "start 0", "evaluated", "end", "start 1", "evaluated", "end", "start 2", "evaluated", "end",
        ]
    );

    let recorded_best = statistics
        .generations()
        .iter()
        .map(|s| s.best_fitness)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(best.fitness, Some(recorded_best));
}

#[test]
fn test_threshold_stops_run_early() {
    let mut config = small_config(7);
    config.neat.fitness_threshold = 0.0;

    let mut engine = EvolutionEngine::new(config).unwrap();
    let mut log = EventLog::default();
    engine.run(thrust_evaluator(), 10, &mut log).unwrap();

    assert_eq!(log.events, vec!["start 0", "evaluated", "solved 0"]);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = || {
        let mut engine = EvolutionEngine::new(small_config(123)).unwrap();
        engine.run(thrust_evaluator(), 4, SilentProgressCallback).unwrap()
    };

    let a = run();
    let b = run();
    assert_eq!(a.key, b.key);
    assert_eq!(a.fitness, b.fitness);
    assert_eq!(a.connections.len(), b.connections.len());
}

#[test]
fn test_unscored_genome_is_an_error() {
    let mut engine = EvolutionEngine::new(small_config(1)).unwrap();
    let skip_first = |population: &mut [(GenomeKey, Genome)], _config: &AppConfig| -> Result<()> {
        for (_, genome) in population.iter_mut().skip(1) {
            genome.fitness = Some(1.0);
        }
        Ok(())
    };

    let err = engine.run(skip_first, 1, SilentProgressCallback).unwrap_err();
    assert!(matches!(err, NeuroLanderError::Evolution(_)));
}

#[test]
fn test_hall_of_fame_tracks_best_across_run() {
    let mut engine = EvolutionEngine::new(small_config(5)).unwrap();
    let mut hall = HallOfFame::new(3);

    let best = engine.run(thrust_evaluator(), 3, &mut hall).unwrap();

    assert_eq!(hall.len(), 3);
    assert_eq!(hall.get_top_n(1)[0].fitness, best.fitness);
}

#[test]
fn test_failed_evaluation_keeps_population() {
    let mut engine = EvolutionEngine::new(small_config(8)).unwrap();
    let failing = |_: &mut [(GenomeKey, Genome)], _: &AppConfig| -> Result<()> {
        Err(NeuroLanderError::Evaluation("simulator unavailable".to_string()))
    };

    let err = engine.run(failing, 1, SilentProgressCallback).unwrap_err();
    assert!(matches!(err, NeuroLanderError::Evaluation(_)));
    assert_eq!(engine.population().len(), 20);
    assert_eq!(engine.generation(), 0);

    // The engine can carry on with a working evaluator.
    let best = engine.run(thrust_evaluator(), 1, SilentProgressCallback).unwrap();
    assert!(best.fitness.is_some());
}
