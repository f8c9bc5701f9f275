use crate::config::AppConfig;
use crate::engines::generation::genome::{Genome, GenomeKey};
use crate::engines::generation::species::SpeciesSet;
use crate::engines::metrics::FitnessMetrics;
use std::collections::BTreeMap;
use std::time::Instant;

/// Generation lifecycle events emitted by the evolution engine.
#[derive(Debug, Clone, Copy)]
pub enum ProgressEvent<'a> {
    GenerationStart {
        generation: usize,
    },
    PostEvaluate {
        config: &'a AppConfig,
        population: &'a BTreeMap<GenomeKey, Genome>,
        species: &'a SpeciesSet,
        best: &'a Genome,
    },
    GenerationEnd {
        config: &'a AppConfig,
        population: &'a BTreeMap<GenomeKey, Genome>,
        species: &'a SpeciesSet,
    },
    CompleteExtinction,
    FoundSolution {
        generation: usize,
        best: &'a Genome,
    },
}

pub trait ProgressCallback {
    fn on_event(&mut self, event: &ProgressEvent<'_>);
}

impl<T: ProgressCallback + ?Sized> ProgressCallback for &mut T {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        (**self).on_event(event);
    }
}

/// Fan an event out to two callbacks, first `.0` then `.1`.
impl<A: ProgressCallback, B: ProgressCallback> ProgressCallback for (A, B) {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        self.0.on_event(event);
        self.1.on_event(event);
    }
}

/// Discards every event.
pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_event(&mut self, _event: &ProgressEvent<'_>) {}
}

/// Prints the generation index and a best/std-dev line per generation.
/// Species and population detail is not printed.
#[derive(Default)]
pub struct ConsoleProgressCallback {
    generation_started: Option<Instant>,
}

impl ConsoleProgressCallback {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::GenerationStart { generation } => {
                self.generation_started = Some(Instant::now());
                println!("{}", generation_start_line(*generation));
            }
            ProgressEvent::PostEvaluate { population, best, .. } => {
                println!("{}", post_evaluate_line(population, best));
            }
            ProgressEvent::GenerationEnd { .. } => {
                if let Some(started) = self.generation_started.take() {
                    log::debug!("Generation time: {:.3}s", started.elapsed().as_secs_f64());
                }
            }
            ProgressEvent::CompleteExtinction | ProgressEvent::FoundSolution { .. } => {}
        }
    }
}

pub fn generation_start_line(generation: usize) -> String {
    format!("Running Generation {}...", generation)
}

/// Best fitness of the generation and the population standard deviation of
/// every evaluated genome.
pub fn post_evaluate_line(population: &BTreeMap<GenomeKey, Genome>, best: &Genome) -> String {
    let fitnesses: Vec<f64> = population.values().filter_map(|g| g.fitness).collect();
    let std_dev = FitnessMetrics::std_dev(&fitnesses);
    let best_fitness = best.fitness.unwrap_or(f64::NAN);
    format!("Best fitness: {:.4} | Std Dev: {:.4}", best_fitness, std_dev)
}
