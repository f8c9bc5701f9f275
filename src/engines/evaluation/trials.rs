use crate::config::EvaluationConfig;
use crate::engines::evaluation::controller::Controller;
use crate::engines::evaluation::episode::EpisodeExecutor;
use crate::engines::metrics::FitnessMetrics;
use crate::env::EnvironmentFactory;
use crate::error::Result;
use crate::types::EpisodeOutcome;

/// Scores a controller as the mean shaped score of several independent
/// episodes, each on a freshly made environment.
pub struct TrialAggregator<'a, F: EnvironmentFactory> {
    factory: &'a F,
    executor: EpisodeExecutor,
    trials: usize,
}

impl<'a, F: EnvironmentFactory> TrialAggregator<'a, F> {
    pub fn new(factory: &'a F, config: &EvaluationConfig) -> Self {
        Self {
            factory,
            executor: EpisodeExecutor::new(config),
            trials: config.trials,
        }
    }

    pub fn run_trials<C: Controller + ?Sized>(&self, controller: &mut C) -> Result<Vec<EpisodeOutcome>> {
        (0..self.trials)
            .map(|_| {
                let env = self.factory.make()?;
                self.executor.run(env, &mut *controller)
            })
            .collect()
    }

    pub fn evaluate<C: Controller + ?Sized>(&self, controller: &mut C) -> Result<f64> {
        let scores: Vec<f64> = self
            .run_trials(controller)?
            .iter()
            .map(|outcome| outcome.shaped_score)
            .collect();
        Ok(FitnessMetrics::mean(&scores))
    }
}
