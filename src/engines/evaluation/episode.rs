use crate::config::EvaluationConfig;
use crate::engines::evaluation::controller::Controller;
use crate::engines::evaluation::normalizer::{argmax, normalize_observation};
use crate::env::{ClosingEnv, Environment};
use crate::error::{NeuroLanderError, Result};
use crate::types::{EpisodeOutcome, LEFT_LEG_CONTACT, NOOP_ACTION, RIGHT_LEG_CONTACT};

/// Runs one controller through one episode and scores it.
///
/// The score is the sum of environment rewards, minus `landing_penalty` for
/// every engine firing once both legs have touched down, followed by a single
/// terminal adjustment (see [`apply_terminal_shaping`]). The episode ends on
/// termination, truncation, or once the step counter exceeds `max_steps`.
#[derive(Debug, Clone)]
pub struct EpisodeExecutor {
    config: EvaluationConfig,
}

impl EpisodeExecutor {
    pub fn new(config: &EvaluationConfig) -> Self {
        Self { config: config.clone() }
    }

    /// The environment is consumed and closed before this returns, on every path.
    pub fn run<E, C>(&self, env: E, controller: &mut C) -> Result<EpisodeOutcome>
    where
        E: Environment,
        C: Controller + ?Sized,
    {
        let mut env = ClosingEnv::new(env);
        let mut observation = env.reset()?;

        let mut cumulative_reward = 0.0;
        let mut steps = 0;
        let mut landed = false;

        loop {
            let inputs = normalize_observation(&observation, self.config.normalization_epsilon);
            let outputs = controller.activate(&inputs)?;
            if outputs.len() != env.action_count() {
                return Err(NeuroLanderError::Evaluation(format!(
                    "controller produced {} outputs for {} actions",
                    outputs.len(),
                    env.action_count()
                )));
            }
            let action = argmax(&outputs).unwrap_or(NOOP_ACTION);

            let result = env.step(action)?;

            if both_legs_down(&result.observation) {
                landed = true;
            }

            let mut reward = result.reward;
            if landed && action != NOOP_ACTION {
                reward -= self.config.landing_penalty;
            }
            cumulative_reward += reward;
            steps += 1;

            if result.terminated || result.truncated || steps > self.config.max_steps {
                break;
            }
            observation = result.observation;
        }

        let shaped_score = apply_terminal_shaping(cumulative_reward, &self.config);
        log::trace!(
            "Episode finished: {} steps, reward {:.3}, shaped {:.3}, landed {}",
            steps,
            cumulative_reward,
            shaped_score,
            landed
        );

        Ok(EpisodeOutcome {
            cumulative_reward,
            shaped_score,
            steps,
            landed,
        })
    }
}

fn both_legs_down(observation: &[f64]) -> bool {
    observation.get(LEFT_LEG_CONTACT) == Some(&1.0) && observation.get(RIGHT_LEG_CONTACT) == Some(&1.0)
}

/// Bonus for totals strictly above the success threshold, penalty for totals
/// strictly below zero. Applied once per episode.
pub fn apply_terminal_shaping(total: f64, config: &EvaluationConfig) -> f64 {
    if total > config.success_threshold {
        total + config.success_bonus
    } else if total < 0.0 {
        total - config.failure_penalty
    } else {
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_shaping_boundaries() {
        let config = EvaluationConfig::default();
        assert_eq!(apply_terminal_shaping(200.0, &config), 200.0);
        assert!((apply_terminal_shaping(200.01, &config) - 300.01).abs() < 1e-9);
        assert!((apply_terminal_shaping(-0.01, &config) + 50.01).abs() < 1e-9);
        assert_eq!(apply_terminal_shaping(0.0, &config), 0.0);
        assert_eq!(apply_terminal_shaping(120.0, &config), 120.0);
    }

    #[test]
    fn test_leg_contact_needs_both_indicators() {
        let mut obs = vec![0.0; 8];
        obs[LEFT_LEG_CONTACT] = 1.0;
        assert!(!both_legs_down(&obs));
        obs[RIGHT_LEG_CONTACT] = 1.0;
        assert!(both_legs_down(&obs));
        assert!(!both_legs_down(&[1.0; 4]));
    }
}
