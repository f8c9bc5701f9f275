use crate::engines::evaluation::controller::Controller;
use crate::engines::evaluation::normalizer::{argmax, normalize_observation};
use crate::engines::metrics::FitnessMetrics;
use crate::env::{ClosingEnv, Environment};
use crate::error::{NeuroLanderError, Result};
use crate::types::NOOP_ACTION;

/// Play a trained controller for `trials` episodes on one environment and
/// report the raw, unshaped reward of each. Episodes run until the environment
/// itself ends them.
pub fn replay_champion<E, C>(env: E, controller: &mut C, trials: usize, epsilon: f64) -> Result<Vec<f64>>
where
    E: Environment,
    C: Controller + ?Sized,
{
    let mut env = ClosingEnv::new(env);
    let mut rewards = Vec::with_capacity(trials);

    for trial in 0..trials {
        let mut observation = env.reset()?;
        let mut cumulative_reward = 0.0;

        loop {
            let outputs = controller.activate(&normalize_observation(&observation, epsilon))?;
            if outputs.len() != env.action_count() {
                return Err(NeuroLanderError::Evaluation(format!(
                    "controller produced {} outputs for {} actions",
                    outputs.len(),
                    env.action_count()
                )));
            }
            let result = env.step(argmax(&outputs).unwrap_or(NOOP_ACTION))?;
            cumulative_reward += result.reward;
            if result.terminated || result.truncated {
                break;
            }
            observation = result.observation;
        }

        println!("Trial {}: Reward = {}", trial + 1, cumulative_reward);
        rewards.push(cumulative_reward);
    }

    println!(
        "Average reward over {} trials: {}",
        trials,
        FitnessMetrics::mean(&rewards)
    );

    Ok(rewards)
}
