#![allow(dead_code)]

use neurolander::engines::evaluation::Controller;
use neurolander::env::Environment;
use neurolander::error::{NeuroLanderError, Result};
use neurolander::types::{Action, Observation, StepResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Deterministic environment driven by a step counter.
///
/// Leg contact is reported on the observations of steps inside `contact`
/// (1-based, inclusive). Each step pays `reward_for(action)`.
pub struct ScriptedEnv {
    pub step_count: usize,
    pub end_after: Option<usize>,
    pub contact: Option<(usize, usize)>,
    pub reward_per_step: f64,
    pub reward_by_action: Option<Vec<f64>>,
    pub fail_at_step: Option<usize>,
    pub closes: Arc<AtomicUsize>,
    pub actions: Vec<Action>,
}

impl ScriptedEnv {
    pub fn new() -> Self {
        Self {
            step_count: 0,
            end_after: None,
            contact: None,
            reward_per_step: 1.0,
            reward_by_action: None,
            fail_at_step: None,
            closes: Arc::new(AtomicUsize::new(0)),
            actions: Vec::new(),
        }
    }

    pub fn ending_after(mut self, steps: usize) -> Self {
        self.end_after = Some(steps);
        self
    }

    /// Contact from `from` onward.
    pub fn with_contact_from(mut self, from: usize) -> Self {
        self.contact = Some((from, usize::MAX));
        self
    }

    pub fn with_contact_between(mut self, from: usize, to: usize) -> Self {
        self.contact = Some((from, to));
        self
    }

    pub fn with_action_rewards(mut self, rewards: Vec<f64>) -> Self {
        self.reward_by_action = Some(rewards);
        self
    }

    pub fn failing_at(mut self, step: usize) -> Self {
        self.fail_at_step = Some(step);
        self
    }

    pub fn sharing_close_counter(mut self, counter: &Arc<AtomicUsize>) -> Self {
        self.closes = Arc::clone(counter);
        self
    }

    fn observation(&self) -> Observation {
        let touching = self
            .contact
            .is_some_and(|(from, to)| self.step_count >= from && self.step_count <= to);
        let leg = if touching { 1.0 } else { 0.0 };
        let t = self.step_count as f64;
        vec![0.1 * t, 1.0 - 0.01 * t, -0.2, 0.3, 0.05, -0.1, leg, leg]
    }
}

impl Environment for ScriptedEnv {
    fn reset(&mut self) -> Result<Observation> {
        self.step_count = 0;
        Ok(self.observation())
    }

    fn step(&mut self, action: Action) -> Result<StepResult> {
        self.step_count += 1;
        if self.fail_at_step == Some(self.step_count) {
            return Err(NeuroLanderError::Environment("scripted failure".to_string()));
        }
        self.actions.push(action);

        let reward = match &self.reward_by_action {
            Some(rewards) => rewards[action],
            None => self.reward_per_step,
        };

        Ok(StepResult {
            observation: self.observation(),
            reward,
            terminated: self.end_after.is_some_and(|n| self.step_count >= n),
            truncated: false,
        })
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn action_count(&self) -> usize {
        4
    }
}

/// Cycles through a fixed list of actions, one-hot encoded.
pub struct ScriptedController {
    pub actions: Vec<Action>,
    pub calls: usize,
}

impl ScriptedController {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions, calls: 0 }
    }

    pub fn always(action: Action) -> Self {
        Self::new(vec![action])
    }
}

impl Controller for ScriptedController {
    fn activate(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        assert_eq!(inputs.len(), 8);
        let action = self.actions[self.calls % self.actions.len()];
        self.calls += 1;

        let mut outputs = vec![0.0; 4];
        outputs[action] = 1.0;
        Ok(outputs)
    }
}

/// Controller that always fails.
pub struct BrokenController;

impl Controller for BrokenController {
    fn activate(&mut self, _inputs: &[f64]) -> Result<Vec<f64>> {
        Err(NeuroLanderError::Network("broken controller".to_string()))
    }
}
