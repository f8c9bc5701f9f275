pub mod lunar_lander;

pub use lunar_lander::{LunarLander, LunarLanderFactory};

use crate::error::Result;
use crate::types::{Action, Observation, StepResult};
use std::ops::{Deref, DerefMut};

/// A discrete-action control task advanced one step at a time.
pub trait Environment {
    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Result<Observation>;

    fn step(&mut self, action: Action) -> Result<StepResult>;

    /// Release resources held by the environment. Must be safe to call more than once.
    fn close(&mut self) {}

    fn action_count(&self) -> usize;
}

/// Produces fresh, independent environment instances.
pub trait EnvironmentFactory: Sync {
    type Env: Environment;

    fn make(&self) -> Result<Self::Env>;
}

impl<F, E> EnvironmentFactory for F
where
    F: Fn() -> Result<E> + Sync,
    E: Environment,
{
    type Env = E;

    fn make(&self) -> Result<E> {
        self()
    }
}

/// Owns an environment and closes it when dropped, whichever way the owner exits.
pub struct ClosingEnv<E: Environment> {
    env: E,
}

impl<E: Environment> ClosingEnv<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }
}

impl<E: Environment> Deref for ClosingEnv<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.env
    }
}

impl<E: Environment> DerefMut for ClosingEnv<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.env
    }
}

impl<E: Environment> Drop for ClosingEnv<E> {
    fn drop(&mut self) {
        self.env.close();
    }
}
