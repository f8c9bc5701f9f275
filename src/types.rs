use serde::{Deserialize, Serialize};

/// Raw sensor readings returned by an environment for a single step.
pub type Observation = Vec<f64>;

/// Discrete action index. Index 0 is always the idle action.
pub type Action = usize;

/// The action that fires no engine.
pub const NOOP_ACTION: Action = 0;

/// Observation indices of the two ground-contact indicators.
pub const LEFT_LEG_CONTACT: usize = 6;
pub const RIGHT_LEG_CONTACT: usize = 7;

/// Result of advancing an environment by one action.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
}

/// Summary of one shaped episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    /// Sum of per-step rewards after landing penalties, before terminal shaping.
    pub cumulative_reward: f64,
    /// Final score after terminal shaping. This is what fitness is built from.
    pub shaped_score: f64,
    pub steps: usize,
    pub landed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    #[default]
    None,
    Human,
}
