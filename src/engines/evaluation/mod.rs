pub mod controller;
pub mod normalizer;
pub mod episode;
pub mod trials;
pub mod population;
pub mod replay;

pub use controller::{Controller, ControllerBuilder, NetworkBuilder};
pub use normalizer::{argmax, normalize_observation};
pub use episode::{apply_terminal_shaping, EpisodeExecutor};
pub use trials::TrialAggregator;
pub use population::PopulationEvaluator;
pub use replay::replay_champion;
