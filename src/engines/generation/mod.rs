pub mod activation;
pub mod genome;
pub mod operators;
pub mod network;
pub mod species;
pub mod reproduction;
pub mod evolution_engine;
pub mod progress;
pub mod statistics;
pub mod hall_of_fame;

pub use activation::Activation;
pub use genome::{ConnectionGene, ConnectionKey, Genome, GenomeKey, NodeGene, NodeKey};
pub use network::FeedForwardNetwork;
pub use species::{Species, SpeciesKey, SpeciesSet};
pub use reproduction::Reproduction;
pub use evolution_engine::{EvolutionEngine, FitnessFunction};
pub use progress::{
    generation_start_line, post_evaluate_line, ConsoleProgressCallback, ProgressCallback, ProgressEvent,
    SilentProgressCallback,
};
pub use statistics::{GenerationStats, StatisticsReporter};
pub use hall_of_fame::HallOfFame;
