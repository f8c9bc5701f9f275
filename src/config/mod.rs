pub mod traits;
pub mod evolution;
pub mod genome;
pub mod reproduction;
pub mod evaluation;
pub mod manager;

pub use manager::AppConfig;
pub use evolution::{EvolutionConfig, FitnessCriterion};
pub use genome::{FloatAttributeConfig, GenomeConfig};
pub use reproduction::{ReproductionConfig, SpeciesConfig, StagnationConfig};
pub use evaluation::EvaluationConfig;
pub use traits::ConfigSection;
