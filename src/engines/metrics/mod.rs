pub mod fitness;

pub use fitness::{FitnessMetrics, FitnessSummary};
