use crate::config::GenomeConfig;
use crate::engines::generation::{FeedForwardNetwork, Genome};
use crate::error::Result;

/// Maps a normalized observation to one score per action.
pub trait Controller {
    fn activate(&mut self, inputs: &[f64]) -> Result<Vec<f64>>;
}

impl Controller for FeedForwardNetwork {
    fn activate(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        FeedForwardNetwork::activate(self, inputs)
    }
}

impl<C: Controller + ?Sized> Controller for &mut C {
    fn activate(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        (**self).activate(inputs)
    }
}

/// Turns a genome into something that can drive an environment.
pub trait ControllerBuilder: Sync {
    type Output: Controller;

    fn build(&self, genome: &Genome, config: &GenomeConfig) -> Result<Self::Output>;
}

/// Compiles genomes into feed-forward networks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkBuilder;

impl ControllerBuilder for NetworkBuilder {
    type Output = FeedForwardNetwork;

    fn build(&self, genome: &Genome, config: &GenomeConfig) -> Result<FeedForwardNetwork> {
        FeedForwardNetwork::create(genome, config)
    }
}
