use super::traits::{check_probability, invalid, ConfigSection};
use crate::engines::generation::activation::Activation;
use crate::engines::generation::genome::NodeKey;
use crate::error::NeuroLanderError;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Network shape and mutation parameters (`[genome]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeConfig {
    pub num_inputs: usize,
    pub num_outputs: usize,

    pub activation_default: Activation,
    pub activation_options: Vec<Activation>,
    pub activation_mutate_rate: f64,

    /// Unlike `weight`, perturbed at 0.7 by default. Keys missing from a
    /// `[genome.bias]` table keep these section defaults when loaded through
    /// `AppConfig::load_from_file`.
    pub bias: FloatAttributeConfig,
    /// Fixed at 1.0 unless configured.
    pub response: FloatAttributeConfig,
    pub weight: FloatAttributeConfig,

    pub enabled_default: bool,
    pub enabled_mutate_rate: f64,

    pub conn_add_prob: f64,
    pub conn_delete_prob: f64,
    pub node_add_prob: f64,
    pub node_delete_prob: f64,

    pub compatibility_disjoint_coefficient: f64,
    pub compatibility_weight_coefficient: f64,
}

/// Initialisation and mutation settings for one floating point gene attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatAttributeConfig {
    pub init_mean: f64,
    pub init_stdev: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub mutate_rate: f64,
    pub mutate_power: f64,
    pub replace_rate: f64,
}

impl Default for FloatAttributeConfig {
    fn default() -> Self {
        Self {
            init_mean: 0.0,
            init_stdev: 1.0,
            min_value: -30.0,
            max_value: 30.0,
            mutate_rate: 0.8,
            mutate_power: 0.5,
            replace_rate: 0.1,
        }
    }
}

impl FloatAttributeConfig {
    /// Fixed attribute that never changes (used for `response` by default).
    pub fn constant(value: f64) -> Self {
        Self {
            init_mean: value,
            init_stdev: 0.0,
            mutate_rate: 0.0,
            mutate_power: 0.0,
            replace_rate: 0.0,
            ..Self::default()
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min_value).min(self.max_value)
    }

    pub fn new_value<R: Rng>(&self, rng: &mut R) -> f64 {
        self.clamp(gaussian(rng, self.init_mean, self.init_stdev))
    }

    /// Perturb with probability `mutate_rate`, otherwise replace with
    /// probability `replace_rate`, otherwise keep.
    pub fn mutate_value<R: Rng>(&self, value: f64, rng: &mut R) -> f64 {
        let roll: f64 = rng.gen();
        if roll < self.mutate_rate {
            return self.clamp(value + gaussian(rng, 0.0, self.mutate_power));
        }
        if roll < self.mutate_rate + self.replace_rate {
            return self.new_value(rng);
        }
        value
    }

    fn validate(&self, name: &str) -> Result<(), NeuroLanderError> {
        check_probability::<GenomeConfig>(&format!("{}.mutate_rate", name), self.mutate_rate)?;
        check_probability::<GenomeConfig>(&format!("{}.replace_rate", name), self.replace_rate)?;
        if self.min_value > self.max_value {
            return Err(invalid::<GenomeConfig>(&format!("{}.min_value exceeds max_value", name)));
        }
        if self.init_stdev < 0.0 || self.mutate_power < 0.0 {
            return Err(invalid::<GenomeConfig>(&format!(
                "{} standard deviations must be non-negative",
                name
            )));
        }
        Ok(())
    }
}

fn gaussian<R: Rng>(rng: &mut R, mean: f64, stdev: f64) -> f64 {
    if stdev <= 0.0 {
        return mean;
    }
    Normal::new(mean, stdev)
        .map(|dist| dist.sample(rng))
        .unwrap_or(mean)
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            num_inputs: 8,
            num_outputs: 4,
            activation_default: Activation::Sigmoid,
            activation_options: vec![Activation::Sigmoid],
            activation_mutate_rate: 0.0,
            bias: FloatAttributeConfig {
                mutate_rate: 0.7,
                ..FloatAttributeConfig::default()
            },
            response: FloatAttributeConfig::constant(1.0),
            weight: FloatAttributeConfig::default(),
            enabled_default: true,
            enabled_mutate_rate: 0.01,
            conn_add_prob: 0.5,
            conn_delete_prob: 0.5,
            node_add_prob: 0.2,
            node_delete_prob: 0.2,
            compatibility_disjoint_coefficient: 1.0,
            compatibility_weight_coefficient: 0.5,
        }
    }
}

impl GenomeConfig {
    /// Input pins are numbered -1, -2, ... and never appear as genome nodes.
    pub fn input_keys(&self) -> Vec<NodeKey> {
        (1..=self.num_inputs as NodeKey).map(|k| -k).collect()
    }

    /// Output nodes occupy keys 0..num_outputs.
    pub fn output_keys(&self) -> Vec<NodeKey> {
        (0..self.num_outputs as NodeKey).collect()
    }

    pub fn is_input(&self, key: NodeKey) -> bool {
        key < 0 && key >= -(self.num_inputs as NodeKey)
    }

    pub fn is_output(&self, key: NodeKey) -> bool {
        key >= 0 && key < self.num_outputs as NodeKey
    }
}

impl ConfigSection for GenomeConfig {
    fn section_name() -> &'static str {
        "genome"
    }

    fn validate(&self) -> Result<(), NeuroLanderError> {
        if self.num_inputs == 0 || self.num_outputs == 0 {
            return Err(invalid::<Self>("num_inputs and num_outputs must be positive"));
        }
        if self.activation_options.is_empty() {
            return Err(invalid::<Self>("activation_options must not be empty"));
        }
        check_probability::<Self>("activation_mutate_rate", self.activation_mutate_rate)?;
        check_probability::<Self>("enabled_mutate_rate", self.enabled_mutate_rate)?;
        check_probability::<Self>("conn_add_prob", self.conn_add_prob)?;
        check_probability::<Self>("conn_delete_prob", self.conn_delete_prob)?;
        check_probability::<Self>("node_add_prob", self.node_add_prob)?;
        check_probability::<Self>("node_delete_prob", self.node_delete_prob)?;
        self.bias.validate("bias")?;
        self.response.validate("response")?;
        self.weight.validate("weight")?;
        Ok(())
    }
}
