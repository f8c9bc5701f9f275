//! Genome representation for NEAT
//!
//! A genome is a set of node genes (hidden and output neurons) and connection
//! genes (weighted links between node keys). Input pins are not stored as
//! nodes: they are the negative keys declared by [`GenomeConfig::input_keys`].
//!
//! Each generation the engine hands genomes to a fitness function, which
//! writes exactly one value into [`Genome::fitness`]. Everything else about
//! the genome is owned by the engine.
//!
//! # Conversion
//!
//! Use `FeedForwardNetwork::create()` to turn a Genome into an evaluable network.

use crate::config::GenomeConfig;
use crate::engines::generation::activation::Activation;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type GenomeKey = u64;
pub type NodeKey = i64;
pub type ConnectionKey = (NodeKey, NodeKey);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGene {
    pub key: NodeKey,
    pub bias: f64,
    pub response: f64,
    pub activation: Activation,
}

impl NodeGene {
    pub fn new_random<R: Rng>(key: NodeKey, config: &GenomeConfig, rng: &mut R) -> Self {
        Self {
            key,
            bias: config.bias.new_value(rng),
            response: config.response.new_value(rng),
            activation: config.activation_default,
        }
    }

    fn distance(&self, other: &NodeGene, config: &GenomeConfig) -> f64 {
        let mut d = (self.bias - other.bias).abs() + (self.response - other.response).abs();
        if self.activation != other.activation {
            d += 1.0;
        }
        d * config.compatibility_weight_coefficient
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub key: ConnectionKey,
    pub weight: f64,
    pub enabled: bool,
}

impl ConnectionGene {
    pub fn new_random<R: Rng>(key: ConnectionKey, config: &GenomeConfig, rng: &mut R) -> Self {
        Self {
            key,
            weight: config.weight.new_value(rng),
            enabled: config.enabled_default,
        }
    }

    fn distance(&self, other: &ConnectionGene, config: &GenomeConfig) -> f64 {
        let mut d = (self.weight - other.weight).abs();
        if self.enabled != other.enabled {
            d += 1.0;
        }
        d * config.compatibility_weight_coefficient
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub key: GenomeKey,
    pub nodes: BTreeMap<NodeKey, NodeGene>,
    #[serde(with = "connection_list")]
    pub connections: BTreeMap<ConnectionKey, ConnectionGene>,
    pub fitness: Option<f64>,
}

impl Genome {
    pub fn new(key: GenomeKey) -> Self {
        Self {
            key,
            nodes: BTreeMap::new(),
            connections: BTreeMap::new(),
            fitness: None,
        }
    }

    /// Output nodes only, every input wired directly to every output.
    pub fn new_initial<R: Rng>(key: GenomeKey, config: &GenomeConfig, rng: &mut R) -> Self {
        let mut genome = Self::new(key);

        for output in config.output_keys() {
            genome.nodes.insert(output, NodeGene::new_random(output, config, rng));
        }

        for input in config.input_keys() {
            for output in config.output_keys() {
                let key = (input, output);
                genome.connections.insert(key, ConnectionGene::new_random(key, config, rng));
            }
        }

        genome
    }

    /// Smallest key not yet used by any node.
    pub fn next_node_key(&self, config: &GenomeConfig) -> NodeKey {
        let floor = config.num_outputs as NodeKey;
        self.nodes
            .keys()
            .next_back()
            .map(|&max| (max + 1).max(floor))
            .unwrap_or(floor)
    }

    pub fn hidden_keys(&self, config: &GenomeConfig) -> Vec<NodeKey> {
        self.nodes
            .keys()
            .copied()
            .filter(|&k| !config.is_input(k) && !config.is_output(k))
            .collect()
    }

    pub fn num_enabled_connections(&self) -> usize {
        self.connections.values().filter(|c| c.enabled).count()
    }

    /// Genetic distance used for speciation.
    pub fn distance(&self, other: &Genome, config: &GenomeConfig) -> f64 {
        let node_distance = gene_distance(&self.nodes, &other.nodes, config, NodeGene::distance);
        let connection_distance = gene_distance(
            &self.connections,
            &other.connections,
            config,
            ConnectionGene::distance,
        );
        node_distance + connection_distance
    }
}

fn gene_distance<K: Ord, G>(
    ours: &BTreeMap<K, G>,
    theirs: &BTreeMap<K, G>,
    config: &GenomeConfig,
    homologous: fn(&G, &G, &GenomeConfig) -> f64,
) -> f64 {
    let max_genes = ours.len().max(theirs.len());
    if max_genes == 0 {
        return 0.0;
    }

    let mut disjoint = theirs.keys().filter(|k| !ours.contains_key(*k)).count();
    let mut distance = 0.0;

    for (key, gene) in ours {
        match theirs.get(key) {
            Some(other) => distance += homologous(gene, other, config),
            None => disjoint += 1,
        }
    }

    (distance + config.compatibility_disjoint_coefficient * disjoint as f64) / max_genes as f64
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Key: {}", self.key)?;
        match self.fitness {
            Some(fitness) => writeln!(f, "Fitness: {:.4}", fitness)?,
            None => writeln!(f, "Fitness: unevaluated")?,
        }
        writeln!(f, "Nodes:")?;
        for node in self.nodes.values() {
            writeln!(
                f,
                "\t{} bias={:.4} response={:.4} activation={}",
                node.key,
                node.bias,
                node.response,
                node.activation.name()
            )?;
        }
        writeln!(f, "Connections:")?;
        for conn in self.connections.values() {
            writeln!(
                f,
                "\t{} -> {} weight={:.4} enabled={}",
                conn.key.0, conn.key.1, conn.weight, conn.enabled
            )?;
        }
        Ok(())
    }
}

/// JSON object keys must be strings, so connections travel as a list.
mod connection_list {
    use super::{ConnectionGene, ConnectionKey};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<ConnectionKey, ConnectionGene>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<ConnectionKey, ConnectionGene>, D::Error> {
        let genes = Vec::<ConnectionGene>::deserialize(deserializer)?;
        Ok(genes.into_iter().map(|g| (g.key, g)).collect())
    }
}
