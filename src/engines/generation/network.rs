use crate::config::GenomeConfig;
use crate::engines::generation::activation::Activation;
use crate::engines::generation::genome::{ConnectionKey, Genome, NodeKey};
use crate::error::{NeuroLanderError, Result};
use std::collections::{HashMap, HashSet};

/// One node's place in the evaluation order.
#[derive(Debug, Clone)]
struct NodeEval {
    node: NodeKey,
    activation: Activation,
    bias: f64,
    response: f64,
    inputs: Vec<(NodeKey, f64)>,
}

/// Acyclic network compiled from a genome's enabled connections.
#[derive(Debug, Clone)]
pub struct FeedForwardNetwork {
    input_nodes: Vec<NodeKey>,
    output_nodes: Vec<NodeKey>,
    node_evals: Vec<NodeEval>,
    values: HashMap<NodeKey, f64>,
}

impl FeedForwardNetwork {
    pub fn create(genome: &Genome, config: &GenomeConfig) -> Result<Self> {
        let input_nodes = config.input_keys();
        let output_nodes = config.output_keys();

        let connections: Vec<ConnectionKey> = genome
            .connections
            .values()
            .filter(|c| c.enabled)
            .map(|c| c.key)
            .collect();

        let layers = feed_forward_layers(&input_nodes, &output_nodes, &connections);

        let mut node_evals = Vec::new();
        for layer in layers {
            for node in layer {
                let gene = genome.nodes.get(&node).ok_or_else(|| {
                    NeuroLanderError::Network(format!(
                        "genome {} references node {} without a gene",
                        genome.key, node
                    ))
                })?;

                let inputs = genome
                    .connections
                    .values()
                    .filter(|c| c.enabled && c.key.1 == node)
                    .map(|c| (c.key.0, c.weight))
                    .collect();

                node_evals.push(NodeEval {
                    node,
                    activation: gene.activation,
                    bias: gene.bias,
                    response: gene.response,
                    inputs,
                });
            }
        }

        let values = input_nodes
            .iter()
            .chain(output_nodes.iter())
            .map(|&k| (k, 0.0))
            .collect();

        Ok(Self {
            input_nodes,
            output_nodes,
            node_evals,
            values,
        })
    }

    /// Propagate `inputs` through the network and return the output values in
    /// output-key order. Outputs with no path from any input read 0.0.
    pub fn activate(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        if inputs.len() != self.input_nodes.len() {
            return Err(NeuroLanderError::Network(format!(
                "expected {} inputs, got {}",
                self.input_nodes.len(),
                inputs.len()
            )));
        }

        for (&key, &value) in self.input_nodes.iter().zip(inputs) {
            self.values.insert(key, value);
        }

        for eval in &self.node_evals {
            let sum: f64 = eval
                .inputs
                .iter()
                .map(|(source, weight)| self.values.get(source).copied().unwrap_or(0.0) * weight)
                .sum();
            let value = eval.activation.apply(eval.bias + eval.response * sum);
            self.values.insert(eval.node, value);
        }

        Ok(self
            .output_nodes
            .iter()
            .map(|k| self.values.get(k).copied().unwrap_or(0.0))
            .collect())
    }

    pub fn num_evaluated_nodes(&self) -> usize {
        self.node_evals.len()
    }
}

/// Nodes whose value can influence an output.
pub fn required_for_output(
    inputs: &[NodeKey],
    outputs: &[NodeKey],
    connections: &[ConnectionKey],
) -> HashSet<NodeKey> {
    let mut required: HashSet<NodeKey> = outputs.iter().copied().collect();
    let mut frontier = required.clone();

    loop {
        let upstream: HashSet<NodeKey> = connections
            .iter()
            .filter(|(a, b)| frontier.contains(b) && !frontier.contains(a))
            .map(|&(a, _)| a)
            .collect();

        if upstream.is_empty() {
            break;
        }

        let layer_nodes: HashSet<NodeKey> = upstream
            .iter()
            .copied()
            .filter(|n| !inputs.contains(n))
            .collect();
        if layer_nodes.is_empty() {
            break;
        }

        required.extend(layer_nodes);
        frontier.extend(upstream);
    }

    required
}

/// Group required nodes into layers that can be evaluated in order. Each
/// layer's nodes depend only on inputs and earlier layers. Nodes within a
/// layer are sorted so evaluation order is deterministic.
pub fn feed_forward_layers(
    inputs: &[NodeKey],
    outputs: &[NodeKey],
    connections: &[ConnectionKey],
) -> Vec<Vec<NodeKey>> {
    let required = required_for_output(inputs, outputs, connections);

    let mut layers = Vec::new();
    let mut ready: HashSet<NodeKey> = inputs.iter().copied().collect();

    loop {
        let candidates: HashSet<NodeKey> = connections
            .iter()
            .filter(|(a, b)| ready.contains(a) && !ready.contains(b))
            .map(|&(_, b)| b)
            .collect();

        let mut layer: Vec<NodeKey> = candidates
            .into_iter()
            .filter(|n| required.contains(n))
            .filter(|n| {
                connections
                    .iter()
                    .filter(|(_, b)| b == n)
                    .all(|(a, _)| ready.contains(a))
            })
            .collect();

        if layer.is_empty() {
            break;
        }

        layer.sort_unstable();
        ready.extend(layer.iter().copied());
        layers.push(layer);
    }

    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::genome::{ConnectionGene, NodeGene};

    fn node(key: NodeKey, bias: f64) -> NodeGene {
        NodeGene {
            key,
            bias,
            response: 1.0,
            activation: Activation::Identity,
        }
    }

    fn conn(a: NodeKey, b: NodeKey, weight: f64, enabled: bool) -> ConnectionGene {
        ConnectionGene {
            key: (a, b),
            weight,
            enabled,
        }
    }

    fn two_in_one_out() -> GenomeConfig {
        GenomeConfig {
            num_inputs: 2,
            num_outputs: 1,
            ..GenomeConfig::default()
        }
    }

    #[test]
    fn test_layers_follow_dependencies() {
        let connections = vec![(-1, 2), (-2, 2), (2, 0), (-1, 0)];
        let layers = feed_forward_layers(&[-1, -2], &[0], &connections);
        assert_eq!(layers, vec![vec![2], vec![0]]);
    }

    #[test]
    fn test_dangling_hidden_node_blocks_its_target() {
        // Node 3 has no inputs, so output 0 never becomes ready.
        let connections = vec![(-1, 2), (-2, 2), (2, 0), (-1, 0), (3, 0)];
        let layers = feed_forward_layers(&[-1, -2], &[0], &connections);
        assert_eq!(layers, vec![vec![2]]);
    }

    #[test]
    fn test_identity_network_sums_weighted_inputs() {
        let config = two_in_one_out();
        let mut genome = Genome::new(0);
        genome.nodes.insert(0, node(0, 0.5));
        genome.nodes.insert(1, node(1, 0.0));
        for c in [conn(-1, 0, 2.0, true), conn(-2, 0, -1.0, true), conn(-2, 1, 9.0, false)] {
            genome.connections.insert(c.key, c);
        }

        let mut net = FeedForwardNetwork::create(&genome, &config).unwrap();
        let out = net.activate(&[3.0, 4.0]).unwrap();

        assert_eq!(out, vec![0.5 + 6.0 - 4.0]);
    }

    #[test]
    fn test_hidden_layer_is_evaluated_first() {
        let config = two_in_one_out();
        let mut genome = Genome::new(0);
        genome.nodes.insert(0, node(0, 0.0));
        genome.nodes.insert(5, node(5, 1.0));
        for c in [conn(-1, 5, 1.0, true), conn(5, 0, 2.0, true), conn(-2, 0, 1.0, true)] {
            genome.connections.insert(c.key, c);
        }

        let mut net = FeedForwardNetwork::create(&genome, &config).unwrap();
        assert_eq!(net.num_evaluated_nodes(), 2);
        assert_eq!(net.activate(&[1.0, 10.0]).unwrap(), vec![(1.0 + 1.0) * 2.0 + 10.0]);
    }

    #[test]
    fn test_rejects_wrong_input_length() {
        let config = two_in_one_out();
        let mut genome = Genome::new(0);
        genome.nodes.insert(0, node(0, 0.0));
        let mut net = FeedForwardNetwork::create(&genome, &config).unwrap();

        assert!(net.activate(&[1.0]).is_err());
        assert_eq!(net.activate(&[1.0, 2.0]).unwrap(), vec![0.0]);
    }
}
