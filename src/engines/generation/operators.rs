use crate::config::GenomeConfig;
use crate::engines::generation::genome::{
    ConnectionGene, ConnectionKey, Genome, GenomeKey, NodeGene, NodeKey,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Apply structural mutations (each with its own probability), then perturb
/// every gene attribute.
pub fn mutate<R: Rng>(genome: &mut Genome, config: &GenomeConfig, rng: &mut R) {
    if rng.gen::<f64>() < config.node_add_prob {
        mutate_add_node(genome, config, rng);
    }
    if rng.gen::<f64>() < config.node_delete_prob {
        mutate_delete_node(genome, config, rng);
    }
    if rng.gen::<f64>() < config.conn_add_prob {
        mutate_add_connection(genome, config, rng);
    }
    if rng.gen::<f64>() < config.conn_delete_prob {
        mutate_delete_connection(genome, rng);
    }

    for conn in genome.connections.values_mut() {
        conn.weight = config.weight.mutate_value(conn.weight, rng);
        if rng.gen::<f64>() < config.enabled_mutate_rate {
            conn.enabled = !conn.enabled;
        }
    }

    for node in genome.nodes.values_mut() {
        node.bias = config.bias.mutate_value(node.bias, rng);
        node.response = config.response.mutate_value(node.response, rng);
        if rng.gen::<f64>() < config.activation_mutate_rate {
            if let Some(&activation) = config.activation_options.choose(rng) {
                node.activation = activation;
            }
        }
    }
}

/// Split a random connection with a new hidden node. The incoming half gets
/// weight 1.0 and the outgoing half keeps the old weight, so the network's
/// behaviour is initially close to unchanged.
pub fn mutate_add_node<R: Rng>(
    genome: &mut Genome,
    config: &GenomeConfig,
    rng: &mut R,
) -> Option<NodeKey> {
    let keys: Vec<ConnectionKey> = genome.connections.keys().copied().collect();
    let &split = keys.choose(rng)?;

    let new_key = genome.next_node_key(config);
    genome
        .nodes
        .insert(new_key, NodeGene::new_random(new_key, config, rng));

    let old = genome.connections.get_mut(&split)?;
    old.enabled = false;
    let weight = old.weight;

    let (input, output) = split;
    insert_connection(genome, (input, new_key), 1.0);
    insert_connection(genome, (new_key, output), weight);

    Some(new_key)
}

/// Remove a random hidden node along with every connection touching it.
pub fn mutate_delete_node<R: Rng>(
    genome: &mut Genome,
    config: &GenomeConfig,
    rng: &mut R,
) -> Option<NodeKey> {
    let hidden = genome.hidden_keys(config);
    let &victim = hidden.choose(rng)?;

    genome
        .connections
        .retain(|&(input, output), _| input != victim && output != victim);
    genome.nodes.remove(&victim);

    Some(victim)
}

/// Add a feed-forward connection between two random nodes. Returns `None`
/// when the pick already exists, joins two outputs, or would close a cycle.
pub fn mutate_add_connection<R: Rng>(
    genome: &mut Genome,
    config: &GenomeConfig,
    rng: &mut R,
) -> Option<ConnectionKey> {
    let possible_outputs: Vec<NodeKey> = genome.nodes.keys().copied().collect();
    let &out_node = possible_outputs.choose(rng)?;

    let mut possible_inputs = possible_outputs;
    possible_inputs.extend(config.input_keys());
    let &in_node = possible_inputs.choose(rng)?;

    let key = (in_node, out_node);
    if genome.connections.contains_key(&key) {
        return None;
    }
    if config.is_output(in_node) && config.is_output(out_node) {
        return None;
    }

    let existing: Vec<ConnectionKey> = genome.connections.keys().copied().collect();
    if creates_cycle(&existing, key) {
        return None;
    }

    genome
        .connections
        .insert(key, ConnectionGene::new_random(key, config, rng));
    Some(key)
}

pub fn mutate_delete_connection<R: Rng>(genome: &mut Genome, rng: &mut R) -> Option<ConnectionKey> {
    let keys: Vec<ConnectionKey> = genome.connections.keys().copied().collect();
    let &victim = keys.choose(rng)?;
    genome.connections.remove(&victim);
    Some(victim)
}

fn insert_connection(genome: &mut Genome, key: ConnectionKey, weight: f64) {
    genome.connections.insert(
        key,
        ConnectionGene {
            key,
            weight,
            enabled: true,
        },
    );
}

/// Whether adding `test` to a feed-forward graph would create a cycle.
pub fn creates_cycle(connections: &[ConnectionKey], test: ConnectionKey) -> bool {
    let (input, output) = test;
    if input == output {
        return true;
    }

    let mut visited = vec![output];
    loop {
        let mut added = 0;
        for &(a, b) in connections {
            if visited.contains(&a) && !visited.contains(&b) {
                if b == input {
                    return true;
                }
                visited.push(b);
                added += 1;
            }
        }
        if added == 0 {
            return false;
        }
    }
}

/// Produce a child from two evaluated parents. Disjoint and excess genes come
/// from the fitter parent; homologous genes mix attributes at random.
pub fn crossover<R: Rng>(
    parent1: &Genome,
    parent2: &Genome,
    child_key: GenomeKey,
    rng: &mut R,
) -> Genome {
    let fitness = |g: &Genome| g.fitness.unwrap_or(f64::NEG_INFINITY);
    let (fitter, other) = if fitness(parent1) >= fitness(parent2) {
        (parent1, parent2)
    } else {
        (parent2, parent1)
    };

    let mut child = Genome::new(child_key);

    for (key, gene) in &fitter.connections {
        let inherited = match other.connections.get(key) {
            Some(partner) => ConnectionGene {
                key: *key,
                weight: pick(gene.weight, partner.weight, rng),
                enabled: pick(gene.enabled, partner.enabled, rng),
            },
            None => gene.clone(),
        };
        child.connections.insert(*key, inherited);
    }

    for (key, gene) in &fitter.nodes {
        let inherited = match other.nodes.get(key) {
            Some(partner) => NodeGene {
                key: *key,
                bias: pick(gene.bias, partner.bias, rng),
                response: pick(gene.response, partner.response, rng),
                activation: pick(gene.activation, partner.activation, rng),
            },
            None => gene.clone(),
        };
        child.nodes.insert(*key, inherited);
    }

    child
}

fn pick<T, R: Rng>(a: T, b: T, rng: &mut R) -> T {
    if rng.gen_bool(0.5) {
        a
    } else {
        b
    }
}
