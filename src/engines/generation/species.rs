use crate::config::{AppConfig, StagnationConfig};
use crate::engines::generation::genome::{Genome, GenomeKey};
use crate::error::{NeuroLanderError, Result};
use std::collections::BTreeMap;

pub type SpeciesKey = usize;

#[derive(Debug, Clone)]
pub struct Species {
    pub key: SpeciesKey,
    pub created: usize,
    pub last_improved: usize,
    pub representative: Genome,
    pub members: Vec<GenomeKey>,
    pub fitness: Option<f64>,
    pub adjusted_fitness: Option<f64>,
    pub fitness_history: Vec<f64>,
}

impl Species {
    fn new(key: SpeciesKey, generation: usize, representative: Genome) -> Self {
        Self {
            key,
            created: generation,
            last_improved: generation,
            representative,
            members: Vec::new(),
            fitness: None,
            adjusted_fitness: None,
            fitness_history: Vec::new(),
        }
    }

    pub fn member_fitnesses(&self, population: &BTreeMap<GenomeKey, Genome>) -> Vec<f64> {
        self.members
            .iter()
            .filter_map(|k| population.get(k).and_then(|g| g.fitness))
            .collect()
    }
}

/// Partition of the population into species by genetic distance.
#[derive(Debug, Clone, Default)]
pub struct SpeciesSet {
    pub species: BTreeMap<SpeciesKey, Species>,
    genome_to_species: BTreeMap<GenomeKey, SpeciesKey>,
    next_key: SpeciesKey,
}

impl SpeciesSet {
    pub fn new() -> Self {
        Self {
            next_key: 1,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn species_of(&self, genome: GenomeKey) -> Option<SpeciesKey> {
        self.genome_to_species.get(&genome).copied()
    }

    /// Assign every genome to a species. Each existing species first adopts
    /// the closest genome to its old representative as its new one; remaining
    /// genomes join the closest compatible species or found a new one.
    pub fn speciate(
        &mut self,
        config: &AppConfig,
        population: &BTreeMap<GenomeKey, Genome>,
        generation: usize,
    ) {
        let threshold = config.species.compatibility_threshold;
        let genome_config = &config.genome;

        let mut unspeciated: Vec<GenomeKey> = population.keys().copied().collect();
        let mut new_representatives: BTreeMap<SpeciesKey, GenomeKey> = BTreeMap::new();
        let mut new_members: BTreeMap<SpeciesKey, Vec<GenomeKey>> = BTreeMap::new();

        for (&sid, species) in &self.species {
            let closest = unspeciated
                .iter()
                .enumerate()
                .map(|(idx, gid)| (idx, species.representative.distance(&population[gid], genome_config)))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            if let Some((idx, _)) = closest {
                let gid = unspeciated.swap_remove(idx);
                new_representatives.insert(sid, gid);
                new_members.insert(sid, vec![gid]);
            }
        }

        unspeciated.sort_unstable();
        for gid in unspeciated {
            let genome = &population[&gid];

            let compatible = new_representatives
                .iter()
                .map(|(&sid, rid)| (sid, genome.distance(&population[rid], genome_config)))
                .filter(|(_, d)| *d < threshold)
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            match compatible {
                Some((sid, _)) => new_members.entry(sid).or_default().push(gid),
                None => {
                    let sid = self.next_key;
                    self.next_key += 1;
                    new_representatives.insert(sid, gid);
                    new_members.insert(sid, vec![gid]);
                }
            }
        }

        self.genome_to_species.clear();
        let mut next_species = BTreeMap::new();
        for (sid, rid) in new_representatives {
            let members = new_members.remove(&sid).unwrap_or_default();
            let mut species = self
                .species
                .remove(&sid)
                .unwrap_or_else(|| Species::new(sid, generation, population[&rid].clone()));

            species.representative = population[&rid].clone();
            for gid in &members {
                self.genome_to_species.insert(*gid, sid);
            }
            species.members = members;
            next_species.insert(sid, species);
        }
        self.species = next_species;

        log::debug!(
            "Generation {}: {} species over {} genomes",
            generation,
            self.species.len(),
            population.len()
        );
    }
}

/// Update species fitness history and flag species that have not improved
/// within `max_stagnation` generations. The best `species_elitism` species are
/// never flagged. Returned in ascending species fitness order.
pub fn update_stagnation(
    species_set: &mut SpeciesSet,
    population: &BTreeMap<GenomeKey, Genome>,
    config: &StagnationConfig,
    generation: usize,
) -> Result<Vec<(SpeciesKey, bool)>> {
    let mut ranked = Vec::with_capacity(species_set.len());

    for (&sid, species) in species_set.species.iter_mut() {
        let previous_best = species
            .fitness_history
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let fitness = config
            .species_fitness_func
            .reduce(species.member_fitnesses(population))
            .ok_or_else(|| {
                NeuroLanderError::Evolution(format!("species {} has no evaluated members", sid))
            })?;

        species.fitness = Some(fitness);
        species.fitness_history.push(fitness);
        species.adjusted_fitness = None;
        if fitness > previous_best {
            species.last_improved = generation;
        }

        ranked.push((sid, fitness, species.last_improved));
    }

    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let total = ranked.len();
    let mut non_stagnant = total;
    let mut result = Vec::with_capacity(total);

    for (idx, (sid, _, last_improved)) in ranked.into_iter().enumerate() {
        let stagnant_time = generation.saturating_sub(last_improved);
        let mut is_stagnant = false;
        if non_stagnant > config.species_elitism {
            is_stagnant = stagnant_time >= config.max_stagnation;
        }
        if total - idx <= config.species_elitism {
            is_stagnant = false;
        }
        if is_stagnant {
            non_stagnant -= 1;
        }
        result.push((sid, is_stagnant));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn population(n: u64, config: &AppConfig) -> BTreeMap<GenomeKey, Genome> {
        let mut rng = StdRng::seed_from_u64(21);
        (0..n)
            .map(|k| (k, Genome::new_initial(k, &config.genome, &mut rng)))
            .collect()
    }

    #[test]
    fn test_every_genome_lands_in_one_species() {
        let config = AppConfig::default();
        let pop = population(30, &config);
        let mut set = SpeciesSet::new();

        set.speciate(&config, &pop, 0);

        let assigned: usize = set.species.values().map(|s| s.members.len()).sum();
        assert_eq!(assigned, 30);
        for key in pop.keys() {
            assert!(set.species_of(*key).is_some());
        }
    }

    #[test]
    fn test_tiny_threshold_isolates_genomes() {
        let mut config = AppConfig::default();
        config.species.compatibility_threshold = 1e-9;
        let pop = population(5, &config);
        let mut set = SpeciesSet::new();

        set.speciate(&config, &pop, 0);

        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_stagnant_species_flagged_but_elites_spared() {
        let config = AppConfig::default();
        let mut pop = population(3, &config);
        for (k, g) in pop.iter_mut() {
            g.fitness = Some(*k as f64);
        }

        let mut set = SpeciesSet::new();
        for (k, g) in &pop {
            let mut species = Species::new(*k as usize + 1, 0, g.clone());
            species.members = vec![*k];
            species.fitness_history = vec![100.0];
            set.species.insert(species.key, species);
        }

        let stagnation = StagnationConfig {
            max_stagnation: 5,
            species_elitism: 1,
            ..StagnationConfig::default()
        };
        let flags = update_stagnation(&mut set, &pop, &stagnation, 10).unwrap();

        assert_eq!(flags, vec![(1, true), (2, true), (3, false)]);
    }
}
