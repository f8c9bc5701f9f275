use crate::config::{AppConfig, GenomeConfig};
use crate::engines::generation::genome::{Genome, GenomeKey};
use crate::engines::generation::operators::{crossover, mutate};
use crate::engines::generation::species::{update_stagnation, SpeciesKey, SpeciesSet};
use crate::error::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Builds each new generation from the evaluated species of the previous one.
#[derive(Debug, Clone)]
pub struct Reproduction {
    next_genome_key: GenomeKey,
}

impl Default for Reproduction {
    fn default() -> Self {
        Self::new()
    }
}

impl Reproduction {
    pub fn new() -> Self {
        Self { next_genome_key: 1 }
    }

    fn next_key(&mut self) -> GenomeKey {
        let key = self.next_genome_key;
        self.next_genome_key += 1;
        key
    }

    pub fn create_new<R: Rng>(
        &mut self,
        config: &GenomeConfig,
        count: usize,
        rng: &mut R,
    ) -> BTreeMap<GenomeKey, Genome> {
        (0..count)
            .map(|_| {
                let key = self.next_key();
                (key, Genome::new_initial(key, config, rng))
            })
            .collect()
    }

    /// Produce the next population. Stagnant species are dropped; the rest
    /// receive offspring in proportion to their adjusted fitness. An empty
    /// result means every species went extinct.
    pub fn reproduce<R: Rng>(
        &mut self,
        config: &AppConfig,
        species_set: &mut SpeciesSet,
        population: &BTreeMap<GenomeKey, Genome>,
        generation: usize,
        rng: &mut R,
    ) -> Result<BTreeMap<GenomeKey, Genome>> {
        let stagnation = update_stagnation(species_set, population, &config.stagnation, generation)?;

        let mut remaining: Vec<SpeciesKey> = Vec::new();
        let mut all_fitnesses: Vec<f64> = Vec::new();
        for (sid, stagnant) in stagnation {
            if stagnant {
                log::info!("Species {} is stagnant and will be removed", sid);
                species_set.species.remove(&sid);
            } else if let Some(species) = species_set.species.get(&sid) {
                all_fitnesses.extend(species.member_fitnesses(population));
                remaining.push(sid);
            }
        }

        if remaining.is_empty() {
            species_set.species.clear();
            return Ok(BTreeMap::new());
        }

        let min_fitness = all_fitnesses.iter().copied().fold(f64::INFINITY, f64::min);
        let max_fitness = all_fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let fitness_range = (max_fitness - min_fitness).max(1.0);

        let mut adjusted = Vec::with_capacity(remaining.len());
        let mut previous_sizes = Vec::with_capacity(remaining.len());
        for sid in &remaining {
            if let Some(species) = species_set.species.get_mut(sid) {
                let fitnesses = species.member_fitnesses(population);
                let mean = fitnesses.iter().sum::<f64>() / fitnesses.len().max(1) as f64;
                let af = (mean - min_fitness) / fitness_range;
                species.adjusted_fitness = Some(af);
                adjusted.push(af);
                previous_sizes.push(species.members.len());
            }
        }

        let elitism = config.reproduction.elitism;
        let min_species_size = config.reproduction.min_species_size.max(elitism);
        let spawn_amounts = compute_spawn(
            &adjusted,
            &previous_sizes,
            config.neat.population_size,
            min_species_size,
        );

        let mut next = BTreeMap::new();
        for (sid, spawn) in remaining.iter().zip(spawn_amounts) {
            let Some(species) = species_set.species.get(sid) else {
                continue;
            };

            let mut members: Vec<&Genome> = species
                .members
                .iter()
                .filter_map(|k| population.get(k))
                .collect();
            members.sort_by(|a, b| {
                b.fitness
                    .partial_cmp(&a.fitness)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut spawn = spawn.max(elitism);
            for elite in members.iter().take(elitism) {
                next.insert(elite.key, (*elite).clone());
                spawn -= 1;
            }
            if spawn == 0 || members.is_empty() {
                continue;
            }

            let cutoff = ((config.reproduction.survival_threshold * members.len() as f64).ceil() as usize)
                .max(2)
                .min(members.len());
            let parents = &members[..cutoff];

            while spawn > 0 {
                spawn -= 1;
                let (Some(&parent1), Some(&parent2)) = (parents.choose(rng), parents.choose(rng)) else {
                    break;
                };
                let key = self.next_key();
                let mut child = crossover(parent1, parent2, key, rng);
                mutate(&mut child, &config.genome, rng);
                next.insert(key, child);
            }
        }

        Ok(next)
    }
}

/// Offspring per species. Each species moves halfway from its previous size
/// toward its fitness-proportional share, then the totals are rescaled to
/// the population size.
pub fn compute_spawn(
    adjusted: &[f64],
    previous_sizes: &[usize],
    pop_size: usize,
    min_species_size: usize,
) -> Vec<usize> {
    let af_sum: f64 = adjusted.iter().sum();

    let raw: Vec<i64> = adjusted
        .iter()
        .zip(previous_sizes)
        .map(|(&af, &ps)| {
            let target = if af_sum > 0.0 {
                (af / af_sum * pop_size as f64).max(min_species_size as f64)
            } else {
                min_species_size as f64
            };

            let delta = (target - ps as f64) * 0.5;
            let step = delta.round() as i64;
            let mut spawn = ps as i64;
            if step != 0 {
                spawn += step;
            } else if delta > 0.0 {
                spawn += 1;
            } else if delta < 0.0 {
                spawn -= 1;
            }
            spawn
        })
        .collect();

    let total: i64 = raw.iter().sum();
    if total <= 0 {
        return vec![min_species_size; raw.len()];
    }

    let norm = pop_size as f64 / total as f64;
    raw.into_iter()
        .map(|n| ((n as f64 * norm).round().max(0.0) as usize).max(min_species_size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_favours_fitter_species() {
        let spawn = compute_spawn(&[0.9, 0.1], &[50, 50], 100, 2);
        assert_eq!(spawn.len(), 2);
        assert!(spawn[0] > spawn[1]);
        let total: usize = spawn.iter().sum();
        assert!((98..=102).contains(&total));
    }

    #[test]
    fn test_spawn_respects_minimum() {
        let spawn = compute_spawn(&[0.0, 0.0], &[1, 1], 10, 3);
        assert!(spawn.iter().all(|&n| n >= 3));
    }

    #[test]
    fn test_reproduce_keeps_elites_and_issues_fresh_keys() {
        let config = AppConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut reproduction = Reproduction::new();
        let mut population = reproduction.create_new(&config.genome, 20, &mut rng);
        for (k, g) in population.iter_mut() {
            g.fitness = Some(*k as f64);
        }

        let mut species = SpeciesSet::new();
        species.speciate(&config, &population, 0);

        let next = reproduction
            .reproduce(&config, &mut species, &population, 0, &mut rng)
            .unwrap();

        assert!(!next.is_empty());
        assert!(next.contains_key(&20), "best genome should survive as an elite");
        assert!(next.keys().any(|&k| k > 20), "offspring should get new keys");
        for (key, genome) in &next {
            assert_eq!(*key, genome.key);
        }
    }
}
