use crate::engines::generation::genome::{Genome, GenomeKey};
use crate::engines::generation::progress::{ProgressCallback, ProgressEvent};

/// The best distinct genomes seen across all generations, fittest first.
/// Elites carried between generations keep their key, so a key is stored at
/// most once with its latest fitness.
pub struct HallOfFame {
    genomes: Vec<Genome>,
    max_size: usize,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            genomes: Vec::new(),
            max_size,
        }
    }

    /// Attempt to add an evaluated genome. Returns whether it is now in the hall.
    pub fn try_add(&mut self, genome: &Genome) -> bool {
        let Some(fitness) = genome.fitness else {
            return false;
        };

        if let Some(existing) = self.genomes.iter_mut().find(|g| g.key == genome.key) {
            *existing = genome.clone();
        } else {
            if self.genomes.len() >= self.max_size {
                let worst = self.genomes.last().and_then(|g| g.fitness);
                if worst.is_some_and(|w| fitness <= w) {
                    return false;
                }
            }
            self.genomes.push(genome.clone());
        }

        self.sort_and_trim();
        self.contains(genome.key)
    }

    fn sort_and_trim(&mut self) {
        self.genomes.sort_by(|a, b| {
            b.fitness.partial_cmp(&a.fitness).unwrap_or(std::cmp::Ordering::Equal)
        });
        self.genomes.truncate(self.max_size);
    }

    pub fn contains(&self, key: GenomeKey) -> bool {
        self.genomes.iter().any(|g| g.key == key)
    }

    pub fn get_all(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn get_top_n(&self, n: usize) -> &[Genome] {
        &self.genomes[..n.min(self.genomes.len())]
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }
}

impl ProgressCallback for HallOfFame {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        if let ProgressEvent::PostEvaluate { population, .. } = event {
            for genome in population.values() {
                self.try_add(genome);
            }
        }
    }
}
