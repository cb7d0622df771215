//! Index partition of the population across the worker pool
//!
//! `[0, population)` is cut into `workers` equal contiguous chunks of
//! `population / workers` indices, followed by the residual chunk that the
//! coordinator computes itself. Chunks never overlap and together cover the
//! whole population, so every index of the next velocity buffer has exactly
//! one writer per tick.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    population: usize,
    workers: usize,
    chunk: usize,
}

impl Partition {
    pub fn new(population: usize, workers: usize) -> Self {
        let chunk = if workers == 0 { 0 } else { population / workers };
        Self {
            population,
            workers,
            chunk,
        }
    }

    pub fn population(&self) -> usize {
        self.population
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Size of every worker chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk
    }

    /// Chunk permanently owned by worker `index`
    pub fn worker_range(&self, index: usize) -> Range<usize> {
        debug_assert!(index < self.workers);
        index * self.chunk..(index + 1) * self.chunk
    }

    /// Tail left over after equal-chunk division, computed by the coordinator
    pub fn residual(&self) -> Range<usize> {
        self.workers * self.chunk..self.population
    }

    /// Worker chunks in worker order, then the residual
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.workers)
            .map(|index| self.worker_range(index))
            .chain(std::iter::once(self.residual()))
    }

    /// Indices of the workers whose chunks intersect `range`.
    ///
    /// Empty ranges and indices in the residual have no owner.
    pub fn owners(&self, range: &Range<usize>) -> Range<usize> {
        if range.is_empty() || self.chunk == 0 {
            return 0..0;
        }
        let first = (range.start / self.chunk).min(self.workers);
        let last = ((range.end - 1) / self.chunk + 1).min(self.workers);
        first..last.max(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_cover_population_exactly_once() {
        for population in 0..40 {
            for workers in 0..10 {
                let partition = Partition::new(population, workers);
                let mut hits = vec![0u32; population];
                for range in partition.ranges() {
                    for i in range {
                        hits[i] += 1;
                    }
                }
                assert!(
                    hits.iter().all(|&h| h == 1),
                    "population {population}, workers {workers}: {hits:?}"
                );
            }
        }
    }

    #[test]
    fn residual_takes_the_remainder() {
        let partition = Partition::new(10, 3);
        assert_eq!(partition.chunk_size(), 3);
        assert_eq!(partition.worker_range(2), 6..9);
        assert_eq!(partition.residual(), 9..10);
    }

    #[test]
    fn more_workers_than_particles_leaves_everything_residual() {
        let partition = Partition::new(2, 8);
        assert_eq!(partition.chunk_size(), 0);
        assert!(partition.worker_range(7).is_empty());
        assert_eq!(partition.residual(), 0..2);
        assert!(partition.owners(&(0..2)).is_empty());
    }

    #[test]
    fn owners_of_overlapping_ranges() {
        let partition = Partition::new(14, 3);
        assert_eq!(partition.owners(&(0..1)), 0..1);
        assert_eq!(partition.owners(&(7..9)), 1..3);
        assert_eq!(partition.owners(&(3..13)), 0..3);
        assert_eq!(partition.owners(&(12..14)), 3..3);
        // empty ranges own nothing, even inside a chunk
        assert!(partition.owners(&(5..5)).is_empty());
    }

    #[test]
    fn owners_agree_with_chunks() {
        for population in 1..30 {
            for workers in 1..6 {
                let partition = Partition::new(population, workers);
                for start in 0..population {
                    for end in start + 1..=population {
                        let expected: Vec<usize> = (0..workers)
                            .filter(|&w| {
                                let owned = partition.worker_range(w);
                                start < owned.end && owned.start < end
                            })
                            .collect();
                        let owners: Vec<usize> = partition.owners(&(start..end)).collect();
                        assert_eq!(owners, expected, "{population} / {workers}: {start}..{end}");
                    }
                }
            }
        }
    }
}
