// engine.rs - Sparse set-based Game of Life with a per-tick neighbor cache

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cell::Cell;
use crate::input::PendingInputBuffer;
use crate::viewport::{Bounds, Viewport};

const INITIAL_CAPACITY: usize = 3000;

/// Memoized live-neighbor counts for a single generation.
///
/// Keyed by coordinate value. Valid only against the live set it was filled
/// from, so a new cache is built for every generation and dropped after it.
#[derive(Debug, Default)]
pub struct NeighborCache {
    counts: HashMap<Cell, u8>,
    hits: u64,
    misses: u64,
}

impl NeighborCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live neighbors of `cell`, served from the cache when already computed.
    pub fn count(&mut self, cell: Cell, live: &HashSet<Cell>, bounds: Bounds) -> u8 {
        if let Some(&count) = self.counts.get(&cell) {
            self.hits += 1;
            return count;
        }
        self.misses += 1;
        let count = Self::scan(cell, live, bounds);
        self.counts.insert(cell, count);
        count
    }

    /// Uncached count. Positions outside the padded bounds are never neighbors.
    pub fn scan(cell: Cell, live: &HashSet<Cell>, bounds: Bounds) -> u8 {
        cell.neighbors()
            .filter(|n| !bounds.is_out_of_bounds(n.x, n.y))
            .filter(|n| live.contains(n))
            .count() as u8
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Births and deaths computed from one immutable snapshot.
#[derive(Debug)]
pub struct Generation {
    pub births: HashSet<Cell>,
    pub deaths: HashSet<Cell>,
    pub cache: NeighborCache,
}

impl Generation {
    /// Kill first, then add the newborns. Consumes the cache with it.
    pub fn apply(self, live: &mut HashSet<Cell>) {
        live.retain(|cell| !self.deaths.contains(cell));
        live.extend(self.births);
    }
}

/// Compute the next generation of `live` without touching it.
///
/// Survival on 2 or 3 neighbors, birth on exactly 3. Birth candidates are the
/// dead cells around live cells that have at least one live neighbor
/// themselves, and a candidate shared by several live cells is evaluated once.
pub fn next_generation(live: &HashSet<Cell>, bounds: Bounds) -> Generation {
    let mut cache = NeighborCache::new();
    let mut births = HashSet::new();
    let mut deaths = HashSet::new();

    for &cell in live {
        let neighbors = cache.count(cell, live, bounds);

        // Under- and overpopulation
        if !(2..=3).contains(&neighbors) {
            deaths.insert(cell);
        }

        // Reproduction, searched only around cells with company
        if neighbors > 0 {
            for candidate in cell.neighbors() {
                if bounds.is_out_of_bounds(candidate.x, candidate.y)
                    || live.contains(&candidate)
                    || births.contains(&candidate)
                {
                    continue;
                }
                if cache.count(candidate, live, bounds) == 3 {
                    births.insert(candidate);
                }
            }
        }
    }

    Generation { births, deaths, cache }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub generation: u64,
    pub touched: usize,       // cells materialized from input this tick
    pub births: usize,
    pub deaths: usize,
    pub population: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub elapsed: Duration,
}

/// Owns the live-cell set. Lives on the scheduler thread; everyone else gets
/// copies.
#[derive(Debug)]
pub struct SimulationEngine {
    cells: HashSet<Cell>,
    input: Arc<PendingInputBuffer>,
    viewport: Viewport,
    generation: u64,
}

impl SimulationEngine {
    pub fn new(input: Arc<PendingInputBuffer>, viewport: Viewport) -> Self {
        Self {
            cells: HashSet::with_capacity(INITIAL_CAPACITY),
            input,
            viewport,
            generation: 0,
        }
    }

    pub fn with_cells(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.cells.extend(cells);
        self
    }

    /// Materialize finished touches, then advance one generation.
    pub fn tick(&mut self) -> TickStats {
        let started = Instant::now();

        let touches = self.input.take_processed();
        let touched = touches.len();
        self.cells.extend(touches);

        let bounds = self.viewport.bounds();
        let next = next_generation(&self.cells, bounds);
        let births = next.births.len();
        let deaths = next.deaths.len();
        let cache_hits = next.cache.hits();
        let cache_misses = next.cache.misses();
        next.apply(&mut self.cells);
        self.generation += 1;

        let elapsed = started.elapsed();
        tracing::trace!(generation = self.generation, ?elapsed, "generation computed");

        TickStats {
            generation: self.generation,
            touched,
            births,
            deaths,
            population: self.cells.len(),
            cache_hits,
            cache_misses,
            elapsed,
        }
    }

    /// Sorted copy of the live cells.
    pub fn live_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.cells.iter().copied().collect();
        cells.sort_unstable();
        cells
    }

    pub fn is_alive(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn population(&self) -> usize {
        self.cells.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(cells: &[(i32, i32)]) -> HashSet<Cell> {
        cells.iter().copied().map(Cell::from).collect()
    }

    #[test]
    fn cached_count_matches_fresh_scan() {
        let cells = live(&[(4, 5), (5, 5), (6, 5), (5, 6)]);
        let bounds = Bounds::new(20, 20);
        let mut cache = NeighborCache::new();

        for probe in [(5, 5), (5, 4), (5, 6), (7, 7)] {
            let cell = Cell::from(probe);
            let first = cache.count(cell, &cells, bounds);
            let second = cache.count(cell, &cells, bounds);
            assert_eq!(first, NeighborCache::scan(cell, &cells, bounds));
            assert_eq!(first, second);
        }
        assert_eq!(cache.misses(), 4);
        assert_eq!(cache.hits(), 4);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn each_generation_starts_with_an_empty_cache() {
        let cells = live(&[(4, 5), (5, 5), (6, 5)]);
        let bounds = Bounds::new(20, 20);

        let first = next_generation(&cells, bounds);
        assert!(!first.cache.is_empty());

        let mut cells = cells;
        first.apply(&mut cells);
        let second = next_generation(&cells, bounds);

        // A reused cache would have served some lookups from the first pass.
        assert_eq!(second.cache.misses() as usize, second.cache.len());
    }

    #[test]
    fn shared_candidate_is_born_once() {
        // (5,4) is adjacent to all three live cells.
        let cells = live(&[(4, 5), (5, 5), (6, 5)]);
        let next = next_generation(&cells, Bounds::new(20, 20));
        assert_eq!(next.births, live(&[(5, 4), (5, 6)]));
        assert_eq!(next.deaths, live(&[(4, 5), (6, 5)]));
    }

    #[test]
    fn lone_cells_seed_no_births() {
        // (10,10) has three live neighbors, but none of them has a neighbor
        // of its own, so nothing looks at it.
        let cells = live(&[(9, 9), (11, 9), (10, 11)]);
        let next = next_generation(&cells, Bounds::new(20, 20));
        assert!(next.births.is_empty());
        assert_eq!(next.deaths, cells);
    }

    #[test]
    fn candidates_outside_the_padding_are_not_born() {
        // Vertical blinker on the left padding column; its birth on x = -2 is
        // out of bounds.
        let cells = live(&[(-1, 4), (-1, 5), (-1, 6)]);
        let next = next_generation(&cells, Bounds::new(20, 20));
        assert_eq!(next.births, live(&[(0, 5)]));
    }
}
