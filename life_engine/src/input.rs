// input.rs - Double-buffered pointer input shared between the UI and the tick loop

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cell::{Cell, Touch};

#[derive(Debug, Default)]
struct Buffers {
    unprocessed: HashMap<Cell, f32>,  // cell -> latest pressure, finger still down
    processed: HashSet<Cell>,         // finished gestures waiting for the next tick
}

/// Buffers touches while a pointer is down and hands finished gestures to the
/// simulation exactly once.
///
/// One lock guards both sets, so `flush` is a single transaction and a
/// concurrent `take_processed` sees either the whole batch or none of it.
#[derive(Debug, Default)]
pub struct PendingInputBuffer {
    buffers: Mutex<Buffers>,
}

impl PendingInputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pointer sample in grid space. A repeated coordinate keeps the
    /// latest pressure.
    pub fn add_pending(&self, x: f32, y: f32, pressure: f32) {
        let touch = Touch::new(x, y, pressure);
        self.lock().unprocessed.insert(touch.cell, touch.pressure);
    }

    /// Records a cell that is already on the grid, at full pressure.
    pub fn add_cell(&self, cell: Cell) {
        self.lock().unprocessed.insert(cell, 1.0);
    }

    /// Replaces the processed batch with the in-progress gesture and clears
    /// the gesture. A batch the simulation has not taken yet is dropped.
    pub fn flush(&self) {
        let mut buffers = self.lock();
        let Buffers { unprocessed, processed } = &mut *buffers;
        *processed = unprocessed.drain().map(|(cell, _)| cell).collect();
        tracing::trace!(promoted = processed.len(), "input flushed");
    }

    /// Returns the processed batch and clears it. Read-once.
    pub fn take_processed(&self) -> HashSet<Cell> {
        std::mem::take(&mut self.lock().processed)
    }

    /// Snapshot of the in-progress gesture for preview rendering.
    pub fn peek_unprocessed(&self) -> Vec<Cell> {
        self.lock().unprocessed.keys().copied().collect()
    }

    /// Like `peek_unprocessed`, with pressure.
    pub fn peek_touches(&self) -> Vec<Touch> {
        self.lock()
            .unprocessed
            .iter()
            .map(|(&cell, &pressure)| Touch { cell, pressure })
            .collect()
    }

    pub fn is_idle(&self) -> bool {
        let buffers = self.lock();
        buffers.unprocessed.is_empty() && buffers.processed.is_empty()
    }

    // The sets stay valid even if a holder panicked, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Buffers> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_does_not_split_a_coordinate() {
        let input = PendingInputBuffer::new();
        input.add_pending(3.1, 4.2, 0.2);
        input.add_pending(2.9, 3.8, 0.9);

        let touches = input.peek_touches();
        assert_eq!(touches.len(), 1);
        assert_eq!(touches[0].cell, Cell::new(3, 4));
        assert_eq!(touches[0].pressure, 0.9);
    }

    #[test]
    fn flush_empties_the_unprocessed_side() {
        let input = PendingInputBuffer::new();
        input.add_cell(Cell::new(1, 1));
        assert!(!input.is_idle());

        input.flush();
        assert!(input.peek_unprocessed().is_empty());
        assert!(!input.is_idle());

        input.take_processed();
        assert!(input.is_idle());
    }
}
