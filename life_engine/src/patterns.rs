// patterns.rs - Named seed patterns, stamped through the input buffer

use crate::cell::Cell;
use crate::input::PendingInputBuffer;

pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i32, i32)],  // (x, y) offsets from the stamp origin
}

impl Pattern {
    /// Cells of the pattern placed at `origin`.
    pub fn cells_at(&self, origin: Cell) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .map(move |&(dx, dy)| Cell::new(origin.x + dx, origin.y + dy))
    }

    /// Size of the pattern's bounding box.
    pub fn extent(&self) -> (i32, i32) {
        let width = self.cells.iter().map(|&(x, _)| x).max().unwrap_or(-1) + 1;
        let height = self.cells.iter().map(|&(_, y)| y).max().unwrap_or(-1) + 1;
        (width, height)
    }

    /// Feeds the pattern in as one finished gesture, so it reaches the
    /// simulation on the next tick like any touch.
    pub fn stamp(&self, input: &PendingInputBuffer, origin: Cell) {
        for cell in self.cells_at(origin) {
            input.add_cell(cell);
        }
        input.flush();
        tracing::debug!(pattern = self.name, %origin, "pattern stamped");
    }

    pub fn find(name: &str) -> Option<&'static Pattern> {
        PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "Glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "Block",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
    },
    Pattern {
        name: "Blinker",
        cells: &[(0, 0), (1, 0), (2, 0)],
    },
    Pattern {
        name: "Toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "Beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Pattern {
        name: "R-pentomino",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
    },
    Pattern {
        name: "Gosper Glider Gun",
        cells: &[
            (0, 4), (1, 4), (0, 5), (1, 5),
            (10, 4), (10, 5), (10, 6), (11, 3), (11, 7), (12, 2), (12, 8),
            (13, 2), (13, 8), (14, 5), (15, 3), (15, 7), (16, 4), (16, 5),
            (16, 6), (17, 5), (20, 2), (20, 3), (20, 4), (21, 2), (21, 3),
            (21, 4), (22, 1), (22, 5), (24, 0), (24, 1), (24, 5), (24, 6),
            (34, 2), (34, 3), (35, 2), (35, 3),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn patterns_have_no_duplicate_cells() {
        for pattern in PATTERNS {
            let unique: HashSet<_> = pattern.cells.iter().collect();
            assert_eq!(unique.len(), pattern.cells.len(), "{} repeats a cell", pattern.name);
        }
    }

    #[test]
    fn stamp_delivers_one_batch() {
        let input = PendingInputBuffer::new();
        let blinker = Pattern::find("blinker").unwrap();
        blinker.stamp(&input, Cell::new(4, 5));

        let batch = input.take_processed();
        let expected: HashSet<Cell> = [(4, 5), (5, 5), (6, 5)].into_iter().map(Cell::from).collect();
        assert_eq!(batch, expected);
        assert!(input.take_processed().is_empty());
    }

    #[test]
    fn gun_extent_matches_its_bounding_box() {
        assert_eq!(Pattern::find("Gosper Glider Gun").unwrap().extent(), (36, 9));
        assert_eq!(Pattern::find("Block").unwrap().extent(), (2, 2));
    }
}
