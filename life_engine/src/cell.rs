// cell.rs - Grid coordinates and pointer samples

use std::fmt;

/// A position on the unbounded grid. Identity is the coordinate pair only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The Moore-neighborhood positions around this cell. Positions past the
    /// edge of the `i32` plane are left out.
    pub fn neighbors(self) -> impl Iterator<Item = Cell> {
        let Cell { x, y } = self;
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(move |(dx, dy)| Some(Cell::new(x.checked_add(dx)?, y.checked_add(dy)?)))
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

/// A pointer sample already scaled into grid space.
///
/// Pressure rides along for preview shading; it never takes part in identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub cell: Cell,
    pub pressure: f32,
}

impl Touch {
    /// Rounds half-up, so `-0.5` lands on `0` rather than `-1`.
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            cell: Cell::new(round_half_up(x), round_half_up(y)),
            pressure,
        }
    }
}

fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}
