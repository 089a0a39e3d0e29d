// viewport.rs - Visible grid size and the padded simulation boundary

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Visible region in cells. Anything outside it plus one cell of padding on
/// every side does not take part in neighbor counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Out of bounds means outside `[-1, width + 1] x [-1, height + 1]`.
    pub fn is_out_of_bounds(&self, x: i32, y: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        x < -1 || y < -1 || x > i64::from(self.width) + 1 || y > i64::from(self.height) + 1
    }
}

/// Shared handle to the current viewport size.
///
/// The presentation side writes it whenever the surface changes; the engine
/// loads one `Bounds` at the start of each tick. Width and height are packed
/// into a single word so a reader never sees half of an update.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    packed: Arc<AtomicU64>,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        let viewport = Self::default();
        viewport.set(width, height);
        viewport
    }

    /// Takes effect on the next tick. Negative sizes clamp to zero.
    pub fn set(&self, width: i32, height: i32) {
        let packed = pack(width.max(0), height.max(0));
        let previous = self.packed.swap(packed, Ordering::AcqRel);
        if previous != packed {
            tracing::debug!(width, height, "viewport resized");
        }
    }

    pub fn bounds(&self) -> Bounds {
        unpack(self.packed.load(Ordering::Acquire))
    }
}

fn pack(width: i32, height: i32) -> u64 {
    ((width as u32 as u64) << 32) | height as u32 as u64
}

fn unpack(packed: u64) -> Bounds {
    Bounds::new((packed >> 32) as u32 as i32, packed as u32 as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_one_cell_on_each_side() {
        let bounds = Bounds::new(20, 10);
        assert!(!bounds.is_out_of_bounds(-1, -1));
        assert!(!bounds.is_out_of_bounds(21, 11));
        assert!(bounds.is_out_of_bounds(-2, 0));
        assert!(bounds.is_out_of_bounds(0, -2));
        assert!(bounds.is_out_of_bounds(22, 5));
        assert!(bounds.is_out_of_bounds(5, 12));
    }

    #[test]
    fn huge_viewport_does_not_overflow() {
        let bounds = Bounds::new(i32::MAX, i32::MAX);
        assert!(!bounds.is_out_of_bounds(i32::MAX, i32::MAX));
        assert!(Bounds::new(10, 10).is_out_of_bounds(i32::MAX, 0));
    }

    #[test]
    fn viewport_handles_share_updates() {
        let viewport = Viewport::default();
        assert_eq!(viewport.bounds(), Bounds::new(0, 0));

        let renderer_side = viewport.clone();
        renderer_side.set(64, 48);
        assert_eq!(viewport.bounds(), Bounds::new(64, 48));

        renderer_side.set(-3, 7);
        assert_eq!(viewport.bounds(), Bounds::new(0, 7));
    }
}
