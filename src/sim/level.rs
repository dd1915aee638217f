//! Brick kinds and level layout

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::consts::GRID_COLS;

/// Brick appearance/sound variant, 1..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrickKind(u8);

impl BrickKind {
    pub const MAX: u8 = 3;

    /// `None` for empty cells (0) and unknown kinds
    pub fn new(value: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// A brick to spawn: kind plus cell centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickSlot {
    pub kind: BrickKind,
    pub pos: Vec2,
}

/// Centre of cell `index`
pub fn cell_center(index: usize, grid: &GridConfig) -> Vec2 {
    let col = (index % GRID_COLS) as f32;
    let row = (index / GRID_COLS) as f32;
    grid.origin + Vec2::new(col * grid.spacing.x, row * grid.spacing.y)
}

/// Every non-empty cell as a brick slot, in cell order
pub fn brick_layout(cells: &[u8], grid: &GridConfig) -> Vec<BrickSlot> {
    cells
        .iter()
        .enumerate()
        .filter_map(|(cell, &value)| {
            BrickKind::new(value).map(|kind| BrickSlot {
                kind,
                pos: cell_center(cell, grid),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::GRID_ROWS;
    use proptest::prelude::*;

    #[test]
    fn test_layout_rows_wrap_every_ten_cells() {
        let grid = GridConfig::default();
        let mut cells = vec![0u8; 21];
        cells[0] = 1;
        cells[9] = 2;
        cells[10] = 3;
        cells[20] = 1;

        let slots = brick_layout(&cells, &grid);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].pos, Vec2::new(170.0, 200.0));
        assert_eq!(slots[1].pos, Vec2::new(170.0 + 9.0 * 50.0, 200.0));
        assert_eq!(slots[2].pos, Vec2::new(170.0, 230.0));
        assert_eq!(slots[3].pos, Vec2::new(170.0, 260.0));
        assert_eq!(slots[2].kind.value(), 3);
    }

    #[test]
    fn test_brick_kind_range() {
        assert!(BrickKind::new(0).is_none());
        assert!(BrickKind::new(4).is_none());
        assert_eq!(BrickKind::new(2).map(BrickKind::value), Some(2));
    }

    proptest! {
        #[test]
        fn prop_layout_counts_non_empty_cells(
            cells in prop::collection::vec(0u8..=3, 0..=GRID_COLS * GRID_ROWS)
        ) {
            let grid = GridConfig::default();
            let slots = brick_layout(&cells, &grid);
            prop_assert_eq!(slots.len(), cells.iter().filter(|&&c| c != 0).count());

            // Bricks never overlap: centres are at least one spacing apart
            for (i, a) in slots.iter().enumerate() {
                for b in &slots[i + 1..] {
                    let d = (a.pos - b.pos).abs();
                    prop_assert!(d.x >= grid.spacing.x - 1e-3 || d.y >= grid.spacing.y - 1e-3);
                }
            }
        }
    }
}
